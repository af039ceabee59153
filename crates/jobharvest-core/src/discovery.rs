//! Listing discovery: paginate each search segment and collect unique listings.
//!
//! Result pagination on the source is flaky near the end of a result set, so a
//! segment tolerates a few consecutive empty pages before it stops. A page
//! whose fetch fails after retries counts as empty.

use std::collections::HashSet;

use url::Url;

use crate::config::SearchConfig;
use crate::error::AppError;
use crate::models::{ListingRef, SearchSegment};
use crate::resolver::canonicalize;
use crate::retry::RetryingFetcher;
use crate::throttle::Pacer;
use crate::traits::{Fetcher, MarkupParser};

/// Run-wide dedup set and the listings accumulated so far.
#[derive(Debug, Default)]
pub struct DiscoverySession {
    seen: HashSet<String>,
    listings: Vec<ListingRef>,
}

impl DiscoverySession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a listing unless its canonical URL was already seen.
    /// The first keyword to surface a URL keeps it.
    pub fn insert(&mut self, canonical_url: String, keyword: &str) -> bool {
        if !self.seen.insert(canonical_url.clone()) {
            return false;
        }
        self.listings.push(ListingRef {
            canonical_url,
            keyword: keyword.to_string(),
        });
        true
    }

    pub fn contains(&self, canonical_url: &str) -> bool {
        self.seen.contains(canonical_url)
    }

    pub fn len(&self) -> usize {
        self.listings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listings.is_empty()
    }

    /// Listings in first-seen order.
    pub fn listings(&self) -> &[ListingRef] {
        &self.listings
    }

    pub fn into_listings(self) -> Vec<ListingRef> {
        self.listings
    }
}

/// Why a segment stopped paginating.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// Consecutive empty pages exceeded the tolerance.
    EmptyPages,
    /// The page cap was reached.
    PageCap,
}

/// Outcome of paginating one segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentReport {
    pub segment: SearchSegment,
    pub pages_fetched: u32,
    pub failed_pages: u32,
    pub links_found: usize,
    pub new_listings: usize,
    pub stop_reason: StopReason,
}

/// Counts consecutive empty pages for one segment.
#[derive(Debug, Clone, Copy)]
pub struct EmptyPageTracker {
    streak: u32,
    tolerance: u32,
}

impl EmptyPageTracker {
    pub fn new(tolerance: u32) -> Self {
        Self {
            streak: 0,
            tolerance,
        }
    }

    /// Record how many links a page yielded.
    pub fn record(&mut self, links: usize) {
        if links == 0 {
            self.streak += 1;
        } else {
            self.streak = 0;
        }
    }

    pub fn streak(&self) -> u32 {
        self.streak
    }

    /// True once the streak is strictly above the tolerance.
    pub fn exhausted(&self) -> bool {
        self.streak > self.tolerance
    }
}

/// URL of one search results page.
pub fn search_page_url(
    search: &SearchConfig,
    segment: &SearchSegment,
    page: u32,
) -> Result<String, AppError> {
    let start = (u64::from(page) * u64::from(search.page_size)).to_string();
    Url::parse_with_params(
        &search.endpoint,
        &[
            ("keywords", segment.keyword.as_str()),
            ("location", segment.country.as_str()),
            ("f_TPR", search.time_window.as_str()),
            ("start", start.as_str()),
        ],
    )
    .map(String::from)
    .map_err(|e| AppError::ConfigError(format!("invalid search endpoint: {e}")))
}

/// Pages through search segments, feeding a [`DiscoverySession`].
pub struct ListingDiscovery<F, P>
where
    F: Fetcher,
    P: MarkupParser,
{
    fetcher: RetryingFetcher<F>,
    parser: P,
    search: SearchConfig,
    pacer: Pacer,
}

impl<F, P> ListingDiscovery<F, P>
where
    F: Fetcher,
    P: MarkupParser,
{
    pub fn new(fetcher: RetryingFetcher<F>, parser: P, search: SearchConfig, pacer: Pacer) -> Self {
        Self {
            fetcher,
            parser,
            search,
            pacer,
        }
    }

    /// Discover every segment in order, returning one report per segment.
    pub async fn discover_all(
        &self,
        segments: &[SearchSegment],
        session: &mut DiscoverySession,
    ) -> Result<Vec<SegmentReport>, AppError> {
        let mut reports = Vec::with_capacity(segments.len());
        for segment in segments {
            reports.push(self.discover_segment(segment, session).await?);
        }
        tracing::info!(unique_listings = session.len(), "Discovery complete");
        Ok(reports)
    }

    /// Paginate one segment until the empty-page tolerance or the page cap stops it.
    ///
    /// Only an unbuildable search URL is an error; failed pages are counted
    /// and skipped.
    pub async fn discover_segment(
        &self,
        segment: &SearchSegment,
        session: &mut DiscoverySession,
    ) -> Result<SegmentReport, AppError> {
        tracing::info!(
            country = %segment.country,
            keyword = %segment.display_keyword(),
            "Searching segment"
        );

        let mut tracker = EmptyPageTracker::new(self.search.empty_page_tolerance);
        let mut pages_fetched = 0;
        let mut failed_pages = 0;
        let mut links_found = 0;
        let mut new_listings = 0;

        for page in 0..self.search.max_pages {
            if tracker.exhausted() {
                break;
            }

            let url = search_page_url(&self.search, segment, page)?;
            let links = match self.fetcher.get(&url).await {
                Ok(body) => self.parser.listing_links(&body),
                Err(e) => {
                    tracing::warn!(%url, page, error = %e, "Search page skipped");
                    failed_pages += 1;
                    Vec::new()
                }
            };
            pages_fetched += 1;
            tracker.record(links.len());

            if links.is_empty() {
                tracing::debug!(page, streak = tracker.streak(), "No listings on page");
            } else {
                links_found += links.len();
                for link in &links {
                    if session.insert(canonicalize(link), &segment.keyword) {
                        new_listings += 1;
                    }
                }
                tracing::debug!(page, links = links.len(), "Listings harvested");
            }

            self.pacer.pause().await;
        }

        let stop_reason = if tracker.exhausted() {
            StopReason::EmptyPages
        } else {
            StopReason::PageCap
        };

        tracing::info!(
            country = %segment.country,
            pages_fetched,
            new_listings,
            ?stop_reason,
            "Segment done"
        );

        Ok(SegmentReport {
            segment: segment.clone(),
            pages_fetched,
            failed_pages,
            links_found,
            new_listings,
            stop_reason,
        })
    }
}
