use std::path::PathBuf;

use chrono::NaiveDate;

use crate::assembler::RecordAssembler;
use crate::config::HarvestConfig;
use crate::discovery::{DiscoverySession, ListingDiscovery, SegmentReport};
use crate::error::AppError;
use crate::models::{DetailRef, ListingRef, NormalizedRecord};
use crate::resolver;
use crate::retry::RetryingFetcher;
use crate::throttle::Pacer;
use crate::traits::{ExportedFiles, Exporter, Fetcher, MarkupParser};

/// Counters for one run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    pub segments: usize,
    pub pages_fetched: u32,
    pub failed_pages: u32,
    pub unique_listings: usize,
    pub malformed_references: usize,
    pub records: usize,
    pub excluded: usize,
    pub fetch_failures: usize,
    pub item_errors: usize,
    pub full_file: Option<PathBuf>,
    pub clean_file: Option<PathBuf>,
}

/// Records collected by a run, before export.
#[derive(Debug)]
pub struct Harvest {
    pub records: Vec<NormalizedRecord>,
    pub report: RunReport,
}

/// Orchestrates a full run: discover → resolve → assemble → export.
///
/// Generic over the fetch, markup and export collaborators so the whole
/// pipeline runs against in-memory stubs in tests.
pub struct HarvestService<F, P, X>
where
    F: Fetcher,
    P: MarkupParser,
    X: Exporter,
{
    fetcher: F,
    parser: P,
    exporter: X,
    config: HarvestConfig,
}

impl<F, P, X> HarvestService<F, P, X>
where
    F: Fetcher,
    P: MarkupParser,
    X: Exporter,
{
    pub fn new(fetcher: F, parser: P, exporter: X, config: HarvestConfig) -> Self {
        Self {
            fetcher,
            parser,
            exporter,
            config,
        }
    }

    pub fn config(&self) -> &HarvestConfig {
        &self.config
    }

    /// Harvest and export. Only a failed export (or invalid config) is fatal.
    pub async fn run(&self, capture_date: NaiveDate) -> Result<Harvest, AppError> {
        let mut harvest = self.harvest(capture_date).await?;
        if let Some(files) = self.export(&harvest.records, capture_date)? {
            harvest.report.full_file = Some(files.full);
            harvest.report.clean_file = Some(files.clean);
        }
        Ok(harvest)
    }

    /// Discover listings, resolve them and assemble records, without exporting.
    pub async fn harvest(&self, capture_date: NaiveDate) -> Result<Harvest, AppError> {
        self.config.validate()?;

        let fetcher = RetryingFetcher::new(self.fetcher.clone(), self.config.retry.clone());
        let segments = self.config.segments();

        // 1. Discover
        tracing::info!(segments = segments.len(), "Harvesting links");
        let discovery = ListingDiscovery::new(
            fetcher.clone(),
            self.parser.clone(),
            self.config.search.clone(),
            Pacer::new(self.config.pacing.page_delay),
        );
        let mut session = DiscoverySession::new();
        let segment_reports = discovery.discover_all(&segments, &mut session).await?;

        // 2. Resolve
        let listings = session.into_listings();
        let (details, malformed) = self.resolve_all(&listings);
        tracing::info!(
            unique_listings = listings.len(),
            resolved = details.len(),
            malformed,
            "Listings resolved"
        );

        // 3. Assemble
        tracing::info!("Extracting details");
        let assembler = RecordAssembler::new(
            fetcher,
            self.parser.clone(),
            self.config.excluded_locations.clone(),
            Pacer::new(self.config.pacing.detail_delay),
            capture_date,
        );
        let assembly = assembler.assemble_all(&details).await;

        let report = RunReport {
            segments: segment_reports.len(),
            pages_fetched: sum_pages(&segment_reports, |r| r.pages_fetched),
            failed_pages: sum_pages(&segment_reports, |r| r.failed_pages),
            unique_listings: listings.len(),
            malformed_references: malformed,
            records: assembly.records.len(),
            excluded: assembly.excluded,
            fetch_failures: assembly.fetch_failures,
            item_errors: assembly.item_errors,
            full_file: None,
            clean_file: None,
        };

        Ok(Harvest {
            records: assembly.records,
            report,
        })
    }

    /// Write records through the exporter. Nothing is written for an empty run.
    pub fn export(
        &self,
        records: &[NormalizedRecord],
        run_date: NaiveDate,
    ) -> Result<Option<ExportedFiles>, AppError> {
        if records.is_empty() {
            tracing::warn!("No data collected");
            return Ok(None);
        }
        let files = self.exporter.export(records, run_date)?;
        tracing::info!(
            full = %files.full.display(),
            clean = %files.clean.display(),
            rows = files.rows,
            "Data saved"
        );
        Ok(Some(files))
    }

    fn resolve_all(&self, listings: &[ListingRef]) -> (Vec<DetailRef>, usize) {
        let mut details = Vec::with_capacity(listings.len());
        let mut malformed = 0;
        for listing in listings {
            match resolver::resolve(listing, &self.config.detail_endpoint) {
                Some(detail) => details.push(detail),
                None => {
                    let error = AppError::MalformedReference(listing.canonical_url.clone());
                    tracing::warn!(%error, "Listing dropped");
                    malformed += 1;
                }
            }
        }
        (details, malformed)
    }
}

fn sum_pages(reports: &[SegmentReport], field: impl Fn(&SegmentReport) -> u32) -> u32 {
    reports.iter().map(field).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{PacingConfig, RetryConfig};
    use crate::testutil::{LineParser, MockExporter, MockFetcher, detail_page, listing_page};
    use crate::traits::FetchResponse;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 14).unwrap()
    }

    fn config() -> HarvestConfig {
        HarvestConfig {
            countries: vec!["Kenya".into()],
            keywords: vec!["".into()],
            retry: RetryConfig::immediate(1),
            pacing: PacingConfig::none(),
            ..HarvestConfig::default()
        }
    }

    #[tokio::test]
    async fn end_to_end_single_record() {
        let fetcher = MockFetcher::with_responses(vec![
            Ok(FetchResponse::ok(listing_page(&[
                "https://www.linkedin.com/jobs/view/data-analyst-at-acme-3912345678?refId=a",
                "https://www.linkedin.com/jobs/view/no-id-here",
            ]))),
            Ok(FetchResponse::ok("")),
            Ok(FetchResponse::ok("")),
            Ok(FetchResponse::ok("")),
            Ok(FetchResponse::ok(detail_page(&[
                ("title", "Data Analyst"),
                ("company", "Acme"),
                ("location", "Nairobi, Kenya"),
                (
                    "description",
                    "Master en statistiques. Minimum 4 ans d'expérience en analyse.",
                ),
            ]))),
        ]);
        let exporter = MockExporter::new();
        let service = HarvestService::new(fetcher.clone(), LineParser, exporter.clone(), config());

        let harvest = service.run(date()).await.unwrap();

        assert_eq!(harvest.records.len(), 1);
        let record = &harvest.records[0];
        assert_eq!(record.education, "Bac+5 / Master / Ingénieur");
        assert_eq!(record.experience, "4 ans/years");
        assert_eq!(
            record.api_link,
            "https://www.linkedin.com/jobs-guest/jobs/api/jobPosting/3912345678"
        );
        assert_eq!(
            record.original_link,
            "https://www.linkedin.com/jobs/view/data-analyst-at-acme-3912345678"
        );

        let report = &harvest.report;
        assert_eq!(report.unique_listings, 2);
        assert_eq!(report.malformed_references, 1);
        assert_eq!(report.pages_fetched, 4);
        assert_eq!(report.records, 1);
        assert!(report.full_file.is_some());

        let exported = exporter.exported();
        assert_eq!(exported.len(), 1);
        assert_eq!(exported[0], harvest.records);

        let requested = fetcher.requested();
        assert_eq!(requested.len(), 5);
        assert!(requested[4].ends_with("/jobPosting/3912345678"));
    }

    #[tokio::test]
    async fn empty_run_exports_nothing() {
        let exporter = MockExporter::new();
        let service =
            HarvestService::new(MockFetcher::empty(), LineParser, exporter.clone(), config());

        let harvest = service.run(date()).await.unwrap();

        assert!(harvest.records.is_empty());
        assert!(harvest.report.full_file.is_none());
        assert!(exporter.exported().is_empty());
    }

    #[tokio::test]
    async fn export_failure_is_fatal() {
        let fetcher = MockFetcher::with_responses(vec![
            Ok(FetchResponse::ok(listing_page(&["https://x.com/jobs/view/a-1"]))),
            Ok(FetchResponse::ok("")),
            Ok(FetchResponse::ok("")),
            Ok(FetchResponse::ok("")),
            Ok(FetchResponse::ok(detail_page(&[("title", "A")]))),
        ]);
        let exporter = MockExporter::with_error(AppError::ExportError("read-only".into()));
        let service = HarvestService::new(fetcher, LineParser, exporter, config());

        let err = service.run(date()).await.unwrap_err();
        assert!(matches!(err, AppError::ExportError(_)));
    }

    #[tokio::test]
    async fn invalid_config_is_rejected_before_fetching() {
        let fetcher = MockFetcher::empty();
        let service = HarvestService::new(
            fetcher.clone(),
            LineParser,
            MockExporter::new(),
            HarvestConfig {
                keywords: vec![],
                ..config()
            },
        );

        let err = service.harvest(date()).await.unwrap_err();
        assert!(matches!(err, AppError::ConfigError(_)));
        assert!(fetcher.requested().is_empty());
    }
}
