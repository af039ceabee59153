//! Record assembly: fetch each detail page, classify it, filter it, emit a record.
//!
//! Every item is isolated. A fetch failure, an excluded location or an
//! unexpected parse error skips that item and the loop moves on.

use chrono::NaiveDate;

use crate::classify::{classify_education, classify_experience};
use crate::error::AppError;
use crate::models::{DetailRef, NormalizedRecord, RawDetail};
use crate::retry::RetryingFetcher;
use crate::text::contains_ignore_case;
use crate::throttle::Pacer;
use crate::traits::{Fetcher, MarkupParser};

/// Why an item produced no record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// The detail page could not be fetched after retries.
    FetchFailed(String),
    /// The location matched the exclusion list.
    Excluded { location: String },
}

/// Result of assembling one detail reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemOutcome {
    Emitted(NormalizedRecord),
    Skipped(SkipReason),
}

/// Totals for a whole assembly pass.
#[derive(Debug, Default)]
pub struct AssemblyReport {
    pub records: Vec<NormalizedRecord>,
    pub excluded: usize,
    pub fetch_failures: usize,
    pub item_errors: usize,
}

/// True when a known location contains any excluded substring, ignoring case.
/// An absent location is never excluded.
pub fn is_excluded(location: Option<&str>, excluded: &[String]) -> bool {
    let Some(location) = location else {
        return false;
    };
    excluded
        .iter()
        .filter(|ex| !ex.is_empty())
        .any(|ex| contains_ignore_case(location, ex))
}

/// Turns detail references into normalized records.
pub struct RecordAssembler<F, P>
where
    F: Fetcher,
    P: MarkupParser,
{
    fetcher: RetryingFetcher<F>,
    parser: P,
    excluded_locations: Vec<String>,
    pacer: Pacer,
    capture_date: NaiveDate,
}

impl<F, P> RecordAssembler<F, P>
where
    F: Fetcher,
    P: MarkupParser,
{
    pub fn new(
        fetcher: RetryingFetcher<F>,
        parser: P,
        excluded_locations: Vec<String>,
        pacer: Pacer,
        capture_date: NaiveDate,
    ) -> Self {
        Self {
            fetcher,
            parser,
            excluded_locations,
            pacer,
            capture_date,
        }
    }

    /// Assemble one item.
    ///
    /// Expected skips come back as `Ok(ItemOutcome::Skipped)`; `Err` is an
    /// unexpected failure the caller logs and skips.
    pub async fn assemble(&self, detail: &DetailRef) -> Result<ItemOutcome, AppError> {
        let html = match self.fetcher.get(&detail.detail_url).await {
            Ok(html) => html,
            Err(e) if e.is_transport_failure() => {
                return Ok(ItemOutcome::Skipped(SkipReason::FetchFailed(e.to_string())));
            }
            Err(e) => return Err(e),
        };

        let raw = self.parser.parse_detail(&html)?;
        Ok(self.build(detail, raw))
    }

    /// Classify and filter an already-parsed detail.
    pub fn build(&self, detail: &DetailRef, raw: RawDetail) -> ItemOutcome {
        if is_excluded(raw.location.as_deref(), &self.excluded_locations) {
            return ItemOutcome::Skipped(SkipReason::Excluded {
                location: raw.location.unwrap_or_default(),
            });
        }

        let education = classify_education(raw.description.as_deref());
        let experience = classify_experience(raw.description.as_deref());

        ItemOutcome::Emitted(NormalizedRecord::assemble(
            detail,
            raw,
            education,
            &experience,
            self.capture_date,
        ))
    }

    /// Assemble every item in order. Never fails as a whole.
    pub async fn assemble_all(&self, details: &[DetailRef]) -> AssemblyReport {
        let mut report = AssemblyReport::default();
        let total = details.len();

        for (i, detail) in details.iter().enumerate() {
            tracing::debug!(item = i + 1, total, url = %detail.detail_url, "Processing detail");

            match self.assemble(detail).await {
                Ok(ItemOutcome::Emitted(record)) => report.records.push(record),
                Ok(ItemOutcome::Skipped(SkipReason::Excluded { location })) => {
                    tracing::debug!(url = %detail.detail_url, %location, "Excluded by location");
                    report.excluded += 1;
                }
                Ok(ItemOutcome::Skipped(SkipReason::FetchFailed(error))) => {
                    tracing::warn!(url = %detail.detail_url, %error, "Detail skipped");
                    report.fetch_failures += 1;
                }
                Err(e) => {
                    tracing::warn!(
                        item = i + 1,
                        url = %detail.detail_url,
                        error = %e,
                        "Error on item"
                    );
                    report.item_errors += 1;
                }
            }

            self.pacer.pause().await;
        }

        tracing::info!(
            records = report.records.len(),
            excluded = report.excluded,
            fetch_failures = report.fetch_failures,
            item_errors = report.item_errors,
            "Details processed"
        );
        report
    }
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use super::*;
    use crate::config::{JitterRange, RetryConfig};
    use crate::models::NOT_AVAILABLE;
    use crate::testutil::{LineParser, MockFetcher, detail_page};
    use crate::traits::FetchResponse;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 14).unwrap()
    }

    fn assembler(fetcher: MockFetcher) -> RecordAssembler<MockFetcher, LineParser> {
        RecordAssembler::new(
            RetryingFetcher::new(fetcher, RetryConfig::immediate(1)),
            LineParser,
            vec!["Spain".into()],
            Pacer::none(),
            date(),
        )
    }

    fn detail_ref(id: &str) -> DetailRef {
        DetailRef {
            detail_id: id.into(),
            detail_url: format!("https://x.com/jobPosting/{id}"),
            keyword: String::new(),
            listing_url: format!("https://x.com/jobs/view/analyst-{id}"),
        }
    }

    #[test]
    fn exclusion_is_case_insensitive_substring() {
        let excluded = vec!["Spain".to_string()];
        assert!(is_excluded(Some("Madrid, SPAIN"), &excluded));
        assert!(is_excluded(Some("barcelona, spain"), &excluded));
        assert!(!is_excluded(Some("Nairobi, Kenya"), &excluded));
        assert!(!is_excluded(None, &excluded));
        assert!(!is_excluded(Some("Anywhere"), &[String::new()]));
    }

    #[tokio::test]
    async fn pauses_after_skipped_items_too() {
        let fetcher = MockFetcher::with_responses(vec![
            Ok(FetchResponse::ok(detail_page(&[("location", "Madrid, Spain")]))),
            Err(AppError::NetworkError("reset".into())),
            Ok(FetchResponse::ok(detail_page(&[("location", "Accra, Ghana")]))),
        ]);
        let delay = Duration::from_millis(20);
        let assembler = RecordAssembler::new(
            RetryingFetcher::new(fetcher, RetryConfig::immediate(1)),
            LineParser,
            vec!["Spain".into()],
            Pacer::new(JitterRange::new(delay, delay)),
            date(),
        );

        let started = Instant::now();
        let report = assembler
            .assemble_all(&[detail_ref("1"), detail_ref("2"), detail_ref("3")])
            .await;

        assert_eq!(report.excluded, 1);
        assert_eq!(report.fetch_failures, 1);
        assert_eq!(report.records.len(), 1);
        assert!(started.elapsed() >= delay * 3);
    }

    #[tokio::test]
    async fn emits_classified_record() {
        let fetcher = MockFetcher::with_responses(vec![Ok(FetchResponse::ok(detail_page(&[
            ("title", "Data Engineer"),
            ("company", "Acme"),
            ("location", "Nairobi, Kenya"),
            ("description", "PhD preferred. 3 to 5 years of experience."),
            ("seniority", "Mid-Senior level"),
        ])))]);
        let assembler = assembler(fetcher);

        let outcome = assembler.assemble(&detail_ref("42")).await.unwrap();
        let ItemOutcome::Emitted(record) = outcome else {
            panic!("expected a record, got {outcome:?}");
        };

        assert_eq!(record.title, "Data Engineer");
        assert_eq!(record.education, "Bac+8 / Doctorat");
        assert_eq!(record.experience, "3 ans/years");
        assert_eq!(record.seniority, "Mid-Senior level");
        assert_eq!(record.employment_type, NOT_AVAILABLE);
        assert_eq!(record.keyword, "General Search");
        assert_eq!(record.api_link, "https://x.com/jobPosting/42");
        assert_eq!(record.date, "2026-10-14");
    }

    #[tokio::test]
    async fn excluded_location_is_skipped() {
        let fetcher = MockFetcher::with_responses(vec![Ok(FetchResponse::ok(detail_page(&[
            ("title", "Analyst"),
            ("location", "Madrid, Spain"),
        ])))]);
        let outcome = assembler(fetcher).assemble(&detail_ref("1")).await.unwrap();
        assert_eq!(
            outcome,
            ItemOutcome::Skipped(SkipReason::Excluded {
                location: "Madrid, Spain".into()
            })
        );
    }

    #[tokio::test]
    async fn fetch_failure_is_skipped() {
        let fetcher = MockFetcher::with_responses(vec![Ok(FetchResponse::new(404, ""))]);
        let outcome = assembler(fetcher).assemble(&detail_ref("1")).await.unwrap();
        assert!(matches!(
            outcome,
            ItemOutcome::Skipped(SkipReason::FetchFailed(_))
        ));
    }

    #[tokio::test]
    async fn missing_description_yields_sentinels() {
        let fetcher = MockFetcher::with_responses(vec![Ok(FetchResponse::ok(detail_page(&[(
            "title", "Driver",
        )])))]);
        let outcome = assembler(fetcher).assemble(&detail_ref("1")).await.unwrap();
        let ItemOutcome::Emitted(record) = outcome else {
            panic!("expected a record");
        };
        assert_eq!(record.description, NOT_AVAILABLE);
        assert_eq!(record.education, NOT_AVAILABLE);
        assert_eq!(record.experience, NOT_AVAILABLE);
        assert_eq!(record.location, NOT_AVAILABLE);
    }

    #[tokio::test]
    async fn assemble_all_isolates_bad_items() {
        let fetcher = MockFetcher::with_responses(vec![
            Ok(FetchResponse::ok(detail_page(&[("title", "First")]))),
            Ok(FetchResponse::new(500, "")),
            Ok(FetchResponse::ok(LineParser::MALFORMED)),
            Ok(FetchResponse::ok(detail_page(&[
                ("title", "Excluded"),
                ("location", "Valencia, Spain"),
            ]))),
            Ok(FetchResponse::ok(detail_page(&[("title", "Last")]))),
        ]);
        let assembler = assembler(fetcher);
        let details: Vec<_> = (1..=5).map(|i| detail_ref(&i.to_string())).collect();

        let report = assembler.assemble_all(&details).await;

        let titles: Vec<_> = report.records.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["First", "Last"]);
        assert_eq!(report.fetch_failures, 1);
        assert_eq!(report.item_errors, 1);
        assert_eq!(report.excluded, 1);
    }
}
