//! Test utilities: mock implementations of the collaborator traits.
//!
//! Handwritten mocks for dependency injection in unit tests.
//! All mocks use `Arc<Mutex<_>>` for interior mutability, allowing
//! test assertions on recorded calls.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use chrono::NaiveDate;

use crate::error::AppError;
use crate::models::{NormalizedRecord, RawDetail};
use crate::traits::{ExportedFiles, Exporter, FetchResponse, Fetcher, MarkupParser};

// ---------------------------------------------------------------------------
// MockFetcher
// ---------------------------------------------------------------------------

/// Mock fetcher that replays a queue of responses and records requested URLs.
#[derive(Clone)]
pub struct MockFetcher {
    /// Each call pops the first element. Once empty, every call answers
    /// `200` with an empty body (an empty results page).
    responses: Arc<Mutex<Vec<Result<FetchResponse, AppError>>>>,
    requested: Arc<Mutex<Vec<String>>>,
}

impl MockFetcher {
    pub fn empty() -> Self {
        Self::with_responses(Vec::new())
    }

    pub fn with_responses(responses: Vec<Result<FetchResponse, AppError>>) -> Self {
        Self {
            responses: Arc::new(Mutex::new(responses)),
            requested: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// URLs requested so far, in order.
    pub fn requested(&self) -> Vec<String> {
        self.requested.lock().unwrap().clone()
    }
}

impl Fetcher for MockFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchResponse, AppError> {
        self.requested.lock().unwrap().push(url.to_string());
        let mut responses = self.responses.lock().unwrap();
        if responses.is_empty() {
            Ok(FetchResponse::ok(""))
        } else {
            responses.remove(0)
        }
    }
}

// ---------------------------------------------------------------------------
// LineParser
// ---------------------------------------------------------------------------

/// Line-oriented stand-in for the HTML parser.
///
/// Listing pages are `link: <url>` lines, detail pages are `<field>: <value>`
/// lines (see [`listing_page`] and [`detail_page`]). A body equal to
/// [`LineParser::MALFORMED`] fails to parse.
#[derive(Debug, Clone, Copy)]
pub struct LineParser;

impl LineParser {
    pub const MALFORMED: &'static str = "!malformed";
}

impl MarkupParser for LineParser {
    fn listing_links(&self, html: &str) -> Vec<String> {
        html.lines()
            .filter_map(|line| line.strip_prefix("link:"))
            .map(|url| url.trim().to_string())
            .filter(|url| !url.is_empty())
            .collect()
    }

    fn parse_detail(&self, html: &str) -> Result<RawDetail, AppError> {
        if html.trim() == Self::MALFORMED {
            return Err(AppError::ParseError("unreadable detail page".into()));
        }

        let mut detail = RawDetail::default();
        for line in html.lines() {
            let Some((key, value)) = line.split_once(':') else {
                continue;
            };
            let value = Some(value.trim().to_string());
            match key.trim() {
                "title" => detail.title = value,
                "company" => detail.company = value,
                "location" => detail.location = value,
                "description" => detail.description = value,
                "seniority" => detail.seniority = value,
                "employment_type" => detail.employment_type = value,
                "job_functions" => detail.job_functions = value,
                "industries" => detail.industries = value,
                _ => {}
            }
        }
        Ok(detail)
    }
}

/// Build a listing page body for [`LineParser`].
pub fn listing_page(urls: &[&str]) -> String {
    urls.iter().map(|url| format!("link: {url}\n")).collect()
}

/// Build a detail page body for [`LineParser`].
pub fn detail_page(fields: &[(&str, &str)]) -> String {
    fields
        .iter()
        .map(|(key, value)| format!("{key}: {value}\n"))
        .collect()
}

// ---------------------------------------------------------------------------
// MockExporter
// ---------------------------------------------------------------------------

/// Mock exporter that records every exported batch.
#[derive(Clone)]
pub struct MockExporter {
    exported: Arc<Mutex<Vec<Vec<NormalizedRecord>>>>,
    error: Arc<Mutex<Option<AppError>>>,
}

impl MockExporter {
    pub fn new() -> Self {
        Self {
            exported: Arc::new(Mutex::new(Vec::new())),
            error: Arc::new(Mutex::new(None)),
        }
    }

    /// Exporter that fails on its first call.
    pub fn with_error(error: AppError) -> Self {
        Self {
            exported: Arc::new(Mutex::new(Vec::new())),
            error: Arc::new(Mutex::new(Some(error))),
        }
    }

    pub fn exported(&self) -> Vec<Vec<NormalizedRecord>> {
        self.exported.lock().unwrap().clone()
    }
}

impl Default for MockExporter {
    fn default() -> Self {
        Self::new()
    }
}

impl Exporter for MockExporter {
    fn export(
        &self,
        records: &[NormalizedRecord],
        run_date: NaiveDate,
    ) -> Result<ExportedFiles, AppError> {
        if let Some(e) = self.error.lock().unwrap().take() {
            return Err(e);
        }
        self.exported.lock().unwrap().push(records.to_vec());
        let day = run_date.format("%Y-%m-%d");
        Ok(ExportedFiles {
            full: PathBuf::from(format!("memory/jobs_full_{day}.csv")),
            clean: PathBuf::from(format!("memory/jobs_clean_{day}.csv")),
            rows: records.len(),
        })
    }
}
