use std::future::Future;
use std::path::PathBuf;

use chrono::NaiveDate;

use crate::error::AppError;
use crate::models::{NormalizedRecord, RawDetail};

/// Status and body of a single HTTP exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResponse {
    pub status: u16,
    pub body: String,
}

impl FetchResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn ok(body: impl Into<String>) -> Self {
        Self::new(200, body)
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Performs one GET request. Retrying is layered on top by
/// [`RetryingFetcher`](crate::retry::RetryingFetcher).
pub trait Fetcher: Send + Sync + Clone {
    fn fetch(&self, url: &str) -> impl Future<Output = Result<FetchResponse, AppError>> + Send;
}

/// Reads the job board markup.
///
/// Missing elements are never errors: they come back as empty lists or
/// `None` fields.
pub trait MarkupParser: Send + Sync + Clone {
    /// Listing hrefs found on one search results page, in page order.
    fn listing_links(&self, html: &str) -> Vec<String>;

    /// Fields of one detail page.
    fn parse_detail(&self, html: &str) -> Result<RawDetail, AppError>;
}

/// Paths written by an [`Exporter`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedFiles {
    pub full: PathBuf,
    pub clean: PathBuf,
    pub rows: usize,
}

/// Persists the records of one run.
pub trait Exporter: Send + Sync {
    fn export(
        &self,
        records: &[NormalizedRecord],
        run_date: NaiveDate,
    ) -> Result<ExportedFiles, AppError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_range() {
        assert!(FetchResponse::ok("").is_success());
        assert!(FetchResponse::new(204, "").is_success());
        assert!(!FetchResponse::new(301, "").is_success());
        assert!(!FetchResponse::new(429, "").is_success());
        assert!(!FetchResponse::new(500, "").is_success());
    }
}
