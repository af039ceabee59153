//! Run configuration.
//!
//! Every tunable has a named default reproducing the production constants.
//! Values can be overridden in code, or from `JOBHARVEST_*` environment
//! variables via [`HarvestConfig::apply_env`].

use std::path::PathBuf;
use std::time::Duration;

use url::Url;

use crate::error::AppError;
use crate::models::SearchSegment;

pub const DEFAULT_COUNTRIES: &[&str] = &[
    "Sub-Saharan Africa",
    "Northern Africa",
    "Eastern Africa",
    "Western Africa",
    "Southern Africa",
];
pub const DEFAULT_KEYWORDS: &[&str] = &[""];
pub const DEFAULT_EXCLUDED_LOCATIONS: &[&str] = &["Spain"];

pub const SEARCH_ENDPOINT: &str =
    "https://www.linkedin.com/jobs-guest/jobs/api/seeMoreJobPostings/search";
pub const DETAIL_ENDPOINT: &str = "https://www.linkedin.com/jobs-guest/jobs/api/jobPosting";
/// Posted within the last 24 hours.
pub const TIME_WINDOW: &str = "r86400";
pub const PAGE_SIZE: u32 = 25;
pub const MAX_PAGES: u32 = 50;
pub const EMPTY_PAGE_TOLERANCE: u32 = 2;

pub const MAX_ATTEMPTS: u32 = 3;
pub const RATE_LIMIT_BACKOFF: Duration = Duration::from_secs(10);
pub const RETRY_DELAY: Duration = Duration::from_secs(2);

pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";
pub const ACCEPT_LANGUAGE: &str = "en-US,en;q=0.9,fr;q=0.8";
pub const REFERER: &str = "https://www.google.com/";

pub const OUTPUT_DIR: &str = "data";

/// Uniformly random delay bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JitterRange {
    pub min: Duration,
    pub max: Duration,
}

impl JitterRange {
    pub const fn new(min: Duration, max: Duration) -> Self {
        Self { min, max }
    }

    /// No delay at all.
    pub const fn none() -> Self {
        Self::new(Duration::ZERO, Duration::ZERO)
    }
}

/// Search pagination settings.
#[derive(Debug, Clone)]
pub struct SearchConfig {
    pub endpoint: String,
    pub time_window: String,
    pub page_size: u32,
    /// Hard cap on pages requested per segment.
    pub max_pages: u32,
    /// A segment stops once its consecutive empty pages exceed this.
    pub empty_page_tolerance: u32,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            endpoint: SEARCH_ENDPOINT.to_string(),
            time_window: TIME_WINDOW.to_string(),
            page_size: PAGE_SIZE,
            max_pages: MAX_PAGES,
            empty_page_tolerance: EMPTY_PAGE_TOLERANCE,
        }
    }
}

/// Retry policy for a single fetch.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    pub max_attempts: u32,
    /// Sleep after a 429 is `rate_limit_backoff × attempt`.
    pub rate_limit_backoff: Duration,
    /// Sleep after any other failure.
    pub retry_delay: Duration,
}

impl RetryConfig {
    /// Same attempt count, no sleeping.
    pub fn immediate(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            rate_limit_backoff: Duration::ZERO,
            retry_delay: Duration::ZERO,
        }
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: MAX_ATTEMPTS,
            rate_limit_backoff: RATE_LIMIT_BACKOFF,
            retry_delay: RETRY_DELAY,
        }
    }
}

/// Politeness delays after each request.
#[derive(Debug, Clone)]
pub struct PacingConfig {
    pub page_delay: JitterRange,
    pub detail_delay: JitterRange,
}

impl PacingConfig {
    pub fn none() -> Self {
        Self {
            page_delay: JitterRange::none(),
            detail_delay: JitterRange::none(),
        }
    }
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            page_delay: JitterRange::new(Duration::from_secs(1), Duration::from_secs(2)),
            detail_delay: JitterRange::new(Duration::from_millis(500), Duration::from_millis(1500)),
        }
    }
}

/// Transport settings handed to the HTTP client.
#[derive(Debug, Clone)]
pub struct HttpConfig {
    pub timeout: Duration,
    pub user_agent: String,
    pub accept_language: String,
    pub referer: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout: REQUEST_TIMEOUT,
            user_agent: USER_AGENT.to_string(),
            accept_language: ACCEPT_LANGUAGE.to_string(),
            referer: REFERER.to_string(),
        }
    }
}

/// Full configuration of a harvest run.
#[derive(Debug, Clone)]
pub struct HarvestConfig {
    pub countries: Vec<String>,
    /// An empty keyword means an unrestricted search.
    pub keywords: Vec<String>,
    /// Case-insensitive location substrings whose records are dropped.
    pub excluded_locations: Vec<String>,
    pub search: SearchConfig,
    pub detail_endpoint: String,
    pub retry: RetryConfig,
    pub pacing: PacingConfig,
    pub http: HttpConfig,
    pub output_dir: PathBuf,
}

impl Default for HarvestConfig {
    fn default() -> Self {
        Self {
            countries: to_strings(DEFAULT_COUNTRIES),
            keywords: to_strings(DEFAULT_KEYWORDS),
            excluded_locations: to_strings(DEFAULT_EXCLUDED_LOCATIONS),
            search: SearchConfig::default(),
            detail_endpoint: DETAIL_ENDPOINT.to_string(),
            retry: RetryConfig::default(),
            pacing: PacingConfig::default(),
            http: HttpConfig::default(),
            output_dir: PathBuf::from(OUTPUT_DIR),
        }
    }
}

impl HarvestConfig {
    /// Cross product of countries and keywords, country-major.
    pub fn segments(&self) -> Vec<SearchSegment> {
        self.countries
            .iter()
            .flat_map(|country| {
                self.keywords
                    .iter()
                    .map(move |keyword| SearchSegment::new(country.clone(), keyword.clone()))
            })
            .collect()
    }

    /// Override values from the process environment.
    ///
    /// - `JOBHARVEST_COUNTRIES`, `JOBHARVEST_KEYWORDS`, `JOBHARVEST_EXCLUDED_LOCATIONS`
    ///   (comma-separated; an empty `JOBHARVEST_KEYWORDS` means one unrestricted search)
    /// - `JOBHARVEST_PAGE_SIZE`, `JOBHARVEST_MAX_PAGES`, `JOBHARVEST_EMPTY_PAGE_TOLERANCE`
    /// - `JOBHARVEST_MAX_ATTEMPTS`, `JOBHARVEST_TIMEOUT_SECS`
    /// - `JOBHARVEST_OUTPUT_DIR`
    pub fn apply_env(self) -> Result<Self, AppError> {
        self.apply_vars(|key| std::env::var(key).ok())
    }

    /// Override values from an arbitrary variable lookup.
    pub fn apply_vars<L>(mut self, lookup: L) -> Result<Self, AppError>
    where
        L: Fn(&str) -> Option<String>,
    {
        if let Some(raw) = lookup("JOBHARVEST_COUNTRIES") {
            self.countries = split_list(&raw).filter(|s| !s.is_empty()).collect();
        }
        if let Some(raw) = lookup("JOBHARVEST_KEYWORDS") {
            self.keywords = split_list(&raw).collect();
        }
        if let Some(raw) = lookup("JOBHARVEST_EXCLUDED_LOCATIONS") {
            self.excluded_locations = split_list(&raw).filter(|s| !s.is_empty()).collect();
        }
        if let Some(raw) = lookup("JOBHARVEST_PAGE_SIZE") {
            self.search.page_size = parse_u32("JOBHARVEST_PAGE_SIZE", &raw)?;
        }
        if let Some(raw) = lookup("JOBHARVEST_MAX_PAGES") {
            self.search.max_pages = parse_u32("JOBHARVEST_MAX_PAGES", &raw)?;
        }
        if let Some(raw) = lookup("JOBHARVEST_EMPTY_PAGE_TOLERANCE") {
            self.search.empty_page_tolerance = parse_u32("JOBHARVEST_EMPTY_PAGE_TOLERANCE", &raw)?;
        }
        if let Some(raw) = lookup("JOBHARVEST_MAX_ATTEMPTS") {
            self.retry.max_attempts = parse_u32("JOBHARVEST_MAX_ATTEMPTS", &raw)?;
        }
        if let Some(raw) = lookup("JOBHARVEST_TIMEOUT_SECS") {
            let secs = parse_u32("JOBHARVEST_TIMEOUT_SECS", &raw)?;
            self.http.timeout = Duration::from_secs(u64::from(secs));
        }
        if let Some(raw) = lookup("JOBHARVEST_OUTPUT_DIR") {
            self.output_dir = PathBuf::from(raw.trim());
        }
        Ok(self)
    }

    /// Reject values that would make a run meaningless.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.countries.is_empty() {
            return Err(AppError::ConfigError("at least one country is required".into()));
        }
        if self.keywords.is_empty() {
            return Err(AppError::ConfigError(
                "at least one keyword is required (use \"\" for an unrestricted search)".into(),
            ));
        }
        if self.search.page_size == 0 {
            return Err(AppError::ConfigError("page size must be at least 1".into()));
        }
        if self.search.max_pages == 0 {
            return Err(AppError::ConfigError("page cap must be at least 1".into()));
        }
        if self.retry.max_attempts == 0 {
            return Err(AppError::ConfigError("max attempts must be at least 1".into()));
        }
        for (name, range) in [
            ("page delay", self.pacing.page_delay),
            ("detail delay", self.pacing.detail_delay),
        ] {
            if range.min > range.max {
                return Err(AppError::ConfigError(format!(
                    "{name} minimum exceeds its maximum"
                )));
            }
        }
        for (name, endpoint) in [
            ("search endpoint", &self.search.endpoint),
            ("detail endpoint", &self.detail_endpoint),
        ] {
            Url::parse(endpoint)
                .map_err(|e| AppError::ConfigError(format!("invalid {name} '{endpoint}': {e}")))?;
        }
        Ok(())
    }
}

fn to_strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|s| s.to_string()).collect()
}

fn split_list(raw: &str) -> impl Iterator<Item = String> + '_ {
    raw.split(',').map(|s| s.trim().to_string())
}

fn parse_u32(name: &str, raw: &str) -> Result<u32, AppError> {
    raw.trim().parse().map_err(|_| {
        AppError::ConfigError(format!("Invalid {name} '{raw}': must be a non-negative integer"))
    })
}
