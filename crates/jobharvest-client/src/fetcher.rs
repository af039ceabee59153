use std::time::Duration;

use jobharvest_core::config::HttpConfig;
use jobharvest_core::error::AppError;
use jobharvest_core::traits::{FetchResponse, Fetcher};
use reqwest::Client;
use reqwest::header::{ACCEPT_LANGUAGE, HeaderMap, HeaderValue, REFERER};

/// HTTP fetcher using reqwest.
///
/// Sends browser-like headers (User-Agent, Accept-Language, Referer) with a
/// fixed per-request timeout. Performs a single attempt and hands back the
/// status with the body; retrying is the caller's concern.
#[derive(Clone)]
pub struct ReqwestFetcher {
    client: Client,
    timeout_secs: u64,
}

impl ReqwestFetcher {
    pub fn new(config: &HttpConfig) -> Result<Self, AppError> {
        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .default_headers(default_headers(config)?)
            .timeout(config.timeout)
            .build()
            .map_err(|e| AppError::HttpError(e.to_string()))?;

        Ok(Self {
            client,
            timeout_secs: config.timeout.as_secs(),
        })
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self, AppError> {
        Self::new(&HttpConfig {
            timeout,
            ..HttpConfig::default()
        })
    }
}

impl Fetcher for ReqwestFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchResponse, AppError> {
        let response = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                AppError::Timeout(self.timeout_secs)
            } else if e.is_connect() {
                AppError::NetworkError(format!("Connection failed: {e}"))
            } else {
                AppError::HttpError(e.to_string())
            }
        })?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| AppError::HttpError(format!("Failed to read response body: {e}")))?;

        Ok(FetchResponse { status, body })
    }
}

fn default_headers(config: &HttpConfig) -> Result<HeaderMap, AppError> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT_LANGUAGE, header_value("Accept-Language", &config.accept_language)?);
    headers.insert(REFERER, header_value("Referer", &config.referer)?);
    Ok(headers)
}

fn header_value(name: &str, value: &str) -> Result<HeaderValue, AppError> {
    HeaderValue::from_str(value)
        .map_err(|e| AppError::ConfigError(format!("Invalid {name} header '{value}': {e}")))
}
