//! Bounded retry around a single-attempt [`Fetcher`].
//!
//! A 429 sleeps `rate_limit_backoff × attempt` (linear backoff); any other
//! non-success status or transport error sleeps `retry_delay`. When every
//! attempt fails the caller gets [`AppError::FetchExhausted`], which it logs
//! and skips.

use std::time::Duration;

use crate::config::RetryConfig;
use crate::error::AppError;
use crate::traits::Fetcher;

const TOO_MANY_REQUESTS: u16 = 429;

/// A [`Fetcher`] wrapper that applies the retry policy and returns the body.
#[derive(Clone)]
pub struct RetryingFetcher<F> {
    inner: F,
    config: RetryConfig,
}

impl<F: Fetcher> RetryingFetcher<F> {
    pub fn new(inner: F, config: RetryConfig) -> Self {
        Self { inner, config }
    }

    /// Fetch a URL, retrying per policy. Returns the body of the first 2xx answer.
    pub async fn get(&self, url: &str) -> Result<String, AppError> {
        let attempts = self.config.max_attempts.max(1);

        for attempt in 1..=attempts {
            let wait = match self.inner.fetch(url).await {
                Ok(response) if response.is_success() => return Ok(response.body),
                Ok(response) if response.status == TOO_MANY_REQUESTS => {
                    let wait = self.rate_limit_wait(attempt);
                    tracing::warn!(
                        %url,
                        attempt,
                        sleep_secs = wait.as_secs_f32(),
                        "Rate limited"
                    );
                    wait
                }
                Ok(response) => {
                    tracing::debug!(%url, attempt, status = response.status, "Non-success status");
                    self.config.retry_delay
                }
                Err(e) => {
                    tracing::warn!(%url, attempt, error = %e, "Connection error");
                    self.config.retry_delay
                }
            };

            if !wait.is_zero() {
                tokio::time::sleep(wait).await;
            }
        }

        Err(AppError::FetchExhausted {
            url: url.to_string(),
            attempts,
        })
    }

    fn rate_limit_wait(&self, attempt: u32) -> Duration {
        self.config.rate_limit_backoff * attempt
    }
}
