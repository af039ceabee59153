use thiserror::Error;

/// Application-wide error types for jobharvest.
#[derive(Error, Debug)]
pub enum AppError {
    /// HTTP request could not be built or sent.
    #[error("HTTP error: {0}")]
    HttpError(String),

    /// Request timed out.
    #[error("Request timed out after {0} seconds")]
    Timeout(u64),

    /// Network/connection error.
    #[error("Network error: {0}")]
    NetworkError(String),

    /// Every retry attempt for a single fetch failed.
    #[error("Could not fetch {url} after {attempts} attempts")]
    FetchExhausted { url: String, attempts: u32 },

    /// Listing URL carries no numeric posting id.
    #[error("No posting id in listing URL: {0}")]
    MalformedReference(String),

    /// Markup could not be interpreted at all.
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Writing the tabular output failed.
    #[error("Export error: {0}")]
    ExportError(String),

    /// Invalid configuration value.
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl AppError {
    /// Returns true if this error comes from the transport layer
    /// (network, timeout or a rejected status), as opposed to a local failure.
    pub fn is_transport_failure(&self) -> bool {
        matches!(
            self,
            AppError::HttpError(_)
                | AppError::Timeout(_)
                | AppError::NetworkError(_)
                | AppError::FetchExhausted { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_failures() {
        assert!(AppError::NetworkError("reset".into()).is_transport_failure());
        assert!(AppError::Timeout(10).is_transport_failure());
        assert!(
            AppError::FetchExhausted {
                url: "https://example.com".into(),
                attempts: 3,
            }
            .is_transport_failure()
        );
        assert!(!AppError::ParseError("bad html".into()).is_transport_failure());
        assert!(!AppError::ConfigError("bad".into()).is_transport_failure());
    }

    #[test]
    fn test_fetch_exhausted_message() {
        let err = AppError::FetchExhausted {
            url: "https://example.com/jobs".into(),
            attempts: 3,
        };
        assert_eq!(
            err.to_string(),
            "Could not fetch https://example.com/jobs after 3 attempts"
        );
    }
}
