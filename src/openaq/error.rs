//! Error handling for the OpenAQ module

use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    /// Reqwest error, typically a timeout or a connection failure.
    #[error("Reqwest error: {0}")]
    Reqwest(#[from] reqwest::Error),

    /// The API answered with a non-success status.
    #[error("HTTP error with status {status}: {message}")]
    Http { status: u16, message: String },

    /// The API answered 429 Too Many Requests.
    #[error("Rate limited by the API (retry after {retry_after_secs:?}s)")]
    RateLimited { retry_after_secs: Option<u64> },

    /// The body did not have the expected JSON shape.
    #[error("Malformed response: {0}")]
    Malformed(#[from] serde_json::Error),
}

impl ApiError {
    pub async fn from_response(response: reqwest::Response) -> ApiError {
        let status = response.status().as_u16();
        let retry_after = response
            .headers()
            .get(reqwest::header::RETRY_AFTER)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        let message = response
            .text()
            .await
            .unwrap_or_else(|_| "Failed to read response text".to_string());

        Self::from_status(status, retry_after.as_deref(), message)
    }

    pub fn from_status(status: u16, retry_after: Option<&str>, message: String) -> ApiError {
        if status == 429 {
            return ApiError::RateLimited {
                retry_after_secs: retry_after.and_then(|v| v.trim().parse::<u64>().ok()),
            };
        }
        ApiError::Http { status, message }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, ApiError::Reqwest(e) if e.is_timeout())
    }

    pub fn is_rate_limited(&self) -> bool {
        matches!(self, ApiError::RateLimited { .. })
    }

    /// Server-provided delay, when the API sent one.
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            ApiError::RateLimited {
                retry_after_secs: Some(secs),
            } => Some(Duration::from_secs(*secs)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_429_becomes_rate_limited() {
        let err = ApiError::from_status(429, Some(" 7 "), "slow down".to_string());
        assert!(err.is_rate_limited());
        assert_eq!(err.retry_after(), Some(Duration::from_secs(7)));
    }

    #[test]
    fn unparsable_retry_after_is_ignored() {
        let err = ApiError::from_status(429, Some("Wed, 21 Oct 2015 07:28:00 GMT"), String::new());
        assert!(err.is_rate_limited());
        assert_eq!(err.retry_after(), None);
    }

    #[test]
    fn other_statuses_are_http_errors() {
        let err = ApiError::from_status(503, None, "unavailable".to_string());
        assert!(matches!(err, ApiError::Http { status: 503, .. }));
        assert!(!err.is_timeout());
        assert_eq!(err.to_string(), "HTTP error with status 503: unavailable");
    }
}
