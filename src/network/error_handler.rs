//! Retry decisions for API failures

use crate::consts::cli_consts::rate_limiting;
use crate::openaq::error::ApiError;
use std::cmp::{max, min};
use std::time::Duration;

/// Decides whether and when a failed request is attempted again.
#[derive(Debug, Clone)]
pub struct ErrorHandler {
    backoff: Duration,
    max_rate_limit_retries: u32,
}

impl ErrorHandler {
    pub fn new(backoff: Duration) -> Self {
        Self {
            backoff,
            max_rate_limit_retries: 1,
        }
    }

    /// Only rate limiting is retried, and only once. Every other failure is
    /// surfaced to the dashboard immediately.
    pub fn should_retry(&self, error: &ApiError, failed_attempts: u32) -> bool {
        error.is_rate_limited() && failed_attempts <= self.max_rate_limit_retries
    }

    /// Delay to respect before the next request after `error`.
    /// Rate limits wait at least the configured backoff, longer if the API asks for it.
    pub fn retry_delay(&self, error: &ApiError) -> Option<Duration> {
        if !error.is_rate_limited() {
            return None;
        }
        let server = error
            .retry_after()
            .map(|d| min(d, Duration::from_secs(rate_limiting::MAX_RETRY_AFTER_SECS)))
            .unwrap_or(Duration::ZERO);
        Some(max(self.backoff, server))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rate_limited(secs: Option<u64>) -> ApiError {
        ApiError::RateLimited {
            retry_after_secs: secs,
        }
    }

    #[test]
    fn rate_limit_is_retried_exactly_once() {
        let handler = ErrorHandler::new(Duration::from_millis(100));
        assert!(handler.should_retry(&rate_limited(None), 1));
        assert!(!handler.should_retry(&rate_limited(None), 2));
    }

    #[test]
    fn other_errors_are_not_retried() {
        let handler = ErrorHandler::new(Duration::from_millis(100));
        let server = ApiError::Http {
            status: 500,
            message: String::new(),
        };
        assert!(!handler.should_retry(&server, 1));
        assert_eq!(handler.retry_delay(&server), None);
    }

    #[test]
    fn retry_delay_honours_the_longer_of_backoff_and_retry_after() {
        let handler = ErrorHandler::new(Duration::from_secs(2));
        assert_eq!(
            handler.retry_delay(&rate_limited(None)),
            Some(Duration::from_secs(2))
        );
        assert_eq!(
            handler.retry_delay(&rate_limited(Some(1))),
            Some(Duration::from_secs(2))
        );
        assert_eq!(
            handler.retry_delay(&rate_limited(Some(30))),
            Some(Duration::from_secs(30))
        );
        assert_eq!(
            handler.retry_delay(&rate_limited(Some(3600))),
            Some(Duration::from_secs(rate_limiting::MAX_RETRY_AFTER_SECS))
        );
    }
}
