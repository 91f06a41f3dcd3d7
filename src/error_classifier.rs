use crate::logging::LogLevel;
use crate::openaq::error::ApiError;

#[derive(Debug, Clone)]
pub struct ErrorClassifier;

impl ErrorClassifier {
    pub fn new() -> Self {
        Self
    }

    pub fn classify_fetch_error(&self, error: &ApiError) -> LogLevel {
        match error {
            // Non-critical: handled by the backoff
            ApiError::RateLimited { .. } => LogLevel::Debug,
            // Temporary server issues
            ApiError::Http { status, .. } if (500..=599).contains(status) => LogLevel::Warn,

            // Critical: auth, malformed responses
            ApiError::Http { status, .. } if *status == 401 => LogLevel::Error,
            ApiError::Http { status, .. } if *status == 403 => LogLevel::Error,
            ApiError::Malformed(_) => LogLevel::Error,

            // Network issues - usually temporary
            _ => LogLevel::Warn,
        }
    }
}

impl Default for ErrorClassifier {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_by_severity() {
        let classifier = ErrorClassifier::new();
        let auth = ApiError::Http {
            status: 401,
            message: "Unauthorized".to_string(),
        };
        let server = ApiError::Http {
            status: 502,
            message: "Bad gateway".to_string(),
        };
        let missing = ApiError::Http {
            status: 404,
            message: "Not found".to_string(),
        };
        let malformed = ApiError::Malformed(serde_json::from_str::<u8>("{").unwrap_err());

        assert_eq!(classifier.classify_fetch_error(&auth), LogLevel::Error);
        assert_eq!(classifier.classify_fetch_error(&server), LogLevel::Warn);
        assert_eq!(classifier.classify_fetch_error(&missing), LogLevel::Warn);
        assert_eq!(classifier.classify_fetch_error(&malformed), LogLevel::Error);
        assert_eq!(
            classifier.classify_fetch_error(&ApiError::RateLimited {
                retry_after_secs: None
            }),
            LogLevel::Debug
        );
    }
}
