//! Request pacing for the OpenAQ API
//!
//! Keeps a minimum interval between requests and holds back every request
//! while a server-imposed retry delay is running.

use std::time::{Duration, Instant};

/// Configuration for request timing behavior
#[derive(Debug, Clone)]
pub struct RequestTimerConfig {
    /// Minimum time between requests
    pub min_interval: Duration,
    /// Delay applied after a failure that carries no explicit retry delay
    pub default_retry_delay: Duration,
}

impl RequestTimerConfig {
    /// Create a simple interval-based timer
    pub fn interval(min_interval: Duration) -> Self {
        Self::new(min_interval, min_interval)
    }

    pub fn new(min_interval: Duration, default_retry_delay: Duration) -> Self {
        Self {
            min_interval,
            default_retry_delay,
        }
    }
}

#[derive(Debug)]
pub struct RequestTimer {
    config: RequestTimerConfig,
    last_request_time: Option<Instant>,
    server_retry_until: Option<Instant>,
}

impl RequestTimer {
    pub fn new(config: RequestTimerConfig) -> Self {
        Self {
            config,
            last_request_time: None,
            server_retry_until: None,
        }
    }

    /// Check if a new request can proceed
    /// Server retry delay takes priority over all other constraints
    pub fn can_proceed(&mut self) -> bool {
        let now = Instant::now();

        if let Some(retry_until) = self.server_retry_until {
            if now < retry_until {
                return false;
            }
            self.server_retry_until = None;
        }

        if let Some(last_time) = self.last_request_time {
            if now.duration_since(last_time) < self.config.min_interval {
                return false;
            }
        }

        true
    }

    /// Record that a request is being sent now
    pub fn record_request(&mut self) {
        self.last_request_time = Some(Instant::now());
    }

    /// Record a successful request
    pub fn record_success(&mut self) {
        self.server_retry_until = None;
    }

    /// Record a failed request with an optional retry delay.
    /// An explicit delay overrides the configured default.
    pub fn record_failure(&mut self, retry_delay: Option<Duration>) {
        let now = Instant::now();
        let delay = retry_delay.unwrap_or(self.config.default_retry_delay);
        self.server_retry_until = Some(now + delay);
    }

    /// Get time until next request is allowed
    pub fn time_until_next(&mut self) -> Duration {
        let now = Instant::now();

        if let Some(retry_until) = self.server_retry_until {
            if now < retry_until {
                return retry_until.duration_since(now);
            }
            self.server_retry_until = None;
        }

        if let Some(last_time) = self.last_request_time {
            let since_last = now.duration_since(last_time);
            if since_last < self.config.min_interval {
                return self.config.min_interval - since_last;
            }
        }

        Duration::ZERO
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retry_delay_overrides_min_interval() {
        let config = RequestTimerConfig::new(Duration::from_millis(100), Duration::from_millis(50));
        let mut timer = RequestTimer::new(config);

        assert!(timer.can_proceed());
        timer.record_request();

        timer.record_failure(Some(Duration::from_secs(5)));

        assert!(!timer.can_proceed());
        let remaining = timer.time_until_next();
        assert!(remaining.as_millis() > 4900);
        assert!(remaining.as_millis() <= 5000);
    }

    #[test]
    fn test_default_retry_delay_when_none_given() {
        let config = RequestTimerConfig::new(Duration::ZERO, Duration::from_secs(1));
        let mut timer = RequestTimer::new(config);

        timer.record_failure(None);

        assert!(!timer.can_proceed());
        let remaining = timer.time_until_next();
        assert!(remaining.as_millis() > 900);
    }

    #[test]
    fn test_success_clears_retry_delay() {
        let config = RequestTimerConfig::interval(Duration::ZERO);
        let mut timer = RequestTimer::new(config);

        timer.record_failure(Some(Duration::from_secs(10)));
        timer.record_success();

        assert!(timer.can_proceed());
        assert_eq!(timer.time_until_next(), Duration::ZERO);
    }

    #[test]
    fn test_min_interval_blocks_back_to_back_requests() {
        let config = RequestTimerConfig::interval(Duration::from_millis(100));
        let mut timer = RequestTimer::new(config);

        assert!(timer.can_proceed());
        timer.record_request();

        assert!(!timer.can_proceed());
        assert!(timer.time_until_next() <= Duration::from_millis(100));
    }
}
