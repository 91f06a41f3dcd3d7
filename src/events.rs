//! Event System
//!
//! Activity events shown in the dashboard log and printed in headless mode

use crate::logging::{LogLevel, should_log_with_env};
use chrono::Local;
use std::fmt::Display;

/// Where an activity event originated.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Source {
    /// Region fetches (locations + latest values).
    Fetcher,
    /// Per-station history fetches.
    History,
    /// UI interactions handled by the dispatcher.
    Dashboard,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, strum::Display)]
pub enum EventType {
    Success,
    Error,
    Refresh,
    Waiting,
    Info,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub source: Source,
    pub msg: String,
    pub timestamp: String,
    pub event_type: EventType,
    pub log_level: LogLevel,
}

impl Event {
    pub fn new(source: Source, msg: String, event_type: EventType, log_level: LogLevel) -> Self {
        Self {
            source,
            msg,
            timestamp: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            event_type,
            log_level,
        }
    }

    pub fn fetcher(msg: String, event_type: EventType, log_level: LogLevel) -> Self {
        Self::new(Source::Fetcher, msg, event_type, log_level)
    }

    pub fn history(msg: String, event_type: EventType, log_level: LogLevel) -> Self {
        Self::new(Source::History, msg, event_type, log_level)
    }

    pub fn dashboard(msg: String, event_type: EventType, log_level: LogLevel) -> Self {
        Self::new(Source::Dashboard, msg, event_type, log_level)
    }

    pub fn should_display(&self) -> bool {
        // Always show success events and info level events
        if self.event_type == EventType::Success || self.log_level >= LogLevel::Info {
            return true;
        }
        should_log_with_env(self.log_level)
    }

    /// Forwards the event to the `log` facade.
    pub fn emit(&self) {
        log::log!(log::Level::from(self.log_level), "{}", self.msg);
    }
}

impl Display for Event {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} [{}] {}", self.event_type, self.timestamp, self.msg)
    }
}
