pub mod cli_consts {
    //! Dashboard Configuration Constants
    //!
    //! This module contains all configuration constants for the dashboard,
    //! organized by functional area for clarity and maintainability.

    // =============================================================================
    // QUEUE CONFIGURATION
    // =============================================================================

    /// The maximum number of events to keep in the activity logs.
    pub const MAX_ACTIVITY_LOGS: usize = 100;

    /// Buffer size of the channel carrying fetch completions and activity events
    /// back to the UI loop.
    pub const EVENT_QUEUE_SIZE: usize = 100;

    // =============================================================================
    // UI CONFIGURATION
    // =============================================================================

    /// Terminal UI timing
    pub mod ui {
        use std::time::Duration;

        /// How long the splash screen stays up unless a key is pressed (seconds)
        pub const SPLASH_DURATION_SECS: u64 = 2;

        /// Input poll timeout, which is also the animation tick (milliseconds)
        pub const POLL_INTERVAL_MS: u64 = 100;

        /// Maximum time between two frames even when nothing changed (milliseconds)
        pub const REDRAW_INTERVAL_MS: u64 = 1_000;

        pub const fn splash_duration() -> Duration {
            Duration::from_secs(SPLASH_DURATION_SECS)
        }

        pub const fn poll_interval() -> Duration {
            Duration::from_millis(POLL_INTERVAL_MS)
        }

        pub const fn redraw_interval() -> Duration {
            Duration::from_millis(REDRAW_INTERVAL_MS)
        }
    }

    // =============================================================================
    // API CONFIGURATION
    // =============================================================================

    /// OpenAQ paging defaults
    pub mod api {
        /// Results requested per page (the OpenAQ maximum).
        pub const PAGE_LIMIT: u32 = 1000;

        /// Pages aggregated per region fetch before the result is cut off.
        pub const MAX_PAGES: u32 = 10;

        /// Connect and total request timeout (seconds)
        pub const REQUEST_TIMEOUT_SECS: u64 = 10;

        /// Days of station history requested for the graph and gauges.
        pub const HISTORY_DAYS: i64 = 7;
    }

    // =============================================================================
    // NETWORK CONFIGURATION
    // =============================================================================

    /// Rate limiting configuration
    pub mod rate_limiting {
        use std::time::Duration;

        /// Delay before the single retry that follows a 429 response (milliseconds)
        pub const BACKOFF_MS: u64 = 2_000;

        /// Minimum interval between two requests to the API (milliseconds)
        pub const MIN_REQUEST_INTERVAL_MS: u64 = 500;

        /// Upper bound applied to server-provided Retry-After values
        pub const MAX_RETRY_AFTER_SECS: u64 = 60;

        /// Helper function to get the backoff duration
        pub const fn backoff() -> Duration {
            Duration::from_millis(BACKOFF_MS)
        }

        /// Helper function to get the minimum request interval
        pub const fn min_request_interval() -> Duration {
            Duration::from_millis(MIN_REQUEST_INTERVAL_MS)
        }
    }

    // =============================================================================
    // MEASUREMENT CONFIGURATION
    // =============================================================================

    /// Plausible value ranges and display scales, in µg/m³
    pub mod measurement {
        /// PM2.5 readings above this are sensor faults.
        pub const PM25_MAX_VALID: f64 = 350.0;
        /// PM10 readings above this are sensor faults.
        pub const PM10_MAX_VALID: f64 = 525.0;

        /// Full scale of the PM2.5 gauges and colour scale
        pub const PM25_GAUGE_MAX: f64 = 250.0;
        /// Full scale of the PM10 gauges and colour scale
        pub const PM10_GAUGE_MAX: f64 = 425.0;

        /// Lower edges of the yellow, orange, red and purple bands.
        pub const PM25_BANDS: [f64; 4] = [12.1, 35.5, 55.5, 150.5];
        pub const PM10_BANDS: [f64; 4] = [55.0, 155.0, 255.0, 355.0];
    }

    // =============================================================================
    // MAP CONFIGURATION
    // =============================================================================

    pub mod map {
        /// Zoom applied when a table row focuses the map on a station.
        pub const FOCUS_ZOOM: f64 = 7.0;

        /// Marker hit radius for mouse clicks, in terminal cells.
        pub const CLICK_RADIUS_CELLS: f64 = 2.0;

        /// Heatmap grid resolution (cells per axis)
        pub const HEAT_GRID_COLS: usize = 48;
        pub const HEAT_GRID_ROWS: usize = 24;
    }
}
