//! Network client with pagination, pacing and rate-limit handling

use super::error_handler::ErrorHandler;
use super::request_timer::{RequestTimer, RequestTimerConfig};
use crate::config::Config;
use crate::model::{BoundingBox, Measurement, Pollutant, Station};
use crate::openaq::error::ApiError;
use crate::openaq::{HistoryQuery, LocationPage, LocationQuery, OpenAq};
use chrono::Utc;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::time::sleep;

/// Limits applied to every fetch.
#[derive(Debug, Clone)]
pub struct FetchSettings {
    pub page_limit: u32,
    pub max_pages: u32,
    pub backoff: Duration,
    pub min_request_interval: Duration,
    pub history_days: i64,
}

impl FetchSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            page_limit: config.page_limit.max(1),
            max_pages: config.max_pages.max(1),
            backoff: Duration::from_millis(config.rate_limit_backoff_ms),
            min_request_interval: Duration::from_millis(config.min_request_interval_ms),
            history_days: config.history_days.max(1),
        }
    }
}

/// Aggregated result of a region fetch.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionData {
    pub bbox: BoundingBox,
    pub stations: Vec<Station>,
    pub measurements: Vec<Measurement>,
    /// Number of pages requested.
    pub pages: u32,
    /// The page cap was hit while the API still had more results.
    pub truncated: bool,
}

impl RegionData {
    pub fn empty(bbox: BoundingBox) -> Self {
        Self {
            bbox,
            stations: Vec::new(),
            measurements: Vec::new(),
            pages: 0,
            truncated: false,
        }
    }
}

/// Network client shared by all fetch tasks. Cloning shares the request timer.
#[derive(Clone)]
pub struct NetworkClient {
    api: Arc<dyn OpenAq>,
    error_handler: ErrorHandler,
    request_timer: Arc<Mutex<RequestTimer>>,
    settings: FetchSettings,
}

impl NetworkClient {
    pub fn new(api: Arc<dyn OpenAq>, settings: FetchSettings) -> Self {
        let timer_config = RequestTimerConfig::interval(settings.min_request_interval);
        Self {
            api,
            error_handler: ErrorHandler::new(settings.backoff),
            request_timer: Arc::new(Mutex::new(RequestTimer::new(timer_config))),
            settings,
        }
    }

    fn timer(&self) -> MutexGuard<'_, RequestTimer> {
        self.request_timer
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Waits until the request timer admits another request, then claims it.
    async fn wait_for_slot(&self) {
        loop {
            let wait = {
                let mut timer = self.timer();
                if timer.can_proceed() {
                    timer.record_request();
                    return;
                }
                timer.time_until_next()
            };
            if wait > Duration::ZERO {
                log::debug!("Waiting {}ms before next API request", wait.as_millis());
                sleep(wait).await;
            } else {
                tokio::task::yield_now().await;
            }
        }
    }

    /// Books the outcome of a request; returns true when it should be retried.
    fn settle(&self, error: &ApiError, failed_attempts: u32) -> bool {
        let delay = self.error_handler.retry_delay(error);
        self.timer().record_failure(delay);
        let retry = self.error_handler.should_retry(error, failed_attempts);
        if retry {
            log::warn!(
                "Rate limited by the API, retrying in {}ms",
                delay.unwrap_or_default().as_millis()
            );
        }
        retry
    }

    async fn locations_page(
        &self,
        query: &LocationQuery,
        page: u32,
    ) -> Result<LocationPage, ApiError> {
        let mut failed_attempts = 0;
        loop {
            self.wait_for_slot().await;
            match self.api.locations(query, page).await {
                Ok(result) => {
                    self.timer().record_success();
                    return Ok(result);
                }
                Err(e) => {
                    failed_attempts += 1;
                    if !self.settle(&e, failed_attempts) {
                        return Err(e);
                    }
                }
            }
        }
    }

    /// Fetch every station inside `bbox`, aggregating pages up to the configured cap.
    pub async fn fetch_region(
        &self,
        bbox: BoundingBox,
        parameter: Option<Pollutant>,
    ) -> Result<RegionData, ApiError> {
        let query = LocationQuery {
            bbox,
            parameter,
            limit: self.settings.page_limit,
        };
        let mut data = RegionData::empty(bbox);

        for page in 1..=self.settings.max_pages {
            let result = self.locations_page(&query, page).await?;
            data.pages = page;

            let page_was_full = result.raw_count >= self.settings.page_limit as usize;
            data.stations.extend(
                result
                    .stations
                    .into_iter()
                    .filter(|station| bbox.contains(&station.coordinates)),
            );
            data.measurements.extend(result.measurements);

            if !page_was_full {
                return Ok(data);
            }
            if page == self.settings.max_pages {
                log::warn!(
                    "Stopped after {} pages; results for this region are incomplete",
                    page
                );
                data.truncated = true;
            }
        }

        Ok(data)
    }

    /// Fetch the recent readings of a single station.
    pub async fn fetch_history(
        &self,
        station_id: u64,
        pollutant: Pollutant,
    ) -> Result<Vec<Measurement>, ApiError> {
        let query = HistoryQuery {
            station_id,
            pollutant,
            date_from: Utc::now() - chrono::Duration::days(self.settings.history_days),
            limit: self.settings.page_limit,
        };

        let mut failed_attempts = 0;
        loop {
            self.wait_for_slot().await;
            match self.api.measurements(&query).await {
                Ok(readings) => {
                    self.timer().record_success();
                    return Ok(readings
                        .into_iter()
                        .filter(|m| m.station_id == station_id && m.pollutant == pollutant)
                        .collect());
                }
                Err(e) => {
                    failed_attempts += 1;
                    if !self.settle(&e, failed_attempts) {
                        return Err(e);
                    }
                }
            }
        }
    }
}
