use crate::model::{BoundingBox, Measurement, Pollutant, Station};
use crate::openaq::error::ApiError;
use chrono::{DateTime, Utc};

pub(crate) mod client;
pub use client::OpenAqClient;
pub mod error;
pub mod wire;

#[cfg(test)]
use mockall::automock;

/// Query for one page of the locations endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct LocationQuery {
    pub bbox: BoundingBox,
    /// Only locations reporting this pollutant, or every location when `None`.
    pub parameter: Option<Pollutant>,
    pub limit: u32,
}

/// Query for the recent readings of one station.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryQuery {
    pub station_id: u64,
    pub pollutant: Pollutant,
    pub date_from: DateTime<Utc>,
    pub limit: u32,
}

/// One decoded page of locations.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LocationPage {
    pub stations: Vec<Station>,
    pub measurements: Vec<Measurement>,
    /// Number of records the API returned, including ones dropped during decoding.
    pub raw_count: usize,
}

#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait OpenAq: Send + Sync {
    /// Fetch a single page (1-based) of locations with their latest readings.
    async fn locations(&self, query: &LocationQuery, page: u32)
    -> Result<LocationPage, ApiError>;

    /// Fetch recent readings for a single station.
    async fn measurements(&self, query: &HistoryQuery) -> Result<Vec<Measurement>, ApiError>;
}
