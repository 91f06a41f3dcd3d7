//! OpenAQ Client
//!
//! A reqwest client for the OpenAQ v2 REST API.

use crate::environment::Environment;
use crate::model::Measurement;
use crate::openaq::error::ApiError;
use crate::openaq::wire::{LocationsResponse, MeasurementsResponse};
use crate::openaq::{HistoryQuery, LocationPage, LocationQuery, OpenAq};
use reqwest::{Client, ClientBuilder, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;

// User-Agent string with dashboard version
const USER_AGENT: &str = concat!("openaq-dashboard/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone)]
pub struct OpenAqClient {
    client: Client,
    environment: Environment,
    api_key: Option<String>,
}

impl OpenAqClient {
    pub fn new(
        environment: Environment,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, ApiError> {
        let client = ClientBuilder::new()
            .connect_timeout(timeout)
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self {
            client,
            environment,
            api_key,
        })
    }

    fn build_url(&self, endpoint: &str) -> String {
        format!(
            "{}/{}",
            self.environment.api_url().trim_end_matches('/'),
            endpoint.trim_start_matches('/')
        )
    }

    fn locations_url(&self, query: &LocationQuery, page: u32) -> String {
        let mut url = self.build_url(&format!(
            "v2/locations?limit={}&page={}&bbox={}",
            query.limit,
            page,
            urlencoding::encode(&query.bbox.to_query_value())
        ));
        if let Some(pollutant) = query.parameter {
            url.push_str("&parameter=");
            url.push_str(pollutant.api_code());
        }
        url
    }

    fn measurements_url(&self, query: &HistoryQuery) -> String {
        let date_from = query
            .date_from
            .format("%Y-%m-%dT%H:%M:%SZ")
            .to_string();
        self.build_url(&format!(
            "v2/measurements?location_id={}&parameter={}&date_from={}&limit={}",
            query.station_id,
            query.pollutant.api_code(),
            urlencoding::encode(&date_from),
            query.limit
        ))
    }

    async fn handle_response_status(response: Response) -> Result<Response, ApiError> {
        if !response.status().is_success() {
            return Err(ApiError::from_response(response).await);
        }
        Ok(response)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, ApiError> {
        let mut request = self
            .client
            .get(url)
            .header("accept", "application/json")
            .header("content-type", "application/json");
        if let Some(key) = &self.api_key {
            request = request.header("X-API-KEY", key);
        }

        let response = request.send().await?;
        let response = Self::handle_response_status(response).await?;
        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait::async_trait]
impl OpenAq for OpenAqClient {
    async fn locations(
        &self,
        query: &LocationQuery,
        page: u32,
    ) -> Result<LocationPage, ApiError> {
        let url = self.locations_url(query, page);
        log::debug!("GET {}", url);
        let response: LocationsResponse = self.get_json(&url).await?;

        let raw_count = response.results.len();
        let mut decoded = LocationPage {
            raw_count,
            ..LocationPage::default()
        };
        for record in response.results {
            if let Some((station, measurements)) = record.into_parts() {
                decoded.stations.push(station);
                decoded.measurements.extend(measurements);
            }
        }
        Ok(decoded)
    }

    async fn measurements(&self, query: &HistoryQuery) -> Result<Vec<Measurement>, ApiError> {
        let url = self.measurements_url(query);
        log::debug!("GET {}", url);
        let response: MeasurementsResponse = self.get_json(&url).await?;
        Ok(response
            .results
            .into_iter()
            .filter_map(|record| record.into_measurement())
            .collect())
    }
}

#[cfg(test)]
/// These are ignored by default since they require network access to the public API.
mod live_api_tests {
    use super::*;
    use crate::model::{Pollutant, Region};

    #[tokio::test]
    #[ignore] // This test requires network access.
    async fn test_fetch_europe_first_page() {
        let client = OpenAqClient::new(
            Environment::Production,
            std::env::var("OPENAQ_API_KEY").ok(),
            Duration::from_secs(10),
        )
        .unwrap();
        let query = LocationQuery {
            bbox: Region::Europe.bounding_box(),
            parameter: Some(Pollutant::Pm25),
            limit: 100,
        };
        match client.locations(&query, 1).await {
            Ok(page) => println!("Got {} stations", page.stations.len()),
            Err(e) => panic!("Failed to fetch locations: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BoundingBox, Pollutant};
    use chrono::{TimeZone, Utc};

    fn client(url: &str) -> OpenAqClient {
        OpenAqClient::new(
            Environment::Custom {
                api_url: url.to_string(),
            },
            None,
            Duration::from_secs(1),
        )
        .unwrap()
    }

    #[test]
    fn locations_url_carries_bbox_and_paging() {
        let client = client("http://localhost:9000/");
        let query = LocationQuery {
            bbox: BoundingBox::new(35.0, -25.0, 71.5, 45.0),
            parameter: Some(Pollutant::Pm10),
            limit: 1000,
        };
        assert_eq!(
            client.locations_url(&query, 3),
            "http://localhost:9000/v2/locations?limit=1000&page=3&bbox=-25%2C35%2C45%2C71.5&parameter=pm10"
        );
    }

    #[test]
    fn measurements_url_formats_date_from() {
        let client = client("http://localhost:9000");
        let query = HistoryQuery {
            station_id: 42,
            pollutant: Pollutant::Pm25,
            date_from: Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap(),
            limit: 1000,
        };
        assert_eq!(
            client.measurements_url(&query),
            "http://localhost:9000/v2/measurements?location_id=42&parameter=pm25&date_from=2024-05-01T00%3A00%3A00Z&limit=1000"
        );
    }

    #[tokio::test]
    async fn unreachable_host_is_a_transport_error() {
        let client = client("http://127.0.0.1:9");
        let query = LocationQuery {
            bbox: BoundingBox::world(),
            parameter: None,
            limit: 10,
        };
        let result = client.locations(&query, 1).await;
        assert!(matches!(result, Err(ApiError::Reqwest(_))));
    }
}
