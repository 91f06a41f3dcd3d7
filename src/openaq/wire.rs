//! Response shapes of the OpenAQ v2 endpoints and their mapping onto the model.

use crate::model::{Coordinates, Measurement, Pollutant, Station};
use chrono::{DateTime, Utc};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct LocationsResponse {
    pub results: Vec<LocationRecord>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationRecord {
    pub id: u64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub coordinates: Option<WireCoordinates>,
    #[serde(default)]
    pub parameters: Vec<ParameterRecord>,
    #[serde(default)]
    pub last_updated: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct WireCoordinates {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParameterRecord {
    pub parameter: String,
    #[serde(default)]
    pub last_value: Option<f64>,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub last_updated: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct MeasurementsResponse {
    pub results: Vec<MeasurementRecord>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeasurementRecord {
    pub location_id: u64,
    pub parameter: String,
    #[serde(default)]
    pub value: Option<f64>,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub date: Option<WireDate>,
}

#[derive(Debug, Deserialize)]
pub struct WireDate {
    #[serde(default)]
    pub utc: Option<String>,
}

pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|ts| ts.with_timezone(&Utc))
}

impl WireCoordinates {
    fn to_coordinates(&self) -> Option<Coordinates> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lon)) if lat.is_finite() && lon.is_finite() => {
                Some(Coordinates::new(lat, lon))
            }
            _ => None,
        }
    }
}

impl LocationRecord {
    /// Splits a location into its station and latest readings.
    /// Locations without usable coordinates cannot be placed and yield `None`.
    pub fn into_parts(self) -> Option<(Station, Vec<Measurement>)> {
        let coordinates = self.coordinates.as_ref()?.to_coordinates()?;
        let station_updated = self.last_updated.as_deref().and_then(parse_timestamp);

        let measurements = self
            .parameters
            .iter()
            .filter_map(|p| {
                let pollutant = Pollutant::from_api_code(&p.parameter)?;
                Some(Measurement {
                    station_id: self.id,
                    pollutant,
                    value: p.last_value,
                    unit: p.unit.clone().unwrap_or_default(),
                    timestamp: p
                        .last_updated
                        .as_deref()
                        .and_then(parse_timestamp)
                        .or(station_updated),
                })
            })
            .collect();

        let station = Station {
            id: self.id,
            name: self.name,
            coordinates,
            city: self.city,
            country: self.country,
        };
        Some((station, measurements))
    }
}

impl MeasurementRecord {
    pub fn into_measurement(self) -> Option<Measurement> {
        let pollutant = Pollutant::from_api_code(&self.parameter)?;
        Some(Measurement {
            station_id: self.location_id,
            pollutant,
            value: self.value,
            unit: self.unit.unwrap_or_default(),
            timestamp: self
                .date
                .and_then(|d| d.utc)
                .as_deref()
                .and_then(parse_timestamp),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LOCATIONS: &str = r#"{
        "meta": {"found": 2, "limit": 1000, "page": 1},
        "results": [
            {
                "id": 2178,
                "name": "Del Norte",
                "city": "Albuquerque",
                "country": "US",
                "coordinates": {"latitude": 35.1353, "longitude": -106.5847},
                "lastUpdated": "2024-03-01T10:00:00+00:00",
                "parameters": [
                    {"parameter": "pm25", "lastValue": 8.2, "unit": "µg/m³", "lastUpdated": "2024-03-01T09:00:00+00:00"},
                    {"parameter": "o3", "lastValue": 0.03, "unit": "ppm"},
                    {"parameter": "pm10", "lastValue": null, "unit": "µg/m³"}
                ]
            },
            {"id": 9, "name": null, "coordinates": null, "parameters": []}
        ]
    }"#;

    #[test]
    fn location_maps_to_station_and_supported_parameters() {
        let response: LocationsResponse = serde_json::from_str(LOCATIONS).unwrap();
        let mut records = response.results.into_iter();

        let (station, measurements) = records.next().unwrap().into_parts().unwrap();
        assert_eq!(station.id, 2178);
        assert_eq!(station.city.as_deref(), Some("Albuquerque"));
        assert_eq!(measurements.len(), 2);
        assert_eq!(measurements[0].pollutant, Pollutant::Pm25);
        assert_eq!(measurements[0].value, Some(8.2));
        assert_eq!(
            measurements[0].timestamp,
            parse_timestamp("2024-03-01T09:00:00Z")
        );
        // Falls back to the station timestamp.
        assert_eq!(
            measurements[1].timestamp,
            parse_timestamp("2024-03-01T10:00:00Z")
        );
        assert_eq!(measurements[1].value, None);

        assert!(records.next().unwrap().into_parts().is_none());
    }

    #[test]
    fn missing_results_field_is_rejected() {
        let parsed = serde_json::from_str::<LocationsResponse>(r#"{"meta": {}}"#);
        assert!(parsed.is_err());
    }

    #[test]
    fn measurement_record_reads_utc_date() {
        let record: MeasurementRecord = serde_json::from_str(
            r#"{"locationId": 7, "location": "x", "parameter": "pm10", "value": 41.0,
                "unit": "µg/m³", "date": {"utc": "2024-02-02T12:00:00Z", "local": "2024-02-02T13:00:00+01:00"}}"#,
        )
        .unwrap();
        let measurement = record.into_measurement().unwrap();
        assert_eq!(measurement.station_id, 7);
        assert_eq!(measurement.pollutant, Pollutant::Pm10);
        assert!(measurement.timestamp.is_some());
    }
}
