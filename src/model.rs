//! Domain types shared by the API client, transformer and dashboard.

use crate::consts::cli_consts::measurement;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Pollutants the dashboard can display.
#[derive(
    Debug,
    Copy,
    Clone,
    Default,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    clap::ValueEnum,
    strum::EnumIter,
)]
#[serde(rename_all = "lowercase")]
pub enum Pollutant {
    #[default]
    #[value(name = "pm25")]
    Pm25,
    #[value(name = "pm10")]
    Pm10,
}

impl Pollutant {
    /// Parameter code used by the OpenAQ API.
    pub fn api_code(&self) -> &'static str {
        match self {
            Pollutant::Pm25 => "pm25",
            Pollutant::Pm10 => "pm10",
        }
    }

    pub fn from_api_code(code: &str) -> Option<Self> {
        match code.to_ascii_lowercase().as_str() {
            "pm25" | "pm2.5" => Some(Pollutant::Pm25),
            "pm10" => Some(Pollutant::Pm10),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Pollutant::Pm25 => "PM 2.5",
            Pollutant::Pm10 => "PM 10",
        }
    }

    /// Readings outside this range are treated as missing.
    pub fn valid_range(&self) -> (f64, f64) {
        match self {
            Pollutant::Pm25 => (0.0, measurement::PM25_MAX_VALID),
            Pollutant::Pm10 => (0.0, measurement::PM10_MAX_VALID),
        }
    }

    pub fn gauge_max(&self) -> f64 {
        match self {
            Pollutant::Pm25 => measurement::PM25_GAUGE_MAX,
            Pollutant::Pm10 => measurement::PM10_GAUGE_MAX,
        }
    }

    /// Lower edges of the bands above "good".
    pub fn band_edges(&self) -> [f64; 4] {
        match self {
            Pollutant::Pm25 => measurement::PM25_BANDS,
            Pollutant::Pm10 => measurement::PM10_BANDS,
        }
    }

    pub fn toggle(&self) -> Self {
        match self {
            Pollutant::Pm25 => Pollutant::Pm10,
            Pollutant::Pm10 => Pollutant::Pm25,
        }
    }
}

impl std::fmt::Display for Pollutant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// A geographic rectangle used to scope queries.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub min_lon: f64,
    pub max_lat: f64,
    pub max_lon: f64,
}

impl BoundingBox {
    pub const fn new(min_lat: f64, min_lon: f64, max_lat: f64, max_lon: f64) -> Self {
        Self {
            min_lat,
            min_lon,
            max_lat,
            max_lon,
        }
    }

    pub const fn world() -> Self {
        Self::new(-90.0, -180.0, 90.0, 180.0)
    }

    /// Inclusive on every edge.
    pub fn contains(&self, point: &Coordinates) -> bool {
        (self.min_lat..=self.max_lat).contains(&point.latitude)
            && (self.min_lon..=self.max_lon).contains(&point.longitude)
    }

    /// `minLon,minLat,maxLon,maxLat`, the order the API expects.
    pub fn to_query_value(&self) -> String {
        format!(
            "{},{},{},{}",
            self.min_lon, self.min_lat, self.max_lon, self.max_lat
        )
    }
}

/// A monitoring location.
#[derive(Debug, Clone, PartialEq)]
pub struct Station {
    pub id: u64,
    pub name: Option<String>,
    pub coordinates: Coordinates,
    pub city: Option<String>,
    pub country: Option<String>,
}

impl Station {
    pub fn display_name(&self) -> &str {
        match self.name.as_deref() {
            Some(name) if !name.trim().is_empty() => name,
            _ => "Name unavailable",
        }
    }
}

/// A single reading as reported by the API, before unit normalisation.
#[derive(Debug, Clone, PartialEq)]
pub struct Measurement {
    pub station_id: u64,
    pub pollutant: Pollutant,
    pub value: Option<f64>,
    pub unit: String,
    pub timestamp: Option<DateTime<Utc>>,
}

/// Named map viewports offered by the region selector.
#[derive(
    Debug,
    Copy,
    Clone,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    clap::ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum Region {
    #[default]
    ShowAll,
    NorthAmerica,
    CentralAmerica,
    SouthAmerica,
    Europe,
    Africa,
    Asia,
    Oceania,
}

const REGIONS: [Region; 8] = [
    Region::ShowAll,
    Region::NorthAmerica,
    Region::CentralAmerica,
    Region::SouthAmerica,
    Region::Europe,
    Region::Africa,
    Region::Asia,
    Region::Oceania,
];

impl Region {
    pub fn label(&self) -> &'static str {
        match self {
            Region::ShowAll => "Show All",
            Region::NorthAmerica => "North America",
            Region::CentralAmerica => "Central America",
            Region::SouthAmerica => "South America",
            Region::Europe => "Europe",
            Region::Africa => "Africa",
            Region::Asia => "Asia",
            Region::Oceania => "Oceania",
        }
    }

    /// Area queried when this region is selected.
    pub fn bounding_box(&self) -> BoundingBox {
        match self {
            Region::ShowAll => BoundingBox::world(),
            Region::NorthAmerica => BoundingBox::new(15.0, -168.0, 72.0, -52.0),
            Region::CentralAmerica => BoundingBox::new(7.0, -118.0, 23.5, -59.0),
            Region::SouthAmerica => BoundingBox::new(-56.0, -82.0, 13.0, -34.0),
            Region::Europe => BoundingBox::new(35.0, -25.0, 71.5, 45.0),
            Region::Africa => BoundingBox::new(-35.0, -18.0, 37.5, 52.0),
            Region::Asia => BoundingBox::new(-11.0, 26.0, 78.0, 180.0),
            Region::Oceania => BoundingBox::new(-50.0, 110.0, 0.0, 180.0),
        }
    }

    /// Map framing for this region.
    pub fn viewport(&self) -> Viewport {
        let (lat, lon, zoom) = match self {
            Region::ShowAll => (17.0, 17.0, 1.0),
            Region::NorthAmerica => (55.8457, -103.6386, 2.0),
            Region::CentralAmerica => (18.0, -90.0, 4.0),
            Region::SouthAmerica => (-25.5, -61.0, 2.25),
            Region::Europe => (57.0, 16.0, 2.0),
            Region::Africa => (-1.0, 19.75, 2.3),
            Region::Asia => (28.33, 86.67, 2.3),
            Region::Oceania => (-31.55, 137.2, 2.3),
        };
        Viewport::new(Coordinates::new(lat, lon), zoom)
    }

    pub fn next(&self) -> Self {
        let idx = REGIONS.iter().position(|r| r == self).unwrap_or(0);
        REGIONS[(idx + 1) % REGIONS.len()]
    }

    pub fn prev(&self) -> Self {
        let idx = REGIONS.iter().position(|r| r == self).unwrap_or(0);
        REGIONS[(idx + REGIONS.len() - 1) % REGIONS.len()]
    }
}

impl std::fmt::Display for Region {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// How the map renders the current dataset.
#[derive(
    Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum DisplayMode {
    #[default]
    Markers,
    Heatmap,
}

impl DisplayMode {
    pub fn toggle(&self) -> Self {
        match self {
            DisplayMode::Markers => DisplayMode::Heatmap,
            DisplayMode::Heatmap => DisplayMode::Markers,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            DisplayMode::Markers => "Markers",
            DisplayMode::Heatmap => "Density Heatmap",
        }
    }
}

/// Visible longitude/latitude window of the map canvas.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct MapBounds {
    pub lon: [f64; 2],
    pub lat: [f64; 2],
}

impl MapBounds {
    /// Converts a position inside the canvas, given as fractions of its width
    /// (left to right) and height (top to bottom), into coordinates.
    pub fn point_at(&self, fx: f64, fy: f64) -> Coordinates {
        let lon = self.lon[0] + fx * (self.lon[1] - self.lon[0]);
        let lat = self.lat[1] - fy * (self.lat[1] - self.lat[0]);
        Coordinates::new(lat, lon)
    }

    /// Inverse of [`MapBounds::point_at`]; `None` when the point is off screen.
    pub fn fraction_of(&self, point: &Coordinates) -> Option<(f64, f64)> {
        let fx = (point.longitude - self.lon[0]) / (self.lon[1] - self.lon[0]);
        let fy = (self.lat[1] - point.latitude) / (self.lat[1] - self.lat[0]);
        ((0.0..=1.0).contains(&fx) && (0.0..=1.0).contains(&fy)).then_some((fx, fy))
    }
}

/// Map centre and zoom. Zoom 1 shows the whole world; every step halves the span.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Viewport {
    pub center: Coordinates,
    pub zoom: f64,
}

impl Viewport {
    pub fn new(center: Coordinates, zoom: f64) -> Self {
        Self { center, zoom }
    }

    /// Visible window around `center`. Windows that would cross a pole or the
    /// antimeridian are shifted back inside the world, so near those edges the
    /// centre is kept on screen but is no longer in the middle of it.
    pub fn bounds(&self) -> MapBounds {
        let scale = 2f64.powf((self.zoom - 1.0).max(0.0));
        let lon = clamp_span(self.center.longitude, 360.0 / scale, -180.0, 180.0);
        let lat = clamp_span(self.center.latitude, 180.0 / scale, -90.0, 90.0);
        MapBounds { lon, lat }
    }
}

/// Centres a window of `span` on `center`, shifted to stay inside `[min, max]`.
fn clamp_span(center: f64, span: f64, min: f64, max: f64) -> [f64; 2] {
    if span >= max - min {
        return [min, max];
    }
    let mut lo = center - span / 2.0;
    let mut hi = center + span / 2.0;
    if lo < min {
        hi += min - lo;
        lo = min;
    }
    if hi > max {
        lo -= hi - max;
        hi = max;
    }
    [lo, hi]
}
