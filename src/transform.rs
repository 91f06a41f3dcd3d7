//! Pure projections of a [`Dataset`] into map, table and chart inputs.

use crate::dataset::Dataset;
use crate::model::{Coordinates, MapBounds, Measurement, Pollutant, Station};
use chrono::{DateTime, Duration, Utc};
use ratatui::style::Color;
use strum::IntoEnumIterator;

pub const DISPLAY_UNIT: &str = "µg/m³";
const MISSING: &str = "N/A";

/// Colour used for stations without a usable reading.
pub const NO_DATA_COLOUR: Color = Color::DarkGray;

/// A station drawn on the map.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerPoint {
    pub station_id: u64,
    pub coordinates: Coordinates,
    /// Normalised to µg/m³, `None` when missing or implausible.
    pub value: Option<f64>,
}

/// A line of the station table.
#[derive(Debug, Clone, PartialEq)]
pub struct TableRow {
    pub station_id: u64,
    pub name: String,
    pub location: String,
    pub parameter: String,
    pub value: Option<f64>,
    pub value_text: String,
    pub unit: String,
    pub timestamp: String,
    pub coordinates: Coordinates,
}

/// Time-ordered readings of one pollutant with summary statistics.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub pollutant: Pollutant,
    pub points: Vec<(DateTime<Utc>, f64)>,
    pub count: usize,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub mean: Option<f64>,
    /// Values per colour band, good to very unhealthy.
    pub histogram: [usize; 5],
}

/// Everything the dashboard draws for one pollutant.
#[derive(Debug, Clone, PartialEq)]
pub struct Projection {
    pub pollutant: Pollutant,
    pub markers: Vec<MarkerPoint>,
    pub rows: Vec<TableRow>,
    pub series: Vec<Series>,
}

impl Projection {
    pub fn series_for(&self, pollutant: Pollutant) -> Option<&Series> {
        self.series.iter().find(|s| s.pollutant == pollutant)
    }
}

/// 24-hour and 7-day means, relative to the newest reading.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Averages {
    pub day: Option<f64>,
    pub week: Option<f64>,
}

/// Mean of the markers falling into one heatmap grid cell.
#[derive(Debug, Clone, PartialEq)]
pub struct HeatCell {
    pub center: Coordinates,
    pub mean: f64,
    pub count: usize,
}

pub fn project(dataset: &Dataset, pollutant: Pollutant) -> Projection {
    let mut markers = Vec::new();
    let mut rows = Vec::new();

    for station in dataset.stations() {
        let Some(measurement) = dataset.latest(station.id, pollutant) else {
            continue;
        };
        let value = clean_value(measurement);
        markers.push(MarkerPoint {
            station_id: station.id,
            coordinates: station.coordinates,
            value,
        });
        rows.push(table_row(station, measurement, value));
    }

    let series = Pollutant::iter()
        .map(|p| {
            let readings = dataset.measurements().iter().filter(|m| m.pollutant == p);
            build_series(p, readings)
        })
        .collect();

    Projection {
        pollutant,
        markers,
        rows,
        series,
    }
}

/// Series over a station's history.
pub fn history_series(history: &[Measurement], pollutant: Pollutant) -> Series {
    build_series(
        pollutant,
        history.iter().filter(|m| m.pollutant == pollutant),
    )
}

fn build_series<'a>(pollutant: Pollutant, readings: impl Iterator<Item = &'a Measurement>) -> Series {
    let cleaned: Vec<(Option<DateTime<Utc>>, f64)> = readings
        .filter_map(|m| Some((m.timestamp, clean_value(m)?)))
        .collect();
    let values: Vec<f64> = cleaned.iter().map(|(_, v)| *v).collect();

    // Readings without a timestamp still count towards the statistics.
    let mut points: Vec<(DateTime<Utc>, f64)> = cleaned
        .iter()
        .filter_map(|(ts, v)| Some(((*ts)?, *v)))
        .collect();
    points.sort_by(|a, b| a.0.cmp(&b.0).then(a.1.total_cmp(&b.1)));

    let mut histogram = [0; 5];
    for v in &values {
        histogram[band_index(pollutant, *v)] += 1;
    }

    Series {
        pollutant,
        count: values.len(),
        min: values.iter().copied().reduce(f64::min),
        max: values.iter().copied().reduce(f64::max),
        mean: mean(&values),
        histogram,
        points,
    }
}

fn table_row(station: &Station, measurement: &Measurement, value: Option<f64>) -> TableRow {
    let location = [station.city.as_deref(), station.country.as_deref()]
        .into_iter()
        .flatten()
        .filter(|s| !s.trim().is_empty())
        .collect::<Vec<_>>()
        .join(", ");

    TableRow {
        station_id: station.id,
        name: station.display_name().to_string(),
        location: if location.is_empty() {
            MISSING.to_string()
        } else {
            location
        },
        parameter: measurement.pollutant.label().to_string(),
        value,
        value_text: value.map_or_else(|| MISSING.to_string(), |v| format!("{:.1}", v)),
        unit: DISPLAY_UNIT.to_string(),
        timestamp: measurement
            .timestamp
            .map_or_else(|| MISSING.to_string(), format_timestamp),
        coordinates: station.coordinates,
    }
}

pub fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.format("%Y-%m-%d at %H:%M:%S GMT").to_string()
}

/// Converts `value` in `unit` to µg/m³; `None` for units we cannot convert.
pub fn normalize_unit(value: f64, unit: &str) -> Option<f64> {
    let unit = unit.trim().to_lowercase().replace('³', "3").replace('μ', "µ");
    match unit.as_str() {
        "µg/m3" | "ug/m3" => Some(value),
        "mg/m3" => Some(value * 1000.0),
        "ng/m3" => Some(value / 1000.0),
        _ => None,
    }
}

/// Normalised value, or `None` when missing, non-finite, or outside the valid range.
pub fn clean_value(measurement: &Measurement) -> Option<f64> {
    let value = normalize_unit(measurement.value?, &measurement.unit)?;
    let (lo, hi) = measurement.pollutant.valid_range();
    (value.is_finite() && (lo..=hi).contains(&value)).then_some(value)
}

fn mean(values: &[f64]) -> Option<f64> {
    (!values.is_empty()).then(|| values.iter().sum::<f64>() / values.len() as f64)
}

pub fn averages(points: &[(DateTime<Utc>, f64)]) -> Averages {
    let Some(newest) = points.iter().map(|(ts, _)| *ts).max() else {
        return Averages::default();
    };
    let window = |span: Duration| {
        let from = newest - span;
        let values: Vec<f64> = points
            .iter()
            .filter(|(ts, _)| *ts >= from)
            .map(|(_, v)| *v)
            .collect();
        mean(&values)
    };
    Averages {
        day: window(Duration::hours(24)),
        week: window(Duration::days(7)),
    }
}

/// Bins markers with a value into a `cols` x `rows` grid over `bounds`.
pub fn heat_cells(
    markers: &[MarkerPoint],
    bounds: &MapBounds,
    cols: usize,
    rows: usize,
) -> Vec<HeatCell> {
    if cols == 0 || rows == 0 {
        return Vec::new();
    }
    let mut sums = vec![(0.0, 0usize); cols * rows];
    for marker in markers {
        let (Some(value), Some((fx, fy))) = (marker.value, bounds.fraction_of(&marker.coordinates))
        else {
            continue;
        };
        let col = ((fx * cols as f64) as usize).min(cols - 1);
        let row = ((fy * rows as f64) as usize).min(rows - 1);
        let cell = &mut sums[row * cols + col];
        cell.0 += value;
        cell.1 += 1;
    }

    sums.into_iter()
        .enumerate()
        .filter(|(_, (_, count))| *count > 0)
        .map(|(idx, (sum, count))| {
            let fx = ((idx % cols) as f64 + 0.5) / cols as f64;
            let fy = ((idx / cols) as f64 + 0.5) / rows as f64;
            HeatCell {
                center: bounds.point_at(fx, fy),
                mean: sum / count as f64,
                count,
            }
        })
        .collect()
}

fn band_index(pollutant: Pollutant, value: f64) -> usize {
    pollutant
        .band_edges()
        .iter()
        .take_while(|edge| value >= **edge)
        .count()
}

pub const BAND_COLOURS: [Color; 5] = [
    Color::Green,
    Color::Yellow,
    Color::LightRed,
    Color::Red,
    Color::Magenta,
];

pub const BAND_LABELS: [&str; 5] = [
    "Good",
    "Moderate",
    "Sensitive",
    "Unhealthy",
    "Very unhealthy",
];

pub fn band_colour(pollutant: Pollutant, value: Option<f64>) -> Color {
    value.map_or(NO_DATA_COLOUR, |v| BAND_COLOURS[band_index(pollutant, v)])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::BoundingBox;
    use chrono::TimeZone;

    fn station(id: u64, lat: f64, lon: f64) -> Station {
        Station {
            id,
            name: Some(format!("Station {}", id)),
            coordinates: Coordinates::new(lat, lon),
            city: Some("Paris".to_string()),
            country: Some("FR".to_string()),
        }
    }

    fn reading(station_id: u64, pollutant: Pollutant, value: Option<f64>, unit: &str) -> Measurement {
        Measurement {
            station_id,
            pollutant,
            value,
            unit: unit.to_string(),
            timestamp: Some(Utc.with_ymd_and_hms(2024, 5, 1, 12, station_id as u32, 0).unwrap()),
        }
    }

    fn sample() -> Dataset {
        Dataset::new(
            BoundingBox::new(40.0, -10.0, 55.0, 20.0),
            vec![station(1, 48.85, 2.35), station(2, 52.5, 13.4), station(3, 41.9, 12.5)],
            vec![
                reading(1, Pollutant::Pm25, Some(8.0), "µg/m³"),
                reading(2, Pollutant::Pm25, Some(0.04), "mg/m³"),
                reading(3, Pollutant::Pm25, None, "µg/m³"),
                reading(1, Pollutant::Pm10, Some(900.0), "µg/m³"),
            ],
        )
    }

    #[test]
    fn projection_is_idempotent() {
        let dataset = sample();
        assert_eq!(project(&dataset, Pollutant::Pm25), project(&dataset, Pollutant::Pm25));
    }

    #[test]
    fn markers_lie_inside_the_dataset_box() {
        let dataset = sample();
        let projection = project(&dataset, Pollutant::Pm25);
        assert_eq!(projection.markers.len(), 3);
        assert!(projection
            .markers
            .iter()
            .all(|m| dataset.bbox().contains(&m.coordinates)));
    }

    #[test]
    fn missing_and_implausible_values_show_not_available() {
        let dataset = sample();
        let pm25 = project(&dataset, Pollutant::Pm25);
        let row = pm25.rows.iter().find(|r| r.station_id == 3).unwrap();
        assert_eq!(row.value_text, "N/A");
        assert_eq!(row.value, None);

        let pm10 = project(&dataset, Pollutant::Pm10);
        assert_eq!(pm10.rows.len(), 1);
        assert_eq!(pm10.rows[0].value_text, "N/A");
        assert_eq!(pm10.series_for(Pollutant::Pm10).unwrap().count, 0);
    }

    #[test]
    fn units_are_normalised_before_aggregation() {
        let projection = project(&sample(), Pollutant::Pm25);
        let row = projection.rows.iter().find(|r| r.station_id == 2).unwrap();
        assert_eq!(row.value, Some(40.0));
        assert_eq!(row.unit, DISPLAY_UNIT);

        let series = projection.series_for(Pollutant::Pm25).unwrap();
        assert_eq!(series.count, 2);
        assert_eq!(series.min, Some(8.0));
        assert_eq!(series.max, Some(40.0));
        assert_eq!(series.mean, Some(24.0));
        assert_eq!(series.histogram, [1, 0, 1, 0, 0]);
    }

    #[test]
    fn unknown_units_are_missing() {
        assert_eq!(normalize_unit(3.0, "ppm"), None);
        assert_eq!(normalize_unit(3.0, "ug/m3"), Some(3.0));
        assert_eq!(normalize_unit(3000.0, "ng/m³"), Some(3.0));
    }

    #[test]
    fn table_row_formats_timestamp_and_location() {
        let projection = project(&sample(), Pollutant::Pm25);
        let row = &projection.rows[0];
        assert_eq!(row.timestamp, "2024-05-01 at 12:01:00 GMT");
        assert_eq!(row.location, "Paris, FR");
        assert_eq!(row.parameter, "PM 2.5");
    }

    #[test]
    fn averages_are_relative_to_the_newest_point() {
        let newest = Utc.with_ymd_and_hms(2024, 5, 8, 0, 0, 0).unwrap();
        let points = vec![
            (newest - Duration::days(6), 30.0),
            (newest - Duration::hours(30), 20.0),
            (newest - Duration::hours(2), 10.0),
            (newest, 20.0),
        ];
        let avg = averages(&points);
        assert_eq!(avg.day, Some(15.0));
        assert_eq!(avg.week, Some(20.0));
        assert_eq!(averages(&[]), Averages::default());
    }

    #[test]
    fn averages_include_the_window_edge() {
        let newest = Utc.with_ymd_and_hms(2024, 5, 8, 0, 0, 0).unwrap();
        let points = vec![
            (newest - Duration::days(7), 40.0),
            (newest - Duration::hours(24), 10.0),
            (newest, 20.0),
        ];
        let avg = averages(&points);
        assert_eq!(avg.day, Some(15.0));
        assert_eq!(avg.week, Some(70.0 / 3.0));
    }

    #[test]
    fn untimed_readings_count_in_statistics_but_not_points() {
        let mut untimed = reading(1, Pollutant::Pm25, Some(10.0), "µg/m³");
        untimed.timestamp = None;
        let timed = reading(1, Pollutant::Pm25, Some(30.0), "µg/m³");

        let series = history_series(&[untimed, timed], Pollutant::Pm25);
        assert_eq!(series.count, 2);
        assert_eq!(series.mean, Some(20.0));
        assert_eq!(series.min, Some(10.0));
        assert_eq!(series.max, Some(30.0));
        assert_eq!(series.histogram.iter().sum::<usize>(), 2);
        assert_eq!(series.points.len(), 1);
        assert_eq!(series.points[0].1, 30.0);
    }

    #[test]
    fn heat_cells_average_markers_in_the_same_cell() {
        let bounds = MapBounds {
            lon: [0.0, 10.0],
            lat: [0.0, 10.0],
        };
        let marker = |id, lat, lon, value| MarkerPoint {
            station_id: id,
            coordinates: Coordinates::new(lat, lon),
            value,
        };
        let markers = vec![
            marker(1, 9.0, 1.0, Some(10.0)),
            marker(2, 8.0, 2.0, Some(30.0)),
            marker(3, 1.0, 9.0, Some(5.0)),
            marker(4, 1.0, 9.0, None),
            marker(5, 50.0, 50.0, Some(1.0)),
        ];
        let cells = heat_cells(&markers, &bounds, 2, 2);
        assert_eq!(cells.len(), 2);
        assert_eq!(cells[0].mean, 20.0);
        assert_eq!(cells[0].count, 2);
        assert_eq!(cells[1].mean, 5.0);
    }

    #[test]
    fn band_colours_follow_breakpoints() {
        assert_eq!(band_colour(Pollutant::Pm25, Some(5.0)), Color::Green);
        assert_eq!(band_colour(Pollutant::Pm25, Some(12.1)), Color::Yellow);
        assert_eq!(band_colour(Pollutant::Pm10, Some(400.0)), Color::Magenta);
        assert_eq!(band_colour(Pollutant::Pm10, None), NO_DATA_COLOUR);
    }
}
