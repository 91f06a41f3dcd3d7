//! Headless snapshot execution

use super::{
    SessionData,
    messages::{print_session_exit_success, print_session_starting},
};
use crate::dispatch::{Dispatcher, Effect, FetchStatus, UiEvent, ViewState};
use crate::logging::init_console_logger;
use crate::transform::{Projection, Series};
use crate::{print_cmd_error, print_cmd_info, print_cmd_warn};
use std::error::Error;

/// Fetches the session's region once and prints what the dashboard would show.
///
/// Runs the same dispatcher as the TUI, so superseded results, malformed
/// responses and empty regions are handled identically.
///
/// # Returns
/// * `Ok(())` - The region was fetched, possibly with no stations
/// * `Err` - The fetch failed
pub async fn run_snapshot(
    session: SessionData,
    parameter_filter: bool,
) -> Result<(), Box<dyn Error>> {
    init_console_logger();
    print_session_starting(
        "snapshot",
        session.view.region.label(),
        &session.environment.to_string(),
    );

    let mut dispatcher = Dispatcher::new(session.view).with_parameter_filter(parameter_filter);
    let mut pending = dispatcher.start();

    while let Some(effect) = pending.pop() {
        match effect {
            Effect::Fetch { seq, query } => {
                let result = session
                    .network
                    .fetch_region(query.bbox, query.parameter)
                    .await;
                pending.extend(dispatcher.handle(UiEvent::FetchCompleted { seq, result }));
            }
            Effect::Notify(event) => {
                event.emit();
                if event.should_display() {
                    println!("{}", event);
                }
            }
            Effect::FetchHistory { .. } | Effect::Render(_) => {}
        }
    }

    let view = dispatcher.state();
    match &view.status {
        FetchStatus::Failed => {
            let banner = view.banner.clone().unwrap_or_default();
            print_cmd_error!("Snapshot failed", banner.as_str());
            return Err(banner.into());
        }
        FetchStatus::NoData => {
            print_cmd_warn!("No data", "No stations reported data in {}", view.region);
        }
        _ => print_snapshot(view),
    }

    print_session_exit_success();
    Ok(())
}

fn print_snapshot(view: &ViewState) {
    let projection = &view.projection;
    print_cmd_info!(
        "Snapshot",
        "{} stations in {} reporting {}",
        projection.rows.len(),
        view.region,
        view.pollutant
    );
    if view.dataset.is_truncated() {
        print_cmd_warn!(
            "Truncated",
            "The page limit was reached; only part of the region is shown"
        );
    }
    for line in table_lines(projection) {
        println!("{}", line);
    }
    println!();
    for series in &projection.series {
        println!("{}", summary_line(series));
    }
}

fn table_lines(projection: &Projection) -> Vec<String> {
    let mut lines = vec![format!(
        "{:<8} {:<32} {:<24} {:<9} {:>8} {:<6} {}",
        "ID", "Station", "Location", "Parameter", "Value", "Unit", "Last updated"
    )];
    lines.extend(projection.rows.iter().map(|row| {
        format!(
            "{:<8} {:<32} {:<24} {:<9} {:>8} {:<6} {}",
            row.station_id,
            truncate(&row.name, 32),
            truncate(&row.location, 24),
            row.parameter,
            row.value_text,
            row.unit,
            row.timestamp
        )
    }));
    lines
}

fn summary_line(series: &Series) -> String {
    let fmt = |v: Option<f64>| v.map_or_else(|| "N/A".to_string(), |v| format!("{:.1}", v));
    format!(
        "{}: {} readings, min {}, max {}, mean {}, bands {:?}",
        series.pollutant,
        series.count,
        fmt(series.min),
        fmt(series.max),
        fmt(series.mean),
        series.histogram
    )
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(width.saturating_sub(1)).collect();
    cut.push('…');
    cut
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::Dataset;
    use crate::model::{BoundingBox, Coordinates, Measurement, Pollutant, Station};
    use crate::transform::project;

    #[test]
    fn table_lists_one_line_per_station() {
        let dataset = Dataset::new(
            BoundingBox::world(),
            vec![Station {
                id: 12,
                name: None,
                coordinates: Coordinates::new(1.0, 1.0),
                city: None,
                country: Some("GH".to_string()),
            }],
            vec![Measurement {
                station_id: 12,
                pollutant: Pollutant::Pm10,
                value: Some(42.0),
                unit: "µg/m³".to_string(),
                timestamp: None,
            }],
        );
        let lines = table_lines(&project(&dataset, Pollutant::Pm10));
        assert_eq!(lines.len(), 2);
        assert!(lines[1].contains("Name unavailable"));
        assert!(lines[1].contains("42.0"));
        assert!(lines[1].contains("GH"));
    }

    #[test]
    fn summary_marks_missing_statistics() {
        let dataset = Dataset::empty(BoundingBox::world());
        let projection = project(&dataset, Pollutant::Pm25);
        let line = summary_line(projection.series_for(Pollutant::Pm25).unwrap());
        assert!(line.starts_with("PM 2.5: 0 readings"));
        assert!(line.contains("mean N/A"));
    }

    #[test]
    fn long_names_are_cut() {
        assert_eq!(truncate("abcdef", 4), "abc…");
        assert_eq!(truncate("abc", 4), "abc");
    }
}
