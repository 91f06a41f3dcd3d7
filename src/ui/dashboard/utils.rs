//! Dashboard utility functions
//!
//! Contains helper functions used across dashboard components

use crate::consts::cli_consts::map::CLICK_RADIUS_CELLS;
use crate::events::Source;
use crate::model::MapBounds;
use crate::transform::MarkerPoint;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::prelude::Color;

/// Screen areas of every dashboard panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DashboardLayout {
    pub header: Rect,
    pub map: Rect,
    pub graph: Rect,
    pub gauges: Rect,
    pub alert: Rect,
    pub table: Rect,
    pub logs: Rect,
    pub footer: Rect,
}

impl DashboardLayout {
    pub fn new(area: Rect) -> Self {
        let main_chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(4),
                Constraint::Fill(1),
                Constraint::Percentage(35),
                Constraint::Length(2),
            ])
            .margin(1)
            .split(area);

        let content_chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
            .split(main_chunks[1]);

        let analytics_chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Fill(1),
                Constraint::Length(6),
                Constraint::Length(1),
            ])
            .split(content_chunks[1]);

        let bottom_chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
            .split(main_chunks[2]);

        Self {
            header: main_chunks[0],
            map: content_chunks[0],
            graph: analytics_chunks[0],
            gauges: analytics_chunks[1],
            alert: analytics_chunks[2],
            table: bottom_chunks[0],
            logs: bottom_chunks[1],
            footer: main_chunks[3],
        }
    }

    /// The map canvas without its border.
    pub fn map_canvas(&self) -> Rect {
        inner(self.map)
    }
}

fn inner(area: Rect) -> Rect {
    Rect {
        x: area.x.saturating_add(1),
        y: area.y.saturating_add(1),
        width: area.width.saturating_sub(2),
        height: area.height.saturating_sub(2),
    }
}

/// Station of the marker closest to the clicked cell, if one lies within
/// the click radius.
pub fn nearest_marker(
    markers: &[MarkerPoint],
    bounds: &MapBounds,
    canvas: Rect,
    column: u16,
    row: u16,
) -> Option<u64> {
    if canvas.width == 0 || canvas.height == 0 || !canvas.contains((column, row).into()) {
        return None;
    }
    let click_x = (column - canvas.x) as f64 + 0.5;
    let click_y = (row - canvas.y) as f64 + 0.5;
    let (width, height) = (canvas.width as f64, canvas.height as f64);

    markers
        .iter()
        .filter_map(|m| {
            let (fx, fy) = bounds.fraction_of(&m.coordinates)?;
            let distance = (fx * width - click_x).hypot(fy * height - click_y);
            (distance <= CLICK_RADIUS_CELLS).then_some((m.station_id, distance))
        })
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(id, _)| id)
}

/// Get a ratatui color for the source of an activity event
pub fn get_source_color(source: &Source) -> Color {
    match source {
        Source::Fetcher => Color::Cyan,
        Source::History => Color::Yellow,
        Source::Dashboard => Color::Green,
    }
}

/// Format compact timestamp with date and time from full timestamp
pub fn format_compact_timestamp(timestamp: &str) -> String {
    // Extract from "YYYY-MM-DD HH:MM:SS" format
    let mut parts = timestamp.split(' ');
    if let (Some(date_part), Some(time_part)) = (parts.next(), parts.next()) {
        if let (Some(month_day), Some(hour_min)) = (date_part.get(5..10), time_part.get(0..5)) {
            return format!("{} {}", month_day, hour_min);
        }
    }
    timestamp.to_string()
}
