//! Dashboard graph component
//!
//! Station history as a line chart, or the regional band distribution when
//! no station is selected

use super::super::state::DashboardState;
use crate::transform::{BAND_COLOURS, BAND_LABELS, DISPLAY_UNIT, Series};

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::prelude::{Color, Style};
use ratatui::symbols::Marker;
use ratatui::text::Line;
use ratatui::widgets::{
    Axis, Bar, BarChart, BarGroup, Block, BorderType, Borders, Chart, Dataset, GraphType,
    Paragraph, Wrap,
};

fn graph_block(title: String) -> Block<'static> {
    Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(Color::Cyan))
}

pub fn render_graph(f: &mut Frame, area: Rect, state: &DashboardState) {
    let view = state.view();
    match &view.selection {
        Some(selection) => match &selection.history {
            Some(series) if series.count > 0 => {
                render_history(f, area, &selection.name, series);
            }
            _ => {
                let latest = selection
                    .latest
                    .map_or_else(|| "N/A".to_string(), |v| format!("{:.1} {}", v, DISPLAY_UNIT));
                let body = if selection.loading {
                    format!("Latest reading: {}\nLoading recent data...", latest)
                } else {
                    format!("Latest reading: {}\nNo recent readings.", latest)
                };
                let paragraph = Paragraph::new(body)
                    .wrap(Wrap { trim: true })
                    .block(graph_block(format!("{}: {}", selection.name, view.pollutant)));
                f.render_widget(paragraph, area);
            }
        },
        None => {
            if let Some(series) = view.projection.series_for(view.pollutant) {
                render_distribution(f, area, series);
            }
        }
    }
}

fn render_history(f: &mut Frame, area: Rect, name: &str, series: &Series) {
    let Some(first) = series.points.first().map(|(ts, _)| *ts) else {
        return;
    };
    let data: Vec<(f64, f64)> = series
        .points
        .iter()
        .map(|(ts, v)| ((*ts - first).num_seconds() as f64 / 3600.0, *v))
        .collect();
    let x_max = data.last().map_or(1.0, |(x, _)| x.max(1.0));
    let y_max = series.max.unwrap_or(1.0).max(1.0) * 1.1;
    let last = series.points.last().map_or(first, |(ts, _)| *ts);

    let datasets = vec![
        Dataset::default()
            .name(series.pollutant.label())
            .marker(Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(Color::LightCyan))
            .data(&data),
    ];

    let chart = Chart::new(datasets)
        .block(graph_block(format!(
            "{}: {} ({} readings)",
            name, series.pollutant, series.count
        )))
        .x_axis(
            Axis::default()
                .title("hours")
                .style(Style::default().fg(Color::DarkGray))
                .bounds([0.0, x_max])
                .labels([
                    Line::from(first.format("%m-%d %H:%M").to_string()),
                    Line::from(last.format("%m-%d %H:%M").to_string()),
                ]),
        )
        .y_axis(
            Axis::default()
                .title(DISPLAY_UNIT)
                .style(Style::default().fg(Color::DarkGray))
                .bounds([0.0, y_max])
                .labels([
                    Line::from("0"),
                    Line::from(format!("{:.0}", y_max / 2.0)),
                    Line::from(format!("{:.0}", y_max)),
                ]),
        );

    f.render_widget(chart, area);
}

fn render_distribution(f: &mut Frame, area: Rect, series: &Series) {
    let bars: Vec<Bar> = series
        .histogram
        .iter()
        .zip(BAND_LABELS.iter().zip(BAND_COLOURS))
        .map(|(count, (label, colour))| {
            Bar::default()
                .value(*count as u64)
                .label(Line::from(*label))
                .style(Style::default().fg(colour))
        })
        .collect();

    let mean = series
        .mean
        .map_or_else(|| "N/A".to_string(), |m| format!("{:.1}", m));
    let chart = BarChart::default()
        .block(graph_block(format!(
            "{} DISTRIBUTION ({} readings, mean {})",
            series.pollutant, series.count, mean
        )))
        .data(BarGroup::default().bars(&bars))
        .bar_width(9)
        .bar_gap(1);

    f.render_widget(chart, area);
}
