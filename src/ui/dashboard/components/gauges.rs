//! Dashboard gauge components
//!
//! 24-hour and 7-day averages of the selected station, and the alert line

use super::super::state::DashboardState;
use crate::transform::{self, DISPLAY_UNIT};

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::prelude::{Color, Modifier, Style};
use ratatui::widgets::{Block, BorderType, Borders, Gauge, Paragraph};

pub fn render_gauges(f: &mut Frame, area: Rect, state: &DashboardState) {
    let view = state.view();
    let gauge_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Length(3)])
        .split(area);

    let gauges = [
        ("24 HOUR AVERAGE", view.gauges.day),
        ("7 DAY AVERAGE", view.gauges.week),
    ];
    for ((title, value), chunk) in gauges.into_iter().zip(gauge_chunks.iter()) {
        let shown = value.unwrap_or(0.0);
        let colour = match value {
            Some(v) => transform::band_colour(view.pollutant, Some(v)),
            None => Color::DarkGray,
        };
        let ratio = (shown / view.pollutant.gauge_max()).clamp(0.0, 1.0);

        let gauge = Gauge::default()
            .block(
                Block::default()
                    .title(title)
                    .borders(Borders::ALL)
                    .border_type(BorderType::Rounded)
                    .border_style(Style::default().fg(colour)),
            )
            .gauge_style(Style::default().fg(colour).add_modifier(Modifier::BOLD))
            .ratio(ratio)
            .label(format!("{:.1} {}", shown, DISPLAY_UNIT));
        f.render_widget(gauge, *chunk);
    }
}

pub fn render_alert(f: &mut Frame, area: Rect, state: &DashboardState) {
    if let Some(alert) = &state.view().alert {
        let paragraph = Paragraph::new(alert.as_str()).style(
            Style::default()
                .fg(Color::LightRed)
                .add_modifier(Modifier::BOLD),
        );
        f.render_widget(paragraph, area);
    }
}
