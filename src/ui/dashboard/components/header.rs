//! Dashboard header component
//!
//! Renders the title, the current selection and the fetch status line

use super::super::state::DashboardState;
use crate::dispatch::FetchStatus;

use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Direction, Layout};
use ratatui::prelude::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Paragraph};

/// Render header with title and fetch status.
pub fn render_header(f: &mut Frame, area: ratatui::layout::Rect, state: &DashboardState) {
    let header_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(2), Constraint::Length(2)])
        .split(area);

    let view = state.view();
    let title = Paragraph::new(format!(
        "OPENAQ AIR QUALITY v{}",
        env!("CARGO_PKG_VERSION")
    ))
    .alignment(Alignment::Center)
    .style(
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    )
    .block(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_type(BorderType::Thick),
    );
    f.render_widget(title, header_chunks[0]);

    let (status_text, status_color) = status_line(state);
    let line = Line::from(vec![
        Span::styled("Region: ", Style::default().fg(Color::DarkGray)),
        Span::styled(view.region.label(), Style::default().fg(Color::White)),
        Span::styled("  Pollutant: ", Style::default().fg(Color::DarkGray)),
        Span::styled(view.pollutant.label(), Style::default().fg(Color::White)),
        Span::styled("  Map: ", Style::default().fg(Color::DarkGray)),
        Span::styled(view.display_mode.label(), Style::default().fg(Color::White)),
        Span::styled("  Source: ", Style::default().fg(Color::DarkGray)),
        Span::styled(state.environment.to_string(), Style::default().fg(Color::White)),
        Span::raw("  "),
        Span::styled(
            status_text,
            Style::default()
                .fg(status_color)
                .add_modifier(Modifier::BOLD),
        ),
    ]);

    let status = Paragraph::new(line).alignment(Alignment::Center).block(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_style(Style::default().fg(Color::DarkGray)),
    );
    f.render_widget(status, header_chunks[1]);
}

fn status_line(state: &DashboardState) -> (String, Color) {
    let view = state.view();
    if let Some(banner) = &view.banner {
        return (banner.clone(), Color::LightRed);
    }
    match &view.status {
        FetchStatus::Idle => ("IDLE".to_string(), Color::DarkGray),
        FetchStatus::Loading => {
            let dots = ".".repeat(state.tick / 10 % 4);
            (format!("LOADING{}", dots), Color::LightBlue)
        }
        FetchStatus::Ready {
            stations,
            truncated,
        } => {
            let updated = view
                .updated_at
                .map(|ts| format!(" at {}", ts.format("%H:%M:%S GMT")))
                .unwrap_or_default();
            let suffix = if *truncated { " (first pages only)" } else { "" };
            (
                format!("{} STATIONS{}{}", stations, suffix, updated),
                Color::LightGreen,
            )
        }
        FetchStatus::NoData => ("NO DATA for this region".to_string(), Color::Yellow),
        FetchStatus::Failed => ("FETCH FAILED".to_string(), Color::LightRed),
    }
}
