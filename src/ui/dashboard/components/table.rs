//! Dashboard station table component

use super::super::state::DashboardState;
use crate::transform;

use ratatui::Frame;
use ratatui::layout::Constraint;
use ratatui::prelude::{Color, Modifier, Style};
use ratatui::widgets::{Block, BorderType, Borders, Cell, Row, Table, TableState};

pub fn render_table(f: &mut Frame, area: ratatui::layout::Rect, state: &DashboardState) {
    let view = state.view();
    let pollutant = view.pollutant;
    let selected_id = view.selection.as_ref().map(|s| s.station_id);

    let header = Row::new(["Station", "Location", "Parameter", "Value", "Unit", "Last updated"])
        .style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        );

    let rows: Vec<Row> = view
        .projection
        .rows
        .iter()
        .map(|row| {
            let marker = if Some(row.station_id) == selected_id {
                "◉ "
            } else {
                "  "
            };
            Row::new(vec![
                Cell::from(format!("{}{}", marker, row.name)),
                Cell::from(row.location.clone()),
                Cell::from(row.parameter.clone()),
                Cell::from(row.value_text.clone()).style(
                    Style::default().fg(transform::band_colour(pollutant, row.value)),
                ),
                Cell::from(row.unit.clone()),
                Cell::from(row.timestamp.clone()).style(Style::default().fg(Color::DarkGray)),
            ])
        })
        .collect();

    let title = if rows.is_empty() {
        "STATIONS (no data)".to_string()
    } else {
        format!("STATIONS ({})", rows.len())
    };

    let table = Table::new(
        rows,
        [
            Constraint::Fill(3),
            Constraint::Fill(2),
            Constraint::Length(9),
            Constraint::Length(7),
            Constraint::Length(6),
            Constraint::Length(26),
        ],
    )
    .header(header)
    .row_highlight_style(Style::default().bg(Color::Rgb(40, 60, 80)))
    .block(
        Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(Color::Cyan)),
    );

    let cursor = (!view.projection.rows.is_empty()).then_some(state.table_cursor());
    let mut table_state = TableState::default().with_selected(cursor);
    f.render_stateful_widget(table, area, &mut table_state);
}
