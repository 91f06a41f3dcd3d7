//! Dashboard map component
//!
//! World map canvas with station markers or the density heatmap

use super::super::state::DashboardState;
use crate::consts::cli_consts::map::{HEAT_GRID_COLS, HEAT_GRID_ROWS};
use crate::model::DisplayMode;
use crate::transform::{self, BAND_COLOURS, BAND_LABELS, NO_DATA_COLOUR};

use ratatui::Frame;
use ratatui::prelude::{Color, Modifier, Style};
use ratatui::symbols::Marker;
use ratatui::text::{Line, Span};
use ratatui::widgets::canvas::{Canvas, Map, MapResolution};
use ratatui::widgets::{Block, BorderType, Borders};

pub fn render_map(f: &mut Frame, area: ratatui::layout::Rect, state: &DashboardState) {
    let view = state.view();
    let bounds = view.viewport.bounds();
    let pollutant = view.pollutant;
    let markers = &view.projection.markers;
    let selected = view.selection.as_ref().map(|s| s.station_id);

    let heat = match view.display_mode {
        DisplayMode::Heatmap => {
            transform::heat_cells(markers, &bounds, HEAT_GRID_COLS, HEAT_GRID_ROWS)
        }
        DisplayMode::Markers => Vec::new(),
    };

    let mut legend: Vec<Span> = vec![Span::raw(" ")];
    for (colour, label) in BAND_COLOURS.iter().zip(BAND_LABELS) {
        legend.push(Span::styled("■ ", Style::default().fg(*colour)));
        legend.push(Span::styled(
            format!("{}  ", label),
            Style::default().fg(Color::DarkGray),
        ));
    }
    legend.push(Span::styled("■ ", Style::default().fg(NO_DATA_COLOUR)));
    legend.push(Span::styled("N/A ", Style::default().fg(Color::DarkGray)));

    let block = Block::default()
        .title(format!(
            "MAP: {} ({} stations)",
            view.display_mode.label(),
            markers.len()
        ))
        .title_bottom(Line::from(legend))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(Color::Cyan));

    let canvas = Canvas::default()
        .block(block)
        .marker(Marker::Braille)
        .x_bounds(bounds.lon)
        .y_bounds(bounds.lat)
        .paint(|ctx| {
            ctx.draw(&Map {
                color: Color::Rgb(70, 90, 110),
                resolution: MapResolution::High,
            });
            ctx.layer();

            match view.display_mode {
                DisplayMode::Heatmap => {
                    for cell in &heat {
                        let colour = transform::band_colour(pollutant, Some(cell.mean));
                        ctx.print(
                            cell.center.longitude,
                            cell.center.latitude,
                            Span::styled("▓", Style::default().fg(colour)),
                        );
                    }
                }
                DisplayMode::Markers => {
                    for marker in markers.iter().filter(|m| Some(m.station_id) != selected) {
                        ctx.print(
                            marker.coordinates.longitude,
                            marker.coordinates.latitude,
                            Span::styled(
                                "●",
                                Style::default().fg(transform::band_colour(pollutant, marker.value)),
                            ),
                        );
                    }
                }
            }

            if let Some(marker) = markers.iter().find(|m| Some(m.station_id) == selected) {
                ctx.print(
                    marker.coordinates.longitude,
                    marker.coordinates.latitude,
                    Span::styled(
                        "◉",
                        Style::default()
                            .fg(Color::White)
                            .add_modifier(Modifier::BOLD),
                    ),
                );
            }
        });

    f.render_widget(canvas, area);
}
