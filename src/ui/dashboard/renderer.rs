//! Dashboard main renderer

use super::components::{footer, gauges, graph, header, logs, map, table};
use super::state::DashboardState;
use super::utils::DashboardLayout;
use ratatui::Frame;
use ratatui::prelude::{Color, Style};
use ratatui::widgets::Block;

pub fn render_dashboard(f: &mut Frame, state: &DashboardState) {
    if state.with_background_color {
        f.render_widget(
            Block::default().style(Style::default().bg(Color::Rgb(16, 20, 24))),
            f.area(),
        );
    }

    let layout = DashboardLayout::new(f.area());

    header::render_header(f, layout.header, state);
    map::render_map(f, layout.map, state);
    graph::render_graph(f, layout.graph, state);
    gauges::render_gauges(f, layout.gauges, state);
    gauges::render_alert(f, layout.alert, state);
    table::render_table(f, layout.table, state);
    logs::render_logs_panel(f, layout.logs, state);
    footer::render_footer(f, layout.footer);
}
