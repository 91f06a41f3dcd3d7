//! Dashboard state management
//!
//! Wraps the dispatcher with what only the terminal needs: the activity log,
//! the table cursor and the set of widgets waiting to be redrawn.

use crate::consts::cli_consts::MAX_ACTIVITY_LOGS;
use crate::dispatch::{Dispatcher, ViewState, WidgetSet};
use crate::environment::Environment;
use crate::events::Event as ActivityEvent;
use crate::ui::app::UIConfig;

use std::collections::VecDeque;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorMove {
    Up,
    Down,
}

pub struct DashboardState {
    /// The environment the data is fetched from.
    pub environment: Environment,
    /// Queue of events waiting to be added to the log
    pub pending_events: VecDeque<ActivityEvent>,
    /// Activity logs for display
    pub activity_logs: VecDeque<ActivityEvent>,
    /// Whether to enable background colors
    pub with_background_color: bool,
    /// Animation tick counter
    pub tick: usize,

    dispatcher: Dispatcher,
    /// Highlighted table row; Enter selects it.
    table_cursor: usize,
    /// Widgets changed since the last frame.
    dirty: WidgetSet,
}

impl DashboardState {
    pub fn new(environment: Environment, dispatcher: Dispatcher, ui_config: &UIConfig) -> Self {
        Self {
            environment,
            pending_events: VecDeque::new(),
            activity_logs: VecDeque::new(),
            with_background_color: ui_config.with_background_color,
            tick: 0,
            dispatcher,
            table_cursor: 0,
            dirty: WidgetSet::all(),
        }
    }

    pub fn view(&self) -> &ViewState {
        self.dispatcher.state()
    }

    pub(super) fn dispatcher_mut(&mut self) -> &mut Dispatcher {
        &mut self.dispatcher
    }

    pub fn table_cursor(&self) -> usize {
        self.table_cursor
    }

    pub fn move_cursor(&mut self, direction: CursorMove) {
        let rows = self.view().projection.rows.len();
        if rows == 0 {
            self.table_cursor = 0;
            return;
        }
        self.table_cursor = match direction {
            CursorMove::Up => self.table_cursor.saturating_sub(1),
            CursorMove::Down => (self.table_cursor + 1).min(rows - 1),
        };
        self.mark_dirty(WidgetSet::of(&[crate::dispatch::Widget::Table]));
    }

    /// Keeps the cursor on the selected row, or inside the table when rows change.
    pub(super) fn sync_cursor(&mut self) {
        let rows = self.view().projection.rows.len();
        if let Some(selected) = self.view().selected_row() {
            self.table_cursor = selected;
        } else if self.table_cursor >= rows {
            self.table_cursor = rows.saturating_sub(1);
        }
    }

    pub fn mark_dirty(&mut self, widgets: WidgetSet) {
        self.dirty = self.dirty.union(widgets);
    }

    /// Returns and clears the widgets waiting to be redrawn.
    pub fn take_dirty(&mut self) -> WidgetSet {
        std::mem::take(&mut self.dirty)
    }

    /// Add an event to activity logs with size limit
    pub fn add_to_activity_log(&mut self, event: ActivityEvent) {
        if self.activity_logs.len() >= MAX_ACTIVITY_LOGS {
            self.activity_logs.pop_front();
        }
        self.activity_logs.push_back(event);
    }

    /// Add an event to the processing queue
    pub fn add_event(&mut self, event: ActivityEvent) {
        self.pending_events.push_back(event);
    }
}
