//! Dashboard state update logic
//!
//! Routes dispatcher effects: redraw requests and activity events stay here,
//! network requests are handed back to the caller to spawn.

use super::state::DashboardState;

use crate::dispatch::{Effect, UiEvent, Widget, WidgetSet};
use crate::workers::WorkerMessage;

impl DashboardState {
    /// Update the dashboard state with a new tick.
    pub fn update(&mut self) {
        self.tick += 1;

        // Process all queued events one by one
        let mut logged = false;
        while let Some(event) = self.pending_events.pop_front() {
            self.add_to_activity_log(event);
            logged = true;
        }
        if logged {
            self.mark_dirty(WidgetSet::of(&[Widget::Status]));
        }
    }

    /// Effects for the first load of the dashboard.
    pub fn start(&mut self) -> Vec<Effect> {
        let effects = self.dispatcher_mut().start();
        self.absorb(effects)
    }

    /// Feeds `event` to the dispatcher and returns the network requests it asks for.
    pub fn dispatch(&mut self, event: UiEvent) -> Vec<Effect> {
        let effects = self.dispatcher_mut().handle(event);
        self.absorb(effects)
    }

    pub fn process_worker_message(&mut self, message: WorkerMessage) -> Vec<Effect> {
        match message {
            WorkerMessage::Completed(event) => self.dispatch(event),
            WorkerMessage::Activity(event) => {
                self.add_event(event);
                Vec::new()
            }
        }
    }

    /// Selects the row under the table cursor.
    pub fn select_cursor_row(&mut self) -> Vec<Effect> {
        self.dispatch(UiEvent::TableRowSelected(self.table_cursor()))
    }

    fn absorb(&mut self, effects: Vec<Effect>) -> Vec<Effect> {
        let mut requests = Vec::new();
        for effect in effects {
            match effect {
                Effect::Render(widgets) => self.mark_dirty(widgets),
                Effect::Notify(event) => self.add_event(event),
                request @ (Effect::Fetch { .. } | Effect::FetchHistory { .. }) => {
                    requests.push(request)
                }
            }
        }
        self.sync_cursor();
        requests
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::{Dispatcher, ViewState};
    use crate::environment::Environment;
    use crate::model::{BoundingBox, Coordinates, DisplayMode, Measurement, Pollutant, Region, Station};
    use crate::network::RegionData;
    use crate::ui::app::UIConfig;
    use crate::ui::dashboard::state::CursorMove;

    fn state() -> DashboardState {
        let view = ViewState::new(Region::ShowAll, Pollutant::Pm25, DisplayMode::Markers);
        DashboardState::new(
            Environment::Production,
            Dispatcher::new(view),
            &UIConfig::new(false),
        )
    }

    fn loaded_state() -> DashboardState {
        let mut state = state();
        let seq = match state.start().as_slice() {
            [Effect::Fetch { seq, .. }] => *seq,
            other => panic!("unexpected effects {:?}", other),
        };
        let stations: Vec<Station> = (1..=3)
            .map(|id| Station {
                id,
                name: Some(format!("Station {}", id)),
                coordinates: Coordinates::new(id as f64, id as f64),
                city: None,
                country: None,
            })
            .collect();
        let measurements = stations
            .iter()
            .map(|s| Measurement {
                station_id: s.id,
                pollutant: Pollutant::Pm25,
                value: Some(5.0),
                unit: "µg/m³".to_string(),
                timestamp: None,
            })
            .collect();
        state.dispatch(UiEvent::FetchCompleted {
            seq,
            result: Ok(RegionData {
                bbox: BoundingBox::world(),
                stations,
                measurements,
                pages: 1,
                truncated: false,
            }),
        });
        state.take_dirty();
        state
    }

    #[test]
    fn renders_and_notifications_are_absorbed() {
        let mut state = loaded_state();
        let requests = state.dispatch(UiEvent::DisplayModeToggled);
        assert!(requests.is_empty());
        assert_eq!(state.take_dirty(), WidgetSet::of(&[Widget::Map]));

        state.update();
        assert!(!state.activity_logs.is_empty());
    }

    #[test]
    fn cursor_stays_inside_the_table() {
        let mut state = loaded_state();
        for _ in 0..10 {
            state.move_cursor(CursorMove::Down);
        }
        assert_eq!(state.table_cursor(), 2);
        state.move_cursor(CursorMove::Up);
        assert_eq!(state.table_cursor(), 1);

        let requests = state.select_cursor_row();
        assert!(matches!(
            requests.as_slice(),
            [Effect::FetchHistory { station_id: 2, .. }]
        ));
        assert_eq!(state.view().viewport.center, Coordinates::new(2.0, 2.0));
    }
}
