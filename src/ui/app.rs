//! Main application state and UI loop
//!
//! Contains the App struct and main UI event handling logic

use crate::consts::cli_consts::ui;
use crate::dispatch::{Dispatcher, Effect, UiEvent, ViewState};
use crate::environment::Environment;
use crate::network::NetworkClient;
use crate::ui::dashboard::{
    CursorMove, DashboardLayout, DashboardState, nearest_marker, render_dashboard,
};
use crate::ui::splash::render_splash;
use crate::workers::{EventSender, WorkerMessage, spawn_fetch, spawn_history};
use crossterm::event::{self, Event, KeyCode, KeyEventKind, MouseButton, MouseEventKind};
use ratatui::layout::Rect;
use ratatui::{Frame, Terminal, backend::Backend};
use std::time::Instant;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// UI configuration data grouped by concern
#[derive(Debug, Clone)]
pub struct UIConfig {
    pub with_background_color: bool,
}

impl UIConfig {
    pub fn new(with_background_color: bool) -> Self {
        Self {
            with_background_color,
        }
    }
}

/// The different screens in the application.
pub enum Screen {
    /// Splash screen shown at the start of the application.
    Splash,
    /// Dashboard screen with the map, analytics and station table.
    Dashboard(Box<DashboardState>),
}

/// What a key press asks for.
#[derive(Debug)]
pub enum KeyAction {
    Quit,
    Dispatch(UiEvent),
    Cursor(CursorMove),
    SelectRow,
    Ignore,
}

/// Application state
pub struct App {
    /// The environment in which the application is running.
    environment: Environment,

    /// The current screen being displayed in the application.
    current_screen: Screen,

    /// Dispatcher handed to the dashboard once the splash screen is done.
    dispatcher: Option<Dispatcher>,

    /// Shared client for every fetch task.
    network: NetworkClient,

    /// Cloned into every fetch task.
    event_sender: EventSender,

    /// Receives completions and activity from fetch tasks.
    event_receiver: mpsc::Receiver<WorkerMessage>,

    /// Fetch tasks still running; aborted on exit.
    workers: Vec<JoinHandle<()>>,

    ui_config: UIConfig,
}

impl App {
    /// Creates a new instance of the application.
    pub fn new(
        environment: Environment,
        view: ViewState,
        network: NetworkClient,
        event_sender: EventSender,
        event_receiver: mpsc::Receiver<WorkerMessage>,
        ui_config: UIConfig,
    ) -> Self {
        Self {
            environment,
            current_screen: Screen::Splash,
            dispatcher: Some(Dispatcher::new(view)),
            network,
            event_sender,
            event_receiver,
            workers: Vec::new(),
            ui_config,
        }
    }

    /// Leaves the splash screen and starts the first region fetch.
    fn open_dashboard(&mut self) {
        let Some(dispatcher) = self.dispatcher.take() else {
            return;
        };
        let mut state = DashboardState::new(self.environment.clone(), dispatcher, &self.ui_config);
        let requests = state.start();
        self.current_screen = Screen::Dashboard(Box::new(state));
        self.execute(requests);
    }

    /// Spawns the network requests the dispatcher asked for.
    fn execute(&mut self, effects: Vec<Effect>) {
        self.workers.retain(|handle| !handle.is_finished());
        for effect in effects {
            match effect {
                Effect::Fetch { seq, query } => self.workers.push(spawn_fetch(
                    self.network.clone(),
                    self.event_sender.clone(),
                    seq,
                    query,
                )),
                Effect::FetchHistory {
                    seq,
                    station_id,
                    pollutant,
                } => self.workers.push(spawn_history(
                    self.network.clone(),
                    self.event_sender.clone(),
                    seq,
                    station_id,
                    pollutant,
                )),
                Effect::Render(_) | Effect::Notify(_) => {}
            }
        }
    }

    fn shutdown(&mut self) {
        for handle in self.workers.drain(..) {
            handle.abort();
        }
    }
}

/// Maps a key to a dashboard action.
pub fn map_key(code: KeyCode, view: &ViewState) -> KeyAction {
    match code {
        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('Q') => KeyAction::Quit,
        KeyCode::Char('r') => KeyAction::Dispatch(UiEvent::RegionChanged(view.region.next())),
        KeyCode::Char('R') => KeyAction::Dispatch(UiEvent::RegionChanged(view.region.prev())),
        KeyCode::Char('p') | KeyCode::Char('P') => {
            KeyAction::Dispatch(UiEvent::PollutantChanged(view.pollutant.toggle()))
        }
        KeyCode::Char('m') | KeyCode::Char('M') => KeyAction::Dispatch(UiEvent::DisplayModeToggled),
        KeyCode::Char('f') | KeyCode::Char('F') => KeyAction::Dispatch(UiEvent::RefreshRequested),
        KeyCode::Up => KeyAction::Cursor(CursorMove::Up),
        KeyCode::Down => KeyAction::Cursor(CursorMove::Down),
        KeyCode::Enter => KeyAction::SelectRow,
        _ => KeyAction::Ignore,
    }
}

/// Marker click on the map canvas, for a terminal of size `area`.
pub fn map_click(state: &DashboardState, area: Rect, column: u16, row: u16) -> Option<UiEvent> {
    let layout = DashboardLayout::new(area);
    let view = state.view();
    nearest_marker(
        &view.projection.markers,
        &view.viewport.bounds(),
        layout.map_canvas(),
        column,
        row,
    )
    .map(UiEvent::MarkerClicked)
}

/// Runs the application UI in a loop, handling events and rendering the appropriate screen.
pub async fn run<B: Backend>(terminal: &mut Terminal<B>, mut app: App) -> std::io::Result<()> {
    let splash_start = Instant::now();
    let mut last_draw: Option<Instant> = None;
    let mut resized = false;

    // UI event loop
    loop {
        // Hand every finished fetch to the dashboard
        while let Ok(message) = app.event_receiver.try_recv() {
            if let Screen::Dashboard(state) = &mut app.current_screen {
                let requests = state.process_worker_message(message);
                app.execute(requests);
            }
        }

        let redraw = match &mut app.current_screen {
            Screen::Splash => true,
            Screen::Dashboard(state) => {
                state.update();
                let dirty = !state.take_dirty().is_empty();
                let stale = last_draw.is_none_or(|t| t.elapsed() >= ui::redraw_interval());
                dirty || stale || resized
            }
        };
        if redraw {
            terminal.draw(|f| render(f, &app.current_screen))?;
            last_draw = Some(Instant::now());
            resized = false;
        }

        // Handle splash-to-dashboard transition
        if let Screen::Splash = app.current_screen {
            if splash_start.elapsed() >= ui::splash_duration() {
                app.open_dashboard();
                continue;
            }
        }

        if !event::poll(ui::poll_interval())? {
            continue;
        }
        match event::read()? {
            Event::Key(key) => {
                // Skip events that are not KeyEventKind::Press
                if key.kind == KeyEventKind::Release {
                    continue;
                }
                let Screen::Dashboard(state) = &mut app.current_screen else {
                    if matches!(key.code, KeyCode::Esc | KeyCode::Char('q')) {
                        app.shutdown();
                        return Ok(());
                    }
                    // Any other key skips the splash screen
                    app.open_dashboard();
                    continue;
                };
                let requests = match map_key(key.code, state.view()) {
                    KeyAction::Quit => {
                        app.shutdown();
                        return Ok(());
                    }
                    KeyAction::Dispatch(event) => state.dispatch(event),
                    KeyAction::Cursor(direction) => {
                        state.move_cursor(direction);
                        Vec::new()
                    }
                    KeyAction::SelectRow => state.select_cursor_row(),
                    KeyAction::Ignore => Vec::new(),
                };
                app.execute(requests);
            }
            Event::Mouse(mouse) if mouse.kind == MouseEventKind::Down(MouseButton::Left) => {
                if let Screen::Dashboard(state) = &mut app.current_screen {
                    let size = terminal.size()?;
                    let area = Rect::new(0, 0, size.width, size.height);
                    if let Some(event) = map_click(state, area, mouse.column, mouse.row) {
                        let requests = state.dispatch(event);
                        app.execute(requests);
                    }
                }
            }
            Event::Resize(_, _) => resized = true,
            _ => {}
        }
    }
}

/// Renders the current screen based on the application state.
fn render(f: &mut Frame, screen: &Screen) {
    match screen {
        Screen::Splash => render_splash(f),
        Screen::Dashboard(state) => render_dashboard(f, state),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{DisplayMode, Pollutant, Region};

    fn view() -> ViewState {
        ViewState::new(Region::Europe, Pollutant::Pm25, DisplayMode::Markers)
    }

    #[test]
    fn region_keys_cycle_both_ways() {
        assert!(matches!(
            map_key(KeyCode::Char('r'), &view()),
            KeyAction::Dispatch(UiEvent::RegionChanged(Region::Africa))
        ));
        assert!(matches!(
            map_key(KeyCode::Char('R'), &view()),
            KeyAction::Dispatch(UiEvent::RegionChanged(Region::SouthAmerica))
        ));
    }

    #[test]
    fn other_keys_map_to_their_actions() {
        assert!(matches!(
            map_key(KeyCode::Char('p'), &view()),
            KeyAction::Dispatch(UiEvent::PollutantChanged(Pollutant::Pm10))
        ));
        assert!(matches!(
            map_key(KeyCode::Char('m'), &view()),
            KeyAction::Dispatch(UiEvent::DisplayModeToggled)
        ));
        assert!(matches!(
            map_key(KeyCode::Char('f'), &view()),
            KeyAction::Dispatch(UiEvent::RefreshRequested)
        ));
        assert!(matches!(map_key(KeyCode::Esc, &view()), KeyAction::Quit));
        assert!(matches!(map_key(KeyCode::Enter, &view()), KeyAction::SelectRow));
        assert!(matches!(map_key(KeyCode::Char('x'), &view()), KeyAction::Ignore));
    }

    #[test]
    fn click_outside_the_map_selects_nothing() {
        let state = DashboardState::new(
            Environment::Production,
            Dispatcher::new(view()),
            &UIConfig::new(false),
        );
        assert!(map_click(&state, Rect::new(0, 0, 120, 40), 0, 0).is_none());
    }
}
