//! Event dispatcher
//!
//! Every user interaction and every network completion arrives as a
//! [`UiEvent`]. The [`Dispatcher`] applies it to the [`ViewState`] and returns
//! the effects the caller has to carry out: network requests to start,
//! widgets to redraw and activity events to record.

use crate::consts::cli_consts::map::FOCUS_ZOOM;
use crate::dataset::{Dataset, FetchSequencer};
use crate::error_classifier::ErrorClassifier;
use crate::events::{Event, EventType};
use crate::logging::LogLevel;
use crate::model::{BoundingBox, DisplayMode, Measurement, Pollutant, Region, Viewport};
use crate::network::RegionData;
use crate::openaq::error::ApiError;
use crate::transform::{self, Averages, Projection, Series};
use chrono::{DateTime, Utc};

#[derive(Debug)]
pub enum UiEvent {
    RegionChanged(Region),
    PollutantChanged(Pollutant),
    MarkerClicked(u64),
    TableRowSelected(usize),
    DisplayModeToggled,
    RefreshRequested,
    FetchCompleted {
        seq: u64,
        result: Result<RegionData, ApiError>,
    },
    HistoryCompleted {
        seq: u64,
        station_id: u64,
        result: Result<Vec<Measurement>, ApiError>,
    },
}

/// Parameters of a region fetch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FetchQuery {
    pub bbox: BoundingBox,
    pub parameter: Option<Pollutant>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    Fetch {
        seq: u64,
        query: FetchQuery,
    },
    FetchHistory {
        seq: u64,
        station_id: u64,
        pollutant: Pollutant,
    },
    Render(WidgetSet),
    Notify(Event),
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, strum::EnumIter)]
pub enum Widget {
    Map,
    Table,
    Graph,
    Gauges,
    Status,
}

impl Widget {
    fn bit(self) -> u8 {
        1 << self as u8
    }
}

/// A set of widgets that need to be redrawn.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct WidgetSet(u8);

impl WidgetSet {
    pub fn of(widgets: &[Widget]) -> Self {
        let mut set = Self::default();
        for w in widgets {
            set.insert(*w);
        }
        set
    }

    pub fn all() -> Self {
        use strum::IntoEnumIterator;
        let mut set = Self::default();
        for w in Widget::iter() {
            set.insert(w);
        }
        set
    }

    pub fn insert(&mut self, widget: Widget) {
        self.0 |= widget.bit();
    }

    pub fn union(self, other: WidgetSet) -> Self {
        Self(self.0 | other.0)
    }

    pub fn contains(&self, widget: Widget) -> bool {
        self.0 & widget.bit() != 0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }
}

/// Outcome of the most recent region fetch.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchStatus {
    Idle,
    Loading,
    Ready { stations: usize, truncated: bool },
    NoData,
    Failed,
}

/// The station currently shown in the graph and gauges.
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    pub station_id: u64,
    pub name: String,
    /// Latest value from the region dataset, shown before the history arrives.
    pub latest: Option<f64>,
    pub history: Option<Series>,
    pub loading: bool,
}

/// What the dashboard currently shows.
#[derive(Debug, Clone)]
pub struct ViewState {
    pub region: Region,
    pub pollutant: Pollutant,
    pub display_mode: DisplayMode,
    pub viewport: Viewport,
    pub dataset: Dataset,
    pub projection: Projection,
    pub selection: Option<Selection>,
    pub gauges: Averages,
    pub status: FetchStatus,
    /// Error banner for the last failed fetch; the dataset on screen is older.
    pub banner: Option<String>,
    /// Alert shown under the gauges.
    pub alert: Option<String>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl ViewState {
    pub fn new(region: Region, pollutant: Pollutant, display_mode: DisplayMode) -> Self {
        let dataset = Dataset::empty(region.bounding_box());
        let projection = transform::project(&dataset, pollutant);
        Self {
            region,
            pollutant,
            display_mode,
            viewport: region.viewport(),
            dataset,
            projection,
            selection: None,
            gauges: Averages::default(),
            status: FetchStatus::Idle,
            banner: None,
            alert: None,
            updated_at: None,
        }
    }

    /// Index of the selected station in the table rows.
    pub fn selected_row(&self) -> Option<usize> {
        let id = self.selection.as_ref()?.station_id;
        self.projection.rows.iter().position(|r| r.station_id == id)
    }
}

pub struct Dispatcher {
    state: ViewState,
    fetches: FetchSequencer,
    histories: FetchSequencer,
    parameter_filter: bool,
    classifier: ErrorClassifier,
}

impl Dispatcher {
    pub fn new(state: ViewState) -> Self {
        Self {
            state,
            fetches: FetchSequencer::new(),
            histories: FetchSequencer::new(),
            parameter_filter: false,
            classifier: ErrorClassifier::new(),
        }
    }

    /// Restrict region fetches to the selected pollutant. Pollutant changes then re-fetch.
    pub fn with_parameter_filter(mut self, enabled: bool) -> Self {
        self.parameter_filter = enabled;
        self
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    /// Effects for the first load of the current region.
    pub fn start(&mut self) -> Vec<Effect> {
        let mut effects = vec![self.fetch_effect()];
        effects.push(Effect::Render(WidgetSet::all()));
        effects
    }

    pub fn handle(&mut self, event: UiEvent) -> Vec<Effect> {
        match event {
            UiEvent::RegionChanged(region) => self.on_region_changed(region),
            UiEvent::PollutantChanged(pollutant) => self.on_pollutant_changed(pollutant),
            UiEvent::MarkerClicked(station_id) => self.on_marker_clicked(station_id),
            UiEvent::TableRowSelected(index) => self.on_row_selected(index),
            UiEvent::DisplayModeToggled => {
                self.state.display_mode = self.state.display_mode.toggle();
                vec![Effect::Render(WidgetSet::of(&[Widget::Map]))]
            }
            UiEvent::RefreshRequested => {
                vec![
                    self.fetch_effect(),
                    Effect::Render(WidgetSet::of(&[Widget::Status])),
                ]
            }
            UiEvent::FetchCompleted { seq, result } => self.on_fetch_completed(seq, result),
            UiEvent::HistoryCompleted {
                seq,
                station_id,
                result,
            } => self.on_history_completed(seq, station_id, result),
        }
    }

    fn fetch_effect(&mut self) -> Effect {
        let seq = self.fetches.issue();
        self.state.status = FetchStatus::Loading;
        Effect::Fetch {
            seq,
            query: FetchQuery {
                bbox: self.state.region.bounding_box(),
                parameter: self.parameter_filter.then_some(self.state.pollutant),
            },
        }
    }

    fn clear_selection(&mut self) {
        self.state.selection = None;
        self.state.gauges = Averages::default();
        self.state.alert = None;
    }

    fn on_region_changed(&mut self, region: Region) -> Vec<Effect> {
        self.state.region = region;
        self.state.viewport = region.viewport();
        let fetch = self.fetch_effect();
        vec![
            Effect::Notify(Event::dashboard(
                format!("Loading stations for {}", region),
                EventType::Refresh,
                LogLevel::Info,
            )),
            fetch,
            Effect::Render(WidgetSet::of(&[Widget::Map, Widget::Status])),
        ]
    }

    fn on_pollutant_changed(&mut self, pollutant: Pollutant) -> Vec<Effect> {
        self.state.pollutant = pollutant;
        self.state.projection = transform::project(&self.state.dataset, pollutant);
        self.clear_selection();

        let mut effects = Vec::new();
        if self.parameter_filter {
            effects.push(self.fetch_effect());
        }
        effects.push(Effect::Render(WidgetSet::all()));
        effects
    }

    fn on_marker_clicked(&mut self, station_id: u64) -> Vec<Effect> {
        match self.select(station_id) {
            Some(history) => vec![
                history,
                Effect::Render(WidgetSet::of(&[
                    Widget::Map,
                    Widget::Table,
                    Widget::Graph,
                    Widget::Gauges,
                ])),
            ],
            None => Vec::new(),
        }
    }

    fn on_row_selected(&mut self, index: usize) -> Vec<Effect> {
        let Some(row) = self.state.projection.rows.get(index) else {
            return Vec::new();
        };
        let (station_id, center) = (row.station_id, row.coordinates);
        self.state.viewport = Viewport::new(center, FOCUS_ZOOM);

        let mut effects: Vec<Effect> = self.select(station_id).into_iter().collect();
        effects.push(Effect::Render(WidgetSet::of(&[
            Widget::Map,
            Widget::Table,
            Widget::Graph,
            Widget::Gauges,
        ])));
        effects
    }

    /// Selects a station of the current dataset and requests its history.
    fn select(&mut self, station_id: u64) -> Option<Effect> {
        let station = self.state.dataset.station(station_id)?;
        let name = station.display_name().to_string();
        let latest = self
            .state
            .projection
            .markers
            .iter()
            .find(|m| m.station_id == station_id)
            .and_then(|m| m.value);

        self.state.selection = Some(Selection {
            station_id,
            name,
            latest,
            history: None,
            loading: true,
        });
        self.state.gauges = Averages::default();
        self.state.alert = None;

        Some(Effect::FetchHistory {
            seq: self.histories.issue(),
            station_id,
            pollutant: self.state.pollutant,
        })
    }

    fn on_fetch_completed(
        &mut self,
        seq: u64,
        result: Result<RegionData, ApiError>,
    ) -> Vec<Effect> {
        if !self.fetches.is_current(seq) {
            return vec![Effect::Notify(Event::fetcher(
                format!("Discarded superseded fetch #{}", seq),
                EventType::Info,
                LogLevel::Debug,
            ))];
        }

        match result {
            Ok(data) => {
                let dataset = Dataset::new(data.bbox, data.stations, data.measurements)
                    .with_truncated(data.truncated);
                let notice = if dataset.is_empty() {
                    Event::fetcher(
                        format!("No stations reported data in {}", self.state.region),
                        EventType::Info,
                        LogLevel::Info,
                    )
                } else {
                    Event::fetcher(
                        format!(
                            "Loaded {} stations for {} ({} pages{})",
                            dataset.stations().len(),
                            self.state.region,
                            data.pages,
                            if data.truncated { ", truncated" } else { "" }
                        ),
                        EventType::Success,
                        LogLevel::Info,
                    )
                };
                self.state.banner = None;
                self.replace_dataset(dataset);
                vec![Effect::Notify(notice), Effect::Render(WidgetSet::all())]
            }
            Err(ApiError::Malformed(e)) => {
                log::error!("Discarding malformed locations response: {}", e);
                self.state.banner = None;
                self.replace_dataset(Dataset::empty(self.state.region.bounding_box()));
                vec![
                    Effect::Notify(Event::fetcher(
                        format!("Unexpected response from OpenAQ: {}", e),
                        EventType::Error,
                        LogLevel::Error,
                    )),
                    Effect::Render(WidgetSet::all()),
                ]
            }
            Err(e) => {
                let level = self.classifier.classify_fetch_error(&e);
                self.state.status = FetchStatus::Failed;
                self.state.banner = Some(failure_banner(&e));
                vec![
                    Effect::Notify(Event::fetcher(
                        format!("Fetch failed: {}", e),
                        EventType::Error,
                        level,
                    )),
                    Effect::Render(WidgetSet::of(&[Widget::Status])),
                ]
            }
        }
    }

    fn replace_dataset(&mut self, dataset: Dataset) {
        self.state.status = if dataset.is_empty() {
            FetchStatus::NoData
        } else {
            FetchStatus::Ready {
                stations: dataset.stations().len(),
                truncated: dataset.is_truncated(),
            }
        };
        self.state.projection = transform::project(&dataset, self.state.pollutant);
        self.state.dataset = dataset;
        self.state.updated_at = Some(Utc::now());

        let still_present = self
            .state
            .selection
            .as_ref()
            .is_some_and(|s| self.state.dataset.station(s.station_id).is_some());
        if !still_present {
            self.clear_selection();
        }
    }

    fn on_history_completed(
        &mut self,
        seq: u64,
        station_id: u64,
        result: Result<Vec<Measurement>, ApiError>,
    ) -> Vec<Effect> {
        let pollutant = self.state.pollutant;
        let Some(selection) = self
            .state
            .selection
            .as_mut()
            .filter(|s| s.station_id == station_id && self.histories.is_current(seq))
        else {
            return vec![Effect::Notify(Event::history(
                format!("Discarded superseded history #{}", seq),
                EventType::Info,
                LogLevel::Debug,
            ))];
        };
        selection.loading = false;

        let series = match result {
            Ok(history) => transform::history_series(&history, pollutant),
            Err(e) => {
                let level = self.classifier.classify_fetch_error(&e);
                let name = selection.name.clone();
                selection.history = None;
                self.state.gauges = Averages::default();
                self.state.alert = Some(unavailable_alert(&name));
                return vec![
                    Effect::Notify(Event::history(
                        format!("History for {} failed: {}", name, e),
                        EventType::Error,
                        level,
                    )),
                    Effect::Render(WidgetSet::of(&[Widget::Graph, Widget::Gauges])),
                ];
            }
        };

        let notice;
        if series.count == 0 {
            self.state.gauges = Averages::default();
            self.state.alert = Some(unavailable_alert(&selection.name));
            notice = Event::history(
                format!("No recent readings for {}", selection.name),
                EventType::Info,
                LogLevel::Info,
            );
        } else {
            self.state.gauges = transform::averages(&series.points);
            self.state.alert = None;
            notice = Event::history(
                format!("Loaded {} readings for {}", series.count, selection.name),
                EventType::Success,
                LogLevel::Info,
            );
        }
        selection.history = Some(series);

        vec![
            Effect::Notify(notice),
            Effect::Render(WidgetSet::of(&[Widget::Graph, Widget::Gauges])),
        ]
    }
}

fn unavailable_alert(name: &str) -> String {
    format!("Recent data for {} is unavailable.", name)
}

fn failure_banner(error: &ApiError) -> String {
    let reason = match error {
        ApiError::RateLimited { .. } => "rate limited by OpenAQ".to_string(),
        e if e.is_timeout() => "request timed out".to_string(),
        ApiError::Reqwest(_) => "network error".to_string(),
        ApiError::Http { status, .. } => format!("HTTP {}", status),
        ApiError::Malformed(_) => "malformed response".to_string(),
    };
    format!("Fetch failed ({}); showing previous data", reason)
}
