//! Core worker utilities

use crate::dispatch::UiEvent;
use crate::events::{Event, EventType};
use crate::logging::LogLevel;
use tokio::sync::mpsc;

/// Messages posted back to the UI loop.
#[derive(Debug)]
pub enum WorkerMessage {
    /// A finished request, to be handed to the dispatcher.
    Completed(UiEvent),
    /// Progress for the activity log.
    Activity(Event),
}

/// Common event sending utilities for workers
#[derive(Clone)]
pub struct EventSender {
    sender: mpsc::Sender<WorkerMessage>,
}

impl EventSender {
    pub fn new(sender: mpsc::Sender<WorkerMessage>) -> Self {
        Self { sender }
    }

    /// Send a completion. Dropped silently once the UI has shut down.
    pub async fn send_completion(&self, event: UiEvent) {
        let _ = self.sender.send(WorkerMessage::Completed(event)).await;
    }

    /// Send a generic event
    pub async fn send_event(&self, event: Event) {
        let _ = self.sender.send(WorkerMessage::Activity(event)).await;
    }

    pub async fn send_fetch_event(
        &self,
        message: String,
        event_type: EventType,
        log_level: LogLevel,
    ) {
        self.send_event(Event::fetcher(message, event_type, log_level))
            .await;
    }

    pub async fn send_history_event(
        &self,
        message: String,
        event_type: EventType,
        log_level: LogLevel,
    ) {
        self.send_event(Event::history(message, event_type, log_level))
            .await;
    }
}
