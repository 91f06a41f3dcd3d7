//! Background tasks that run network requests off the UI loop

pub mod core;
pub mod fetcher;

pub use self::core::{EventSender, WorkerMessage};
pub use self::fetcher::{spawn_fetch, spawn_history};
