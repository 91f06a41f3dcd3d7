pub mod client;
pub mod error_handler;
pub mod request_timer;

pub use client::{FetchSettings, NetworkClient, RegionData};
