//! Dashboard component modules
//!
//! Contains all individual rendering components

pub mod footer;
pub mod gauges;
pub mod graph;
pub mod header;
pub mod logs;
pub mod map;
pub mod table;
