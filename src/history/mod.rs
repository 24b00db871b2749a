//! Session history persistence and statistics.
//!
//! Provides the durable session log and range-filtered aggregates:
//! - Append-only JSON session log with delete and clear
//! - Snapshot queries with status filters
//! - Statistics over trailing day ranges

pub mod stats;
pub mod store;

pub use stats::{aggregate, Statistics};
pub use store::{HistoryFilter, HistoryStore};
