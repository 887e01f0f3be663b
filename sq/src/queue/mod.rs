//! Fetch queue for series of items
//!
//! Tracks pending adds and removals, reconciles them into a committed queue
//! through the configured strategy, and hands out bounded slots from its head.

mod config;
mod core;
mod handle;
mod trace;
mod types;

pub use config::QueueConfig;
pub use self::core::QueueManager;
pub use handle::SeriesQueue;
pub use trace::{MemoryTrace, QueueTrace, TraceEvent, TracingTrace};
pub use types::{
    IndexedEntry, ItemId, Markers, PendingAdd, QueueEntry, QueueItem, SeriesKey, SeriesProgress, SeriesStatus,
    SlotResult,
};
