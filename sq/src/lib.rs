//! SeriesQueue - priority-biased fetch ordering for series of items
//!
//! SeriesQueue decides the order in which items (for example the images of an
//! imaging series) are fetched when several series are tracked at once, biasing
//! delivery toward whatever the consumer is currently looking at.
//!
//! # Core Concepts
//!
//! - **Reconciliation**: every add, remove or hint change synchronously reworks the
//!   committed queue through the configured strategy
//! - **Strategies**: sequential-append, round-robin, center-propagation and
//!   three-section-window, selected at construction
//! - **Slots**: callers pop bounded batches from the head of the queue; popping
//!   updates per-series progress
//! - **Shared access**: `SeriesQueue` guards the manager with a mutex and wakes
//!   async slot waiters after each reconciliation
//!
//! # Modules
//!
//! - [`queue`] - Queue manager, shared handle, entry types and tracing sinks
//! - [`strategy`] - Ordering strategies and reorder helpers
//! - [`scenario`] - YAML scenario replay
//! - [`config`] - Configuration types and loading
//! - [`cli`] - Command-line interface
//!
//! # Example
//!
//! ```ignore
//! use seriesqueue::{QueueConfig, QueueManager, Strategy};
//!
//! let mut manager = QueueManager::new(QueueConfig::new(Strategy::RoundRobin));
//! manager.add("k1", "series-a", "study-1", &["a0", "a1"]);
//! manager.add("k2", "series-b", "study-1", &["b0", "b1", "b2"]);
//! let slot = manager.pop_slot(3);
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod queue;
pub mod scenario;
pub mod strategy;

// Re-export commonly used types
pub use config::Config;
pub use error::QueueError;
pub use queue::{
    IndexedEntry, Markers, MemoryTrace, PendingAdd, QueueConfig, QueueEntry, QueueItem, QueueManager, QueueTrace,
    SeriesKey, SeriesProgress, SeriesQueue, SlotResult, TraceEvent, TracingTrace,
};
pub use scenario::{Scenario, Step, StepOutcome};
pub use strategy::{Rework, ReworkInput, Strategy};
