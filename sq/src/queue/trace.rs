//! Verbose queue tracing
//!
//! When verbose logging is on, the manager hands the full queue to a `QueueTrace`
//! sink before and after every rework and after every popped slot. The default
//! sink writes JSON snapshots through `tracing`; `MemoryTrace` keeps them for inspection.

use std::sync::Mutex;

use serde::Serialize;
use tracing::info;

use crate::strategy::Strategy;

use super::types::QueueEntry;

/// Sink receiving queue snapshots
pub trait QueueTrace: Send + Sync {
    /// Called before a reconciliation runs, with the committed queue it starts from
    fn reworking(&self, strategy: Strategy, queue: &[QueueEntry]);

    /// Called after a reconciliation, with the committed queue it left behind
    fn reworked(&self, strategy: Strategy, queue: &[QueueEntry]);

    /// Called after a slot was popped from the head of the queue
    fn popped(&self, slot: &[QueueEntry], remaining: &[QueueEntry]);
}

/// Writes snapshots as structured `tracing` events
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingTrace;

impl QueueTrace for TracingTrace {
    fn reworking(&self, strategy: Strategy, queue: &[QueueEntry]) {
        let snapshot = serde_json::to_string(queue).unwrap_or_default();
        info!(%strategy, len = queue.len(), queue = %snapshot, "queue before rework");
    }

    fn reworked(&self, strategy: Strategy, queue: &[QueueEntry]) {
        let snapshot = serde_json::to_string(queue).unwrap_or_default();
        info!(%strategy, len = queue.len(), queue = %snapshot, "queue reworked");
    }

    fn popped(&self, slot: &[QueueEntry], remaining: &[QueueEntry]) {
        let slot_snapshot = serde_json::to_string(slot).unwrap_or_default();
        let queue_snapshot = serde_json::to_string(remaining).unwrap_or_default();
        info!(
            len = slot.len(),
            remaining = remaining.len(),
            slot = %slot_snapshot,
            queue = %queue_snapshot,
            "slot popped"
        );
    }
}

/// A recorded snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "kebab-case")]
pub enum TraceEvent {
    Reworking {
        strategy: Strategy,
        queue: Vec<QueueEntry>,
    },
    Reworked {
        strategy: Strategy,
        queue: Vec<QueueEntry>,
    },
    Popped {
        slot: Vec<QueueEntry>,
        remaining: Vec<QueueEntry>,
    },
}

/// Keeps every snapshot in memory
#[derive(Debug, Default)]
pub struct MemoryTrace {
    events: Mutex<Vec<TraceEvent>>,
}

impl MemoryTrace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Recorded snapshots, oldest first
    pub fn events(&self) -> Vec<TraceEvent> {
        self.events.lock().map(|events| events.clone()).unwrap_or_default()
    }

    fn record(&self, event: TraceEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }
}

impl QueueTrace for MemoryTrace {
    fn reworking(&self, strategy: Strategy, queue: &[QueueEntry]) {
        self.record(TraceEvent::Reworking {
            strategy,
            queue: queue.to_vec(),
        });
    }

    fn reworked(&self, strategy: Strategy, queue: &[QueueEntry]) {
        self.record(TraceEvent::Reworked {
            strategy,
            queue: queue.to_vec(),
        });
    }

    fn popped(&self, slot: &[QueueEntry], remaining: &[QueueEntry]) {
        self.record(TraceEvent::Popped {
            slot: slot.to_vec(),
            remaining: remaining.to_vec(),
        });
    }
}
