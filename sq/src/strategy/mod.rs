//! Queue ordering strategies
//!
//! Each strategy is a pure function from the pending adds, the committed queue and
//! the consumer's hints to a new committed queue. The manager picks one at
//! construction and runs it on every reconciliation.

mod center;
mod reorder;
mod round_robin;
mod sequential;
mod windowed;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::QueueError;
use crate::queue::{Markers, PendingAdd, QueueEntry};

pub use reorder::{expand_from, order_from_center, stable_partition};

/// Ordering policy applied on every reconciliation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum Strategy {
    /// Append new series at the tail, active series moved to the front
    #[default]
    SequentialAppend,
    /// Interleave series one item at a time
    RoundRobin,
    /// Active window reordered outward from its midpoint
    CenterPropagation,
    /// First item of every series, then the active window, then the backlog
    ThreeSectionWindow,
}

impl Strategy {
    pub const ALL: [Strategy; 4] = [
        Self::SequentialAppend,
        Self::RoundRobin,
        Self::CenterPropagation,
        Self::ThreeSectionWindow,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::SequentialAppend => "sequential-append",
            Self::RoundRobin => "round-robin",
            Self::CenterPropagation => "center-propagation",
            Self::ThreeSectionWindow => "three-section-window",
        }
    }

    /// Short description for listings
    pub fn describe(self) -> &'static str {
        match self {
            Self::SequentialAppend => "append series in add order, active series first",
            Self::RoundRobin => "alternate between series one item at a time",
            Self::CenterPropagation => "expand the active window outward from its midpoint",
            Self::ThreeSectionWindow => "one item per series, then active window, then backlog",
        }
    }

    /// Run this strategy over one reconciliation's input
    pub fn rework(self, input: ReworkInput<'_>) -> Rework {
        debug!(
            strategy = %self,
            adding = input.adding.len(),
            queued = input.queue.len(),
            active_key = ?input.active_key,
            active_index = ?input.active_index,
            "Strategy::rework: called"
        );
        match self {
            Self::SequentialAppend => sequential::rework(input),
            Self::RoundRobin => round_robin::rework(input),
            Self::CenterPropagation => center::rework(input),
            Self::ThreeSectionWindow => windowed::rework(input),
        }
    }
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Strategy {
    type Err = QueueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace('_', "-");
        Self::ALL
            .into_iter()
            .find(|strategy| strategy.as_str() == normalized)
            .ok_or_else(|| QueueError::UnknownStrategy(s.to_string()))
    }
}

/// Everything a strategy sees during one reconciliation
#[derive(Debug, Clone, Copy)]
pub struct ReworkInput<'a> {
    /// Series added since the last successful reconciliation, in add order
    pub adding: &'a [PendingAdd],
    /// Committed queue with pending removals already applied
    pub queue: &'a [QueueEntry],
    pub active_key: Option<&'a str>,
    pub active_index: Option<usize>,
    pub markers: Markers,
}

/// Outcome of a strategy run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rework {
    /// New committed queue and section markers
    Applied { queue: Vec<QueueEntry>, markers: Markers },

    /// The active index no longer matches any queued item; keep the previous queue
    StaleIndex { index: usize },
}
