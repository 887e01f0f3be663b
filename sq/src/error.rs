//! Queue error types

use thiserror::Error;

/// Errors surfaced by the queue API
#[derive(Debug, Error, PartialEq, Eq)]
pub enum QueueError {
    #[error("Slot request cancelled")]
    Cancelled,

    #[error("Unknown strategy: {0}")]
    UnknownStrategy(String),
}

impl QueueError {
    /// Check if this error came from a cancelled wait
    pub fn is_cancelled(&self) -> bool {
        matches!(self, QueueError::Cancelled)
    }
}
