//! Queue configuration

use serde::{Deserialize, Serialize};

use crate::strategy::Strategy;

/// Queue configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueueConfig {
    /// Ordering strategy applied on every reconciliation
    pub strategy: Strategy,

    /// Trace queue contents after every rework and every popped slot
    #[serde(rename = "verbose-logging")]
    pub verbose_logging: bool,
}

impl QueueConfig {
    pub fn new(strategy: Strategy) -> Self {
        Self {
            strategy,
            verbose_logging: false,
        }
    }

    pub fn verbose(mut self, verbose_logging: bool) -> Self {
        self.verbose_logging = verbose_logging;
        self
    }
}
