//! Scenario replay
//!
//! A scenario is a YAML file listing queue operations. Replaying it against a
//! `SeriesQueue` yields one `StepOutcome` per step, which makes strategy behavior
//! easy to inspect from the command line.
//!
//! ```yaml
//! strategy: three-section-window
//! slot-size: 3
//! steps:
//!   - add: { key: k1, series-id: A, study-id: "1", items: [a0, a1, a2] }
//!   - active-key: k1
//!   - pop: 2
//!   - status: k1
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::queue::{QueueConfig, QueueEntry, SeriesKey, SeriesProgress, SeriesQueue, SlotResult};
use crate::strategy::Strategy;

/// A series to add
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct AddStep {
    pub key: SeriesKey,
    #[serde(default)]
    pub series_id: String,
    #[serde(default)]
    pub study_id: String,
    pub items: Vec<String>,
}

/// One queue operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Step {
    Add(AddStep),
    Remove(SeriesKey),
    ActiveKey(Option<SeriesKey>),
    ActiveIndex(Option<usize>),
    /// Pop a slot; `None` uses the scenario's slot size
    Pop(Option<usize>),
    /// Status of one key, or of every tracked key when `None`
    Status(Option<SeriesKey>),
}

/// A replayable list of steps
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Scenario {
    /// Overrides the configured strategy
    pub strategy: Option<Strategy>,

    /// Overrides the configured slot size
    pub slot_size: Option<usize>,

    #[serde(with = "serde_yaml::with::singleton_map_recursive")]
    pub steps: Vec<Step>,
}

/// What a step produced
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "step", rename_all = "kebab-case")]
pub enum StepOutcome {
    Added {
        key: SeriesKey,
        added: bool,
    },
    Removed {
        key: SeriesKey,
    },
    /// Active key in effect after the rework (cleared if the key is not queued)
    ActiveKey {
        key: Option<SeriesKey>,
    },
    ActiveIndex {
        index: Option<usize>,
    },
    Popped {
        slot: Vec<QueueEntry>,
    },
    /// The queue was busy, so no slot was taken
    NotReady {
        requested: usize,
    },
    Status {
        key: SeriesKey,
        status: Option<SeriesProgress>,
    },
    Overall {
        status: BTreeMap<SeriesKey, Option<SeriesProgress>>,
    },
}

impl Scenario {
    /// Load a scenario from a YAML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content =
            fs::read_to_string(path).context(format!("Failed to read scenario file {}", path.display()))?;
        Self::parse(&content).context(format!("Failed to parse scenario file {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        let scenario: Self = serde_yaml::from_str(content)?;
        debug!(steps = scenario.steps.len(), strategy = ?scenario.strategy, "Scenario::parse: parsed");
        Ok(scenario)
    }

    /// Queue configuration with this scenario's overrides applied
    pub fn queue_config(&self, base: &QueueConfig) -> QueueConfig {
        QueueConfig {
            strategy: self.strategy.unwrap_or(base.strategy),
            ..base.clone()
        }
    }

    /// Replay every step against `queue`
    pub async fn replay(&self, queue: &SeriesQueue, default_slot_size: usize) -> Vec<StepOutcome> {
        let slot_size = self.slot_size.unwrap_or(default_slot_size);
        let mut outcomes = Vec::with_capacity(self.steps.len());
        for step in &self.steps {
            outcomes.push(run_step(queue, step, slot_size).await);
        }
        outcomes
    }
}

async fn run_step(queue: &SeriesQueue, step: &Step, slot_size: usize) -> StepOutcome {
    debug!(?step, "run_step: called");
    match step {
        Step::Add(add) => StepOutcome::Added {
            key: add.key.clone(),
            added: queue.add(&add.key, &add.series_id, &add.study_id, add.items.as_slice()).await,
        },
        Step::Remove(key) => {
            queue.remove(key).await;
            StepOutcome::Removed { key: key.clone() }
        }
        Step::ActiveKey(key) => {
            queue.set_active_key(key.as_deref()).await;
            StepOutcome::ActiveKey {
                key: queue.active_key().await,
            }
        }
        Step::ActiveIndex(index) => {
            queue.set_active_index(*index).await;
            StepOutcome::ActiveIndex {
                index: queue.active_index().await,
            }
        }
        Step::Pop(n) => {
            let requested = n.unwrap_or(slot_size);
            // Another holder of a shared handle gets one yield to release the lock
            let result = match queue.pop_slot(requested) {
                SlotResult::NotReady => {
                    tokio::task::yield_now().await;
                    queue.pop_slot(requested)
                }
                ready => ready,
            };
            match result {
                SlotResult::Ready(slot) => StepOutcome::Popped { slot },
                SlotResult::NotReady => {
                    warn!(requested, "Queue busy, slot not popped");
                    StepOutcome::NotReady { requested }
                }
            }
        }
        Step::Status(Some(key)) => StepOutcome::Status {
            key: key.clone(),
            status: queue.status(key).await,
        },
        Step::Status(None) => StepOutcome::Overall {
            status: queue.overall_status().await,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCENARIO: &str = r#"
strategy: round-robin
slot-size: 5
steps:
  - add: { key: k1, series-id: A, study-id: "1", items: [a0, a1] }
  - add: { key: k2, series-id: B, study-id: "2", items: [b0, b1, b2] }
  - add: { key: k1, items: [x] }
  - pop: null
  - status: k2
  - status: null
"#;

    #[test]
    fn test_parse_scenario() {
        let scenario = Scenario::parse(SCENARIO).unwrap();
        assert_eq!(scenario.strategy, Some(Strategy::RoundRobin));
        assert_eq!(scenario.slot_size, Some(5));
        assert_eq!(scenario.steps.len(), 6);
        assert_eq!(scenario.steps[3], Step::Pop(None));
        assert_eq!(scenario.steps[4], Step::Status(Some("k2".to_string())));
        match &scenario.steps[2] {
            Step::Add(add) => {
                assert_eq!(add.key, "k1");
                assert!(add.series_id.is_empty());
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_parse_rejects_unknown_step() {
        assert!(Scenario::parse("steps:\n  - explode: 3").is_err());
    }

    #[test]
    fn test_queue_config_override() {
        let scenario = Scenario::parse(SCENARIO).unwrap();
        let base = QueueConfig::new(Strategy::SequentialAppend).verbose(true);
        let config = scenario.queue_config(&base);
        assert_eq!(config.strategy, Strategy::RoundRobin);
        assert!(config.verbose_logging);

        let config = Scenario::default().queue_config(&base);
        assert_eq!(config.strategy, Strategy::SequentialAppend);
    }

    #[tokio::test]
    async fn test_replay() {
        let scenario = Scenario::parse(SCENARIO).unwrap();
        let queue = SeriesQueue::new(scenario.queue_config(&QueueConfig::default()));
        let outcomes = scenario.replay(&queue, 1).await;

        assert_eq!(
            outcomes[2],
            StepOutcome::Added {
                key: "k1".to_string(),
                added: false
            }
        );
        match &outcomes[3] {
            StepOutcome::Popped { slot } => {
                let keys: Vec<_> = slot.iter().map(|e| e.key()).collect();
                assert_eq!(keys, vec!["k1", "k2", "k1", "k2", "k2"]);
            }
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(
            outcomes[4],
            StepOutcome::Status {
                key: "k2".to_string(),
                status: None
            }
        );
        match &outcomes[5] {
            StepOutcome::Overall { status } => assert!(status.is_empty()),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_replay_pop_reports_busy_queue() {
        let queue = SeriesQueue::new(QueueConfig::default());
        queue.add("k1", "A", "1", &["a0", "a1"]).await;
        let scenario = Scenario::parse("steps:\n  - pop: 2").unwrap();

        let outcomes = {
            let _held = queue.hold().await;
            scenario.replay(&queue, 1).await
        };
        assert_eq!(outcomes, vec![StepOutcome::NotReady { requested: 2 }]);
        assert_eq!(queue.snapshot().await.len(), 2);

        let outcomes = scenario.replay(&queue, 1).await;
        match &outcomes[0] {
            StepOutcome::Popped { slot } => assert_eq!(slot.len(), 2),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_replay_active_key_reports_effective_key() {
        let scenario = Scenario::parse(
            "steps:\n  - add: { key: k1, items: [a0] }\n  - active-key: ghost\n  - active-key: k1\n  - active-index: 1",
        )
        .unwrap();
        let queue = SeriesQueue::new(QueueConfig::default());
        let outcomes = scenario.replay(&queue, 1).await;

        assert_eq!(outcomes[1], StepOutcome::ActiveKey { key: None });
        assert_eq!(
            outcomes[2],
            StepOutcome::ActiveKey {
                key: Some("k1".to_string())
            }
        );
        assert_eq!(outcomes[3], StepOutcome::ActiveIndex { index: Some(1) });
    }
}
