//! Queue manager implementation

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use tracing::{debug, warn};

use crate::strategy::{Rework, ReworkInput, Strategy};

use super::config::QueueConfig;
use super::trace::{QueueTrace, TracingTrace};
use super::types::{Markers, PendingAdd, QueueEntry, SeriesKey, SeriesProgress, SeriesStatus};

/// The QueueManager owns the pending and committed queues and reconciles them
/// through the configured strategy on every state change.
///
/// All mutation goes through `&mut self`; share it through `SeriesQueue` when
/// more than one task needs access.
pub struct QueueManager {
    strategy: Strategy,

    /// Committed fetch order
    queue: Vec<QueueEntry>,

    /// Series waiting for the next reconciliation
    adding: Vec<PendingAdd>,

    /// Keys waiting to be filtered out of the committed queue
    removing: Vec<SeriesKey>,

    /// Bookkeeping per tracked key
    series: HashMap<SeriesKey, SeriesStatus>,

    active_key: Option<SeriesKey>,
    active_index: Option<usize>,

    /// Section boundaries, only moved by the windowed strategy
    markers: Markers,

    trace: Option<Arc<dyn QueueTrace>>,
}

impl QueueManager {
    /// Create a new manager with the given configuration
    pub fn new(config: QueueConfig) -> Self {
        debug!(?config, "QueueManager::new: called");
        let trace: Option<Arc<dyn QueueTrace>> = if config.verbose_logging {
            Some(Arc::new(TracingTrace))
        } else {
            None
        };
        Self {
            strategy: config.strategy,
            queue: Vec::new(),
            adding: Vec::new(),
            removing: Vec::new(),
            series: HashMap::new(),
            active_key: None,
            active_index: None,
            markers: Markers::default(),
            trace,
        }
    }

    /// Create a manager that reports every snapshot to `trace`, regardless of `verbose_logging`
    pub fn with_trace(config: QueueConfig, trace: Arc<dyn QueueTrace>) -> Self {
        let mut manager = Self::new(config);
        manager.trace = Some(trace);
        manager
    }

    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    /// Track a new series; returns false if the key is already tracked or has no items
    pub fn add<S: AsRef<str>>(&mut self, key: &str, series_id: &str, study_id: &str, items: &[S]) -> bool {
        debug!(%key, %series_id, %study_id, items = items.len(), "QueueManager::add: called");
        if self.series.contains_key(key) {
            warn!(%key, "Series is already tracked, ignoring add");
            return false;
        }
        if items.is_empty() {
            warn!(%key, "Series has no items, ignoring add");
            return false;
        }

        self.adding.push(PendingAdd {
            key: key.to_string(),
            series_id: series_id.to_string(),
            study_id: study_id.to_string(),
            items: items.iter().map(|item| item.as_ref().to_string()).collect(),
        });
        self.series.insert(key.to_string(), SeriesStatus::new(items.len()));
        self.rework();
        true
    }

    /// Stop tracking a series and drop its queued entries
    pub fn remove(&mut self, key: &str) {
        debug!(%key, "QueueManager::remove: called");
        self.adding.retain(|pending| pending.key != key);
        self.removing.push(key.to_string());
        self.series.remove(key);
        self.rework();
    }

    pub fn active_key(&self) -> Option<&str> {
        self.active_key.as_deref()
    }

    /// Set the series of interest; resets the active index
    pub fn set_active_key(&mut self, key: Option<&str>) {
        debug!(?key, "QueueManager::set_active_key: called");
        self.active_key = key.map(str::to_string);
        self.active_index = None;
        self.rework();
    }

    pub fn active_index(&self) -> Option<usize> {
        self.active_index
    }

    /// Set the 1-based item position of interest within the active series
    pub fn set_active_index(&mut self, index: Option<usize>) {
        debug!(?index, "QueueManager::set_active_index: called");
        self.active_index = index;
        self.rework();
    }

    /// Remove up to `n` entries from the head of the queue
    pub fn pop_slot(&mut self, n: usize) -> Vec<QueueEntry> {
        debug!(n, queued = self.queue.len(), "QueueManager::pop_slot: called");
        let count = n.min(self.queue.len());
        let slot: Vec<QueueEntry> = self.queue.drain(..count).collect();
        self.markers.shift_down(count);
        self.update_series(&slot);

        if let Some(trace) = &self.trace {
            trace.popped(&slot, &self.queue);
        }
        slot
    }

    /// Remaining and initial item counts, or `None` once nothing is queued for `key`
    pub fn status(&self, key: &str) -> Option<SeriesProgress> {
        let remaining = self.remaining(key);
        if remaining == 0 {
            return None;
        }
        let initial = self
            .series
            .get(key)
            .map(|status| status.initial_count)
            .unwrap_or(remaining);
        Some(SeriesProgress { remaining, initial })
    }

    /// `status` of every tracked key
    pub fn overall_status(&self) -> BTreeMap<SeriesKey, Option<SeriesProgress>> {
        self.series.keys().map(|key| (key.clone(), self.status(key))).collect()
    }

    /// True while at least one series is being fetched and entries remain
    pub fn is_active(&self) -> bool {
        self.series.values().any(|status| status.in_flight) && !self.queue.is_empty()
    }

    /// Committed queue in fetch order
    pub fn queue(&self) -> &[QueueEntry] {
        &self.queue
    }

    /// Series not yet merged into the committed queue
    pub fn pending(&self) -> &[PendingAdd] {
        &self.adding
    }

    pub fn markers(&self) -> Markers {
        self.markers
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    fn remaining(&self, key: &str) -> usize {
        self.queue.iter().filter(|entry| entry.key() == key).count()
    }

    fn update_series(&mut self, slot: &[QueueEntry]) {
        let mut seen: Vec<&str> = Vec::new();
        for entry in slot {
            let key = entry.key();
            if seen.contains(&key) {
                continue;
            }
            seen.push(key);

            if self.remaining(key) == 0 {
                debug!(%key, "QueueManager::update_series: series drained");
                self.series.remove(key);
            } else if let Some(status) = self.series.get_mut(key) {
                status.in_flight = true;
            }
        }
    }

    /// Reconcile pending adds and removals into the committed queue
    fn rework(&mut self) {
        debug!(
            strategy = %self.strategy,
            adding = self.adding.len(),
            removing = self.removing.len(),
            "QueueManager::rework: called"
        );
        if let Some(trace) = &self.trace {
            trace.reworking(self.strategy, &self.queue);
        }
        self.apply_removals();

        if let Some(active) = self.active_key.as_deref() {
            let present = self.queue.iter().any(|entry| entry.key() == active)
                || self.adding.iter().any(|pending| pending.key == active);
            if !present {
                debug!(%active, "QueueManager::rework: active key no longer queued, clearing");
                self.active_key = None;
            }
        }

        let input = ReworkInput {
            adding: &self.adding,
            queue: &self.queue,
            active_key: self.active_key.as_deref(),
            active_index: self.active_index,
            markers: self.markers,
        };
        match self.strategy.rework(input) {
            Rework::Applied { queue, markers } => {
                self.queue = queue;
                self.markers = markers;
                self.adding.clear();
            }
            Rework::StaleIndex { index } => {
                warn!(
                    index,
                    active_key = ?self.active_key,
                    pending = self.adding.len(),
                    "Active index is not queued, keeping previous order"
                );
            }
        }

        if let Some(trace) = &self.trace {
            trace.reworked(self.strategy, &self.queue);
        }
    }

    fn apply_removals(&mut self) {
        if self.removing.is_empty() {
            return;
        }
        let removing = std::mem::take(&mut self.removing);
        let Markers { q1_end, q2_end } = self.markers;
        let mut removed_q1 = 0;
        let mut removed_q2 = 0;
        let mut position = 0;

        self.queue.retain(|entry| {
            let keep = !removing.iter().any(|key| key == entry.key());
            if !keep {
                if position < q1_end {
                    removed_q1 += 1;
                }
                if position < q2_end {
                    removed_q2 += 1;
                }
            }
            position += 1;
            keep
        });

        self.markers = Markers::new(q1_end.saturating_sub(removed_q1), q2_end.saturating_sub(removed_q2));
        debug!(?removing, markers = ?self.markers, "QueueManager::apply_removals: done");
    }
}

impl std::fmt::Debug for QueueManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueueManager")
            .field("strategy", &self.strategy)
            .field("queued", &self.queue.len())
            .field("adding", &self.adding.len())
            .field("series", &self.series.len())
            .field("active_key", &self.active_key)
            .field("active_index", &self.active_index)
            .field("markers", &self.markers)
            .finish_non_exhaustive()
    }
}
