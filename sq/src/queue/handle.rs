//! Shared handle for the queue manager

use std::collections::BTreeMap;
use std::sync::Arc;

use tokio::sync::{Mutex, Notify};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::error::QueueError;

use super::config::QueueConfig;
use super::core::QueueManager;
use super::types::{QueueEntry, SeriesKey, SeriesProgress, SlotResult};

struct Shared {
    manager: Mutex<QueueManager>,
    /// Signalled after every reconciliation
    reworked: Notify,
}

/// Cloneable handle to a `QueueManager` shared between tasks
///
/// The mutex guards reconciliation and pop as one critical section: `pop_slot`
/// never waits for it and reports `SlotResult::NotReady` while another task holds it.
#[derive(Clone)]
pub struct SeriesQueue {
    inner: Arc<Shared>,
}

impl SeriesQueue {
    /// Create a handle around a fresh manager
    pub fn new(config: QueueConfig) -> Self {
        Self::from_manager(QueueManager::new(config))
    }

    pub fn from_manager(manager: QueueManager) -> Self {
        debug!(?manager, "SeriesQueue::from_manager: called");
        Self {
            inner: Arc::new(Shared {
                manager: Mutex::new(manager),
                reworked: Notify::new(),
            }),
        }
    }

    pub async fn add<S: AsRef<str>>(&self, key: &str, series_id: &str, study_id: &str, items: &[S]) -> bool {
        let added = self.inner.manager.lock().await.add(key, series_id, study_id, items);
        self.inner.reworked.notify_waiters();
        added
    }

    pub async fn remove(&self, key: &str) {
        self.inner.manager.lock().await.remove(key);
        self.inner.reworked.notify_waiters();
    }

    pub async fn active_key(&self) -> Option<SeriesKey> {
        self.inner.manager.lock().await.active_key().map(str::to_string)
    }

    pub async fn set_active_key(&self, key: Option<&str>) {
        self.inner.manager.lock().await.set_active_key(key);
        self.inner.reworked.notify_waiters();
    }

    pub async fn active_index(&self) -> Option<usize> {
        self.inner.manager.lock().await.active_index()
    }

    pub async fn set_active_index(&self, index: Option<usize>) {
        self.inner.manager.lock().await.set_active_index(index);
        self.inner.reworked.notify_waiters();
    }

    pub async fn status(&self, key: &str) -> Option<SeriesProgress> {
        self.inner.manager.lock().await.status(key)
    }

    pub async fn overall_status(&self) -> BTreeMap<SeriesKey, Option<SeriesProgress>> {
        self.inner.manager.lock().await.overall_status()
    }

    pub async fn is_active(&self) -> bool {
        self.inner.manager.lock().await.is_active()
    }

    /// Copy of the committed queue
    pub async fn snapshot(&self) -> Vec<QueueEntry> {
        self.inner.manager.lock().await.queue().to_vec()
    }

    /// Hold the manager lock, making every `pop_slot` report `NotReady` until released
    #[cfg(test)]
    pub(crate) async fn hold(&self) -> tokio::sync::MutexGuard<'_, QueueManager> {
        self.inner.manager.lock().await
    }

    /// Take up to `n` entries without waiting
    pub fn pop_slot(&self, n: usize) -> SlotResult {
        match self.inner.manager.try_lock() {
            Ok(mut manager) => SlotResult::Ready(manager.pop_slot(n)),
            Err(_) => {
                debug!(n, "SeriesQueue::pop_slot: busy, not ready");
                SlotResult::NotReady
            }
        }
    }

    /// Wait until at least one entry can be popped, then take up to `n`
    ///
    /// Wakes after every reconciliation. Resolves with an empty slot right away
    /// when `n` is zero. Cancelling `cancel` ends the wait with `QueueError::Cancelled`.
    pub async fn pop_slot_async(&self, n: usize, cancel: &CancellationToken) -> Result<Vec<QueueEntry>, QueueError> {
        debug!(n, "SeriesQueue::pop_slot_async: called");
        if n == 0 {
            return Ok(Vec::new());
        }

        loop {
            // Register before checking so a rework between check and wait is not missed
            let reworked = self.inner.reworked.notified();
            tokio::pin!(reworked);
            reworked.as_mut().enable();

            let slot = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(QueueError::Cancelled),
                mut manager = self.inner.manager.lock() => manager.pop_slot(n),
            };
            if !slot.is_empty() {
                debug!(len = slot.len(), "SeriesQueue::pop_slot_async: slot ready");
                return Ok(slot);
            }

            debug!("SeriesQueue::pop_slot_async: queue empty, waiting for rework");
            tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(QueueError::Cancelled),
                _ = &mut reworked => {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::strategy::Strategy;

    fn queue(strategy: Strategy) -> SeriesQueue {
        SeriesQueue::new(QueueConfig::new(strategy))
    }

    #[tokio::test]
    async fn test_pop_slot_ready() {
        let sq = queue(Strategy::SequentialAppend);
        sq.add("k1", "A", "1", &["a0", "a1"]).await;

        let slot = sq.pop_slot(1).into_ready().unwrap();
        assert_eq!(slot[0].item_id(), "a0");
    }

    #[tokio::test]
    async fn test_pop_slot_not_ready_while_locked() {
        let sq = queue(Strategy::SequentialAppend);
        sq.add("k1", "A", "1", &["a0"]).await;

        let guard = sq.inner.manager.lock().await;
        assert_eq!(sq.pop_slot(1), SlotResult::NotReady);
        drop(guard);

        assert!(sq.pop_slot(1).is_ready());
    }

    #[tokio::test]
    async fn test_pop_slot_async_returns_queued() {
        let sq = queue(Strategy::RoundRobin);
        sq.add("k1", "A", "1", &["a0", "a1"]).await;

        let slot = sq.pop_slot_async(5, &CancellationToken::new()).await.unwrap();
        assert_eq!(slot.len(), 2);
    }

    #[tokio::test]
    async fn test_pop_slot_async_waits_for_add() {
        let sq = queue(Strategy::SequentialAppend);
        let waiter = {
            let sq = sq.clone();
            tokio::spawn(async move { sq.pop_slot_async(2, &CancellationToken::new()).await })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        sq.add("k1", "A", "1", &["a0", "a1", "a2"]).await;

        let slot = tokio::time::timeout(Duration::from_secs(5), waiter)
            .await
            .expect("waiter should wake")
            .expect("task should not panic")
            .expect("should not be cancelled");
        assert_eq!(slot.len(), 2);
        assert_eq!(sq.status("k1").await.map(|s| s.remaining), Some(1));
    }

    #[tokio::test]
    async fn test_pop_slot_async_cancelled() {
        let sq = queue(Strategy::SequentialAppend);
        let cancel = CancellationToken::new();
        let waiter = {
            let sq = sq.clone();
            let cancel = cancel.clone();
            tokio::spawn(async move { sq.pop_slot_async(1, &cancel).await })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        cancel.cancel();

        let result = tokio::time::timeout(Duration::from_secs(5), waiter)
            .await
            .expect("waiter should wake")
            .expect("task should not panic");
        assert_eq!(result, Err(QueueError::Cancelled));
    }

    #[tokio::test]
    async fn test_pop_slot_async_zero() {
        let sq = queue(Strategy::SequentialAppend);
        let slot = sq.pop_slot_async(0, &CancellationToken::new()).await.unwrap();
        assert!(slot.is_empty());
    }

    #[tokio::test]
    async fn test_handle_hints_round_trip() {
        let sq = queue(Strategy::ThreeSectionWindow);
        sq.add("k1", "A", "1", &["a0", "a1", "a2"]).await;
        sq.set_active_key(Some("k1")).await;
        sq.set_active_index(Some(3)).await;

        assert_eq!(sq.active_key().await.as_deref(), Some("k1"));
        assert_eq!(sq.active_index().await, Some(3));
        let ids: Vec<_> = sq.snapshot().await.iter().map(|e| e.item_id().to_string()).collect();
        assert_eq!(ids, vec!["a0", "a2", "a1"]);
    }
}
