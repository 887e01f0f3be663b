//! Queue types shared by the manager and the ordering strategies

use serde::{Deserialize, Serialize};

/// Unique tracking identifier of a series instance
pub type SeriesKey = String;

/// Identifier of a single fetchable item
pub type ItemId = String;

/// A single fetchable item together with the series it belongs to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueItem {
    pub key: SeriesKey,
    pub series_id: String,
    pub study_id: String,
    pub item_id: ItemId,
}

/// An item carrying its 1-based position within the series' original item list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexedEntry {
    #[serde(flatten)]
    pub item: QueueItem,
    pub original_index: usize,
}

/// An entry of the committed queue
///
/// Strategies that restore original order only ever see `Indexed` entries in the
/// sections they reorder; `Untagged` entries come from strategies that never need
/// the position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum QueueEntry {
    Indexed(IndexedEntry),
    Untagged(QueueItem),
}

impl QueueEntry {
    pub fn item(&self) -> &QueueItem {
        match self {
            Self::Indexed(entry) => &entry.item,
            Self::Untagged(item) => item,
        }
    }

    pub fn key(&self) -> &str {
        &self.item().key
    }

    pub fn item_id(&self) -> &str {
        &self.item().item_id
    }

    pub fn original_index(&self) -> Option<usize> {
        match self {
            Self::Indexed(entry) => Some(entry.original_index),
            Self::Untagged(_) => None,
        }
    }

    /// Convert into an indexed entry, handing the entry back if it carries no index
    pub fn into_indexed(self) -> Result<IndexedEntry, QueueEntry> {
        match self {
            Self::Indexed(entry) => Ok(entry),
            other => Err(other),
        }
    }
}

impl From<IndexedEntry> for QueueEntry {
    fn from(entry: IndexedEntry) -> Self {
        Self::Indexed(entry)
    }
}

impl From<QueueItem> for QueueEntry {
    fn from(item: QueueItem) -> Self {
        Self::Untagged(item)
    }
}

/// A series waiting to be merged into the committed queue
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingAdd {
    pub key: SeriesKey,
    pub series_id: String,
    pub study_id: String,
    pub items: Vec<ItemId>,
}

impl PendingAdd {
    fn item(&self, item_id: &str) -> QueueItem {
        QueueItem {
            key: self.key.clone(),
            series_id: self.series_id.clone(),
            study_id: self.study_id.clone(),
            item_id: item_id.to_string(),
        }
    }

    /// Items in original order, tagged with their 1-based position
    pub fn indexed_entries(&self) -> impl Iterator<Item = IndexedEntry> + '_ {
        self.items.iter().enumerate().map(|(i, item_id)| IndexedEntry {
            item: self.item(item_id),
            original_index: i + 1,
        })
    }

    /// Items in original order, without position tags
    pub fn untagged_entries(&self) -> impl Iterator<Item = QueueItem> + '_ {
        self.items.iter().map(|item_id| self.item(item_id))
    }
}

/// Per-series bookkeeping
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeriesStatus {
    /// Number of items at add time, never decremented
    pub initial_count: usize,
    /// Set once the first slot containing this series was popped
    pub in_flight: bool,
}

impl SeriesStatus {
    pub fn new(initial_count: usize) -> Self {
        Self {
            initial_count,
            in_flight: false,
        }
    }
}

/// Progress of a series as reported to callers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeriesProgress {
    pub remaining: usize,
    pub initial: usize,
}

/// Result of a non-blocking slot request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlotResult {
    /// Entries removed from the head of the queue (possibly empty)
    Ready(Vec<QueueEntry>),

    /// The queue is being reworked, try again later
    NotReady,
}

impl SlotResult {
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready(_))
    }

    pub fn into_ready(self) -> Option<Vec<QueueEntry>> {
        match self {
            Self::Ready(slot) => Some(slot),
            Self::NotReady => None,
        }
    }
}

/// Section boundaries `[q1_end, q2_end]` of the windowed strategy
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Markers {
    pub q1_end: usize,
    pub q2_end: usize,
}

impl Markers {
    pub fn new(q1_end: usize, q2_end: usize) -> Self {
        Self { q1_end, q2_end }
    }

    /// Shift both markers toward the head after `count` entries were popped
    pub fn shift_down(&mut self, count: usize) {
        self.q1_end = self.q1_end.saturating_sub(count);
        self.q2_end = self.q2_end.saturating_sub(count);
    }

    /// Markers clamped so that `q1_end <= q2_end <= len`
    pub fn clamped(self, len: usize) -> Self {
        let q1_end = self.q1_end.min(len);
        Self {
            q1_end,
            q2_end: self.q2_end.clamp(q1_end, len),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pending(key: &str, items: &[&str]) -> PendingAdd {
        PendingAdd {
            key: key.to_string(),
            series_id: "S".to_string(),
            study_id: "T".to_string(),
            items: items.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn test_indexed_entries_are_one_based() {
        let add = pending("k1", &["a", "b", "c"]);
        let indices: Vec<_> = add.indexed_entries().map(|e| e.original_index).collect();
        assert_eq!(indices, vec![1, 2, 3]);
    }

    #[test]
    fn test_entry_accessors() {
        let add = pending("k1", &["a"]);
        let indexed: QueueEntry = add.indexed_entries().next().unwrap().into();
        let untagged: QueueEntry = add.untagged_entries().next().unwrap().into();

        assert_eq!(indexed.key(), "k1");
        assert_eq!(indexed.original_index(), Some(1));
        assert_eq!(untagged.item_id(), "a");
        assert_eq!(untagged.original_index(), None);
        assert!(untagged.into_indexed().is_err());
    }

    #[test]
    fn test_entry_serializes_flat() {
        let add = pending("k1", &["a"]);
        let indexed: QueueEntry = add.indexed_entries().next().unwrap().into();
        let json = serde_json::to_value(&indexed).unwrap();
        assert_eq!(json["key"], "k1");
        assert_eq!(json["item_id"], "a");
        assert_eq!(json["original_index"], 1);

        let untagged: QueueEntry = add.untagged_entries().next().unwrap().into();
        let json = serde_json::to_value(&untagged).unwrap();
        assert!(json.get("original_index").is_none());
    }

    #[test]
    fn test_markers_shift_floors_at_zero() {
        let mut markers = Markers::new(2, 5);
        markers.shift_down(3);
        assert_eq!(markers, Markers::new(0, 2));
        markers.shift_down(10);
        assert_eq!(markers, Markers::new(0, 0));
    }

    #[test]
    fn test_markers_clamped() {
        assert_eq!(Markers::new(4, 9).clamped(6), Markers::new(4, 6));
        assert_eq!(Markers::new(8, 9).clamped(6), Markers::new(6, 6));
    }
}
