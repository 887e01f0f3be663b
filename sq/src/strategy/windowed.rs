//! Three-section window strategy
//!
//! Persistent markers split the committed queue into three contiguous sections:
//!
//! ```text
//! [ Q1: next item of each new series | Q2: active series window | Q3: backlog ]
//!                                   q1_end                      q2_end
//! ```
//!
//! Q1 guarantees that every new series is served within one pop cycle. Q2 holds
//! the active series and is the only section reordered by the active index; it is
//! kept as `IndexedEntry` values so its original order can always be restored.
//! Q3 is a FIFO backlog kept in original per-series order.

use crate::queue::{IndexedEntry, Markers, QueueEntry};

use super::reorder::expand_from;
use super::{Rework, ReworkInput};

pub(super) fn rework(input: ReworkInput<'_>) -> Rework {
    let Markers { q1_end, q2_end } = input.markers.clamped(input.queue.len());
    let mut q1: Vec<QueueEntry> = input.queue[..q1_end].to_vec();
    let mut q2: Vec<IndexedEntry> = input.queue[q1_end..q2_end].iter().cloned().map(require_index).collect();
    let mut q3: Vec<QueueEntry> = input.queue[q2_end..].to_vec();
    let prior_active = q2.first().map(|entry| entry.item.key.clone());

    for pending in input.adding {
        let mut entries = pending.indexed_entries();
        if let Some(first) = entries.next() {
            q1.push(first.into());
        }
        q3.extend(entries.map(QueueEntry::from));
    }

    if input.active_key != prior_active.as_deref() {
        // Previous window goes back to the head of the backlog in original order
        restore_original_order(&mut q2);
        let backlog: Vec<QueueEntry> = q2.drain(..).map(QueueEntry::from).chain(q3).collect();
        let (active, backlog): (Vec<QueueEntry>, Vec<QueueEntry>) = backlog
            .into_iter()
            .partition(|entry| input.active_key == Some(entry.key()));
        q2 = active.into_iter().map(require_index).collect();
        q3 = backlog;
    }

    if let Some(target) = input.active_index {
        restore_original_order(&mut q2);
        let Some(position) = q2.iter().position(|entry| entry.original_index == target) else {
            return Rework::StaleIndex { index: target };
        };
        q2 = expand_from(q2, position);
    }

    let markers = Markers::new(q1.len(), q1.len() + q2.len());
    let mut queue = q1;
    queue.extend(q2.into_iter().map(QueueEntry::from));
    queue.extend(q3);
    Rework::Applied { queue, markers }
}

fn restore_original_order(window: &mut [IndexedEntry]) {
    window.sort_by_key(|entry| entry.original_index);
}

fn require_index(entry: QueueEntry) -> IndexedEntry {
    entry.into_indexed().unwrap_or_else(|entry| {
        panic!(
            "three-section window: entry {} of series {} has no original index",
            entry.item_id(),
            entry.key()
        )
    })
}
