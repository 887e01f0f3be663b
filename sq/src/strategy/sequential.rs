//! Sequential-append strategy

use crate::queue::{PendingAdd, QueueEntry};

use super::reorder::stable_partition;
use super::{Rework, ReworkInput};

/// Committed queue followed by every pending item, tagged, in series-then-item order
pub(super) fn append(adding: &[PendingAdd], queue: &[QueueEntry]) -> Vec<QueueEntry> {
    let mut appended = queue.to_vec();
    for pending in adding {
        appended.extend(pending.indexed_entries().map(QueueEntry::from));
    }
    appended
}

/// `append`, then the active series (if any) stably moved to the front
pub(super) fn arrange(adding: &[PendingAdd], queue: &[QueueEntry], active_key: Option<&str>) -> Vec<QueueEntry> {
    let appended = append(adding, queue);
    match active_key {
        Some(active) => stable_partition(appended, |entry| entry.key() == active),
        None => appended,
    }
}

pub(super) fn rework(input: ReworkInput<'_>) -> Rework {
    Rework::Applied {
        queue: arrange(input.adding, input.queue, input.active_key),
        markers: input.markers,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queue::Markers;
    use crate::strategy::testing::{item_ids, keys, pending};

    fn run(adding: &[PendingAdd], queue: &[QueueEntry], active_key: Option<&str>) -> Vec<QueueEntry> {
        let input = ReworkInput {
            adding,
            queue,
            active_key,
            active_index: None,
            markers: Markers::default(),
        };
        match rework(input) {
            Rework::Applied { queue, .. } => queue,
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_appends_in_series_then_item_order() {
        let queue = run(&[pending("k1", 2), pending("k2", 2)], &[], None);
        assert_eq!(item_ids(&queue), vec!["k1-0", "k1-1", "k2-0", "k2-1"]);
        let indices: Vec<_> = queue.iter().map(|e| e.original_index()).collect();
        assert_eq!(indices, vec![Some(1), Some(2), Some(1), Some(2)]);
    }

    #[test]
    fn test_appends_after_committed() {
        let first = run(&[pending("k1", 2)], &[], None);
        let queue = run(&[pending("k2", 1)], &first, None);
        assert_eq!(item_ids(&queue), vec!["k1-0", "k1-1", "k2-0"]);
    }

    #[test]
    fn test_active_key_moves_to_front_stably() {
        let first = run(&[pending("k1", 2), pending("k2", 3)], &[], None);
        let queue = run(&[pending("k3", 1)], &first, Some("k2"));
        assert_eq!(keys(&queue), vec!["k2", "k2", "k2", "k1", "k1", "k3"]);
        assert_eq!(item_ids(&queue)[..3], ["k2-0", "k2-1", "k2-2"]);
    }

    #[test]
    fn test_unknown_active_key_changes_nothing() {
        let queue = run(&[pending("k1", 2), pending("k2", 1)], &[], Some("nope"));
        assert_eq!(item_ids(&queue), vec!["k1-0", "k1-1", "k2-0"]);
    }
}
