//! Round-robin strategy

use std::collections::{HashMap, VecDeque};

use crate::queue::{QueueEntry, SeriesKey};

use super::{Rework, ReworkInput};

pub(super) fn rework(input: ReworkInput<'_>) -> Rework {
    // Key order: committed keys first, then pending keys, by first appearance
    let mut key_order: Vec<SeriesKey> = Vec::new();
    for key in input
        .queue
        .iter()
        .map(QueueEntry::key)
        .chain(input.adding.iter().filter(|p| !p.items.is_empty()).map(|p| p.key.as_str()))
    {
        if !key_order.iter().any(|k| k == key) {
            key_order.push(key.to_string());
        }
    }

    // Pool order is pending items followed by the committed queue
    let pool = input
        .adding
        .iter()
        .flat_map(|pending| pending.untagged_entries().map(QueueEntry::from))
        .chain(input.queue.iter().cloned());

    let mut buckets: HashMap<SeriesKey, VecDeque<QueueEntry>> = HashMap::new();
    let mut total = 0;
    for entry in pool {
        buckets.entry(entry.key().to_string()).or_default().push_back(entry);
        total += 1;
    }

    let mut rotation: VecDeque<SeriesKey> = key_order.into();
    let mut queue = Vec::with_capacity(total);
    while let Some(key) = rotation.pop_front() {
        let bucket = buckets
            .get_mut(&key)
            .unwrap_or_else(|| panic!("round-robin: key {key} is scheduled but has no pooled entries"));
        let entry = bucket
            .pop_front()
            .unwrap_or_else(|| panic!("round-robin: key {key} is scheduled but its entries are exhausted"));
        queue.push(entry);
        if !bucket.is_empty() {
            rotation.push_back(key);
        }
    }

    assert_eq!(queue.len(), total, "round-robin must preserve the number of entries");
    Rework::Applied {
        queue,
        markers: input.markers,
    }
}
