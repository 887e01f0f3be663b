//! Center-propagation strategy

use super::reorder::order_from_center;
use super::sequential::arrange;
use super::{Rework, ReworkInput};

pub(super) fn rework(input: ReworkInput<'_>) -> Rework {
    let mut queue = arrange(input.adding, input.queue, input.active_key);

    // Window is everything before the last active entry
    let window_end = input
        .active_key
        .and_then(|active| queue.iter().rposition(|entry| entry.key() == active))
        .unwrap_or(0);

    let tail = queue.split_off(window_end);
    let mut queue = order_from_center(queue);
    queue.extend(tail);

    Rework::Applied {
        queue,
        markers: input.markers,
    }
}
