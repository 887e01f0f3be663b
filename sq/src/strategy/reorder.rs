//! Reordering helpers shared by the strategies

/// Move every element matching `pred` to the front, keeping relative order on both sides
pub fn stable_partition<T>(items: Vec<T>, mut pred: impl FnMut(&T) -> bool) -> Vec<T> {
    let (mut front, back): (Vec<T>, Vec<T>) = items.into_iter().partition(|item| pred(item));
    front.extend(back);
    front
}

/// Center-out order seeded at the middle element (`len / 2`)
pub fn order_from_center<T>(items: Vec<T>) -> Vec<T> {
    let center = items.len() / 2;
    expand_from(items, center)
}

/// Center-out order seeded at `center`: the seed, then alternately the next
/// element to its right and the next to its left until both ends are exhausted.
///
/// A seed past the end is clamped to the last element.
pub fn expand_from<T>(items: Vec<T>, center: usize) -> Vec<T> {
    let len = items.len();
    if len == 0 {
        return items;
    }
    let center = center.min(len - 1);

    let mut slots: Vec<Option<T>> = items.into_iter().map(Some).collect();
    let mut ordered = Vec::with_capacity(len);
    ordered.extend(slots[center].take());

    let mut left = center;
    let mut right = center + 1;
    while left > 0 || right < len {
        if right < len {
            ordered.extend(slots[right].take());
            right += 1;
        }
        if left > 0 {
            left -= 1;
            ordered.extend(slots[left].take());
        }
    }
    ordered
}
