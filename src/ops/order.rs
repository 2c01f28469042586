//! Ordered-sequence helpers shared by every reorder path.

/// Move the element at `old_index` to `new_index` (remove then insert, not
/// swap). Returns false and leaves `items` untouched if either index is out
/// of range or they are equal.
pub fn array_move<T>(items: &mut Vec<T>, old_index: usize, new_index: usize) -> bool {
    if old_index == new_index || old_index >= items.len() || new_index >= items.len() {
        return false;
    }
    let item = items.remove(old_index);
    items.insert(new_index, item);
    true
}

/// Array-move within the subsequence of `items` selected by `is_member`,
/// writing the moved subsequence back into the same slots. Indices are
/// relative to the subsequence. Non-members keep their absolute positions.
pub fn move_within<T, F>(items: &mut [T], is_member: F, old_index: usize, new_index: usize) -> bool
where
    T: Clone,
    F: Fn(&T) -> bool,
{
    let slots: Vec<usize> = items
        .iter()
        .enumerate()
        .filter(|(_, item)| is_member(*item))
        .map(|(i, _)| i)
        .collect();
    let mut members: Vec<T> = slots.iter().map(|&i| items[i].clone()).collect();
    if !array_move(&mut members, old_index, new_index) {
        return false;
    }
    for (slot, member) in slots.into_iter().zip(members) {
        items[slot] = member;
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn array_move_forward_and_back() {
        let mut v = vec!["a", "b", "c", "d"];
        assert!(array_move(&mut v, 0, 2));
        assert_eq!(v, vec!["b", "c", "a", "d"]);
        assert!(array_move(&mut v, 2, 0));
        assert_eq!(v, vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn array_move_is_not_a_swap() {
        let mut v = vec![1, 2, 3, 4, 5];
        array_move(&mut v, 4, 1);
        assert_eq!(v, vec![1, 5, 2, 3, 4]);
    }

    #[test]
    fn array_move_rejects_out_of_range() {
        let mut v = vec![1, 2];
        assert!(!array_move(&mut v, 0, 2));
        assert!(!array_move(&mut v, 1, 1));
        assert_eq!(v, vec![1, 2]);
    }

    #[test]
    fn inverse_move_round_trips_every_pair() {
        let original: Vec<u8> = (0..6).collect();
        for old in 0..original.len() {
            for new in 0..original.len() {
                let mut v = original.clone();
                array_move(&mut v, old, new);
                array_move(&mut v, new, old);
                assert_eq!(v, original, "move {old}->{new} did not round-trip");
            }
        }
    }

    #[test]
    fn move_within_keeps_non_members_in_place() {
        let mut v = vec!["a1", "x", "a2", "y", "a3"];
        assert!(move_within(&mut v, |s| s.starts_with('a'), 2, 0));
        assert_eq!(v, vec!["a3", "x", "a1", "y", "a2"]);
    }
}
