// ── Keyed set differencer ──

use std::collections::HashSet;
use std::hash::Hash;

/// Additions and removals needed to turn one keyed collection into another.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetDiff<T> {
    /// Present in `new`, absent from `old`. In `new` order.
    pub to_add: Vec<T>,
    /// Present in `old`, absent from `new`. In `old` order.
    pub to_remove: Vec<T>,
}

impl<T> SetDiff<T> {
    pub fn is_empty(&self) -> bool {
        self.to_add.is_empty() && self.to_remove.is_empty()
    }
}

impl<T> Default for SetDiff<T> {
    fn default() -> Self {
        Self {
            to_add: Vec::new(),
            to_remove: Vec::new(),
        }
    }
}

/// Compare `old` and `new` by the key `key_fn` extracts.
///
/// Items whose key appears on both sides are in neither output, even if
/// their other fields differ. Runs in O(n + m); keys need not be sorted.
pub fn diff_by_key<T, K, F>(old: &[T], new: &[T], key_fn: F) -> SetDiff<T>
where
    T: Clone,
    K: Eq + Hash,
    F: Fn(&T) -> K,
{
    let old_keys: HashSet<K> = old.iter().map(&key_fn).collect();
    let new_keys: HashSet<K> = new.iter().map(&key_fn).collect();

    let to_add = new
        .iter()
        .filter(|item| !old_keys.contains(&key_fn(item)))
        .cloned()
        .collect();
    let to_remove = old
        .iter()
        .filter(|item| !new_keys.contains(&key_fn(item)))
        .cloned()
        .collect();

    SetDiff { to_add, to_remove }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn diff(old: &[u64], new: &[u64]) -> SetDiff<u64> {
        diff_by_key(old, new, |n| *n)
    }

    #[test]
    fn overlapping_sets() {
        let d = diff(&[1, 2], &[2, 3]);
        assert_eq!(d.to_add, vec![3]);
        assert_eq!(d.to_remove, vec![1]);
    }

    #[test]
    fn equal_sets_in_any_order_are_empty() {
        let d = diff(&[3, 1, 2], &[2, 3, 1]);
        assert!(d.is_empty());
    }

    #[test]
    fn output_follows_input_order() {
        let d = diff(&[9, 5, 7, 1], &[4, 1, 8, 6]);
        assert_eq!(d.to_add, vec![4, 8, 6]);
        assert_eq!(d.to_remove, vec![9, 5, 7]);
    }

    #[test]
    fn empty_old_adds_everything() {
        let d = diff(&[], &[5, 6]);
        assert_eq!(d.to_add, vec![5, 6]);
        assert!(d.to_remove.is_empty());
    }

    #[test]
    fn matching_key_with_different_payload_is_ignored() {
        let old = [(1, "a"), (2, "b")];
        let new = [(1, "changed"), (2, "b")];
        let d = diff_by_key(&old, &new, |(k, _)| *k);
        assert!(d.is_empty());
    }
}
