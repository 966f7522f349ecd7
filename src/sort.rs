use crate::heap::{Heap, HeapError};
use std::cmp::Ordering;

/// Sorts `items` greatest first according to `compare`.
///
/// The items are copied into a temporary heap sized to the slice and then
/// extracted back in order, so `items[0]` receives the maximum. Pass a
/// reversed comparator for ascending output.
///
/// Only fails if the temporary heap cannot be allocated, in which case
/// `items` is left untouched.
pub fn heap_sort_by<T, F>(items: &mut [T], compare: F) -> Result<(), HeapError>
where
    T: Clone,
    F: Fn(&T, &T) -> Ordering + Send + Sync,
{
    let heap = Heap::try_with_comparator(items.len(), compare)?;
    heap.extend(items.iter().cloned())?;

    for slot in items.iter_mut() {
        *slot = heap.extract_max()?;
    }
    Ok(())
}

/// Sorts `items` in descending natural order.
pub fn heap_sort<T: Ord + Clone>(items: &mut [T]) -> Result<(), HeapError> {
    heap_sort_by(items, T::cmp)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heap_sort_descending() {
        let mut items = [5, 3, 8, 1];
        heap_sort(&mut items).unwrap();
        assert_eq!(items, [8, 5, 3, 1]);
    }

    #[test]
    fn test_heap_sort_reversed_comparator_is_ascending() {
        let mut items = vec![5, 3, 8, 1, 8, 0];
        heap_sort_by(&mut items, |a: &i32, b: &i32| b.cmp(a)).unwrap();
        assert_eq!(items, vec![0, 1, 3, 5, 8, 8]);
    }

    #[test]
    fn test_heap_sort_empty_and_single() {
        let mut empty: Vec<u8> = Vec::new();
        heap_sort(&mut empty).unwrap();
        assert!(empty.is_empty());

        let mut single = [42];
        heap_sort(&mut single).unwrap();
        assert_eq!(single, [42]);
    }

    #[test]
    fn test_heap_sort_by_key() {
        let mut words = vec!["pear", "fig", "banana", "kiwi"];
        heap_sort_by(&mut words, |a: &&str, b: &&str| a.len().cmp(&b.len())).unwrap();

        assert_eq!(words[0], "banana");
        assert_eq!(words[3], "fig");
    }

    #[test]
    fn test_heap_sort_borrowed_strs() {
        let owned = vec![String::from("pear"), String::from("fig"), String::from("kiwi")];
        let mut refs: Vec<&str> = owned.iter().map(|s| s.as_str()).collect();

        heap_sort(&mut refs).unwrap();

        assert_eq!(refs, vec!["pear", "kiwi", "fig"]);
    }

    #[test]
    fn test_heap_sort_by_captured_weights() {
        let weights = vec![10, 0, 5];
        let mut indices = vec![0usize, 1, 2];

        heap_sort_by(&mut indices, |a: &usize, b: &usize| weights[*a].cmp(&weights[*b])).unwrap();

        assert_eq!(indices, vec![0, 2, 1]);
    }

    #[test]
    fn test_heap_sort_matches_std_sort() {
        let mut items: Vec<u32> = (0..500).map(|i| (i * 7919) % 257).collect();
        let mut expected = items.clone();
        expected.sort_unstable_by(|a, b| b.cmp(a));

        heap_sort(&mut items).unwrap();
        assert_eq!(items, expected);
    }
}
