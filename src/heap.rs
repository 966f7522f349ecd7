use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::TryReserveError;
use std::fmt;
use std::sync::Arc;

/// Three-way comparison shared between a heap and its callers.
///
/// Elements comparing `Greater` rise toward the root.
pub type Comparator<'a, T> = Arc<dyn Fn(&T, &T) -> Ordering + Send + Sync + 'a>;

/// What `insert` does when every slot is taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Growth {
    /// Reject the insert with `HeapError::CapacityExceeded`.
    #[default]
    Fixed,
    /// Double the capacity (minimum 1) and carry on.
    Double,
}

/// Backing storage, only ever touched with the heap's lock held.
struct Slots<T> {
    items: Vec<T>,
    capacity: usize,
}

impl<T> Slots<T> {
    fn grow_to(&mut self, new_capacity: usize) -> Result<(), HeapError> {
        let additional = new_capacity - self.items.len();
        self.items
            .try_reserve_exact(additional)
            .map_err(|source| HeapError::AllocationFailure {
                requested: new_capacity,
                source,
            })?;
        self.capacity = new_capacity;
        Ok(())
    }
}

/// An array-backed binary max-heap guarded by a single mutex.
///
/// Every public operation, accessors included, runs as one critical section
/// over the storage. Operations from different threads are fully serialized.
///
/// Layout is 0-indexed: the parent of `i` is `(i - 1) / 2` and its children
/// are `2i + 1` and `2i + 2`. No child ever compares `Greater` than its parent.
///
/// Elements are moved in and dropped like any other value. Store `&U` or
/// `Arc<U>` to keep shared ownership with the caller; `'a` bounds both the
/// comparator and any borrows it captures.
pub struct Heap<'a, T> {
    slots: Mutex<Slots<T>>,
    compare: Comparator<'a, T>,
    growth: Growth,
}

impl<'a, T: Ord + 'a> Heap<'a, T> {
    /// Creates an empty heap ordered by `T`'s natural order.
    pub fn new(capacity: usize) -> Self {
        Self::with_comparator(capacity, T::cmp)
    }
}

impl<'a, T> Heap<'a, T> {
    /// Creates an empty, fixed-capacity heap ordered by `compare`.
    pub fn with_comparator<F>(capacity: usize, compare: F) -> Self
    where
        F: Fn(&T, &T) -> Ordering + Send + Sync + 'a,
    {
        Self::with_shared_comparator(capacity, Arc::new(compare))
    }

    /// Creates an empty heap reusing a comparator handle, e.g. one obtained
    /// from another heap's `comparator()`.
    pub fn with_shared_comparator(capacity: usize, compare: Comparator<'a, T>) -> Self {
        Self {
            slots: Mutex::new(Slots {
                items: Vec::with_capacity(capacity),
                capacity,
            }),
            compare,
            growth: Growth::Fixed,
        }
    }

    /// Like `with_comparator`, but reports a failed storage allocation
    /// instead of aborting.
    pub fn try_with_comparator<F>(capacity: usize, compare: F) -> Result<Self, HeapError>
    where
        F: Fn(&T, &T) -> Ordering + Send + Sync + 'a,
    {
        let mut items = Vec::new();
        items
            .try_reserve_exact(capacity)
            .map_err(|source| HeapError::AllocationFailure {
                requested: capacity,
                source,
            })?;

        Ok(Self {
            slots: Mutex::new(Slots { items, capacity }),
            compare: Arc::new(compare),
            growth: Growth::Fixed,
        })
    }

    /// Sets the policy applied when inserting into a full heap.
    pub fn with_growth(mut self, growth: Growth) -> Self {
        self.growth = growth;
        self
    }

    /// Shorthand for `with_growth(Growth::Double)`.
    pub fn auto_grow(self) -> Self {
        self.with_growth(Growth::Double)
    }

    /// Inserts `item` and sifts it up to its place.
    ///
    /// A full `Growth::Fixed` heap rejects the item and is left untouched.
    pub fn insert(&self, item: T) -> Result<&Self, HeapError> {
        let mut slots = self.slots.lock();
        self.push_locked(&mut slots, item)?;
        Ok(self)
    }

    /// Inserts every item under one lock acquisition.
    ///
    /// Stops at the first failure; items inserted before it stay in the heap.
    pub fn extend<I>(&self, items: I) -> Result<&Self, HeapError>
    where
        I: IntoIterator<Item = T>,
    {
        let mut slots = self.slots.lock();
        for item in items {
            self.push_locked(&mut slots, item)?;
        }
        Ok(self)
    }

    fn push_locked(&self, slots: &mut Slots<T>, item: T) -> Result<(), HeapError> {
        if slots.items.len() == slots.capacity {
            match self.growth {
                Growth::Fixed => {
                    return Err(HeapError::CapacityExceeded {
                        capacity: slots.capacity,
                    })
                }
                Growth::Double => {
                    let old = slots.capacity;
                    let target = old.saturating_mul(2).max(1);
                    slots.grow_to(target)?;
                    log::debug!("heap grew from {} to {} slots", old, target);
                }
            }
        }

        slots.items.push(item);
        let last = slots.items.len() - 1;
        sift_up(&mut slots.items, last, &*self.compare);
        Ok(())
    }

    /// Removes and returns the greatest element.
    pub fn extract_max(&self) -> Result<T, HeapError> {
        let mut slots = self.slots.lock();
        if slots.items.is_empty() {
            return Err(HeapError::EmptyHeap);
        }

        // The last element takes the root's place, then sinks.
        let top = slots.items.swap_remove(0);
        sift_down(&mut slots.items, 0, &*self.compare);
        log::trace!("extracted root, {} elements left", slots.items.len());
        Ok(top)
    }

    /// Calls `visitor` on each element in storage order (root first).
    ///
    /// The lock is held for the whole walk, so `visitor` must not call back
    /// into this heap: the mutex is not reentrant and the call would deadlock.
    pub fn for_each<F>(&self, mut visitor: F)
    where
        F: FnMut(&T),
    {
        let slots = self.slots.lock();
        for item in &slots.items {
            visitor(item);
        }
    }

    /// Number of stored elements.
    pub fn size(&self) -> usize {
        self.slots.lock().items.len()
    }

    /// Number of slots available before the heap is full.
    pub fn max_size(&self) -> usize {
        self.slots.lock().capacity
    }

    pub fn is_empty(&self) -> bool {
        self.slots.lock().items.is_empty()
    }

    pub fn growth(&self) -> Growth {
        self.growth
    }

    /// Returns a handle to the comparator this heap was built with.
    pub fn comparator(&self) -> Comparator<'a, T> {
        Arc::clone(&self.compare)
    }

    /// Grows the storage to `new_capacity` slots.
    ///
    /// Asking for the current capacity is a no-op. Shrinking is never allowed
    /// and leaves the heap untouched.
    pub fn resize(&self, new_capacity: usize) -> Result<&Self, HeapError> {
        let mut slots = self.slots.lock();
        match new_capacity.cmp(&slots.capacity) {
            Ordering::Less => Err(HeapError::ShrinkRejected {
                requested: new_capacity,
                capacity: slots.capacity,
            }),
            Ordering::Equal => Ok(self),
            Ordering::Greater => {
                let old = slots.capacity;
                slots.grow_to(new_capacity)?;
                log::debug!("heap resized from {} to {} slots", old, new_capacity);
                Ok(self)
            }
        }
    }

    /// Checks that no element compares greater than its parent.
    pub fn is_heap(&self) -> bool {
        let slots = self.slots.lock();
        let items = &slots.items;
        (1..items.len())
            .all(|i| (self.compare)(&items[i], &items[(i - 1) / 2]) != Ordering::Greater)
    }

    /// Consumes the heap and returns its elements greatest first.
    pub fn into_sorted_vec(self) -> Vec<T> {
        let mut items = self.slots.into_inner().items;
        let mut sorted = Vec::with_capacity(items.len());
        while !items.is_empty() {
            sorted.push(items.swap_remove(0));
            sift_down(&mut items, 0, &*self.compare);
        }
        sorted
    }
}

impl<T: Clone> Heap<'_, T> {
    /// Returns a copy of the greatest element without removing it.
    pub fn peek(&self) -> Option<T> {
        self.slots.lock().items.first().cloned()
    }
}

impl<T> fmt::Debug for Heap<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let slots = self.slots.lock();
        f.debug_struct("Heap")
            .field("size", &slots.items.len())
            .field("capacity", &slots.capacity)
            .field("growth", &self.growth)
            .finish()
    }
}

/// Moves the element at `pos` toward the root while it beats its parent.
fn sift_up<T>(items: &mut [T], mut pos: usize, compare: &dyn Fn(&T, &T) -> Ordering) {
    while pos > 0 {
        let parent = (pos - 1) / 2;
        if compare(&items[pos], &items[parent]) != Ordering::Greater {
            break;
        }
        items.swap(pos, parent);
        pos = parent;
    }
}

/// Moves the element at `pos` toward the leaves while a child outranks it.
///
/// When both children compare equal the right one is taken.
fn sift_down<T>(items: &mut [T], mut pos: usize, compare: &dyn Fn(&T, &T) -> Ordering) {
    let len = items.len();
    loop {
        let left = 2 * pos + 1;
        if left >= len {
            break;
        }
        let right = left + 1;

        let larger = if right < len && compare(&items[left], &items[right]) != Ordering::Greater {
            right
        } else {
            left
        };

        if compare(&items[pos], &items[larger]) == Ordering::Greater {
            break;
        }
        items.swap(pos, larger);
        pos = larger;
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeapError {
    CapacityExceeded { capacity: usize },
    EmptyHeap,
    ShrinkRejected { requested: usize, capacity: usize },
    AllocationFailure { requested: usize, source: TryReserveError },
}

impl fmt::Display for HeapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HeapError::CapacityExceeded { capacity } => {
                write!(f, "Heap is full ({} slots)", capacity)
            }
            HeapError::EmptyHeap => write!(f, "Cannot extract from an empty heap"),
            HeapError::ShrinkRejected { requested, capacity } => write!(
                f,
                "Cannot shrink heap from {} to {} slots",
                capacity, requested
            ),
            HeapError::AllocationFailure { requested, source } => {
                write!(f, "Failed to allocate {} heap slots: {}", requested, source)
            }
        }
    }
}

impl std::error::Error for HeapError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            HeapError::AllocationFailure { source, .. } => Some(source),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    fn drain<T>(heap: &Heap<'_, T>) -> Vec<T> {
        let mut out = Vec::new();
        while let Ok(item) = heap.extract_max() {
            out.push(item);
        }
        out
    }

    #[test]
    fn test_extraction_order() {
        let heap = Heap::new(8);
        for i in [3, 1, 4, 1, 5, 9, 2, 6] {
            heap.insert(i).unwrap();
        }

        assert_eq!(drain(&heap), vec![9, 6, 5, 4, 3, 2, 1, 1]);
        assert!(heap.is_empty());
    }

    #[test]
    fn test_insert_chaining() {
        let heap = Heap::new(3);
        heap.insert(1).unwrap().insert(7).unwrap().insert(4).unwrap();

        assert_eq!(heap.size(), 3);
        assert_eq!(heap.peek(), Some(7));
    }

    #[test]
    fn test_heap_property_after_mixed_ops() {
        let heap = Heap::new(64);
        let mut expected_size = 0;

        for round in 0..8u32 {
            for i in 0..6u32 {
                heap.insert((round * 37 + i * 11) % 23).unwrap();
                expected_size += 1;
                assert!(heap.is_heap());
            }
            for _ in 0..3 {
                heap.extract_max().unwrap();
                expected_size -= 1;
                assert!(heap.is_heap());
            }
            assert_eq!(heap.size(), expected_size);
        }
    }

    #[test]
    fn test_custom_comparator_makes_min_heap() {
        let heap = Heap::with_comparator(5, |a: &i32, b: &i32| b.cmp(a));
        heap.extend([5, 2, 8, 1, 9]).unwrap();

        assert_eq!(drain(&heap), vec![1, 2, 5, 8, 9]);
    }

    #[test]
    fn test_insert_when_full_is_rejected() {
        let heap = Heap::new(2);
        heap.insert(1).unwrap();
        heap.insert(2).unwrap();

        let err = heap.insert(3).unwrap_err();
        assert_eq!(err, HeapError::CapacityExceeded { capacity: 2 });
        assert_eq!(heap.size(), 2);
        assert_eq!(heap.peek(), Some(2));
    }

    #[test]
    fn test_auto_grow_doubles_capacity() {
        let heap = Heap::new(0).auto_grow();
        assert_eq!(heap.growth(), Growth::Double);

        heap.insert(10).unwrap();
        assert_eq!(heap.max_size(), 1);
        heap.insert(20).unwrap();
        assert_eq!(heap.max_size(), 2);
        heap.insert(30).unwrap();
        assert_eq!(heap.max_size(), 4);

        assert_eq!(drain(&heap), vec![30, 20, 10]);
    }

    #[test]
    fn test_extract_from_empty() {
        let heap: Heap<'_, i32> = Heap::new(4);

        assert_eq!(heap.extract_max(), Err(HeapError::EmptyHeap));
        assert_eq!(heap.size(), 0);
        assert_eq!(heap.max_size(), 4);
    }

    #[test]
    fn test_noop_resize() {
        let heap = Heap::new(4);
        heap.extend([4, 8, 1]).unwrap();

        heap.resize(heap.max_size()).unwrap();

        assert_eq!(heap.size(), 3);
        assert_eq!(heap.max_size(), 4);
        assert_eq!(drain(&heap), vec![8, 4, 1]);
    }

    #[test]
    fn test_shrink_rejected() {
        let heap = Heap::new(4);
        heap.extend([4, 8]).unwrap();

        let err = heap.resize(heap.max_size() - 1).unwrap_err();
        assert_eq!(
            err,
            HeapError::ShrinkRejected {
                requested: 3,
                capacity: 4
            }
        );
        assert_eq!(heap.size(), 2);
        assert_eq!(heap.max_size(), 4);
        assert_eq!(drain(&heap), vec![8, 4]);
    }

    #[test]
    fn test_resize_grows_and_keeps_contents() {
        let heap = Heap::new(2);
        heap.extend([1, 2]).unwrap();
        assert!(heap.insert(3).is_err());

        heap.resize(5).unwrap().insert(3).unwrap();

        assert_eq!(heap.max_size(), 5);
        assert_eq!(drain(&heap), vec![3, 2, 1]);
    }

    #[test]
    fn test_resize_releases_lock_on_failure() {
        let heap = Heap::new(3);
        assert!(heap.resize(1).is_err());

        // Would deadlock if the failed resize kept the lock.
        heap.insert(1).unwrap();
        assert_eq!(heap.size(), 1);
    }

    #[test]
    fn test_right_child_wins_ties() {
        let heap = Heap::with_comparator(4, |a: &(u32, char), b: &(u32, char)| a.0.cmp(&b.0));
        heap.extend([(9, 'r'), (5, 'a'), (5, 'b'), (1, 'z')]).unwrap();

        // Root 9 is replaced by (1, 'z'), which sinks toward the right 5.
        assert_eq!(heap.extract_max().unwrap(), (9, 'r'));
        assert_eq!(heap.peek(), Some((5, 'b')));
    }

    #[test]
    fn test_for_each_visits_every_element_root_first() {
        let heap = Heap::new(6);
        heap.extend([2, 7, 3, 5]).unwrap();

        let mut seen = Vec::new();
        heap.for_each(|x| seen.push(*x));

        assert_eq!(seen.len(), 4);
        assert_eq!(seen[0], 7);
        seen.sort();
        assert_eq!(seen, vec![2, 3, 5, 7]);
    }

    #[test]
    fn test_comparator_is_shared() {
        let heap = Heap::with_comparator(2, |a: &i32, b: &i32| b.cmp(a));
        let other = Heap::with_shared_comparator(3, heap.comparator());
        other.extend([3, 1, 2]).unwrap();

        assert_eq!(other.into_sorted_vec(), vec![1, 2, 3]);
        assert_eq!((heap.comparator())(&1, &2), Ordering::Greater);
    }

    #[test]
    fn test_shared_elements_outlive_heap() {
        let shared = Arc::new(String::from("kept"));
        {
            let heap = Heap::new(1);
            heap.insert(Arc::clone(&shared)).unwrap();
            assert_eq!(Arc::strong_count(&shared), 2);
        }
        assert_eq!(Arc::strong_count(&shared), 1);
        assert_eq!(shared.as_str(), "kept");
    }

    #[test]
    fn test_try_with_comparator_reports_allocation_failure() {
        let result = Heap::try_with_comparator(usize::MAX, u64::cmp);

        assert!(matches!(
            result,
            Err(HeapError::AllocationFailure { requested, .. }) if requested == usize::MAX
        ));
    }

    #[test]
    fn test_resize_reports_allocation_failure() {
        let heap = Heap::new(2);
        heap.insert(5u64).unwrap();

        let err = heap.resize(usize::MAX).unwrap_err();

        assert!(matches!(
            err,
            HeapError::AllocationFailure { requested, .. } if requested == usize::MAX
        ));
        assert_eq!(heap.max_size(), 2);
        assert_eq!(heap.size(), 1);
        heap.insert(7).unwrap();
        assert_eq!(heap.peek(), Some(7));
    }

    #[test]
    fn test_borrowed_elements_and_local_comparator() {
        let owned = vec![String::from("pear"), String::from("fig"), String::from("banana")];
        let priority = vec![("fig", 3), ("banana", 2), ("pear", 1)];

        let heap = Heap::with_comparator(3, |a: &&str, b: &&str| {
            let rank = |s: &str| priority.iter().find(|(k, _)| *k == s).map(|(_, r)| *r);
            rank(a).cmp(&rank(b))
        });
        heap.extend(owned.iter().map(|s| s.as_str())).unwrap();

        assert_eq!(heap.into_sorted_vec(), vec!["fig", "banana", "pear"]);
        assert_eq!(owned.len(), 3);
    }

    #[test]
    fn test_concurrent_inserts() {
        const THREADS: usize = 8;
        const INSERTS: usize = 500;

        let heap = Heap::new(THREADS * INSERTS);

        thread::scope(|s| {
            for t in 0..THREADS {
                let heap = &heap;
                s.spawn(move || {
                    for i in 0..INSERTS {
                        heap.insert(t * INSERTS + i).unwrap();
                    }
                });
            }
        });

        assert_eq!(heap.size(), THREADS * INSERTS);
        assert!(heap.is_heap());

        let sorted = heap.into_sorted_vec();
        let expected: Vec<usize> = (0..THREADS * INSERTS).rev().collect();
        assert_eq!(sorted, expected);
    }

    #[test]
    fn test_concurrent_inserts_and_extracts() {
        let heap = Arc::new(Heap::new(16).auto_grow());
        heap.extend(0..1000u32).unwrap();

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let heap = Arc::clone(&heap);
                thread::spawn(move || {
                    let mut taken = Vec::new();
                    for _ in 0..200 {
                        taken.push(heap.extract_max().unwrap());
                    }
                    taken
                })
            })
            .collect();

        let mut taken: Vec<u32> = handles
            .into_iter()
            .flat_map(|h| h.join().unwrap())
            .collect();
        taken.sort_unstable();

        // The 800 largest values were removed exactly once each.
        assert_eq!(taken, (200..1000).collect::<Vec<_>>());
        assert_eq!(heap.size(), 200);
        assert!(heap.is_heap());
    }
}
