use crate::heap::{Growth, Heap, HeapError};
use crate::progress::StressProgress;
use crate::types::{CapacityChange, StressChecks, StressReport, StressTotals};
use rayon::prelude::*;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

/// Drives concurrent inserts into one shared heap, then checks that nothing
/// was lost or misplaced.
pub struct StressRunner {
    threads: usize,
    inserts_per_thread: usize,
    capacity: usize,
    growth: Growth,
}

impl StressRunner {
    /// `capacity: None` sizes the heap to hold every insert up front.
    pub fn new(
        threads: usize,
        inserts_per_thread: usize,
        capacity: Option<usize>,
        growth: Growth,
    ) -> Result<Self, StressError> {
        // Auto-detect thread count if 0
        let threads = if threads == 0 {
            rayon::current_num_threads()
        } else {
            threads
        };

        let total = threads.saturating_mul(inserts_per_thread);
        let capacity = capacity.unwrap_or(total);

        if growth == Growth::Fixed && capacity < total {
            return Err(StressError::TooSmall { capacity, total });
        }

        Ok(Self {
            threads,
            inserts_per_thread,
            capacity,
            growth,
        })
    }

    pub fn total_inserts(&self) -> usize {
        self.threads.saturating_mul(self.inserts_per_thread)
    }

    pub fn run(&self, progress: &StressProgress) -> Result<StressReport, StressError> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.threads)
            .build()
            .map_err(StressError::Pool)?;

        let heap = Heap::try_with_comparator(self.capacity, u64::cmp)?.with_growth(self.growth);
        let inserted = AtomicU64::new(0);
        let per_thread = self.inserts_per_thread;
        let started = Instant::now();

        log::info!(
            "stress: {} threads x {} inserts, {} initial slots ({:?})",
            self.threads,
            per_thread,
            self.capacity,
            self.growth
        );

        pool.install(|| {
            (0..self.threads).into_par_iter().try_for_each(|thread| {
                for i in 0..per_thread {
                    heap.insert(scramble((thread * per_thread + i) as u64))?;

                    let count = inserted.fetch_add(1, Ordering::Relaxed) + 1;
                    if count % 1000 == 0 {
                        progress.update(count, self.threads);
                    }
                }
                Ok::<(), HeapError>(())
            })
        })?;

        progress.finish();

        let expected_size = self.total_inserts();
        let final_size = heap.size();
        let heap_property = heap.is_heap();
        let final_slots = heap.max_size();

        let drained = heap.into_sorted_vec();
        let drained_in_order = drained.windows(2).all(|w| w[0] >= w[1]);
        let elapsed_ms = started.elapsed().as_millis() as u64;

        log::info!("stress: finished in {} ms", elapsed_ms);

        Ok(StressReport {
            threads: self.threads,
            inserts_per_thread: per_thread,
            growth: self.growth,
            capacity: CapacityChange {
                initial: self.capacity,
                final_slots,
                storage_bytes: final_slots.saturating_mul(std::mem::size_of::<u64>()) as u64,
            },
            totals: StressTotals {
                expected_size,
                final_size,
                drained: drained.len(),
            },
            checks: StressChecks {
                size_matches: final_size == expected_size && drained.len() == expected_size,
                heap_property,
                drained_in_order,
            },
            elapsed_ms,
        })
    }
}

/// Spreads sequential ids over the value range so inserts don't arrive sorted.
fn scramble(id: u64) -> u64 {
    id.wrapping_mul(0x9E37_79B9_7F4A_7C15).rotate_left(17)
}

#[derive(Debug)]
pub enum StressError {
    TooSmall { capacity: usize, total: usize },
    Pool(rayon::ThreadPoolBuildError),
    Heap(HeapError),
}

impl From<HeapError> for StressError {
    fn from(e: HeapError) -> Self {
        StressError::Heap(e)
    }
}

impl std::fmt::Display for StressError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StressError::TooSmall { capacity, total } => write!(
                f,
                "Fixed heap of {} slots cannot hold {} inserts (use --growth double)",
                capacity, total
            ),
            StressError::Pool(e) => write!(f, "Failed to start thread pool: {}", e),
            StressError::Heap(e) => write!(f, "Heap operation failed: {}", e),
        }
    }
}

impl std::error::Error for StressError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stress_fixed_heap() {
        let runner = StressRunner::new(4, 250, None, Growth::Fixed).unwrap();
        let report = runner.run(&StressProgress::new(false, 0)).unwrap();

        assert_eq!(report.totals.expected_size, 1000);
        assert_eq!(report.totals.final_size, 1000);
        assert_eq!(report.capacity.final_slots, 1000);
        assert!(report.checks.all_passed());
    }

    #[test]
    fn test_stress_growing_heap() {
        let runner = StressRunner::new(3, 100, Some(1), Growth::Double).unwrap();
        let report = runner.run(&StressProgress::new(false, 0)).unwrap();

        assert_eq!(report.totals.final_size, 300);
        assert_eq!(report.capacity.initial, 1);
        assert_eq!(report.capacity.final_slots, 512);
        assert!(report.checks.all_passed());
    }

    #[test]
    fn test_fixed_heap_too_small_is_rejected() {
        let result = StressRunner::new(2, 10, Some(5), Growth::Fixed);

        assert!(matches!(
            result,
            Err(StressError::TooSmall {
                capacity: 5,
                total: 20
            })
        ));
    }

    #[test]
    fn test_oversized_capacity_reports_allocation_failure() {
        let runner = StressRunner::new(1, 1, Some(usize::MAX / 2), Growth::Double).unwrap();
        let result = runner.run(&StressProgress::new(false, 0));

        assert!(matches!(
            result,
            Err(StressError::Heap(HeapError::AllocationFailure { .. }))
        ));
    }

    #[test]
    fn test_auto_thread_count() {
        let runner = StressRunner::new(0, 1, None, Growth::Fixed).unwrap();
        assert_eq!(runner.total_inserts(), rayon::current_num_threads());
    }

    #[test]
    fn test_scramble_is_injective_on_small_range() {
        let mut values: Vec<u64> = (0..10_000).map(scramble).collect();
        values.sort_unstable();
        values.dedup();
        assert_eq!(values.len(), 10_000);
    }
}
