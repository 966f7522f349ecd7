//! A binary max-heap shared between threads behind a single mutex, plus a
//! heap sort built on top of it.

pub mod cli;
pub mod config;
pub mod heap;
pub mod output;
pub mod progress;
pub mod sort;
pub mod stress;
pub mod types;

pub use heap::{Comparator, Growth, Heap, HeapError};
pub use sort::{heap_sort, heap_sort_by};
