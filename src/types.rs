use crate::heap::Growth;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Descending,
    Ascending,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SortReport {
    pub order: SortOrder,
    pub count: usize,
    pub sorted: Vec<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StressReport {
    pub threads: usize,
    pub inserts_per_thread: usize,
    pub growth: Growth,
    pub capacity: CapacityChange,
    pub totals: StressTotals,
    pub checks: StressChecks,
    pub elapsed_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CapacityChange {
    pub initial: usize,
    pub final_slots: usize,
    pub storage_bytes: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StressTotals {
    pub expected_size: usize,
    pub final_size: usize,
    pub drained: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StressChecks {
    pub size_matches: bool,
    pub heap_property: bool,
    pub drained_in_order: bool,
}

impl StressChecks {
    pub fn all_passed(&self) -> bool {
        self.size_matches && self.heap_property && self.drained_in_order
    }
}
