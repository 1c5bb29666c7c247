//! Weighted task fixtures for grouping tests.
//!
//! # Example
//!
//! ```
//! use solverforge_test::task::{sum_by_project, Task};
//!
//! let tasks = vec![Task::new(1, 0, 10), Task::new(2, 0, 20), Task::new(3, 1, 5)];
//! let sums = sum_by_project(&tasks);
//! assert_eq!(sums[&0], 30);
//! assert_eq!(sums[&1], 5);
//! ```

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

/// A task with a weight, assigned to a project.
#[derive(Debug)]
pub struct Task {
    pub id: i64,
    project: AtomicI64,
    weight: AtomicI64,
}

impl Task {
    pub fn new(id: i64, project: i64, weight: i64) -> Arc<Self> {
        Arc::new(Self {
            id,
            project: AtomicI64::new(project),
            weight: AtomicI64::new(weight),
        })
    }

    pub fn project(&self) -> i64 {
        self.project.load(Ordering::Relaxed)
    }

    pub fn set_project(&self, project: i64) {
        self.project.store(project, Ordering::Relaxed);
    }

    pub fn weight(&self) -> i64 {
        self.weight.load(Ordering::Relaxed)
    }

    pub fn set_weight(&self, weight: i64) {
        self.weight.store(weight, Ordering::Relaxed);
    }
}

/// Total weight per project, recomputed from scratch.
pub fn sum_by_project(tasks: &[Arc<Task>]) -> BTreeMap<i64, i64> {
    let mut sums = BTreeMap::new();
    for task in tasks {
        *sums.entry(task.project()).or_insert(0) += task.weight();
    }
    sums
}
