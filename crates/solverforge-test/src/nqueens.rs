//! N-Queens test fixtures.
//!
//! One queen per column; the row is the planning variable. Two queens
//! conflict when they share a row or a diagonal.

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use solverforge_core::score::SimpleScore;

/// A queen entity in the N-Queens problem.
#[derive(Debug)]
pub struct Queen {
    pub id: i64,
    pub column: i64,
    row: AtomicI64,
}

impl Queen {
    pub fn new(id: i64, column: i64, row: i64) -> Arc<Self> {
        Arc::new(Self {
            id,
            column,
            row: AtomicI64::new(row),
        })
    }

    pub fn row(&self) -> i64 {
        self.row.load(Ordering::Relaxed)
    }

    pub fn set_row(&self, row: i64) {
        self.row.store(row, Ordering::Relaxed);
    }

    pub fn ascending_diagonal(&self) -> i64 {
        self.row() + self.column
    }

    pub fn descending_diagonal(&self) -> i64 {
        self.row() - self.column
    }
}

/// Queens with `rows[i]` in column `i`.
pub fn board(rows: &[i64]) -> Vec<Arc<Queen>> {
    rows.iter()
        .enumerate()
        .map(|(column, &row)| Queen::new(column as i64, column as i64, row))
        .collect()
}

/// Pairs sharing a row, counted from scratch.
pub fn row_conflicts(queens: &[Arc<Queen>]) -> i64 {
    count_pairs(queens, |a, b| a.row() == b.row())
}

/// Pairs sharing a row or a diagonal, counted from scratch. A pair on a
/// row and a diagonal at once counts once per shared line.
pub fn calculate_conflicts(queens: &[Arc<Queen>]) -> i64 {
    row_conflicts(queens)
        + count_pairs(queens, |a, b| a.ascending_diagonal() == b.ascending_diagonal())
        + count_pairs(queens, |a, b| a.descending_diagonal() == b.descending_diagonal())
}

/// One soft point lost per conflict.
pub fn conflict_score(queens: &[Arc<Queen>]) -> SimpleScore {
    SimpleScore::of(-calculate_conflicts(queens))
}

fn count_pairs(queens: &[Arc<Queen>], same: impl Fn(&Queen, &Queen) -> bool) -> i64 {
    let mut count = 0;
    for (i, a) in queens.iter().enumerate() {
        for b in &queens[i + 1..] {
            if same(a, b) {
                count += 1;
            }
        }
    }
    count
}
