//! Employee rostering fixtures.
//!
//! Shifts are half-open `[start, end)` intervals. An employee id of
//! [`UNASSIGNED`] means the shift has nobody yet.

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

pub const UNASSIGNED: i64 = -1;

#[derive(Debug)]
pub struct Employee {
    pub id: i64,
    pub name: &'static str,
    pub skills: Vec<&'static str>,
}

impl Employee {
    pub fn new(id: i64, name: &'static str, skills: &[&'static str]) -> Arc<Self> {
        Arc::new(Self {
            id,
            name,
            skills: skills.to_vec(),
        })
    }

    pub fn has_skill(&self, skill: &str) -> bool {
        self.skills.iter().any(|s| *s == skill)
    }
}

#[derive(Debug)]
pub struct Shift {
    pub id: i64,
    pub start: i64,
    pub end: i64,
    pub required_skill: &'static str,
    employee: AtomicI64,
}

impl Shift {
    pub fn new(id: i64, start: i64, end: i64, required_skill: &'static str) -> Arc<Self> {
        Arc::new(Self {
            id,
            start,
            end,
            required_skill,
            employee: AtomicI64::new(UNASSIGNED),
        })
    }

    pub fn employee(&self) -> i64 {
        self.employee.load(Ordering::Relaxed)
    }

    pub fn assign(&self, employee: i64) {
        self.employee.store(employee, Ordering::Relaxed);
    }

    pub fn is_assigned(&self) -> bool {
        self.employee() != UNASSIGNED
    }

    pub fn overlaps(&self, other: &Shift) -> bool {
        self.start < other.end && other.start < self.end
    }
}

/// Pairs of shifts of one employee that overlap, counted from scratch.
pub fn overlapping_pairs(shifts: &[Arc<Shift>]) -> i64 {
    let mut count = 0;
    for (i, a) in shifts.iter().enumerate() {
        for b in &shifts[i + 1..] {
            if a.is_assigned() && a.employee() == b.employee() && a.overlaps(b) {
                count += 1;
            }
        }
    }
    count
}

/// Assigned shifts whose employee lacks the required skill.
pub fn missing_skills(shifts: &[Arc<Shift>], employees: &[Arc<Employee>]) -> i64 {
    shifts
        .iter()
        .filter(|s| {
            employees
                .iter()
                .find(|e| e.id == s.employee())
                .is_some_and(|e| !e.has_skill(s.required_skill))
        })
        .count() as i64
}
