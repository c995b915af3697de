/*
SPDX-FileCopyrightText: Copyright 2026 Proctor Contributors
SPDX-License-Identifier: MIT
*/

//! Post-allocation balance analysis.
//!
//! # Status: advisory only
//!
//! The spread check is **computed and logged** after an allocation run; it
//! never invalidates the allocation.  The fewest-duties-first selection rule
//! keeps the spread between the most- and least-loaded teacher of a pool at
//! 1 or less whenever demand can be spread across distinct dates; pathological
//! demand patterns (one date needing far more staff than the pool holds) can
//! widen it.  A widened spread signals understaffing to the person running
//! the allocation, the same way the forced-overflow advisories do.
//!
//! # Guarantee being checked
//!
//! For a pool where total demand divides across the dates without forcing
//! overflow, `max(count) − min(count) ≤ 1`, with the remainder of an uneven
//! division going to the earliest roster entries.  [`check_balance`] returns
//! `None` when that bound holds and `Some(report)` when it is exceeded.

use crate::roster::{DutyClass, TeacherDutyResult};

// ── Public API ────────────────────────────────────────────────────────────────

/// Duty-count spread of one pool, reported when it exceeds the guaranteed
/// bound of 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BalanceReport {
    pub duty_class: DutyClass,
    /// Highest per-teacher duty count in the pool.
    pub max: usize,
    /// Lowest per-teacher duty count in the pool.
    pub min: usize,
}

impl BalanceReport {
    /// `max − min`, always ≥ 2 when the report exists at all.
    pub fn spread(&self) -> usize {
        self.max - self.min
    }
}

/// Check the duty-count spread of one pool.
///
/// Returns `None` if the pool is balanced (spread ≤ 1) or has fewer than two
/// members (a single teacher cannot be unbalanced against anyone).
///
/// Returns `Some(report)` if the spread exceeds 1. The caller should emit a
/// warning; the allocation itself stays valid.
pub fn check_balance(results: &[TeacherDutyResult], class: DutyClass) -> Option<BalanceReport> {
    let counts: Vec<usize> = results
        .iter()
        .filter(|r| r.duty_class == class)
        .map(|r| r.assignments.len())
        .collect();

    if counts.len() < 2 {
        return None;
    }

    let max = counts.iter().copied().max().unwrap_or(0);
    let min = counts.iter().copied().min().unwrap_or(0);

    if max - min > 1 {
        Some(BalanceReport {
            duty_class: class,
            max,
            min,
        })
    } else {
        None
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn result_with_count(serial: u32, class: DutyClass, count: usize) -> TeacherDutyResult {
        use crate::roster::{DutyAssignment, Session};
        TeacherDutyResult {
            serial,
            name: format!("Teacher{serial}"),
            department: "DeptA".into(),
            duty_class: class,
            assignments: (0..count)
                .map(|day| DutyAssignment {
                    date: format!("2026-03-{:02}", day + 1),
                    session: Session::Forenoon,
                })
                .collect(),
        }
    }

    #[test]
    fn balanced_pool_reports_nothing() {
        let results = vec![
            result_with_count(1, DutyClass::Invigilator, 2),
            result_with_count(2, DutyClass::Invigilator, 2),
            result_with_count(3, DutyClass::Invigilator, 1),
        ];
        assert_eq!(check_balance(&results, DutyClass::Invigilator), None);
    }

    #[test]
    fn wide_spread_is_reported() {
        let results = vec![
            result_with_count(1, DutyClass::Invigilator, 3),
            result_with_count(2, DutyClass::Invigilator, 1),
            result_with_count(3, DutyClass::Invigilator, 1),
        ];
        let report = check_balance(&results, DutyClass::Invigilator).expect("spread of 2");
        assert_eq!(report.max, 3);
        assert_eq!(report.min, 1);
        assert_eq!(report.spread(), 2);
        assert_eq!(report.duty_class, DutyClass::Invigilator);
    }

    #[test]
    fn pools_are_checked_separately() {
        // A wide squad spread must not be attributed to the invigilator pool.
        let results = vec![
            result_with_count(1, DutyClass::Invigilator, 2),
            result_with_count(2, DutyClass::Invigilator, 2),
            result_with_count(3, DutyClass::Squad, 4),
            result_with_count(4, DutyClass::Squad, 1),
        ];
        assert_eq!(check_balance(&results, DutyClass::Invigilator), None);
        let squad = check_balance(&results, DutyClass::Squad).expect("squad spread of 3");
        assert_eq!(squad.spread(), 3);
    }

    #[test]
    fn empty_pool_reports_nothing() {
        assert_eq!(check_balance(&[], DutyClass::Squad), None);
    }

    #[test]
    fn single_member_pool_reports_nothing() {
        let results = vec![result_with_count(1, DutyClass::Squad, 5)];
        assert_eq!(check_balance(&results, DutyClass::Squad), None);
    }
}
