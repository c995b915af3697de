/*
SPDX-FileCopyrightText: Copyright 2026 Proctor Contributors
SPDX-License-Identifier: MIT
*/

//! The duty allocator.
//!
//! [`allocate`] distributes exam-duty slots across the teacher roster: each
//! [`ExamRequirement`] names a (date, session) slot and how many invigilators
//! and squad members it needs, and the allocator fills every slot from the
//! matching pool, balancing duty counts as it goes.  The result is one
//! [`TeacherDutyResult`] per roster entry plus an advisory list of
//! forced-overflow picks.
//!
//! # Determinism
//!
//! | Concern | Mechanism |
//! |---|---|
//! | Slot processing order | requirements stable-sorted by (date, session FN before AN) |
//! | Fairness | stable fewest-duties-first sort of eligible pool positions per slot |
//! | Tie-break | stable sorts preserve roster order, so the earliest roster entry wins ties |
//! | State | all per-run bookkeeping is local to one `allocate` call |
//!
//! # Selection passes
//!
//! Each slot is filled in up to three passes over its pool:
//!
//! 1. **Diversify**: walk the eligible members (not yet on duty that date),
//!    fewest duties first, picking at most one teacher per department.
//! 2. **Fill**: if the slot is still short, walk the same order again and
//!    pick any remaining eligible member, departments repeating.
//! 3. **Forced overflow**: if every eligible member is taken (the whole pool
//!    is already on duty that date), pick from the full pool, fewest duties
//!    first.  Each such pick double-books a teacher on that date and is
//!    reported as an [`OverflowAdvisory`] rather than absorbed silently.
//!
//! A pool member is picked at most once per slot, so a slot can fall short
//! only when its demand exceeds the pool size.
//!
//! # Example
//! ```rust,ignore
//! let allocation = allocate(&teachers, &requirements);
//! for advisory in &allocation.overflows {
//!     eprintln!("understaffed: {advisory:?}");
//! }
//! render(&allocation.results);
//! ```

pub mod balance;

pub use balance::{check_balance, BalanceReport};

use std::collections::HashSet;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::roster::{
    DutyAssignment, DutyClass, ExamRequirement, Session, Teacher, TeacherDutyResult,
};

// ── Output types ──────────────────────────────────────────────────────────────

/// One forced-overflow pick: `teacher` was given a second duty on `date`
/// because every member of the pool was already on duty that date.
///
/// Advisories signal understaffing: the demand on that date exceeded what the
/// pool could cover without double-booking.  They never invalidate the
/// allocation itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OverflowAdvisory {
    pub date: String,
    pub session: Session,
    pub duty_class: DutyClass,
    pub serial: u32,
    pub name: String,
}

/// Result of one allocation run.
///
/// `results` is exactly the per-teacher output contract: one entry per input
/// teacher, serial-ascending, assignment lists date-then-session ordered.
/// `overflows` carries one advisory per forced-overflow pick, in slot
/// processing order.  Callers that only care about the assignments read
/// `results` and ignore `overflows`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Allocation {
    pub results: Vec<TeacherDutyResult>,
    pub overflows: Vec<OverflowAdvisory>,
}

// ── Per-call pool state ───────────────────────────────────────────────────────

/// Working state for one duty pool during a single `allocate` call.
///
/// Parallel arrays indexed by *pool position* (the order members appear in the
/// roster): `members[i]` is the roster index, `assignments[i]` the duties
/// accumulated so far, `busy_dates[i]` the dates already claimed.  Pool
/// position, not serial number, is the tie-break axis; roster order is
/// significant input.
struct Pool {
    class: DutyClass,
    /// Roster indices of the members, in roster order.
    members: Vec<usize>,
    /// Duties accumulated per member, parallel to `members`.
    assignments: Vec<Vec<DutyAssignment>>,
    /// Dates each member is already on duty for, parallel to `members`.
    busy_dates: Vec<HashSet<String>>,
}

impl Pool {
    /// Partition the roster: collect the members of `class`, preserving
    /// relative roster order.
    fn new(class: DutyClass, teachers: &[Teacher]) -> Self {
        let members: Vec<usize> = teachers
            .iter()
            .enumerate()
            .filter(|(_, t)| t.duty_class == class)
            .map(|(idx, _)| idx)
            .collect();
        let len = members.len();
        Pool {
            class,
            members,
            assignments: vec![Vec::new(); len],
            busy_dates: vec![HashSet::new(); len],
        }
    }

    /// Fill one slot from this pool.
    ///
    /// Runs the three selection passes described in the module docs, appends
    /// the slot to every picked member's assignment list, and marks the date
    /// claimed for them.  Pass-3 picks push an [`OverflowAdvisory`] onto
    /// `overflows`.
    fn fill_slot(
        &mut self,
        teachers: &[Teacher],
        date: &str,
        session: Session,
        needed: u32,
        overflows: &mut Vec<OverflowAdvisory>,
    ) {
        if needed == 0 || self.members.is_empty() {
            return;
        }
        let needed = needed as usize;

        // Eligible = pool positions not yet on duty this date, fewest duties
        // first.  The sort is stable, so equal counts keep roster order.
        let mut eligible: Vec<usize> = (0..self.members.len())
            .filter(|&pos| !self.busy_dates[pos].contains(date))
            .collect();
        eligible.sort_by_key(|&pos| self.assignments[pos].len());

        let mut selected: Vec<usize> = Vec::with_capacity(needed);

        // ── Pass 1: diversify departments ─────────────────────────────────────
        let mut seen_departments: HashSet<&str> = HashSet::new();
        for &pos in &eligible {
            if selected.len() >= needed {
                break;
            }
            let department = teachers[self.members[pos]].department.as_str();
            if seen_departments.insert(department) {
                selected.push(pos);
            }
        }

        // ── Pass 2: fill, departments repeating ───────────────────────────────
        if selected.len() < needed {
            for &pos in &eligible {
                if selected.len() >= needed {
                    break;
                }
                if !selected.contains(&pos) {
                    selected.push(pos);
                }
            }
        }

        // ── Pass 3: forced overflow ───────────────────────────────────────────
        // Reached only when every date-eligible member is already selected, so
        // each pick below double-books someone on `date`.
        if selected.len() < needed {
            let mut remaining: Vec<usize> = (0..self.members.len())
                .filter(|pos| !selected.contains(pos))
                .collect();
            remaining.sort_by_key(|&pos| self.assignments[pos].len());

            for &pos in &remaining {
                if selected.len() >= needed {
                    break;
                }
                let teacher = &teachers[self.members[pos]];
                warn!(
                    teacher = %teacher.name,
                    serial = teacher.serial,
                    date = %date,
                    session = %session,
                    pool = %self.class,
                    "pool exhausted for this date — double-booking as last resort"
                );
                overflows.push(OverflowAdvisory {
                    date: date.to_string(),
                    session,
                    duty_class: self.class,
                    serial: teacher.serial,
                    name: teacher.name.clone(),
                });
                selected.push(pos);
            }
        }

        if selected.len() < needed {
            warn!(
                date = %date,
                session = %session,
                pool = %self.class,
                needed = needed,
                filled = selected.len(),
                "slot demand exceeds pool size — slot left short"
            );
        }

        for &pos in &selected {
            self.assignments[pos].push(DutyAssignment {
                date: date.to_string(),
                session,
            });
            self.busy_dates[pos].insert(date.to_string());
            debug!(
                serial = teachers[self.members[pos]].serial,
                date = %date,
                session = %session,
                pool = %self.class,
                duties = self.assignments[pos].len(),
                "duty assigned"
            );
        }
    }

    /// Move every member's accumulated assignments into `per_teacher`,
    /// indexed by roster position.
    fn drain_into(self, per_teacher: &mut [Vec<DutyAssignment>]) {
        let Pool {
            members,
            assignments,
            ..
        } = self;
        for (pos, duties) in assignments.into_iter().enumerate() {
            per_teacher[members[pos]] = duties;
        }
    }
}

// ── Public entry point ────────────────────────────────────────────────────────

/// Allocate every requirement slot across the roster.
///
/// Pure function of its two inputs: no shared state, no I/O, deterministic for
/// a given input including input order (roster order is the tie-break axis).
/// Degenerate inputs (empty roster, empty requirements, zero-valued counts)
/// yield well-formed results with empty assignment lists, never an error.
///
/// The invigilator and squad pools are allocated independently: they never
/// compete for the same slot headcount.
pub fn allocate(teachers: &[Teacher], requirements: &[ExamRequirement]) -> Allocation {
    info!(
        teachers = teachers.len(),
        requirements = requirements.len(),
        "starting duty allocation"
    );

    let mut invigilators = Pool::new(DutyClass::Invigilator, teachers);
    let mut squad = Pool::new(DutyClass::Squad, teachers);

    // Fix the processing order: earliest slot gets first pick of the
    // least-loaded teachers.  Stable sort keeps duplicate (date, session)
    // records in input order.
    let mut ordered: Vec<&ExamRequirement> = requirements.iter().collect();
    ordered.sort_by(|a, b| a.date.cmp(&b.date).then(a.session.cmp(&b.session)));

    let mut overflows: Vec<OverflowAdvisory> = Vec::new();

    for req in &ordered {
        invigilators.fill_slot(
            teachers,
            &req.date,
            req.session,
            req.needed(DutyClass::Invigilator),
            &mut overflows,
        );
        squad.fill_slot(
            teachers,
            &req.date,
            req.session,
            req.needed(DutyClass::Squad),
            &mut overflows,
        );
    }

    // ── Assemble results in serial order ──────────────────────────────────────
    let mut per_teacher: Vec<Vec<DutyAssignment>> = vec![Vec::new(); teachers.len()];
    invigilators.drain_into(&mut per_teacher);
    squad.drain_into(&mut per_teacher);

    let mut results: Vec<TeacherDutyResult> = teachers
        .iter()
        .zip(per_teacher)
        .map(|(teacher, mut assignments)| {
            assignments.sort();
            TeacherDutyResult {
                serial: teacher.serial,
                name: teacher.name.clone(),
                department: teacher.department.clone(),
                duty_class: teacher.duty_class,
                assignments,
            }
        })
        .collect();
    results.sort_by_key(|r| r.serial);

    info!(
        assigned = results.iter().map(|r| r.assignments.len()).sum::<usize>(),
        overflow_picks = overflows.len(),
        "duty allocation complete"
    );

    Allocation { results, overflows }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
