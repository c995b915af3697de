/*
SPDX-FileCopyrightText: Copyright 2026 Proctor Contributors
SPDX-License-Identifier: MIT
*/

//! Result projections and table rendering.
//!
//! Everything here is a pure projection of the allocator's result list; no
//! new allocation output is produced:
//!
//! * [`slot_wise`] flattens the per-teacher results into per-slot entries,
//!   the view an exam office pins up outside the halls.
//! * [`AllocationSummary`] computes the headline counters (pool sizes, demand
//!   vs. assigned, unfilled positions).
//! * [`duty_table`] / [`slot_table`] render both views as terminal tables.

use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::roster::{DutyClass, ExamRequirement, Session, Teacher, TeacherDutyResult};

// ── Slot-wise projection ──────────────────────────────────────────────────────

/// One row of the slot-wise view: a single teacher standing a single duty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotEntry {
    pub date: String,
    pub session: Session,
    pub duty_class: DutyClass,
    pub name: String,
    pub department: String,
}

/// Flatten results into the slot-wise view, sorted by date, then session
/// (FN before AN), then duty class (invigilators before squad), then name.
pub fn slot_wise(results: &[TeacherDutyResult]) -> Vec<SlotEntry> {
    let mut entries: Vec<SlotEntry> = results
        .iter()
        .flat_map(|r| {
            r.assignments.iter().map(|a| SlotEntry {
                date: a.date.clone(),
                session: a.session,
                duty_class: r.duty_class,
                name: r.name.clone(),
                department: r.department.clone(),
            })
        })
        .collect();

    entries.sort_by(|a, b| {
        a.date
            .cmp(&b.date)
            .then(a.session.cmp(&b.session))
            .then(a.duty_class.cmp(&b.duty_class))
            .then(a.name.cmp(&b.name))
    });
    entries
}

// ── Summary counters ──────────────────────────────────────────────────────────

/// Headline counters for one allocation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AllocationSummary {
    pub total_teachers: usize,
    pub invigilators: usize,
    pub squad: usize,
    /// Number of requirement records (slots).
    pub sessions: usize,
    pub unique_dates: usize,
    /// Total headcount the plan demands across both pools.
    pub duties_required: usize,
    /// Total duties actually handed out.
    pub duties_assigned: usize,
}

impl AllocationSummary {
    pub fn compute(
        teachers: &[Teacher],
        requirements: &[ExamRequirement],
        results: &[TeacherDutyResult],
    ) -> Self {
        let mut dates: Vec<&str> = requirements.iter().map(|r| r.date.as_str()).collect();
        dates.sort_unstable();
        dates.dedup();

        AllocationSummary {
            total_teachers: teachers.len(),
            invigilators: teachers
                .iter()
                .filter(|t| t.duty_class == DutyClass::Invigilator)
                .count(),
            squad: teachers
                .iter()
                .filter(|t| t.duty_class == DutyClass::Squad)
                .count(),
            sessions: requirements.len(),
            unique_dates: dates.len(),
            duties_required: requirements
                .iter()
                .map(|r| (r.invigilators_needed + r.squad_needed) as usize)
                .sum(),
            duties_assigned: results.iter().map(|r| r.assignments.len()).sum(),
        }
    }

    /// Demanded positions that nobody was assigned to (pool exhausted).
    pub fn unfilled(&self) -> usize {
        self.duties_required.saturating_sub(self.duties_assigned)
    }
}

// ── Table rendering ───────────────────────────────────────────────────────────

#[derive(Tabled)]
struct DutyRow {
    #[tabled(rename = "Sl No")]
    serial: u32,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Department")]
    department: String,
    #[tabled(rename = "Duty Type")]
    duty_class: String,
    #[tabled(rename = "Total")]
    total: usize,
    #[tabled(rename = "Assigned Duties")]
    duties: String,
}

#[derive(Tabled)]
struct SlotRow {
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "Session")]
    session: String,
    #[tabled(rename = "Duty Type")]
    duty_class: String,
    #[tabled(rename = "Teacher Name")]
    name: String,
    #[tabled(rename = "Department")]
    department: String,
}

/// `date(SESSION)` list, e.g. `2026-03-02(FN)  2026-03-03(AN)`.
fn format_duties(result: &TeacherDutyResult) -> String {
    result
        .assignments
        .iter()
        .map(|a| a.to_string())
        .collect::<Vec<String>>()
        .join("  ")
}

/// Render the per-teacher duty table.
pub fn duty_table(results: &[TeacherDutyResult]) -> String {
    let rows: Vec<DutyRow> = results
        .iter()
        .map(|r| DutyRow {
            serial: r.serial,
            name: r.name.clone(),
            department: r.department.clone(),
            duty_class: r.duty_class.to_string(),
            total: r.assignments.len(),
            duties: format_duties(r),
        })
        .collect();
    Table::new(rows).with(Style::sharp()).to_string()
}

/// Render the slot-wise duty table.
pub fn slot_table(results: &[TeacherDutyResult]) -> String {
    let rows: Vec<SlotRow> = slot_wise(results)
        .into_iter()
        .map(|e| SlotRow {
            date: e.date,
            session: e.session.to_string(),
            duty_class: e.duty_class.to_string(),
            name: e.name,
            department: e.department,
        })
        .collect();
    Table::new(rows).with(Style::sharp()).to_string()
}

// ── Tests ─────────────────────────────────────────────────────────────────────
