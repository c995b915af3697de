/*
SPDX-FileCopyrightText: Copyright 2026 Proctor Contributors
SPDX-License-Identifier: MIT
*/

//! Core data structures for the duty allocator.
//!
//! The types here model the two sides of the allocation pipeline:
//!
//! ```text
//! roster.yaml ──(config)──► Teacher ───────────┐
//!                                              ├─(allocator)─► TeacherDutyResult ─(report)─► tables / YAML
//! exam_plan.yaml ──(config)──► ExamRequirement ┘
//!                              ↑ validated input               ↑ output, serial-ordered
//! ```
//!
//! # Ownership model
//! `Teacher` and `ExamRequirement` are immutable inputs: the allocator borrows
//! them and never mutates them.  All mutable bookkeeping lives in per-call
//! state inside `allocator::allocate`, and the output `TeacherDutyResult`s are
//! built fresh on every call.
//!
//! # Date strings
//! `date` fields are plain strings whose lexicographic order must equal their
//! chronological order.  The `config` module guarantees this by normalising
//! every accepted input format to ISO `YYYY-MM-DD` before the values reach
//! the core types.

use std::fmt;

use serde::{Deserialize, Serialize};

// ── Session ───────────────────────────────────────────────────────────────────

/// One of the two exam sessions held on a date.
///
/// The derived `Ord` puts forenoon before afternoon, which is the ordering
/// every sorted view in the system relies on (requirement processing order,
/// per-teacher assignment lists, the slot-wise projection).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Session {
    /// Forenoon session, written `FN` in input files and reports.
    #[serde(rename = "FN")]
    Forenoon,
    /// Afternoon session, written `AN`.
    #[serde(rename = "AN")]
    Afternoon,
}

impl Session {
    /// Parse a session label, case-insensitively.
    ///
    /// Returns `None` for anything that is neither `FN` nor `AN`; the
    /// ingestion layer decides how to fall back.
    pub fn from_label(label: &str) -> Option<Self> {
        let label = label.trim();
        if label.eq_ignore_ascii_case("FN") {
            Some(Session::Forenoon)
        } else if label.eq_ignore_ascii_case("AN") {
            Some(Session::Afternoon)
        } else {
            None
        }
    }
}

impl fmt::Display for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Session::Forenoon => write!(f, "FN"),
            Session::Afternoon => write!(f, "AN"),
        }
    }
}

// ── Duty class ────────────────────────────────────────────────────────────────

/// Duty classification of a teacher.
///
/// The two classes form independent allocation pools: a squad slot is never
/// filled by an invigilator-classified teacher and vice versa.  The derived
/// `Ord` (invigilator first) is the ordering the slot-wise report uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum DutyClass {
    /// Sits inside an exam hall for the whole session.
    Invigilator,
    /// Patrols across halls during the session.
    Squad,
}

impl DutyClass {
    /// Parse a duty-class label, case-insensitively.
    ///
    /// Returns `None` for unrecognised labels; the ingestion layer decides how
    /// to fall back.
    pub fn from_label(label: &str) -> Option<Self> {
        let label = label.trim();
        if label.eq_ignore_ascii_case("squad") {
            Some(DutyClass::Squad)
        } else if label.eq_ignore_ascii_case("invigilator") {
            Some(DutyClass::Invigilator)
        } else {
            None
        }
    }
}

impl fmt::Display for DutyClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DutyClass::Invigilator => write!(f, "Invigilator"),
            DutyClass::Squad => write!(f, "Squad"),
        }
    }
}

// ── Teacher (input) ───────────────────────────────────────────────────────────

/// One teacher on the roster.
///
/// `serial` is the unique, stable ordering key: results are returned in
/// ascending serial order, and within equal duty counts the allocator prefers
/// the teacher that appears earlier in the roster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Teacher {
    /// Unique serial number from the roster.
    pub serial: u32,
    pub name: String,
    pub department: String,
    /// Which allocation pool this teacher belongs to.
    pub duty_class: DutyClass,
}

// ── ExamRequirement (input) ───────────────────────────────────────────────────

/// Staffing demand for one (date, session) slot.
///
/// Dates need not be unique across records: two records for the same
/// (date, session) are processed as two separate slots, in input order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExamRequirement {
    /// ISO `YYYY-MM-DD` date string (normalised by the ingestion layer).
    pub date: String,
    pub session: Session,
    /// Invigilators needed for this slot.
    pub invigilators_needed: u32,
    /// Squad members needed for this slot.
    pub squad_needed: u32,
}

impl ExamRequirement {
    /// Headcount this slot demands from the given pool.
    pub fn needed(&self, class: DutyClass) -> u32 {
        match class {
            DutyClass::Invigilator => self.invigilators_needed,
            DutyClass::Squad => self.squad_needed,
        }
    }
}

// ── DutyAssignment (output) ───────────────────────────────────────────────────

/// One unit of duty given to one teacher.
///
/// The derived `Ord` (date first, then session with FN before AN) is exactly
/// the order assignment lists are kept in.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DutyAssignment {
    pub date: String,
    pub session: Session,
}

impl fmt::Display for DutyAssignment {
    /// Compact `date(SESSION)` form used in duty lists, e.g. `2026-03-02(FN)`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.date, self.session)
    }
}

// ── TeacherDutyResult (output) ────────────────────────────────────────────────

/// Per-teacher allocation result: the input identity fields plus the ordered
/// list of assigned duties.
///
/// `allocator::allocate` returns exactly one of these per input teacher,
/// sorted by serial ascending, with `assignments` sorted by date then session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeacherDutyResult {
    pub serial: u32,
    pub name: String,
    pub department: String,
    pub duty_class: DutyClass,
    pub assignments: Vec<DutyAssignment>,
}

// ── Tests ─────────────────────────────────────────────────────────────────────
