//! Roster and exam plan ingestion.
//!
//! This module is the validation boundary of the system: it loads the two
//! YAML input files, normalises every loosely-formatted field, and hands the
//! allocator fully-validated [`Teacher`] and [`ExamRequirement`] records.
//! The allocator itself never sees raw strings for sessions, duty classes or
//! oddly-formatted dates.
//!
//! The expected roster structure is:
//! ```yaml
//! teachers:
//!   - serial: 1
//!     name: "A. Narayanan"
//!     department: "Physics"
//!     duty: "Invigilator"
//! ```
//!
//! and the exam plan structure is:
//! ```yaml
//! sessions:
//!   - date: "02-03-2026"
//!     session: "FN"
//!     invigilators: 3
//!     squad: 1
//! ```
//!
//! Dates are accepted as `YYYY-MM-DD`, `DD-MM-YYYY` or `DD/MM/YYYY` and
//! re-emitted as ISO `YYYY-MM-DD`, which makes lexicographic comparison equal
//! chronological comparison everywhere downstream.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::roster::{DutyClass, ExamRequirement, Session, Teacher};

// ── Error type ────────────────────────────────────────────────────────────────

/// Semantic validation failures raised while turning file rows into core
/// records.  File-level failures (missing file, unparseable YAML) are wrapped
/// by `anyhow` in the load functions instead.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum IngestError {
    /// Every roster row was dropped (missing names) or the list was empty.
    #[error("no usable teacher rows — ensure fields: serial, name, department, duty")]
    EmptyRoster,

    /// Every plan row was dropped (zero demand) or the list was empty.
    #[error("no exam sessions with non-zero demand — ensure fields: date, session, invigilators, squad")]
    EmptyPlan,

    /// Two roster rows carry the same serial number.
    #[error("duplicate serial {serial} in roster (rows {first_row} and {second_row})")]
    DuplicateSerial {
        serial: u32,
        first_row: usize,
        second_row: usize,
    },

    /// A plan date could not be parsed in any accepted format.
    #[error("unparseable date '{value}' (expected YYYY-MM-DD, DD-MM-YYYY or DD/MM/YYYY)")]
    BadDate { value: String },
}

// ── Private YAML deserialization types ────────────────────────────────────────

/// Top-level wrapper matching the roster file layout.
///
/// Kept private – callers work with validated [`Teacher`] records instead.
#[derive(Debug, Deserialize)]
struct RosterFile {
    teachers: Vec<RosterRow>,
}

/// Per-teacher fields as they appear in the roster file.
///
/// Everything except the name is optional so that partial rows are accepted
/// gracefully: a missing serial falls back to the row position, a missing or
/// unknown duty label falls back to `Invigilator`.
#[derive(Debug, Deserialize)]
struct RosterRow {
    #[serde(default)]
    serial: Option<u32>,
    #[serde(default)]
    name: String,
    #[serde(default)]
    department: String,
    #[serde(default)]
    duty: String,
}

/// Top-level wrapper matching the exam plan file layout.
#[derive(Debug, Deserialize)]
struct PlanFile {
    sessions: Vec<PlanRow>,
}

/// Per-slot fields as they appear in the exam plan file.
#[derive(Debug, Deserialize)]
struct PlanRow {
    date: String,
    #[serde(default)]
    session: String,
    #[serde(default)]
    invigilators: u32,
    #[serde(default)]
    squad: u32,
}

// ── Load functions ────────────────────────────────────────────────────────────

/// Parse `path` into a validated teacher roster.
///
/// Rows without a name are dropped; unknown duty labels fall back to
/// `Invigilator` with a warning; duplicate serials are rejected.
///
/// # Errors
/// Returns an error if the file cannot be opened, the YAML is structurally
/// invalid, or validation fails (see [`IngestError`]).
pub fn load_roster(path: &Path) -> Result<Vec<Teacher>> {
    info!("Loading roster from: {}", path.display());

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Cannot open roster file: {}", path.display()))?;

    let file: RosterFile = serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse roster YAML: {}", path.display()))?;

    let teachers = roster_from_rows(file.teachers)?;

    info!(
        teachers = teachers.len(),
        invigilators = teachers
            .iter()
            .filter(|t| t.duty_class == DutyClass::Invigilator)
            .count(),
        squad = teachers
            .iter()
            .filter(|t| t.duty_class == DutyClass::Squad)
            .count(),
        "roster loaded"
    );

    Ok(teachers)
}

/// Parse `path` into a validated exam plan.
///
/// Dates are normalised to ISO, sessions to FN/AN, and rows with zero demand
/// in both pools are dropped.
///
/// # Errors
/// Returns an error if the file cannot be opened, the YAML is structurally
/// invalid, or validation fails (see [`IngestError`]).
pub fn load_exam_plan(path: &Path) -> Result<Vec<ExamRequirement>> {
    info!("Loading exam plan from: {}", path.display());

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Cannot open exam plan file: {}", path.display()))?;

    let file: PlanFile = serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse exam plan YAML: {}", path.display()))?;

    let requirements = plan_from_rows(file.sessions)?;

    info!(
        sessions = requirements.len(),
        invigilator_demand = requirements
            .iter()
            .map(|r| r.invigilators_needed)
            .sum::<u32>(),
        squad_demand = requirements.iter().map(|r| r.squad_needed).sum::<u32>(),
        "exam plan loaded"
    );

    Ok(requirements)
}

// ── Validation ────────────────────────────────────────────────────────────────

fn roster_from_rows(rows: Vec<RosterRow>) -> Result<Vec<Teacher>, IngestError> {
    let mut teachers: Vec<Teacher> = Vec::with_capacity(rows.len());
    // serial → 1-based file row, for the duplicate error message
    let mut seen_serials: HashMap<u32, usize> = HashMap::new();

    for (idx, row) in rows.into_iter().enumerate() {
        let row_number = idx + 1;
        let name = row.name.trim();
        if name.is_empty() {
            debug!(row = row_number, "skipping roster row without a name");
            continue;
        }

        let serial = row.serial.unwrap_or(row_number as u32);
        if let Some(&first_row) = seen_serials.get(&serial) {
            return Err(IngestError::DuplicateSerial {
                serial,
                first_row,
                second_row: row_number,
            });
        }
        seen_serials.insert(serial, row_number);

        let duty_class = match DutyClass::from_label(&row.duty) {
            Some(class) => class,
            None => {
                warn!(
                    row = row_number,
                    duty = %row.duty,
                    "unrecognised duty label, treating as Invigilator"
                );
                DutyClass::Invigilator
            }
        };

        teachers.push(Teacher {
            serial,
            name: name.to_string(),
            department: row.department.trim().to_string(),
            duty_class,
        });
    }

    if teachers.is_empty() {
        return Err(IngestError::EmptyRoster);
    }
    Ok(teachers)
}

fn plan_from_rows(rows: Vec<PlanRow>) -> Result<Vec<ExamRequirement>, IngestError> {
    let mut requirements: Vec<ExamRequirement> = Vec::with_capacity(rows.len());

    for (idx, row) in rows.into_iter().enumerate() {
        let row_number = idx + 1;
        if row.invigilators == 0 && row.squad == 0 {
            debug!(row = row_number, "skipping exam plan row with zero demand");
            continue;
        }

        let date = normalize_date(&row.date)?;

        let session = match Session::from_label(&row.session) {
            Some(session) => session,
            None => {
                if !row.session.trim().is_empty() {
                    warn!(
                        row = row_number,
                        session = %row.session,
                        "unrecognised session label, treating as FN"
                    );
                }
                Session::Forenoon
            }
        };

        requirements.push(ExamRequirement {
            date,
            session,
            invigilators_needed: row.invigilators,
            squad_needed: row.squad,
        });
    }

    if requirements.is_empty() {
        return Err(IngestError::EmptyPlan);
    }
    Ok(requirements)
}

/// Normalise a date string to ISO `YYYY-MM-DD`.
///
/// Accepted input formats, tried in order: `YYYY-MM-DD`, `DD-MM-YYYY`,
/// `DD/MM/YYYY`.
fn normalize_date(raw: &str) -> Result<String, IngestError> {
    const FORMATS: [&str; 3] = ["%Y-%m-%d", "%d-%m-%Y", "%d/%m/%Y"];

    let trimmed = raw.trim();
    for format in FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, format) {
            return Ok(date.format("%Y-%m-%d").to_string());
        }
    }
    Err(IngestError::BadDate {
        value: raw.to_string(),
    })
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    /// Helper: write a YAML string to a temp file and return it.
    fn yaml_tempfile(content: &str) -> NamedTempFile {
        let mut f = NamedTempFile::new().unwrap();
        f.write_all(content.as_bytes()).unwrap();
        f
    }

    // ── load_roster ───────────────────────────────────────────────────────────

    #[test]
    fn load_example_roster() {
        let yaml = r#"
teachers:
  - serial: 1
    name: "A. Narayanan"
    department: "Physics"
    duty: "Invigilator"
  - serial: 2
    name: "B. Thomas"
    department: "Chemistry"
    duty: "Squad"
  - serial: 3
    name: "C. Iyer"
    department: "Mathematics"
    duty: "invigilator"
"#;
        let f = yaml_tempfile(yaml);
        let teachers = load_roster(f.path()).unwrap();

        assert_eq!(teachers.len(), 3);
        assert_eq!(teachers[0].name, "A. Narayanan");
        assert_eq!(teachers[0].duty_class, DutyClass::Invigilator);
        assert_eq!(teachers[1].duty_class, DutyClass::Squad);
        assert_eq!(teachers[2].duty_class, DutyClass::Invigilator);
    }

    #[test]
    fn missing_serial_falls_back_to_row_position() {
        let yaml = r#"
teachers:
  - name: "First"
    department: "Physics"
    duty: "Invigilator"
  - name: "Second"
    department: "Chemistry"
    duty: "Squad"
"#;
        let f = yaml_tempfile(yaml);
        let teachers = load_roster(f.path()).unwrap();
        assert_eq!(teachers[0].serial, 1);
        assert_eq!(teachers[1].serial, 2);
    }

    #[test]
    fn unknown_duty_label_falls_back_to_invigilator() {
        let yaml = r#"
teachers:
  - serial: 1
    name: "First"
    department: "Physics"
    duty: "supervisor"
"#;
        let f = yaml_tempfile(yaml);
        let teachers = load_roster(f.path()).unwrap();
        assert_eq!(teachers[0].duty_class, DutyClass::Invigilator);
    }

    #[test]
    fn rows_without_names_are_dropped() {
        let yaml = r#"
teachers:
  - serial: 1
    name: "   "
    department: "Physics"
    duty: "Invigilator"
  - serial: 2
    name: "Kept"
    department: "Chemistry"
    duty: "Squad"
"#;
        let f = yaml_tempfile(yaml);
        let teachers = load_roster(f.path()).unwrap();
        assert_eq!(teachers.len(), 1);
        assert_eq!(teachers[0].name, "Kept");
    }

    #[test]
    fn all_rows_dropped_is_an_empty_roster_error() {
        let yaml = "teachers:\n  - serial: 1\n    name: \"\"\n";
        let f = yaml_tempfile(yaml);
        let err = load_roster(f.path()).unwrap_err();
        assert_eq!(
            err.downcast_ref::<IngestError>(),
            Some(&IngestError::EmptyRoster)
        );
    }

    #[test]
    fn duplicate_serial_is_rejected() {
        let yaml = r#"
teachers:
  - serial: 7
    name: "First"
    department: "Physics"
    duty: "Invigilator"
  - serial: 7
    name: "Second"
    department: "Chemistry"
    duty: "Squad"
"#;
        let f = yaml_tempfile(yaml);
        let err = load_roster(f.path()).unwrap_err();
        assert_eq!(
            err.downcast_ref::<IngestError>(),
            Some(&IngestError::DuplicateSerial {
                serial: 7,
                first_row: 1,
                second_row: 2,
            })
        );
    }

    #[test]
    fn missing_roster_file_returns_error() {
        let result = load_roster(Path::new("/nonexistent/path/roster.yaml"));
        assert!(result.is_err());
    }

    #[test]
    fn malformed_roster_yaml_returns_error() {
        let f = yaml_tempfile("this is: not: valid: yaml: content:::");
        assert!(load_roster(f.path()).is_err());
    }

    // ── load_exam_plan ────────────────────────────────────────────────────────

    #[test]
    fn load_example_plan() {
        let yaml = r#"
sessions:
  - date: "2026-03-02"
    session: "FN"
    invigilators: 3
    squad: 1
  - date: "2026-03-02"
    session: "an"
    invigilators: 2
    squad: 1
"#;
        let f = yaml_tempfile(yaml);
        let plan = load_exam_plan(f.path()).unwrap();

        assert_eq!(plan.len(), 2);
        assert_eq!(plan[0].session, Session::Forenoon);
        assert_eq!(plan[0].invigilators_needed, 3);
        assert_eq!(plan[1].session, Session::Afternoon);
        assert_eq!(plan[1].squad_needed, 1);
    }

    #[test]
    fn dates_are_normalised_to_iso() {
        let yaml = r#"
sessions:
  - date: "02-03-2026"
    session: "FN"
    invigilators: 1
  - date: "2026-03-03"
    session: "FN"
    invigilators: 1
  - date: "4/3/2026"
    session: "FN"
    invigilators: 1
"#;
        let f = yaml_tempfile(yaml);
        let plan = load_exam_plan(f.path()).unwrap();
        let dates: Vec<&str> = plan.iter().map(|r| r.date.as_str()).collect();
        assert_eq!(dates, vec!["2026-03-02", "2026-03-03", "2026-03-04"]);
    }

    #[test]
    fn unparseable_date_is_rejected() {
        let yaml = r#"
sessions:
  - date: "March 2nd"
    session: "FN"
    invigilators: 1
"#;
        let f = yaml_tempfile(yaml);
        let err = load_exam_plan(f.path()).unwrap_err();
        assert_eq!(
            err.downcast_ref::<IngestError>(),
            Some(&IngestError::BadDate {
                value: "March 2nd".into()
            })
        );
    }

    #[test]
    fn unknown_session_label_falls_back_to_forenoon() {
        let yaml = r#"
sessions:
  - date: "2026-03-02"
    session: "morning"
    invigilators: 1
"#;
        let f = yaml_tempfile(yaml);
        let plan = load_exam_plan(f.path()).unwrap();
        assert_eq!(plan[0].session, Session::Forenoon);
    }

    #[test]
    fn zero_demand_rows_are_dropped() {
        let yaml = r#"
sessions:
  - date: "2026-03-02"
    session: "FN"
    invigilators: 0
    squad: 0
  - date: "2026-03-03"
    session: "FN"
    invigilators: 2
"#;
        let f = yaml_tempfile(yaml);
        let plan = load_exam_plan(f.path()).unwrap();
        assert_eq!(plan.len(), 1);
        assert_eq!(plan[0].date, "2026-03-03");
    }

    #[test]
    fn all_zero_demand_is_an_empty_plan_error() {
        let yaml = r#"
sessions:
  - date: "2026-03-02"
    session: "FN"
    invigilators: 0
    squad: 0
"#;
        let f = yaml_tempfile(yaml);
        let err = load_exam_plan(f.path()).unwrap_err();
        assert_eq!(
            err.downcast_ref::<IngestError>(),
            Some(&IngestError::EmptyPlan)
        );
    }

    #[test]
    fn missing_plan_file_returns_error() {
        let result = load_exam_plan(Path::new("/nonexistent/path/plan.yaml"));
        assert!(result.is_err());
    }

    // ── normalize_date ────────────────────────────────────────────────────────

    #[test]
    fn normalize_date_accepts_all_documented_formats() {
        assert_eq!(normalize_date("2026-03-02").unwrap(), "2026-03-02");
        assert_eq!(normalize_date("02-03-2026").unwrap(), "2026-03-02");
        assert_eq!(normalize_date("02/03/2026").unwrap(), "2026-03-02");
        assert_eq!(normalize_date(" 02-03-2026 ").unwrap(), "2026-03-02");
    }

    #[test]
    fn normalize_date_makes_lexicographic_order_chronological() {
        // DD-MM-YYYY inputs from different months sort wrongly as raw
        // strings; after normalisation the order is chronological.
        let earlier = normalize_date("28-02-2026").unwrap();
        let later = normalize_date("01-03-2026").unwrap();
        assert!(earlier < later);
    }

    #[test]
    fn normalize_date_rejects_garbage() {
        assert!(normalize_date("not a date").is_err());
        assert!(normalize_date("").is_err());
        assert!(normalize_date("2026-13-40").is_err());
    }
}
