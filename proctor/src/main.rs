/*
SPDX-FileCopyrightText: Copyright 2026 Proctor Contributors
SPDX-License-Identifier: MIT
*/

use std::path::{Path, PathBuf};
use std::process;

use anyhow::Context;
use clap::Parser;
use tracing::{error, info, warn};

use proctor::allocator::{self, check_balance};
use proctor::config;
use proctor::report::{self, AllocationSummary};
use proctor::roster::{DutyClass, TeacherDutyResult};

// ── CLI argument definition ───────────────────────────────────────────────────

/// Proctor exam duty allocator.
///
/// Example:
///   proctor -r roster.yaml -p exam_plan.yaml --slot-wise -o allocation.yaml
#[derive(Debug, Parser)]
#[command(
    name = "proctor",
    about = "Exam invigilation and squad duty allocator",
    long_about = None,
)]
struct Cli {
    /// Path to the YAML teacher roster file.
    #[arg(short = 'r', long = "roster")]
    roster: PathBuf,

    /// Path to the YAML exam plan file.
    #[arg(short = 'p', long = "plan")]
    plan: PathBuf,

    /// Write the allocation results to this YAML file.
    #[arg(short = 'o', long = "out")]
    out: Option<PathBuf>,

    /// Also print the slot-wise duty table (one row per teacher per slot).
    #[arg(long = "slot-wise", default_value_t = false)]
    slot_wise: bool,
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() {
    // Initialise structured logging.
    // Level is controlled by the RUST_LOG env-var (e.g. RUST_LOG=debug).
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    info!(
        roster    = ?cli.roster,
        plan      = ?cli.plan,
        out       = ?cli.out,
        slot_wise = cli.slot_wise,
        "Configuration"
    );

    // ── Load inputs ───────────────────────────────────────────────────────────
    let teachers = match config::load_roster(&cli.roster) {
        Ok(teachers) => teachers,
        Err(e) => {
            error!("Failed to load roster: {:#}", e);
            process::exit(1);
        }
    };

    let requirements = match config::load_exam_plan(&cli.plan) {
        Ok(requirements) => requirements,
        Err(e) => {
            error!("Failed to load exam plan: {:#}", e);
            process::exit(1);
        }
    };

    // ── Allocate ──────────────────────────────────────────────────────────────
    let allocation = allocator::allocate(&teachers, &requirements);

    let summary = AllocationSummary::compute(&teachers, &requirements, &allocation.results);
    info!(
        teachers     = summary.total_teachers,
        invigilators = summary.invigilators,
        squad        = summary.squad,
        sessions     = summary.sessions,
        dates        = summary.unique_dates,
        required     = summary.duties_required,
        assigned     = summary.duties_assigned,
        unfilled     = summary.unfilled(),
        "Allocation summary"
    );

    // ── Advisories ────────────────────────────────────────────────────────────
    if !allocation.overflows.is_empty() {
        warn!(
            double_bookings = allocation.overflows.len(),
            "some teachers were double-booked on a date — the plan is understaffed for those dates"
        );
    }
    for class in [DutyClass::Invigilator, DutyClass::Squad] {
        if let Some(balance) = check_balance(&allocation.results, class) {
            warn!(
                pool   = %class,
                max    = balance.max,
                min    = balance.min,
                spread = balance.spread(),
                "duty counts spread beyond the guaranteed bound"
            );
        }
    }

    // ── Render / export ───────────────────────────────────────────────────────
    println!("{}", report::duty_table(&allocation.results));

    if cli.slot_wise {
        println!();
        println!("{}", report::slot_table(&allocation.results));
    }

    if let Some(path) = &cli.out {
        if let Err(e) = write_results(path, &allocation.results) {
            error!("Failed to write results: {:#}", e);
            process::exit(1);
        }
        info!("Results written to: {}", path.display());
    }
}

/// Serialise the per-teacher results to a YAML file.
fn write_results(path: &Path, results: &[TeacherDutyResult]) -> anyhow::Result<()> {
    let yaml = serde_yaml::to_string(results).context("Failed to serialise results")?;
    std::fs::write(path, yaml)
        .with_context(|| format!("Cannot write results file: {}", path.display()))?;
    Ok(())
}
