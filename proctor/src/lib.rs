/*
SPDX-FileCopyrightText: Copyright 2026 Proctor Contributors
SPDX-License-Identifier: MIT
*/

//! Proctor – exam invigilation and squad duty allocator
//!
//! Module layout:
//!
//! ```text
//! lib.rs
//! ├── roster.rs    – core data types (teachers, requirements, results)
//! ├── config/      – YAML ingestion and validation of roster + exam plan
//! ├── allocator/   – slot-by-slot duty allocation + balance advisory
//! └── report/      – slot-wise projection, summary counters, tables
//! ```
//!
//! The allocator (`allocator::allocate`) is a pure function over validated
//! in-memory records; `config` and `report` are its ingestion and
//! presentation collaborators, and the `proctor` binary wires the three
//! together.

pub mod allocator;
pub mod config;
pub mod report;
pub mod roster;
