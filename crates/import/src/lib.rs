// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]

mod absences;
mod csv_rows;
mod dashboard;
mod diagnostics;
mod error;
mod json;
mod subjects;

#[cfg(test)]
mod tests;

pub use absences::{
    AbsenceRecord, DAYS_ALIASES, TYPE_ALIASES, absence_from_row, attach_absences, load_absences,
};
pub use csv_rows::{CsvTable, detect_delimiter, header_row, load_rows, parse_csv_line};
pub use dashboard::{DEFAULT_UPCOMING_DAYS, Dashboard, build_dashboard};
pub use diagnostics::TracingDiagnostics;
pub use error::ImportError;
pub use json::subjects_from_json;
pub use subjects::{
    ADMISSION_ALIASES, BIRTH_ALIASES, CPF_ALIASES, NAME_ALIASES, ROLE_ALIASES, SEX_ALIASES,
    UNIT_ALIASES, load_subjects, subject_from_row, subjects_from_rows,
};
