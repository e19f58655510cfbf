// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! The absence sheet: one row per absence record, keyed by CPF or name.

use crate::csv_rows::{CsvTable, header_row, load_rows};
use crate::error::ImportError;
use crate::subjects::{CPF_ALIASES, NAME_ALIASES};
use licenca_domain::{FieldRow, Subject, UnpaidLeaveInterval, normalize_cpf};
use std::collections::HashMap;
use tracing::{info, warn};

/// Headers holding the absence type.
pub const TYPE_ALIASES: &[&str] = &[
    "tipo",
    "tipo de afastamento",
    "afastamento",
    "motivo",
    "licenca",
];

/// Headers holding the acquired days.
pub const DAYS_ALIASES: &[&str] = &[
    "dias",
    "dias adquiridos",
    "qtd dias",
    "quantidade de dias",
];

/// An absence row resolved to a subject identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AbsenceRecord {
    /// Identifier of the subject the absence belongs to.
    pub subject_id: String,
    /// The absence itself.
    pub interval: UnpaidLeaveInterval,
}

fn leading_number(value: &str) -> Option<u32> {
    let digits: String = value
        .trim()
        .chars()
        .take_while(char::is_ascii_digit)
        .collect();
    digits.parse::<u32>().ok()
}

/// Maps a row onto an absence record.
///
/// Returns `None` when the row names no subject, has no type, or has no
/// day count.
#[must_use]
pub fn absence_from_row(row: &FieldRow) -> Option<AbsenceRecord> {
    let subject_id: String = row
        .get(CPF_ALIASES)
        .and_then(normalize_cpf)
        .or_else(|| row.get(NAME_ALIASES).map(|name| Subject::new(name).id()))?;
    let type_label: &str = row.get(TYPE_ALIASES)?;
    let days: u32 = row.get(DAYS_ALIASES).and_then(leading_number)?;

    Some(AbsenceRecord {
        subject_id,
        interval: UnpaidLeaveInterval::new(type_label, days),
    })
}

/// Reads the absence sheet.
///
/// # Errors
///
/// Returns `ImportError::InvalidCsvFormat` if the CSV cannot be read, or
/// `ImportError::MissingColumn` if the type or day columns are absent.
pub fn load_absences(
    content: &str,
    delimiter: Option<u8>,
) -> Result<Vec<AbsenceRecord>, ImportError> {
    let table: CsvTable = load_rows(content, delimiter)?;
    let headers: FieldRow = header_row(&table.headers);
    if headers.get(TYPE_ALIASES).is_none() {
        return Err(ImportError::MissingColumn { column: "tipo" });
    }
    if headers.get(DAYS_ALIASES).is_none() {
        return Err(ImportError::MissingColumn { column: "dias" });
    }

    let records: Vec<AbsenceRecord> = table.rows.iter().filter_map(absence_from_row).collect();
    info!(
        rows = table.rows.len(),
        records = records.len(),
        "Loaded absence sheet"
    );
    Ok(records)
}

/// Attaches absence records to their subjects.
///
/// Returns the number of records that matched no subject.
pub fn attach_absences(subjects: &mut [Subject], records: Vec<AbsenceRecord>) -> usize {
    let index: HashMap<String, usize> = subjects
        .iter()
        .enumerate()
        .map(|(position, subject)| (subject.id(), position))
        .collect();

    let mut unmatched: usize = 0;
    for record in records {
        match index.get(&record.subject_id) {
            Some(&position) => subjects[position].absences.push(record.interval),
            None => {
                warn!(subject = %record.subject_id, "Absence record matches no subject");
                unmatched += 1;
            }
        }
    }
    unmatched
}
