// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Mapping of loader rows onto subjects.
//!
//! Every field has an alias table; lookups go through [`FieldRow`] so the
//! rules engine never sees header spelling. A subject may span several
//! rows, one per scheduled period.

use crate::csv_rows::{CsvTable, header_row, load_rows};
use crate::error::ImportError;
use licenca_domain::{
    Diagnostic, DiagnosticSink, FieldRow, LeavePeriod, Sex, Subject, is_valid_cpf, normalize_cpf,
    parse_optional_date, resolve_period_columns,
};
use std::collections::HashMap;
use tracing::{debug, info};

/// Headers naming the subject.
pub const NAME_ALIASES: &[&str] = &["servidor", "nome", "nome completo"];

/// Headers holding the CPF.
pub const CPF_ALIASES: &[&str] = &["cpf"];

/// Headers holding the birth date.
pub const BIRTH_ALIASES: &[&str] = &[
    "data de nascimento",
    "data nascimento",
    "dt nascimento",
    "nascimento",
];

/// Headers holding the admission date.
pub const ADMISSION_ALIASES: &[&str] = &[
    "data de admissao",
    "data admissao",
    "dt admissao",
    "admissao",
    "data de ingresso",
    "ingresso",
];

/// Headers holding the sex.
pub const SEX_ALIASES: &[&str] = &["sexo", "genero"];

/// Headers holding the role.
pub const ROLE_ALIASES: &[&str] = &["cargo", "funcao"];

/// Headers holding the lotação.
pub const UNIT_ALIASES: &[&str] = &["lotacao", "unidade", "setor"];

/// Maps a single row onto a subject.
///
/// Returns `None` for rows without a name.
#[must_use]
pub fn subject_from_row(row: &FieldRow, default_months: u32) -> Option<Subject> {
    let name: &str = row.get(NAME_ALIASES)?;
    let field = |aliases: &[&str]| row.get(aliases).map(str::to_string).unwrap_or_default();

    Some(Subject {
        cpf: row.get(CPF_ALIASES).and_then(normalize_cpf),
        birth_date: parse_optional_date(row.get(BIRTH_ALIASES)),
        admission_date: parse_optional_date(row.get(ADMISSION_ALIASES)),
        sex: row.get(SEX_ALIASES).map_or(Sex::Unknown, Sex::parse),
        role: field(ROLE_ALIASES),
        unit_path: field(UNIT_ALIASES),
        periods: resolve_period_columns(row, default_months).into_iter().collect(),
        ..Subject::new(name)
    })
}

/// Fills the gaps of `target` from a later row of the same subject.
fn merge_into(target: &mut Subject, other: Subject) {
    if target.cpf.is_none() {
        target.cpf = other.cpf;
    }
    if target.birth_date.is_none() {
        target.birth_date = other.birth_date;
    }
    if target.admission_date.is_none() {
        target.admission_date = other.admission_date;
    }
    if target.sex == Sex::Unknown {
        target.sex = other.sex;
    }
    if target.role.is_empty() {
        target.role = other.role;
    }
    if target.unit_path.is_empty() {
        target.unit_path = other.unit_path;
    }
    target.periods.extend(other.periods);
    target.absences.extend(other.absences);
}

/// Maps rows onto subjects, merging rows that share an identifier.
///
/// Subjects keep the order in which they first appear. Periods of a
/// subject are ordered by start; periods without one go last. A CPF that
/// fails check-digit verification is kept and reported to `sink`.
#[must_use]
pub fn subjects_from_rows(
    rows: &[FieldRow],
    default_months: u32,
    sink: &dyn DiagnosticSink,
) -> Vec<Subject> {
    let mut subjects: Vec<Subject> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut skipped: usize = 0;

    for row in rows {
        let Some(subject) = subject_from_row(row, default_months) else {
            skipped += 1;
            continue;
        };

        let id: String = subject.id();
        if let Some(&position) = index.get(&id) {
            merge_into(&mut subjects[position], subject);
        } else {
            index.insert(id, subjects.len());
            subjects.push(subject);
        }
    }

    for subject in &mut subjects {
        sort_periods(&mut subject.periods);
        if let Some(cpf) = subject.cpf.as_deref()
            && !is_valid_cpf(cpf)
        {
            sink.record(Diagnostic::InvalidCpf {
                name: subject.name.clone(),
                cpf: cpf.to_string(),
            });
        }
    }

    if skipped > 0 {
        debug!(skipped, "Skipped rows without a subject name");
    }
    subjects
}

fn sort_periods(periods: &mut [LeavePeriod]) {
    periods.sort_by_key(|p| (p.start.is_none(), p.start));
}

/// Reads the subject sheet.
///
/// # Arguments
///
/// * `content` - The raw CSV text
/// * `delimiter` - The field delimiter, or `None` to detect it
/// * `default_months` - Leave duration for schedule text with a single date
/// * `sink` - Receives data problems found while mapping rows
///
/// # Errors
///
/// Returns `ImportError::InvalidCsvFormat` if the CSV cannot be read, or
/// `ImportError::MissingColumn` if no header names the subject.
pub fn load_subjects(
    content: &str,
    delimiter: Option<u8>,
    default_months: u32,
    sink: &dyn DiagnosticSink,
) -> Result<Vec<Subject>, ImportError> {
    let table: CsvTable = load_rows(content, delimiter)?;
    if header_row(&table.headers).get(NAME_ALIASES).is_none() {
        return Err(ImportError::MissingColumn { column: "servidor" });
    }

    let subjects: Vec<Subject> = subjects_from_rows(&table.rows, default_months, sink);
    info!(
        rows = table.rows.len(),
        subjects = subjects.len(),
        "Loaded subject sheet"
    );
    Ok(subjects)
}
