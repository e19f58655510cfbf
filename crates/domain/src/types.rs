// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::dates::{add_regulatory_months, is_within_bounds};
use crate::error::DomainError;
use crate::normalize::{fold_diacritics, normalize_cpf, normalize_key};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use time::Date;

/// Sex of a subject, as recorded in the HR export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Sex {
    /// Masculino.
    Male,
    /// Feminino.
    Female,
    /// Missing or unrecognized. Evaluated with the male thresholds.
    #[default]
    Unknown,
}

impl Sex {
    /// Parses a sex cell, accepting `M`, `F`, `MAS`, `FEM`, `MASCULINO` and
    /// `FEMININO` in any case. Anything else is `Unknown`.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        match fold_diacritics(raw.trim()).to_uppercase().as_str() {
            "M" | "MAS" | "MASCULINO" => Self::Male,
            "F" | "FEM" | "FEMININO" => Self::Female,
            _ => Self::Unknown,
        }
    }

    /// Returns the string representation of the sex.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Male => "male",
            Self::Female => "female",
            Self::Unknown => "unknown",
        }
    }
}

impl FromStr for Sex {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl std::fmt::Display for Sex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// How a leave period was derived from the source data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    /// Both ends were given, either as a text range or as separate columns.
    ExplicitRange,
    /// A single start date; the end follows from the duration.
    SingleDateInferred,
    /// Text of the form "N meses a partir de X".
    MonthsFromStart,
    /// The schedule text could not be interpreted.
    Unparsed,
}

/// A single leave interval of a subject.
///
/// Periods built by the schedule resolver always carry both ends. Periods
/// built from loose spreadsheet columns may lack an end (it is then
/// derived from `duration_months`) or even a start, in which case the
/// status classifier ignores them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeavePeriod {
    /// First day of leave.
    pub start: Option<Date>,
    /// Last day of leave.
    pub end: Option<Date>,
    /// Duration in regulatory (thirty-day) months.
    pub duration_months: Option<u32>,
    /// Provenance of the period.
    pub source_kind: SourceKind,
    /// The original cell text, kept for diagnostics.
    pub raw_text: String,
}

impl LeavePeriod {
    /// Creates a period, enforcing `end >= start` when both are known.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidPeriodRange` if the end precedes the start.
    pub fn new(
        start: Option<Date>,
        end: Option<Date>,
        duration_months: Option<u32>,
        source_kind: SourceKind,
        raw_text: impl Into<String>,
    ) -> Result<Self, DomainError> {
        if let (Some(start), Some(end)) = (start, end)
            && end < start
        {
            return Err(DomainError::InvalidPeriodRange { start, end });
        }

        Ok(Self {
            start,
            end,
            duration_months,
            source_kind,
            raw_text: raw_text.into(),
        })
    }

    /// Creates a placeholder for schedule text that could not be resolved.
    #[must_use]
    pub fn unparsed(raw_text: impl Into<String>) -> Self {
        Self {
            start: None,
            end: None,
            duration_months: None,
            source_kind: SourceKind::Unparsed,
            raw_text: raw_text.into(),
        }
    }

    /// The end used for classification: the explicit end, or the start plus
    /// `duration_months` thirty-day months.
    #[must_use]
    pub fn effective_end(&self) -> Option<Date> {
        match (self.start, self.end, self.duration_months) {
            (_, Some(end), _) => Some(end),
            (Some(start), None, Some(months)) => add_regulatory_months(start, months),
            _ => None,
        }
    }
}

/// Classification of an absence by its type label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AbsenceKind {
    /// Licença sem remuneração. Does not count toward contribution time.
    Unpaid,
    /// Licença prêmio. Counts toward contribution time.
    PremiumAccrued,
    /// Any other absence. Counts toward contribution time.
    Other,
}

impl AbsenceKind {
    /// Classifies a free-text absence label.
    ///
    /// A label mentioning both "sem" and "remuneração" is unpaid; one
    /// mentioning "prêmio" is premium leave. Matching ignores case and
    /// accents.
    #[must_use]
    pub fn classify(label: &str) -> Self {
        let key: String = normalize_key(label);
        if key.contains("sem") && key.contains("remuneracao") {
            Self::Unpaid
        } else if key.contains("premio") {
            Self::PremiumAccrued
        } else {
            Self::Other
        }
    }
}

/// An absence record that may affect contribution time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnpaidLeaveInterval {
    /// The absence type as written in the source sheet.
    pub type_label: String,
    /// Days of absence acquired under this record.
    pub acquired_days: u32,
}

impl UnpaidLeaveInterval {
    /// Creates a new absence record.
    #[must_use]
    pub fn new(type_label: impl Into<String>, acquired_days: u32) -> Self {
        Self {
            type_label: type_label.into(),
            acquired_days,
        }
    }

    /// Returns the classification of this record.
    #[must_use]
    pub fn kind(&self) -> AbsenceKind {
        AbsenceKind::classify(&self.type_label)
    }
}

/// A civil servant tracked by the dashboard.
///
/// Subjects are built once by the row loader and never mutated by the
/// rules engine. Age and eligibility are derived on demand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Subject {
    /// Full name.
    pub name: String,
    /// CPF, normalized to eleven digits when present.
    #[serde(default)]
    pub cpf: Option<String>,
    /// Date of birth.
    #[serde(default)]
    pub birth_date: Option<Date>,
    /// Date of admission into public service.
    #[serde(default)]
    pub admission_date: Option<Date>,
    /// Sex, selecting the retirement thresholds.
    #[serde(default)]
    pub sex: Sex,
    /// Cargo.
    #[serde(default)]
    pub role: String,
    /// Lotação, with organizational levels separated by `/`.
    #[serde(default)]
    pub unit_path: String,
    /// Scheduled premium leave periods.
    #[serde(default)]
    pub periods: Vec<LeavePeriod>,
    /// Absence records considered by the contribution-time computation.
    #[serde(default)]
    pub absences: Vec<UnpaidLeaveInterval>,
}

impl Subject {
    /// Creates a subject with only a name; remaining fields are filled in
    /// with struct update syntax or by the loader.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Stable identifier: the normalized CPF when present, otherwise the
    /// upper-cased name.
    #[must_use]
    pub fn id(&self) -> String {
        self.cpf
            .as_deref()
            .and_then(normalize_cpf)
            .unwrap_or_else(|| self.name.trim().to_uppercase())
    }

    /// Top-level organizational unit of the lotação.
    #[must_use]
    pub fn top_unit(&self) -> String {
        self.unit_path
            .split('/')
            .map(str::trim)
            .find(|segment| !segment.is_empty())
            .map_or_else(|| String::from("(sem lotação)"), str::to_uppercase)
    }

    /// Returns the birth date, validated against the parser bounds.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidSubject` if the date is missing or out
    /// of range.
    pub fn require_birth_date(&self) -> Result<Date, DomainError> {
        self.require_date(self.birth_date, "birth_date")
    }

    /// Returns the admission date, validated against the parser bounds.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidSubject` if the date is missing or out
    /// of range.
    pub fn require_admission_date(&self) -> Result<Date, DomainError> {
        self.require_date(self.admission_date, "admission_date")
    }

    fn require_date(&self, date: Option<Date>, field: &'static str) -> Result<Date, DomainError> {
        let date: Date = date.ok_or_else(|| DomainError::missing_field(&self.id(), field))?;
        if !is_within_bounds(date) {
            return Err(DomainError::InvalidSubject {
                subject: self.id(),
                field,
                reason: format!("{date} is outside the accepted range"),
            });
        }
        Ok(date)
    }

    /// Periods with a known start, ordered by start ascending.
    #[must_use]
    pub fn ordered_periods(&self) -> Vec<&LeavePeriod> {
        let mut periods: Vec<&LeavePeriod> =
            self.periods.iter().filter(|p| p.start.is_some()).collect();
        periods.sort_by_key(|p| p.start);
        periods
    }
}
