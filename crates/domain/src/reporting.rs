// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Cross-subject aggregates.
//!
//! Per-subject failures are isolated: a subject without the dates a
//! retirement computation needs appears in the summary with the reason,
//! and the rest of the batch is unaffected.

use crate::diagnostics::{Diagnostic, DiagnosticSink};
use crate::error::DomainError;
use crate::leave_status::{LeaveStatus, StatusCounts, classify_leave_status};
use crate::retirement::{RetirementReport, build_retirement_report};
use crate::types::{Sex, Subject};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use time::Date;

/// Counts leave status per top-level organizational unit.
///
/// Units are keyed by the first segment of the lotação, upper-cased.
/// Subjects without a lotação are grouped under `(sem lotação)`.
#[must_use]
pub fn status_counts_by_unit(subjects: &[Subject], today: Date) -> BTreeMap<String, StatusCounts> {
    let mut by_unit: BTreeMap<String, StatusCounts> = BTreeMap::new();
    for subject in subjects {
        let status: LeaveStatus = classify_leave_status(&subject.periods, today);
        by_unit.entry(subject.top_unit()).or_default().add(status);
    }
    by_unit
}

/// Horizon bucket of a subject's retirement projection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RetirementHorizon {
    /// At least one rule is met today.
    EligibleNow,
    /// Eligible within 365 days.
    WithinOneYear,
    /// Eligible within 730 days.
    WithinTwoYears,
    /// Eligible later than two years from now.
    Later,
}

impl RetirementHorizon {
    /// Buckets a report by its projection.
    #[must_use]
    pub const fn of(report: &RetirementReport) -> Self {
        if report.projection.is_eligible_now {
            Self::EligibleNow
        } else if report.projection.days_until <= 365 {
            Self::WithinOneYear
        } else if report.projection.days_until <= 730 {
            Self::WithinTwoYears
        } else {
            Self::Later
        }
    }

    /// Returns the string representation of the horizon.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::EligibleNow => "eligible_now",
            Self::WithinOneYear => "within_one_year",
            Self::WithinTwoYears => "within_two_years",
            Self::Later => "later",
        }
    }
}

/// Counts of subjects per retirement horizon.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetirementSummaryCounts {
    /// Eligible today.
    pub eligible_now: usize,
    /// Eligible within one year.
    pub within_one_year: usize,
    /// Eligible within two years.
    pub within_two_years: usize,
    /// Eligible later.
    pub later: usize,
    /// Missing or invalid birth or admission date.
    pub invalid: usize,
}

/// One subject in the retirement summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetirementEntry {
    /// Subject identifier.
    pub subject_id: String,
    /// Subject name.
    pub name: String,
    /// Top-level organizational unit.
    pub unit: String,
    /// Horizon bucket, absent when the report could not be built.
    pub horizon: Option<RetirementHorizon>,
    /// The report, absent when the subject is invalid.
    pub report: Option<RetirementReport>,
    /// Why the report could not be built.
    pub invalid_reason: Option<String>,
}

/// Retirement outlook across subjects at one reference date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetirementSummary {
    /// The date every report was computed for.
    pub reference_date: Date,
    /// Counts per horizon.
    pub counts: RetirementSummaryCounts,
    /// Valid subjects soonest first, then invalid subjects by name.
    pub entries: Vec<RetirementEntry>,
}

/// Builds a retirement report for every subject.
///
/// Subjects whose report fails are kept with the failure reason and
/// reported to `sink` as skipped. Subjects evaluated with the male
/// thresholds because their sex is unknown are reported as well.
#[must_use]
pub fn retirement_summary(
    subjects: &[Subject],
    today: Date,
    sink: &dyn DiagnosticSink,
) -> RetirementSummary {
    let mut counts: RetirementSummaryCounts = RetirementSummaryCounts::default();
    let mut entries: Vec<RetirementEntry> = Vec::with_capacity(subjects.len());

    for subject in subjects {
        let subject_id: String = subject.id();
        let result: Result<RetirementReport, DomainError> = build_retirement_report(subject, today);

        let entry: RetirementEntry = match result {
            Ok(report) => {
                if subject.sex == Sex::Unknown {
                    sink.record(Diagnostic::UnknownSexDefaulted {
                        subject: subject_id.clone(),
                    });
                }
                let horizon: RetirementHorizon = RetirementHorizon::of(&report);
                match horizon {
                    RetirementHorizon::EligibleNow => counts.eligible_now += 1,
                    RetirementHorizon::WithinOneYear => counts.within_one_year += 1,
                    RetirementHorizon::WithinTwoYears => counts.within_two_years += 1,
                    RetirementHorizon::Later => counts.later += 1,
                }
                RetirementEntry {
                    subject_id,
                    name: subject.name.clone(),
                    unit: subject.top_unit(),
                    horizon: Some(horizon),
                    report: Some(report),
                    invalid_reason: None,
                }
            }
            Err(err) => {
                counts.invalid += 1;
                sink.record(Diagnostic::SubjectSkipped {
                    subject: subject_id.clone(),
                    reason: err.to_string(),
                });
                RetirementEntry {
                    subject_id,
                    name: subject.name.clone(),
                    unit: subject.top_unit(),
                    horizon: None,
                    report: None,
                    invalid_reason: Some(err.to_string()),
                }
            }
        };
        entries.push(entry);
    }

    entries.sort_by(|a, b| {
        let days_a: Option<i64> = a.report.as_ref().map(|r| r.projection.days_until);
        let days_b: Option<i64> = b.report.as_ref().map(|r| r.projection.days_until);
        // Entries with a report come first.
        days_a
            .is_none()
            .cmp(&days_b.is_none())
            .then(days_a.cmp(&days_b))
            .then_with(|| a.name.cmp(&b.name))
    });

    RetirementSummary {
        reference_date: today,
        counts,
        entries,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::diagnostics::CollectingDiagnostics;
    use crate::types::{LeavePeriod, SourceKind};
    use time::macros::date;

    fn period(start: Date, end: Date) -> LeavePeriod {
        LeavePeriod::new(Some(start), Some(end), None, SourceKind::ExplicitRange, "").unwrap()
    }

    #[test]
    fn test_status_counts_by_unit_groups_top_level() {
        let today: Date = date!(2025 - 03 - 01);
        let subjects: Vec<Subject> = vec![
            Subject {
                unit_path: String::from("ses/dir/gab"),
                periods: vec![period(date!(2025 - 02 - 01), date!(2025 - 04 - 01))],
                ..Subject::new("Ana")
            },
            Subject {
                unit_path: String::from("SES / outra"),
                periods: vec![period(date!(2025 - 05 - 01), date!(2025 - 07 - 01))],
                ..Subject::new("Bruno")
            },
            Subject::new("Carla"),
        ];

        let by_unit: BTreeMap<String, StatusCounts> = status_counts_by_unit(&subjects, today);

        assert_eq!(by_unit.len(), 2);
        let ses: &StatusCounts = by_unit.get("SES").unwrap();
        assert_eq!(ses.ongoing, 1);
        assert_eq!(ses.scheduled, 1);
        assert_eq!(by_unit.get("(sem lotação)").unwrap().unscheduled, 1);
    }

    #[test]
    fn test_retirement_summary_isolates_invalid_subjects() {
        let today: Date = date!(2025 - 06 - 15);
        let subjects: Vec<Subject> = vec![
            Subject {
                birth_date: Some(date!(1975 - 01 - 01)),
                admission_date: Some(date!(2005 - 01 - 01)),
                sex: Sex::Male,
                ..Subject::new("Longe")
            },
            Subject::new("Sem Datas"),
            Subject {
                birth_date: Some(date!(1960 - 06 - 15)),
                admission_date: Some(date!(1995 - 06 - 15)),
                sex: Sex::Female,
                ..Subject::new("Apta")
            },
        ];
        let sink: CollectingDiagnostics = CollectingDiagnostics::new();

        let summary: RetirementSummary = retirement_summary(&subjects, today, &sink);

        assert_eq!(summary.counts.eligible_now, 1);
        assert_eq!(summary.counts.later, 1);
        assert_eq!(summary.counts.invalid, 1);
        assert_eq!(summary.entries.len(), 3);
        assert_eq!(summary.entries[0].name, "Apta");
        assert_eq!(summary.entries[1].name, "Longe");
        assert_eq!(summary.entries[2].name, "Sem Datas");
        assert!(summary.entries[2].report.is_none());
        assert!(summary.entries[2].invalid_reason.is_some());

        let events: Vec<Diagnostic> = sink.events();
        assert_eq!(events.len(), 1);
        assert!(matches!(events[0], Diagnostic::SubjectSkipped { .. }));
    }

    #[test]
    fn test_retirement_summary_reports_unknown_sex() {
        let today: Date = date!(2025 - 06 - 15);
        let subjects: Vec<Subject> = vec![Subject {
            birth_date: Some(date!(1970 - 01 - 01)),
            admission_date: Some(date!(2000 - 01 - 01)),
            ..Subject::new("Sem Sexo")
        }];
        let sink: CollectingDiagnostics = CollectingDiagnostics::new();

        let summary: RetirementSummary = retirement_summary(&subjects, today, &sink);

        let report: &RetirementReport = summary.entries[0].report.as_ref().unwrap();
        assert!(report.thresholds_defaulted);
        assert_eq!(report.snapshot.thresholds.min_age, 65);
        assert_eq!(
            sink.events(),
            vec![Diagnostic::UnknownSexDefaulted {
                subject: String::from("SEM SEXO")
            }]
        );
    }

    #[test]
    fn test_horizon_buckets() {
        let today: Date = date!(2025 - 01 - 01);
        // Turns 65 within the year with enough contribution.
        let soon: Subject = Subject {
            birth_date: Some(date!(1960 - 07 - 01)),
            admission_date: Some(date!(1995 - 01 - 01)),
            sex: Sex::Male,
            ..Subject::new("Breve")
        };
        let report: RetirementReport = build_retirement_report(&soon, today).unwrap();
        assert_eq!(RetirementHorizon::of(&report), RetirementHorizon::WithinOneYear);
        assert_eq!(RetirementHorizon::WithinOneYear.as_str(), "within_one_year");
    }
}
