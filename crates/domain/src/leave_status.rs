// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Leave status classification relative to a reference date.
//!
//! Each period is classified on its own; a subject then receives exactly
//! one status under the priority `Ongoing > Scheduled > Concluded >
//! Unscheduled`.
//!
//! Status is **computed**, not stored. The reference date is an explicit
//! argument so a single report never straddles midnight.

use crate::dates::days_between;
use crate::diagnostics::{Diagnostic, DiagnosticSink};
use crate::types::{LeavePeriod, SourceKind, Subject};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use time::Date;

/// Leave status of a period or of a subject.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeaveStatus {
    /// The reference date lies within the period, both ends inclusive.
    Ongoing,
    /// The period has not started yet.
    Scheduled,
    /// The period ended before the reference date.
    Concluded,
    /// No period could be classified.
    Unscheduled,
}

impl LeaveStatus {
    /// Returns the string representation of the status.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Ongoing => "ongoing",
            Self::Scheduled => "scheduled",
            Self::Concluded => "concluded",
            Self::Unscheduled => "unscheduled",
        }
    }

    /// Lower rank wins when several periods disagree.
    const fn rank(self) -> u8 {
        match self {
            Self::Ongoing => 0,
            Self::Scheduled => 1,
            Self::Concluded => 2,
            Self::Unscheduled => 3,
        }
    }
}

impl std::fmt::Display for LeaveStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Why a period did not take part in classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeriodSkip {
    /// No start date.
    MissingStart,
    /// Neither an end date nor a duration.
    MissingEnd,
}

/// Classifies a single period.
///
/// # Errors
///
/// Returns the reason the period cannot be classified when it lacks a
/// start, or lacks both an end and a duration.
pub fn classify_period(period: &LeavePeriod, today: Date) -> Result<LeaveStatus, PeriodSkip> {
    let start: Date = period.start.ok_or(PeriodSkip::MissingStart)?;
    let end: Date = period.effective_end().ok_or(PeriodSkip::MissingEnd)?;

    if today < start {
        Ok(LeaveStatus::Scheduled)
    } else if today > end {
        Ok(LeaveStatus::Concluded)
    } else {
        Ok(LeaveStatus::Ongoing)
    }
}

/// Reduces the periods of one subject to a single status.
#[must_use]
pub fn classify_leave_status(periods: &[LeavePeriod], today: Date) -> LeaveStatus {
    periods
        .iter()
        .filter_map(|p| classify_period(p, today).ok())
        .min_by_key(|status| status.rank())
        .unwrap_or(LeaveStatus::Unscheduled)
}

/// Subject counts per status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCounts {
    /// Subjects with a future period and none ongoing.
    pub scheduled: usize,
    /// Subjects currently on leave.
    pub ongoing: usize,
    /// Subjects whose periods all ended.
    pub concluded: usize,
    /// Subjects without any classifiable period.
    pub unscheduled: usize,
}

impl StatusCounts {
    /// Adds one subject with the given status.
    pub const fn add(&mut self, status: LeaveStatus) {
        match status {
            LeaveStatus::Scheduled => self.scheduled += 1,
            LeaveStatus::Ongoing => self.ongoing += 1,
            LeaveStatus::Concluded => self.concluded += 1,
            LeaveStatus::Unscheduled => self.unscheduled += 1,
        }
    }

    /// Total number of subjects counted.
    #[must_use]
    pub const fn total(&self) -> usize {
        self.scheduled + self.ongoing + self.concluded + self.unscheduled
    }
}

/// Per-subject statuses plus their counts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusClassification {
    /// Status by subject identifier.
    pub statuses: BTreeMap<String, LeaveStatus>,
    /// Counts over `statuses`.
    pub counts: StatusCounts,
}

/// Classifies every subject at the same reference date.
///
/// Periods that cannot be classified are reported to `sink`. Subjects
/// sharing an identifier keep the highest-priority status.
pub fn classify_many(
    subjects: &[Subject],
    today: Date,
    sink: &dyn DiagnosticSink,
) -> StatusClassification {
    let mut statuses: BTreeMap<String, LeaveStatus> = BTreeMap::new();

    for subject in subjects {
        let id: String = subject.id();
        for period in &subject.periods {
            match classify_period(period, today) {
                Ok(_) => {}
                Err(PeriodSkip::MissingStart) if period.source_kind == SourceKind::Unparsed => {
                    sink.record(Diagnostic::UnparsedSchedule {
                        subject: id.clone(),
                        raw_text: period.raw_text.clone(),
                    });
                }
                Err(PeriodSkip::MissingStart) => sink.record(Diagnostic::PeriodWithoutStart {
                    subject: id.clone(),
                    raw_text: period.raw_text.clone(),
                }),
                Err(PeriodSkip::MissingEnd) => sink.record(Diagnostic::PeriodWithoutEnd {
                    subject: id.clone(),
                    raw_text: period.raw_text.clone(),
                }),
            }
        }

        let status: LeaveStatus = classify_leave_status(&subject.periods, today);
        statuses
            .entry(id)
            .and_modify(|existing| {
                if status.rank() < existing.rank() {
                    *existing = status;
                }
            })
            .or_insert(status);
    }

    let mut counts: StatusCounts = StatusCounts::default();
    for status in statuses.values() {
        counts.add(*status);
    }

    StatusClassification { statuses, counts }
}

/// Number of periods starting within each upcoming window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpcomingWindowCounts {
    /// Starting 0 to 30 days from the reference date.
    pub within_30: usize,
    /// Starting 31 to 60 days out.
    pub within_31_to_60: usize,
    /// Starting 61 to 90 days out.
    pub within_61_to_90: usize,
}

impl UpcomingWindowCounts {
    /// Total periods starting within 90 days.
    #[must_use]
    pub const fn total(&self) -> usize {
        self.within_30 + self.within_31_to_60 + self.within_61_to_90
    }
}

/// Buckets period starts into the 0-30, 31-60 and 61-90 day windows.
///
/// Only periods with a start date take part; everything else is skipped
/// silently.
#[must_use]
pub fn upcoming_window_counts(subjects: &[Subject], today: Date) -> UpcomingWindowCounts {
    let mut counts: UpcomingWindowCounts = UpcomingWindowCounts::default();

    for start in subjects
        .iter()
        .flat_map(|s| s.periods.iter())
        .filter_map(|p| p.start)
    {
        match days_between(today, start) {
            0..=30 => counts.within_30 += 1,
            31..=60 => counts.within_31_to_60 += 1,
            61..=90 => counts.within_61_to_90 += 1,
            _ => {}
        }
    }

    counts
}

/// One upcoming period with the metadata a detail view needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpcomingLeave {
    /// Subject identifier.
    pub subject_id: String,
    /// Subject name.
    pub name: String,
    /// Cargo.
    pub role: String,
    /// Lotação.
    pub unit_path: String,
    /// First day of leave.
    pub start: Date,
    /// Last day of leave, when known.
    pub end: Option<Date>,
    /// Duration in regulatory months, when known.
    pub duration_months: Option<u32>,
    /// Days from the reference date until the start.
    pub days_until_start: i64,
}

/// Lists periods starting within the next `days` days (inclusive), nearest
/// first. Ties are ordered by subject name.
#[must_use]
pub fn upcoming_detailed(subjects: &[Subject], days: u32, today: Date) -> Vec<UpcomingLeave> {
    let horizon: i64 = i64::from(days);
    let mut upcoming: Vec<UpcomingLeave> = Vec::new();

    for subject in subjects {
        for period in &subject.periods {
            let Some(start) = period.start else {
                continue;
            };
            let days_until_start: i64 = days_between(today, start);
            if !(0..=horizon).contains(&days_until_start) {
                continue;
            }
            upcoming.push(UpcomingLeave {
                subject_id: subject.id(),
                name: subject.name.clone(),
                role: subject.role.clone(),
                unit_path: subject.unit_path.clone(),
                start,
                end: period.effective_end(),
                duration_months: period.duration_months,
                days_until_start,
            });
        }
    }

    upcoming.sort_by(|a, b| {
        a.days_until_start
            .cmp(&b.days_until_start)
            .then_with(|| a.name.cmp(&b.name))
    });
    upcoming
}
