// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Everything the dashboard renders, computed at one reference date.

use licenca_domain::{
    DiagnosticSink, RetirementSummary, StatusClassification, StatusCounts, Subject,
    UpcomingLeave, UpcomingWindowCounts, classify_many, retirement_summary,
    status_counts_by_unit, upcoming_detailed, upcoming_window_counts,
};
use serde::Serialize;
use std::collections::BTreeMap;
use time::Date;
use tracing::info;

/// Default look-ahead of the upcoming leave list, in days.
pub const DEFAULT_UPCOMING_DAYS: u32 = 30;

/// Combined dashboard data.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dashboard {
    /// The date every figure was computed for.
    pub reference_date: Date,
    /// Number of subjects considered.
    pub subject_count: usize,
    /// Leave status per subject and overall counts.
    pub leave_status: StatusClassification,
    /// Periods starting in the next thirty, sixty and ninety days.
    pub upcoming_windows: UpcomingWindowCounts,
    /// Periods starting within the look-ahead, soonest first.
    pub upcoming: Vec<UpcomingLeave>,
    /// Leave status counts per top-level unit.
    pub status_by_unit: BTreeMap<String, StatusCounts>,
    /// Retirement outlook.
    pub retirement: RetirementSummary,
}

/// Builds the dashboard.
///
/// # Arguments
///
/// * `subjects` - The subjects to report on
/// * `today` - The reference date, captured once by the caller
/// * `upcoming_days` - Look-ahead of the upcoming leave list
/// * `sink` - Receiver for skipped periods and subjects
#[must_use]
pub fn build_dashboard(
    subjects: &[Subject],
    today: Date,
    upcoming_days: u32,
    sink: &dyn DiagnosticSink,
) -> Dashboard {
    let dashboard: Dashboard = Dashboard {
        reference_date: today,
        subject_count: subjects.len(),
        leave_status: classify_many(subjects, today, sink),
        upcoming_windows: upcoming_window_counts(subjects, today),
        upcoming: upcoming_detailed(subjects, upcoming_days, today),
        status_by_unit: status_counts_by_unit(subjects, today),
        retirement: retirement_summary(subjects, today, sink),
    };

    info!(
        subjects = dashboard.subject_count,
        ongoing = dashboard.leave_status.counts.ongoing,
        scheduled = dashboard.leave_status.counts.scheduled,
        eligible_now = dashboard.retirement.counts.eligible_now,
        invalid = dashboard.retirement.counts.invalid,
        "Built dashboard"
    );
    dashboard
}
