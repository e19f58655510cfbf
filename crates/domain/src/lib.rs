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

mod dates;
mod diagnostics;
mod error;
mod leave_status;
mod normalize;
mod reporting;
mod retirement;
mod schedule;
mod types;

#[cfg(test)]
mod tests;

pub use dates::{
    DAYS_PER_MONTH, MAX_YEAR, MIN_YEAR, add_days, add_regulatory_months, add_years,
    calendar_date, days_between, format_date, format_optional_date, is_within_bounds,
    month_from_name, parse_date, parse_optional_date,
};
pub use diagnostics::{CollectingDiagnostics, Diagnostic, DiagnosticSink, NoopDiagnostics};
pub use leave_status::{
    LeaveStatus, PeriodSkip, StatusClassification, StatusCounts, UpcomingLeave,
    UpcomingWindowCounts, classify_leave_status, classify_many, classify_period,
    upcoming_detailed, upcoming_window_counts,
};
pub use normalize::{
    FieldRow, fold_diacritics, format_cpf, is_valid_cpf, normalize_cpf, normalize_key,
};
pub use reporting::{
    RetirementEntry, RetirementHorizon, RetirementSummary, RetirementSummaryCounts,
    retirement_summary, status_counts_by_unit,
};
pub use retirement::{
    AlertLevel, AlertPriority, ContributionTime, DAYS_PER_CONTRIBUTION_YEAR, DAYS_PER_YEAR,
    EligibilityResult, MIN_CONTRIBUTION_FOR_AGE_RULE, RetirementAlert, RetirementProgress,
    RetirementProjection, RetirementReport, RetirementRule, RetirementSnapshot,
    RetirementThresholds, RuleProjection, UnpaidLeaveImpact, build_retirement_report,
    calculate_age, calculate_contribution_time, evaluate_by_age, evaluate_by_contribution_time,
    evaluate_by_points, project_retirement, retirement_progress, unpaid_leave_impact,
};
pub use schedule::{
    DEFAULT_DURATION_MONTHS, END_ALIASES, MONTHS_ALIASES, SCHEDULE_ALIASES, START_ALIASES,
    resolve_period_columns, resolve_schedule,
};

// Re-export public types
pub use error::DomainError;
pub use types::{AbsenceKind, LeavePeriod, Sex, SourceKind, Subject, UnpaidLeaveInterval};
