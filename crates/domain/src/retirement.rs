// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Retirement eligibility under the age, contribution-time and points
//! rules.
//!
//! All three rules are evaluated independently for a subject at a
//! reference date. When none is met, each rule gets an estimated
//! qualifying date and the earliest one becomes the projection.
//!
//! Contribution time is gross tenure since admission minus unpaid leave
//! days. Premium leave and other absences still count. A contribution
//! year is 365 days.

use crate::dates::{add_days, add_years, days_between};
use crate::error::DomainError;
use crate::types::{AbsenceKind, Sex, Subject, UnpaidLeaveInterval};
use serde::{Deserialize, Serialize};
use time::Date;

/// Minimum contribution years required alongside the minimum age.
pub const MIN_CONTRIBUTION_FOR_AGE_RULE: u32 = 15;

/// Days in a contribution year.
pub const DAYS_PER_YEAR: i64 = 365;

/// [`DAYS_PER_YEAR`] for fractional year arithmetic.
pub const DAYS_PER_CONTRIBUTION_YEAR: f64 = 365.0;

/// The legal rule under which a subject may retire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RetirementRule {
    /// Minimum age plus fifteen contribution years.
    ByAge,
    /// Full contribution time.
    ByContributionTime,
    /// Age plus contribution years reaching the points minimum.
    ByPoints,
}

impl RetirementRule {
    /// Evaluation order; ties between rules resolve to the earlier one.
    pub const ALL: [Self; 3] = [Self::ByAge, Self::ByContributionTime, Self::ByPoints];

    /// Human-readable rule name.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::ByAge => "age",
            Self::ByContributionTime => "contribution time",
            Self::ByPoints => "points",
        }
    }
}

impl std::fmt::Display for RetirementRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Sex-dependent legal thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetirementThresholds {
    /// Minimum age for the age rule.
    pub min_age: u32,
    /// Contribution years required by the age rule.
    pub min_contribution_for_age: u32,
    /// Contribution years required by the contribution-time and points
    /// rules.
    pub full_contribution_years: u32,
    /// Minimum age + contribution points.
    pub min_points: u32,
}

impl RetirementThresholds {
    /// Thresholds for a sex. `Unknown` uses the male values.
    #[must_use]
    pub const fn for_sex(sex: Sex) -> Self {
        match sex {
            Sex::Female => Self {
                min_age: 62,
                min_contribution_for_age: MIN_CONTRIBUTION_FOR_AGE_RULE,
                full_contribution_years: 30,
                min_points: 90,
            },
            Sex::Male | Sex::Unknown => Self {
                min_age: 65,
                min_contribution_for_age: MIN_CONTRIBUTION_FOR_AGE_RULE,
                full_contribution_years: 35,
                min_points: 100,
            },
        }
    }
}

/// Complete years between `birth` and `reference`.
///
/// One is subtracted when the birthday has not yet occurred in the
/// reference year. Reference dates before birth yield zero.
#[must_use]
pub fn calculate_age(birth: Date, reference: Date) -> u32 {
    if reference < birth {
        return 0;
    }

    let years_diff: i32 = reference.year() - birth.year();
    let birthday_reached: bool =
        (u8::from(reference.month()), reference.day()) >= (u8::from(birth.month()), birth.day());

    let years: i32 = if birthday_reached {
        years_diff
    } else {
        years_diff - 1
    };
    u32::try_from(years.max(0)).unwrap_or(0)
}

/// Contribution time breakdown at a reference date.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ContributionTime {
    /// Days since admission.
    pub total_days: i64,
    /// Days that count toward retirement (`total_days - unpaid_days`).
    pub counted_days: i64,
    /// `counted_days` in contribution years.
    pub years_counted: f64,
    /// Unpaid leave days, subtracted from the total.
    pub unpaid_days: i64,
    /// Premium leave days, informational.
    pub premium_accrued_days: i64,
    /// Other absence days, informational.
    pub other_leave_days: i64,
}

/// Computes contribution time from admission, discounting unpaid leave.
#[must_use]
pub fn calculate_contribution_time(
    admission: Date,
    absences: &[UnpaidLeaveInterval],
    reference: Date,
) -> ContributionTime {
    let total_days: i64 = days_between(admission, reference).max(0);

    let (mut unpaid_days, mut premium_accrued_days, mut other_leave_days) = (0_i64, 0_i64, 0_i64);
    for absence in absences {
        let days: i64 = i64::from(absence.acquired_days);
        match absence.kind() {
            AbsenceKind::Unpaid => unpaid_days += days,
            AbsenceKind::PremiumAccrued => premium_accrued_days += days,
            AbsenceKind::Other => other_leave_days += days,
        }
    }

    let counted_days: i64 = (total_days - unpaid_days).max(0);
    #[allow(clippy::cast_precision_loss)]
    let years_counted: f64 = counted_days as f64 / DAYS_PER_CONTRIBUTION_YEAR;

    ContributionTime {
        total_days,
        counted_days,
        years_counted,
        unpaid_days,
        premium_accrued_days,
        other_leave_days,
    }
}

/// Outcome of one rule for one subject at one reference date.
///
/// Requirements a rule does not impose are reported as met. All missing
/// quantities are clamped at zero.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EligibilityResult {
    /// The rule evaluated.
    pub rule: RetirementRule,
    /// Whether every requirement of the rule is met.
    pub is_eligible: bool,
    /// Age in complete years; `None` when the birth date is unknown.
    pub age: Option<u32>,
    /// Contribution years counted.
    pub contribution_years: f64,
    /// Age plus contribution years; `None` when the birth date is unknown.
    pub points: Option<f64>,
    /// Minimum age, for the age rule.
    pub required_age: Option<u32>,
    /// Contribution years the rule requires.
    pub required_contribution_years: u32,
    /// Minimum points, for the points rule.
    pub required_points: Option<u32>,
    /// Years of age still missing.
    pub age_years_missing: u32,
    /// Contribution years still missing.
    pub contribution_years_missing: f64,
    /// Contribution days still missing.
    pub contribution_days_missing: i64,
    /// Points still missing.
    pub points_missing: f64,
    /// Age requirement met.
    pub meets_age: bool,
    /// Contribution requirement met.
    pub meets_contribution: bool,
    /// Points requirement met.
    pub meets_points: bool,
}

impl EligibilityResult {
    /// Points rounded to one decimal place, for display. Empty when the
    /// points are unknown.
    #[must_use]
    pub fn points_display(&self) -> String {
        self.points
            .map_or_else(String::new, |points| format!("{points:.1}"))
    }
}

/// Age and contribution of a subject at a reference date.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RetirementSnapshot {
    /// Sex as recorded.
    pub sex: Sex,
    /// Thresholds applied.
    pub thresholds: RetirementThresholds,
    /// Age in complete years; `None` for a contribution-only snapshot of a
    /// subject without a usable birth date.
    pub age: Option<u32>,
    /// Contribution time breakdown.
    pub contribution: ContributionTime,
}

impl RetirementSnapshot {
    /// Builds the snapshot of a subject using the given absences.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidSubject` if the birth or admission date
    /// is missing or invalid.
    pub fn with_absences(
        subject: &Subject,
        absences: &[UnpaidLeaveInterval],
        reference: Date,
    ) -> Result<Self, DomainError> {
        let birth: Date = subject.require_birth_date()?;
        let admission: Date = subject.require_admission_date()?;
        Ok(Self::build(
            subject,
            Some(calculate_age(birth, reference)),
            admission,
            absences,
            reference,
        ))
    }

    /// Builds a snapshot that only needs the admission date. The age is
    /// filled in when the birth date is usable.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidSubject` if the admission date is
    /// missing or invalid.
    pub fn contribution_only(subject: &Subject, reference: Date) -> Result<Self, DomainError> {
        let admission: Date = subject.require_admission_date()?;
        let age: Option<u32> = subject
            .require_birth_date()
            .ok()
            .map(|birth| calculate_age(birth, reference));
        Ok(Self::build(subject, age, admission, &subject.absences, reference))
    }

    fn build(
        subject: &Subject,
        age: Option<u32>,
        admission: Date,
        absences: &[UnpaidLeaveInterval],
        reference: Date,
    ) -> Self {
        Self {
            sex: subject.sex,
            thresholds: RetirementThresholds::for_sex(subject.sex),
            age,
            contribution: calculate_contribution_time(admission, absences, reference),
        }
    }

    /// Builds the snapshot of a subject with its own absences.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidSubject` if the birth or admission date
    /// is missing or invalid.
    pub fn of(subject: &Subject, reference: Date) -> Result<Self, DomainError> {
        Self::with_absences(subject, &subject.absences, reference)
    }

    /// Age plus contribution years, when the age is known.
    #[must_use]
    pub fn points(&self) -> Option<f64> {
        self.age
            .map(|age| f64::from(age) + self.contribution.years_counted)
    }

    /// Evaluates one rule against this snapshot.
    ///
    /// An unknown age never meets an age or points requirement.
    #[must_use]
    pub fn evaluate(&self, rule: RetirementRule) -> EligibilityResult {
        let t: RetirementThresholds = self.thresholds;
        let years: f64 = self.contribution.years_counted;
        let points: Option<f64> = self.points();

        let (required_age, required_contribution_years, required_points) = match rule {
            RetirementRule::ByAge => (Some(t.min_age), t.min_contribution_for_age, None),
            RetirementRule::ByContributionTime => (None, t.full_contribution_years, None),
            RetirementRule::ByPoints => (None, t.full_contribution_years, Some(t.min_points)),
        };

        let meets_age: bool =
            required_age.is_none_or(|min| self.age.is_some_and(|age| age >= min));
        let contribution_days_missing: i64 = (i64::from(required_contribution_years)
            * DAYS_PER_YEAR
            - self.contribution.counted_days)
            .max(0);
        let meets_contribution: bool = contribution_days_missing == 0;
        let meets_points: bool =
            required_points.is_none_or(|min| points.is_some_and(|p| p >= f64::from(min)));

        EligibilityResult {
            rule,
            is_eligible: meets_age && meets_contribution && meets_points,
            age: self.age,
            contribution_years: years,
            points,
            required_age,
            required_contribution_years,
            required_points,
            age_years_missing: required_age
                .map_or(0, |min| min.saturating_sub(self.age.unwrap_or(0))),
            contribution_years_missing: (f64::from(required_contribution_years) - years).max(0.0),
            contribution_days_missing,
            points_missing: required_points
                .map_or(0.0, |min| (f64::from(min) - points.unwrap_or(0.0)).max(0.0)),
            meets_age,
            meets_contribution,
            meets_points,
        }
    }
}

fn snapshot_rule(
    subject: &Subject,
    rule: RetirementRule,
    reference: Date,
) -> Result<EligibilityResult, DomainError> {
    Ok(RetirementSnapshot::of(subject, reference)?.evaluate(rule))
}

/// Evaluates the age rule.
///
/// # Errors
///
/// Returns `DomainError::InvalidSubject` if the birth or admission date is
/// missing or invalid.
pub fn evaluate_by_age(
    subject: &Subject,
    reference: Date,
) -> Result<EligibilityResult, DomainError> {
    snapshot_rule(subject, RetirementRule::ByAge, reference)
}

/// Evaluates the contribution-time rule. Only the admission date is
/// required.
///
/// # Errors
///
/// Returns `DomainError::InvalidSubject` if the admission date is missing
/// or invalid.
pub fn evaluate_by_contribution_time(
    subject: &Subject,
    reference: Date,
) -> Result<EligibilityResult, DomainError> {
    let snapshot: RetirementSnapshot = RetirementSnapshot::contribution_only(subject, reference)?;
    Ok(snapshot.evaluate(RetirementRule::ByContributionTime))
}

/// Evaluates the points rule.
///
/// # Errors
///
/// Returns `DomainError::InvalidSubject` if the birth or admission date is
/// missing or invalid.
pub fn evaluate_by_points(
    subject: &Subject,
    reference: Date,
) -> Result<EligibilityResult, DomainError> {
    snapshot_rule(subject, RetirementRule::ByPoints, reference)
}

/// Estimated qualifying date under one rule.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RuleProjection {
    /// The rule projected.
    pub rule: RetirementRule,
    /// The current evaluation of the rule.
    pub eligibility: EligibilityResult,
    /// Estimated qualifying date; the reference date when already eligible.
    pub projected_date: Date,
    /// Days from the reference date until `projected_date`.
    pub days_until: i64,
}

/// Aggregate projection over the three rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetirementProjection {
    /// The date the projection was computed for.
    pub reference_date: Date,
    /// Whether any rule is met today.
    pub is_eligible_now: bool,
    /// The first eligible rule, or the soonest projected one.
    pub best_option: RuleProjection,
    /// All rules, soonest first; ties keep evaluation order.
    pub all_projections: Vec<RuleProjection>,
    /// Date of `best_option`.
    pub projected_date: Date,
    /// Days until `projected_date`.
    pub days_until: i64,
}

fn overflow(operation: &str) -> DomainError {
    DomainError::DateArithmeticOverflow {
        operation: operation.to_string(),
    }
}

/// Whole years until a fractional gap closes.
fn whole_years(gap: f64) -> u32 {
    // Gaps are bounded by the thresholds (at most a few hundred years).
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let years: u32 = gap.max(0.0).ceil() as u32;
    years
}

fn project_rule(
    eligibility: EligibilityResult,
    reference: Date,
) -> Result<RuleProjection, DomainError> {
    let projected_date: Date = if eligibility.is_eligible {
        reference
    } else {
        match eligibility.rule {
            RetirementRule::ByAge => {
                // Both gaps must close; the slower one gates the date.
                let contribution_years: u32 = u32::try_from(
                    (eligibility.contribution_days_missing + DAYS_PER_YEAR - 1) / DAYS_PER_YEAR,
                )
                .map_err(|_| overflow("projecting the age rule"))?;
                let years: u32 = eligibility.age_years_missing.max(contribution_years);
                add_years(reference, years).ok_or_else(|| overflow("projecting the age rule"))?
            }
            RetirementRule::ByContributionTime => {
                add_days(reference, eligibility.contribution_days_missing)
                    .ok_or_else(|| overflow("projecting the contribution-time rule"))?
            }
            RetirementRule::ByPoints => {
                // Age and contribution both advance, about two points a year.
                add_years(reference, whole_years(eligibility.points_missing / 2.0))
                    .ok_or_else(|| overflow("projecting the points rule"))?
            }
        }
    };

    Ok(RuleProjection {
        rule: eligibility.rule,
        eligibility,
        projected_date,
        days_until: days_between(reference, projected_date),
    })
}

fn project_snapshot(
    snapshot: &RetirementSnapshot,
    reference: Date,
) -> Result<RetirementProjection, DomainError> {
    let mut all_projections: Vec<RuleProjection> = RetirementRule::ALL
        .iter()
        .map(|rule| project_rule(snapshot.evaluate(*rule), reference))
        .collect::<Result<Vec<RuleProjection>, DomainError>>()?;
    all_projections.sort_by_key(|p| p.days_until);

    let first_eligible: Option<RuleProjection> = RetirementRule::ALL.iter().find_map(|rule| {
        all_projections
            .iter()
            .find(|p| p.rule == *rule && p.eligibility.is_eligible)
            .copied()
    });

    let (is_eligible_now, best_option) = match first_eligible {
        Some(best) => (true, best),
        None => (
            false,
            *all_projections
                .first()
                .ok_or_else(|| overflow("selecting the earliest projection"))?,
        ),
    };

    Ok(RetirementProjection {
        reference_date: reference,
        is_eligible_now,
        best_option,
        projected_date: best_option.projected_date,
        days_until: best_option.days_until,
        all_projections,
    })
}

/// Projects the earliest qualifying date over all rules.
///
/// # Errors
///
/// Returns `DomainError::InvalidSubject` if the birth or admission date is
/// missing or invalid, or `DomainError::DateArithmeticOverflow` if a
/// projected date is not representable.
pub fn project_retirement(
    subject: &Subject,
    reference: Date,
) -> Result<RetirementProjection, DomainError> {
    project_snapshot(&RetirementSnapshot::of(subject, reference)?, reference)
}

/// Effect of unpaid leave on contribution time and on the projection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnpaidLeaveImpact {
    /// Contribution days lost to unpaid leave.
    pub days_impact: i64,
    /// `days_impact` in contribution years.
    pub years_impact: f64,
    /// Days the projected date moves later because of unpaid leave.
    pub delay_days: i64,
    /// Projection with the subject's absences.
    pub projection_with: RetirementProjection,
    /// Projection ignoring all absences.
    pub projection_without: RetirementProjection,
}

/// Compares the projection with and without the subject's absences.
///
/// # Errors
///
/// Returns `DomainError::InvalidSubject` if the birth or admission date is
/// missing or invalid, or `DomainError::DateArithmeticOverflow` if a
/// projected date is not representable.
pub fn unpaid_leave_impact(
    subject: &Subject,
    reference: Date,
) -> Result<UnpaidLeaveImpact, DomainError> {
    let with: RetirementSnapshot = RetirementSnapshot::of(subject, reference)?;
    let without: RetirementSnapshot = RetirementSnapshot::with_absences(subject, &[], reference)?;

    let projection_with: RetirementProjection = project_snapshot(&with, reference)?;
    let projection_without: RetirementProjection = project_snapshot(&without, reference)?;

    let days_impact: i64 = without.contribution.counted_days - with.contribution.counted_days;
    #[allow(clippy::cast_precision_loss)]
    let years_impact: f64 = days_impact as f64 / DAYS_PER_CONTRIBUTION_YEAR;

    Ok(UnpaidLeaveImpact {
        days_impact,
        years_impact,
        delay_days: (projection_with.days_until - projection_without.days_until).max(0),
        projection_with,
        projection_without,
    })
}

/// Severity of a retirement alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertLevel {
    /// Informational.
    Info,
    /// Needs attention soon.
    Warning,
    /// Needs action.
    Alert,
}

/// Priority of a retirement alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertPriority {
    /// Show first.
    High,
    /// Show after high-priority alerts.
    Medium,
}

/// A message attached to a retirement report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetirementAlert {
    /// Severity.
    pub level: AlertLevel,
    /// Priority.
    pub priority: AlertPriority,
    /// Human-readable message.
    pub message: String,
}

impl RetirementAlert {
    fn new(level: AlertLevel, priority: AlertPriority, message: String) -> Self {
        Self {
            level,
            priority,
            message,
        }
    }
}

/// Everything the dashboard shows about one subject's retirement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetirementReport {
    /// Subject identifier.
    pub subject_id: String,
    /// Subject name.
    pub name: String,
    /// Age and contribution at the reference date.
    pub snapshot: RetirementSnapshot,
    /// True when sex was unknown and male thresholds were applied.
    pub thresholds_defaulted: bool,
    /// Age rule.
    pub by_age: EligibilityResult,
    /// Contribution-time rule.
    pub by_contribution_time: EligibilityResult,
    /// Points rule.
    pub by_points: EligibilityResult,
    /// Projection over the three rules.
    pub projection: RetirementProjection,
    /// Effect of unpaid leave.
    pub unpaid_leave_impact: UnpaidLeaveImpact,
    /// Generated alerts.
    pub alerts: Vec<RetirementAlert>,
}

fn build_alerts(
    projection: &RetirementProjection,
    impact: &UnpaidLeaveImpact,
) -> Vec<RetirementAlert> {
    let mut alerts: Vec<RetirementAlert> = Vec::new();
    let days: i64 = projection.days_until;

    if projection.is_eligible_now {
        alerts.push(RetirementAlert::new(
            AlertLevel::Info,
            AlertPriority::High,
            format!("Eligible for retirement by {}", projection.best_option.rule),
        ));
    } else if days <= 365 {
        let months: i64 = (days + 29) / 30;
        alerts.push(RetirementAlert::new(
            AlertLevel::Warning,
            AlertPriority::High,
            format!(
                "Eligible for retirement by {} in about {months} month(s)",
                projection.best_option.rule
            ),
        ));
    } else if days <= 730 {
        #[allow(clippy::cast_precision_loss)]
        let years: f64 = days as f64 / DAYS_PER_CONTRIBUTION_YEAR;
        alerts.push(RetirementAlert::new(
            AlertLevel::Info,
            AlertPriority::Medium,
            format!(
                "Eligible for retirement by {} in about {years:.1} years",
                projection.best_option.rule
            ),
        ));
    }

    if impact.years_impact >= 1.0 {
        alerts.push(RetirementAlert::new(
            AlertLevel::Warning,
            AlertPriority::Medium,
            format!(
                "Unpaid leave reduced contribution time by {:.1} years",
                impact.years_impact
            ),
        ));
    }

    if impact.delay_days > 365 {
        alerts.push(RetirementAlert::new(
            AlertLevel::Alert,
            AlertPriority::High,
            format!(
                "Unpaid leave delays retirement by {} days",
                impact.delay_days
            ),
        ));
    }

    alerts
}

/// Builds the full retirement report of a subject.
///
/// # Errors
///
/// Returns `DomainError::InvalidSubject` if the birth or admission date is
/// missing or invalid, or `DomainError::DateArithmeticOverflow` if a
/// projected date is not representable.
pub fn build_retirement_report(
    subject: &Subject,
    reference: Date,
) -> Result<RetirementReport, DomainError> {
    let snapshot: RetirementSnapshot = RetirementSnapshot::of(subject, reference)?;
    let projection: RetirementProjection = project_snapshot(&snapshot, reference)?;
    let impact: UnpaidLeaveImpact = unpaid_leave_impact(subject, reference)?;
    let alerts: Vec<RetirementAlert> = build_alerts(&projection, &impact);

    Ok(RetirementReport {
        subject_id: subject.id(),
        name: subject.name.clone(),
        thresholds_defaulted: subject.sex == Sex::Unknown,
        by_age: snapshot.evaluate(RetirementRule::ByAge),
        by_contribution_time: snapshot.evaluate(RetirementRule::ByContributionTime),
        by_points: snapshot.evaluate(RetirementRule::ByPoints),
        snapshot,
        projection,
        unpaid_leave_impact: impact,
        alerts,
    })
}

/// Progress toward each rule, in percent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RetirementProgress {
    /// Maximum of the three percentages.
    pub overall: f64,
    /// Age against the minimum age.
    pub by_age: f64,
    /// Contribution years against the full contribution time.
    pub by_contribution_time: f64,
    /// Points against the points minimum.
    pub by_points: f64,
    /// The rule whose percentage equals `overall`.
    pub closest_rule: RetirementRule,
}

fn percent(current: f64, required: u32) -> f64 {
    if required == 0 {
        return 100.0;
    }
    (current / f64::from(required) * 100.0).clamp(0.0, 100.0)
}

/// Computes how close a subject is to each rule.
///
/// # Errors
///
/// Returns `DomainError::InvalidSubject` if the birth or admission date is
/// missing or invalid.
pub fn retirement_progress(
    subject: &Subject,
    reference: Date,
) -> Result<RetirementProgress, DomainError> {
    let snapshot: RetirementSnapshot = RetirementSnapshot::of(subject, reference)?;
    let t: RetirementThresholds = snapshot.thresholds;

    let by_age: f64 = percent(snapshot.age.map_or(0.0, f64::from), t.min_age);
    let by_contribution_time: f64 = percent(
        snapshot.contribution.years_counted,
        t.full_contribution_years,
    );
    let by_points: f64 = percent(snapshot.points().unwrap_or(0.0), t.min_points);

    let ranked: [(RetirementRule, f64); 3] = [
        (RetirementRule::ByAge, by_age),
        (RetirementRule::ByContributionTime, by_contribution_time),
        (RetirementRule::ByPoints, by_points),
    ];
    let overall: f64 = by_age.max(by_contribution_time).max(by_points);
    let closest_rule: RetirementRule = ranked
        .iter()
        .find(|(_, value)| *value >= overall)
        .map_or(RetirementRule::ByAge, |(rule, _)| *rule);

    Ok(RetirementProgress {
        overall,
        by_age,
        by_contribution_time,
        by_points,
        closest_rule,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use time::macros::date;

    fn subject(sex: Sex, birth: Date, admission: Date) -> Subject {
        Subject {
            sex,
            birth_date: Some(birth),
            admission_date: Some(admission),
            ..Subject::new("Servidor Teste")
        }
    }

    #[test]
    fn test_calculate_age_birthday_boundary() {
        let birth: Date = date!(1960 - 06 - 15);
        assert_eq!(calculate_age(birth, date!(2025 - 06 - 14)), 64);
        assert_eq!(calculate_age(birth, date!(2025 - 06 - 15)), 65);
        assert_eq!(calculate_age(birth, date!(2025 - 12 - 31)), 65);
        assert_eq!(calculate_age(birth, date!(1950 - 01 - 01)), 0);
    }

    #[test]
    fn test_calculate_age_leap_day_birth() {
        let birth: Date = date!(2000 - 02 - 29);
        assert_eq!(calculate_age(birth, date!(2025 - 02 - 28)), 24);
        assert_eq!(calculate_age(birth, date!(2025 - 03 - 01)), 25);
    }

    #[test]
    fn test_contribution_time_subtracts_only_unpaid() {
        let absences: Vec<UnpaidLeaveInterval> = vec![
            UnpaidLeaveInterval::new("Licença sem remuneração", 100),
            UnpaidLeaveInterval::new("LICENÇA PRÊMIO", 90),
            UnpaidLeaveInterval::new("Licença médica", 10),
        ];
        let ct: ContributionTime =
            calculate_contribution_time(date!(2020 - 01 - 01), &absences, date!(2021 - 01 - 01));

        assert_eq!(ct.total_days, 366);
        assert_eq!(ct.unpaid_days, 100);
        assert_eq!(ct.premium_accrued_days, 90);
        assert_eq!(ct.other_leave_days, 10);
        assert_eq!(ct.counted_days, 266);
        assert_eq!(ct.years_counted, 266.0 / 365.0);
    }

    #[test]
    fn test_contribution_time_never_negative() {
        let absences: Vec<UnpaidLeaveInterval> =
            vec![UnpaidLeaveInterval::new("sem remuneracao", 5000)];
        let ct: ContributionTime =
            calculate_contribution_time(date!(2020 - 01 - 01), &absences, date!(2021 - 01 - 01));
        assert_eq!(ct.counted_days, 0);

        let ct: ContributionTime =
            calculate_contribution_time(date!(2030 - 01 - 01), &[], date!(2021 - 01 - 01));
        assert_eq!(ct.total_days, 0);
    }

    #[test]
    fn test_age_rule_boundary_male() {
        let reference: Date = date!(2025 - 06 - 15);
        let exactly_65: Subject = subject(Sex::Male, date!(1960 - 06 - 15), date!(2000 - 01 - 01));
        let one_day_younger: Subject =
            subject(Sex::Male, date!(1960 - 06 - 16), date!(2000 - 01 - 01));

        let result: EligibilityResult = evaluate_by_age(&exactly_65, reference).unwrap();
        assert!(result.is_eligible);
        assert_eq!(result.required_age, Some(65));
        assert_eq!(result.age_years_missing, 0);

        let result: EligibilityResult = evaluate_by_age(&one_day_younger, reference).unwrap();
        assert!(!result.is_eligible);
        assert!(!result.meets_age);
        assert!(result.meets_contribution);
        assert_eq!(result.age_years_missing, 1);
    }

    #[test]
    fn test_age_rule_requires_fifteen_years() {
        let reference: Date = date!(2025 - 06 - 15);
        let s: Subject = subject(Sex::Male, date!(1955 - 01 - 01), date!(2015 - 01 - 01));
        let result: EligibilityResult = evaluate_by_age(&s, reference).unwrap();
        assert!(result.meets_age);
        assert!(!result.meets_contribution);
        assert!(!result.is_eligible);
        assert!(result.contribution_years_missing > 4.0);
    }

    #[test]
    fn test_unknown_sex_uses_male_thresholds() {
        assert_eq!(
            RetirementThresholds::for_sex(Sex::Unknown),
            RetirementThresholds::for_sex(Sex::Male)
        );
        assert_eq!(RetirementThresholds::for_sex(Sex::Female).min_points, 90);
    }

    #[test]
    fn test_female_end_to_end_scenario() {
        let reference: Date = date!(2025 - 06 - 15);
        let s: Subject = subject(Sex::Female, date!(1960 - 06 - 15), date!(1995 - 06 - 15));

        let report: RetirementReport = build_retirement_report(&s, reference).unwrap();

        assert_eq!(report.snapshot.age, Some(65));
        assert!(report.snapshot.contribution.years_counted >= 30.0);
        assert!(report.by_contribution_time.is_eligible);
        assert!(report.by_points.is_eligible);
        assert!(report.by_age.is_eligible);
        assert!(report.projection.is_eligible_now);
        assert_eq!(report.projection.days_until, 0);
        assert_eq!(report.projection.projected_date, reference);
        assert_eq!(report.projection.best_option.rule, RetirementRule::ByAge);
        assert_eq!(report.alerts.len(), 1);
        assert_eq!(report.alerts[0].level, AlertLevel::Info);
        assert_eq!(report.alerts[0].priority, AlertPriority::High);
    }

    #[test]
    fn test_projection_not_eligible_sorted() {
        let reference: Date = date!(2025 - 01 - 01);
        // Age 50, 20 contribution years (plus a few leap days).
        let s: Subject = subject(Sex::Male, date!(1975 - 01 - 01), date!(2005 - 01 - 01));

        let projection: RetirementProjection = project_retirement(&s, reference).unwrap();

        assert!(!projection.is_eligible_now);
        assert_eq!(projection.all_projections.len(), 3);
        assert!(
            projection
                .all_projections
                .windows(2)
                .all(|w| w[0].days_until <= w[1].days_until)
        );
        assert_eq!(projection.best_option, projection.all_projections[0]);
        assert!(projection.days_until > 0);

        // Age rule: 15 years of age missing, contribution already met.
        let by_age: &RuleProjection = projection
            .all_projections
            .iter()
            .find(|p| p.rule == RetirementRule::ByAge)
            .unwrap();
        assert_eq!(by_age.projected_date, date!(2040 - 01 - 01));
    }

    #[test]
    fn test_projection_contribution_rule_days() {
        let reference: Date = date!(2025 - 01 - 01);
        let s: Subject = subject(Sex::Female, date!(1990 - 01 - 01), date!(2000 - 01 - 01));
        let projection: RetirementProjection = project_retirement(&s, reference).unwrap();
        let by_time: &RuleProjection = projection
            .all_projections
            .iter()
            .find(|p| p.rule == RetirementRule::ByContributionTime)
            .unwrap();

        let counted: i64 = days_between(date!(2000 - 01 - 01), reference);
        assert_eq!(by_time.days_until, 30 * 365 - counted);
    }

    fn rule_projection(projection: &RetirementProjection, rule: RetirementRule) -> RuleProjection {
        *projection
            .all_projections
            .iter()
            .find(|p| p.rule == rule)
            .unwrap()
    }

    #[test]
    fn test_points_projection_gains_two_points_a_year() {
        let reference: Date = date!(2025 - 01 - 01);
        // Age 60 with a little over 20 years: just under 20 points missing.
        let s: Subject = subject(Sex::Male, date!(1965 - 01 - 01), date!(2005 - 01 - 01));

        let projection: RetirementProjection = project_retirement(&s, reference).unwrap();
        let by_points: RuleProjection = rule_projection(&projection, RetirementRule::ByPoints);

        assert!(by_points.eligibility.points_missing > 19.0);
        assert!(by_points.eligibility.points_missing < 20.0);
        assert_eq!(by_points.projected_date, date!(2035 - 01 - 01));
        assert_eq!(
            by_points.days_until,
            days_between(reference, date!(2035 - 01 - 01))
        );
    }

    #[test]
    fn test_points_projection_ignores_contribution_floor() {
        let reference: Date = date!(2025 - 01 - 01);
        // Age 80 with 20 years: points met, contribution floor not.
        let s: Subject = subject(Sex::Male, date!(1945 - 01 - 01), date!(2005 - 01 - 01));
        let result: EligibilityResult = evaluate_by_points(&s, reference).unwrap();
        assert!(result.meets_points);
        assert!(!result.meets_contribution);
        assert!(!result.is_eligible);
        assert_eq!(result.points_missing, 0.0);
        assert!(result.contribution_days_missing > 0);

        let projection: RetirementProjection = project_retirement(&s, reference).unwrap();
        let by_points: RuleProjection = rule_projection(&projection, RetirementRule::ByPoints);
        assert_eq!(by_points.projected_date, reference);
        assert_eq!(by_points.days_until, 0);
    }

    #[test]
    fn test_contribution_rule_needs_only_admission() {
        let reference: Date = date!(2025 - 01 - 01);
        let s: Subject = Subject {
            sex: Sex::Female,
            admission_date: Some(date!(1994 - 01 - 01)),
            ..Subject::new("Sem Nascimento")
        };

        let result: EligibilityResult = evaluate_by_contribution_time(&s, reference).unwrap();
        assert!(result.is_eligible);
        assert_eq!(result.required_contribution_years, 30);
        assert_eq!(result.age, None);
        assert_eq!(result.points, None);
        assert_eq!(result.points_display(), "");

        let err: DomainError = evaluate_by_age(&s, reference).unwrap_err();
        assert!(matches!(
            err,
            DomainError::InvalidSubject {
                field: "birth_date",
                ..
            }
        ));

        let err: DomainError =
            evaluate_by_contribution_time(&Subject::new("Sem Datas"), reference).unwrap_err();
        assert!(matches!(
            err,
            DomainError::InvalidSubject {
                field: "admission_date",
                ..
            }
        ));
    }

    #[test]
    fn test_unpaid_leave_impact_zero_without_unpaid_days() {
        let reference: Date = date!(2025 - 01 - 01);
        let mut s: Subject = subject(Sex::Male, date!(1970 - 01 - 01), date!(2000 - 01 - 01));
        s.absences = vec![UnpaidLeaveInterval::new("Licença prêmio", 90)];

        let impact: UnpaidLeaveImpact = unpaid_leave_impact(&s, reference).unwrap();

        assert_eq!(impact.days_impact, 0);
        assert_eq!(impact.delay_days, 0);
        assert_eq!(impact.projection_with, impact.projection_without);
    }

    #[test]
    fn test_unpaid_leave_impact_delays_projection() {
        let reference: Date = date!(2025 - 01 - 01);
        let mut s: Subject = subject(Sex::Male, date!(1970 - 01 - 01), date!(2000 - 01 - 01));
        s.absences = vec![UnpaidLeaveInterval::new("Licença sem remuneração", 500)];

        let impact: UnpaidLeaveImpact = unpaid_leave_impact(&s, reference).unwrap();

        assert_eq!(impact.days_impact, 500);
        assert!(impact.years_impact > 1.0);
        assert!(impact.projection_with.days_until >= impact.projection_without.days_until);
        assert!(impact.delay_days > 0);
    }

    #[test]
    fn test_report_alerts_for_large_unpaid_leave() {
        let reference: Date = date!(2025 - 01 - 01);
        // Age 63 with 35 years of tenure: eligible by contribution time
        // until 800 unpaid days push the best option to the age rule.
        let mut s: Subject = subject(Sex::Male, date!(1962 - 01 - 01), date!(1990 - 01 - 01));
        s.absences = vec![UnpaidLeaveInterval::new("Licença sem remuneração", 800)];

        let report: RetirementReport = build_retirement_report(&s, reference).unwrap();
        let impact: &UnpaidLeaveImpact = &report.unpaid_leave_impact;

        assert!(impact.projection_without.is_eligible_now);
        assert_eq!(
            impact.projection_without.best_option.rule,
            RetirementRule::ByContributionTime
        );
        assert!(!report.projection.is_eligible_now);
        assert_eq!(report.projection.best_option.rule, RetirementRule::ByAge);
        assert_eq!(impact.days_impact, 800);
        assert_eq!(impact.delay_days, 730);

        let entries: Vec<(AlertLevel, AlertPriority)> =
            report.alerts.iter().map(|a| (a.level, a.priority)).collect();
        assert_eq!(
            entries,
            vec![
                (AlertLevel::Info, AlertPriority::Medium),
                (AlertLevel::Warning, AlertPriority::Medium),
                (AlertLevel::Alert, AlertPriority::High),
            ]
        );
    }

    #[test]
    fn test_report_warns_on_unpaid_leave_without_delay() {
        let reference: Date = date!(2025 - 01 - 01);
        // About ten years away with or without absences; 400 unpaid days
        // still cost more than a contribution year.
        let mut s: Subject = subject(Sex::Male, date!(1970 - 01 - 01), date!(2000 - 01 - 01));
        s.absences = vec![UnpaidLeaveInterval::new("Licença sem remuneração", 400)];

        let report: RetirementReport = build_retirement_report(&s, reference).unwrap();
        let entries: Vec<(AlertLevel, AlertPriority)> =
            report.alerts.iter().map(|a| (a.level, a.priority)).collect();

        assert!(report.unpaid_leave_impact.years_impact >= 1.0);
        assert_eq!(report.unpaid_leave_impact.delay_days, 9);
        assert_eq!(entries, vec![(AlertLevel::Warning, AlertPriority::Medium)]);
    }

    #[test]
    fn test_report_warning_within_a_year() {
        let reference: Date = date!(2025 - 01 - 01);
        // Turns 65 in six months with 30 contribution years.
        let s: Subject = subject(Sex::Male, date!(1960 - 07 - 01), date!(1995 - 01 - 01));

        let report: RetirementReport = build_retirement_report(&s, reference).unwrap();

        assert!(!report.projection.is_eligible_now);
        assert_eq!(report.projection.best_option.rule, RetirementRule::ByAge);
        assert_eq!(report.alerts[0].level, AlertLevel::Warning);
        assert_eq!(report.alerts[0].priority, AlertPriority::High);
    }

    #[test]
    fn test_report_requires_dates() {
        let s: Subject = Subject::new("Sem Datas");
        let err: DomainError = build_retirement_report(&s, date!(2025 - 01 - 01)).unwrap_err();
        match err {
            DomainError::InvalidSubject { field, .. } => assert_eq!(field, "birth_date"),
            other => panic!("Expected InvalidSubject, got {other:?}"),
        }

        let s: Subject = Subject {
            birth_date: Some(date!(1970 - 01 - 01)),
            ..Subject::new("Sem Admissão")
        };
        let err: DomainError = evaluate_by_points(&s, date!(2025 - 01 - 01)).unwrap_err();
        assert!(matches!(
            err,
            DomainError::InvalidSubject {
                field: "admission_date",
                ..
            }
        ));
    }

    #[test]
    fn test_progress_overall_is_max_and_capped() {
        let reference: Date = date!(2025 - 01 - 01);
        let s: Subject = subject(Sex::Male, date!(1950 - 01 - 01), date!(2010 - 01 - 01));

        let progress: RetirementProgress = retirement_progress(&s, reference).unwrap();

        assert!(progress.overall <= 100.0);
        assert_eq!(progress.by_age, 100.0);
        assert_eq!(
            progress.overall,
            progress
                .by_age
                .max(progress.by_contribution_time)
                .max(progress.by_points)
        );
        assert_eq!(progress.closest_rule, RetirementRule::ByAge);
    }

    #[test]
    fn test_progress_closest_rule_contribution() {
        let reference: Date = date!(2025 - 01 - 01);
        let s: Subject = subject(Sex::Female, date!(1980 - 01 - 01), date!(1998 - 01 - 01));

        let progress: RetirementProgress = retirement_progress(&s, reference).unwrap();

        assert_eq!(progress.closest_rule, RetirementRule::ByContributionTime);
        assert!(progress.by_contribution_time > progress.by_age);
    }
}
