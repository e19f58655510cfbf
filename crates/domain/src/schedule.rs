// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Resolution of "cronograma" cells and start/end columns into leave
//! periods.
//!
//! Free-text schedules are tried in order, first match wins:
//!
//! 1. an explicit range, `<date> - <date>` (also `a` / `até`)
//! 2. a single date, ending after the default number of months
//! 3. "N meses a partir de <date>" (also `em`, `de`, `desde`)
//!
//! Anything else resolves to no period.

use crate::dates::{DAYS_PER_MONTH, add_days, days_between, parse_date};
use crate::normalize::{FieldRow, fold_diacritics};
use crate::types::{LeavePeriod, SourceKind};
use regex::Regex;
use std::sync::OnceLock;
use time::Date;

/// Months of leave assumed when a schedule names only a start date.
pub const DEFAULT_DURATION_MONTHS: u32 = 3;

/// Header aliases for an explicit start column.
pub const START_ALIASES: &[&str] = &[
    "data inicio",
    "inicio",
    "data de inicio",
    "data inicial",
    "a partir",
    "a partir de",
    "inicio licenca",
];

/// Header aliases for an explicit end column.
pub const END_ALIASES: &[&str] = &[
    "data fim",
    "fim",
    "data final",
    "data de fim",
    "termino",
    "data termino",
    "data de termino",
];

/// Header aliases for a duration column, in months.
pub const MONTHS_ALIASES: &[&str] = &["meses", "qtd meses", "quantidade de meses", "duracao"];

/// Header aliases for the free-text schedule column.
pub const SCHEDULE_ALIASES: &[&str] = &["cronograma", "periodo de gozo", "periodo"];

struct SchedulePatterns {
    tight_range: Regex,
    spaced_range: Regex,
    months_then_date: Regex,
    date_then_months: Regex,
}

fn patterns() -> Option<&'static SchedulePatterns> {
    static PATTERNS: OnceLock<Option<SchedulePatterns>> = OnceLock::new();
    PATTERNS
        .get_or_init(|| {
            Some(SchedulePatterns {
                // jan/2025 - mar/2025, 01/2025 a 03/2025
                tight_range: Regex::new(r"^([^\s-]+)\s*(?:-|\s(?:a|ate)\s)\s*([^\s-]+)$").ok()?,
                // 2025-01-01 - 2025-03-31 (connector must be surrounded by spaces)
                spaced_range: Regex::new(r"^(\S+)\s+(?:-|a|ate)\s+(\S+)$").ok()?,
                // 3 meses a partir de 01/02/2025
                months_then_date: Regex::new(
                    r"^(\d{1,3})\s*(?:meses|mes)\s+(?:(?:a\s+partir\s+de|a\s+partir|desde|em|de)\s+)?(\S+)$",
                )
                .ok()?,
                // a partir de 01/02/2025 (3 meses)
                date_then_months: Regex::new(
                    r"^(?:(?:a\s+partir\s+de|desde|em)\s+)?(\S+)\s*[(,-]?\s*(\d{1,3})\s*(?:meses|mes)\s*\)?$",
                )
                .ok()?,
            })
        })
        .as_ref()
}

/// Last day of a leave starting on `start` and lasting `months` regulatory
/// months.
fn inferred_end(start: Date, months: u32) -> Option<Date> {
    let days: i64 = (i64::from(months) * DAYS_PER_MONTH - 1).max(0);
    add_days(start, days)
}

/// Months covered by an explicit range, rounded up.
fn months_spanned(start: Date, end: Date) -> u32 {
    let days: i64 = days_between(start, end).max(0);
    u32::try_from((days + DAYS_PER_MONTH - 1) / DAYS_PER_MONTH).unwrap_or(u32::MAX)
}

fn explicit_range(text: &str, raw_text: &str) -> Option<LeavePeriod> {
    let patterns: &SchedulePatterns = patterns()?;
    [&patterns.tight_range, &patterns.spaced_range]
        .iter()
        .find_map(|pattern| {
            let captures = pattern.captures(text)?;
            let start: Date = parse_date(captures.get(1)?.as_str())?;
            let end: Date = parse_date(captures.get(2)?.as_str())?;
            LeavePeriod::new(
                Some(start),
                Some(end),
                Some(months_spanned(start, end)),
                SourceKind::ExplicitRange,
                raw_text,
            )
            .ok()
        })
}

fn single_date(text: &str, raw_text: &str, default_months: u32) -> Option<LeavePeriod> {
    let start: Date = parse_date(text)?;
    let end: Date = inferred_end(start, default_months)?;
    LeavePeriod::new(
        Some(start),
        Some(end),
        Some(default_months),
        SourceKind::SingleDateInferred,
        raw_text,
    )
    .ok()
}

fn months_from_start(text: &str, raw_text: &str) -> Option<LeavePeriod> {
    let patterns: &SchedulePatterns = patterns()?;

    let (months_text, date_text): (&str, &str) = patterns
        .months_then_date
        .captures(text)
        .and_then(|c| Some((c.get(1)?.as_str(), c.get(2)?.as_str())))
        .or_else(|| {
            let c = patterns.date_then_months.captures(text)?;
            Some((c.get(2)?.as_str(), c.get(1)?.as_str()))
        })?;

    let months: u32 = months_text.parse::<u32>().ok().filter(|m| *m > 0)?;
    let start: Date = parse_date(date_text)?;
    let end: Date = inferred_end(start, months)?;
    LeavePeriod::new(
        Some(start),
        Some(end),
        Some(months),
        SourceKind::MonthsFromStart,
        raw_text,
    )
    .ok()
}

/// Resolves a free-text schedule cell into zero or one leave periods.
///
/// An empty result means the text could not be interpreted.
#[must_use]
pub fn resolve_schedule(raw_text: &str, default_months: u32) -> Vec<LeavePeriod> {
    let text: String = fold_diacritics(raw_text.trim()).to_lowercase();
    if text.is_empty() {
        return Vec::new();
    }

    explicit_range(&text, raw_text)
        .or_else(|| single_date(&text, raw_text, default_months))
        .or_else(|| months_from_start(&text, raw_text))
        .into_iter()
        .collect()
}

/// Reads a leading month count such as `3` or `3 meses`.
fn parse_months_cell(value: &str) -> Option<u32> {
    let digits: String = value
        .trim()
        .chars()
        .take_while(char::is_ascii_digit)
        .collect();
    digits.parse::<u32>().ok()
}

/// Resolves the leave period of a loader row.
///
/// Explicit start/end columns take precedence. A start without a usable end
/// keeps the duration column, if any, so the classifier can derive the end.
/// Without a start column the free-text schedule column is resolved; text
/// that does not resolve yields an `Unparsed` placeholder. Returns `None`
/// when the row carries no schedule information at all.
#[must_use]
pub fn resolve_period_columns(row: &FieldRow, default_months: u32) -> Option<LeavePeriod> {
    if let Some(raw_start) = row.get(START_ALIASES)
        && let Some(start) = parse_date(raw_start)
    {
        let raw_end: Option<&str> = row.get(END_ALIASES);
        let end: Option<Date> = raw_end.and_then(parse_date).filter(|end| *end >= start);
        let months: Option<u32> = row.get(MONTHS_ALIASES).and_then(parse_months_cell);
        let raw_text: String = raw_end.map_or_else(
            || raw_start.to_string(),
            |raw_end| format!("{raw_start} - {raw_end}"),
        );

        let period: Option<LeavePeriod> = match end {
            Some(end) => LeavePeriod::new(
                Some(start),
                Some(end),
                Some(months.unwrap_or_else(|| months_spanned(start, end))),
                SourceKind::ExplicitRange,
                raw_text,
            )
            .ok(),
            None => LeavePeriod::new(
                Some(start),
                None,
                months,
                SourceKind::SingleDateInferred,
                raw_text,
            )
            .ok(),
        };
        if period.is_some() {
            return period;
        }
    }

    let schedule: &str = row.get(SCHEDULE_ALIASES)?;
    Some(
        resolve_schedule(schedule, default_months)
            .into_iter()
            .next()
            .unwrap_or_else(|| LeavePeriod::unparsed(schedule)),
    )
}
