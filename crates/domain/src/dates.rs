// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Brazilian date parsing, formatting and day arithmetic.
//!
//! Spreadsheet cells carry dates in several shapes. [`parse_date`] tries
//! them in a fixed priority order so that `15/01/2025` is always read as
//! day/month/year:
//!
//! 1. `DD/MM/YYYY`
//! 2. `month/YYYY` (full name or three-letter abbreviation, day 1)
//! 3. `mon-YY` (two-digit year in 2000-2099, day 1)
//! 4. `MM/YYYY` (day 1)
//! 5. ISO `YYYY-MM-DD`
//! 6. a lenient fallback (`YYYY/MM/DD`, `YYYY.MM.DD`, `DD-MM-YYYY`,
//!    `DD.MM.YYYY`, ISO date-times, `month YYYY`, `month de YYYY`,
//!    `mon-YYYY`)
//!
//! Every candidate passes the same bounds check: year 1900-2100 and a day
//! that exists in that month.
//!
//! Month arithmetic follows the leave regulations: a month is exactly
//! thirty days.

use crate::normalize::normalize_key;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use time::parsing::Parsed;
use time::{Date, Duration, Month};

/// Earliest year accepted by the parser.
pub const MIN_YEAR: i32 = 1900;
/// Latest year accepted by the parser.
pub const MAX_YEAR: i32 = 2100;
/// Days in a regulatory month.
pub const DAYS_PER_MONTH: i64 = 30;

type Layout = &'static [BorrowedFormatItem<'static>];

const DAY_MONTH_YEAR: Layout =
    format_description!("[day padding:none]/[month padding:none]/[year]");
const MONTH_YEAR: Layout = format_description!("[month padding:none]/[year]");
const ISO_DATE: Layout = format_description!("[year]-[month padding:none]-[day padding:none]");
const FALLBACK_LAYOUTS: [Layout; 4] = [
    format_description!("[year]/[month padding:none]/[day padding:none]"),
    format_description!("[year].[month padding:none].[day padding:none]"),
    format_description!("[day padding:none]-[month padding:none]-[year]"),
    format_description!("[day padding:none].[month padding:none].[year]"),
];
const DISPLAY_FORMAT: Layout = format_description!("[day]/[month]/[year]");

const MONTH_NAMES: [(&str, &str); 12] = [
    ("janeiro", "jan"),
    ("fevereiro", "fev"),
    ("marco", "mar"),
    ("abril", "abr"),
    ("maio", "mai"),
    ("junho", "jun"),
    ("julho", "jul"),
    ("agosto", "ago"),
    ("setembro", "set"),
    ("outubro", "out"),
    ("novembro", "nov"),
    ("dezembro", "dez"),
];

/// Builds a date from raw components, applying the parser's bounds.
#[must_use]
pub fn calendar_date(year: i32, month: u8, day: u8) -> Option<Date> {
    if !(MIN_YEAR..=MAX_YEAR).contains(&year) {
        return None;
    }
    let month: Month = Month::try_from(month).ok()?;
    Date::from_calendar_date(year, month, day).ok()
}

/// Returns true if the date lies inside the parser's accepted year range.
#[must_use]
pub fn is_within_bounds(date: Date) -> bool {
    (MIN_YEAR..=MAX_YEAR).contains(&date.year())
}

/// Resolves a Portuguese month name or abbreviation, ignoring case and
/// accents.
#[must_use]
pub fn month_from_name(name: &str) -> Option<u8> {
    let key: String = normalize_key(name.trim_end_matches('.'));
    MONTH_NAMES
        .iter()
        .position(|(full, abbrev)| key == *full || key == *abbrev)
        .and_then(|idx| u8::try_from(idx + 1).ok())
}

fn is_digits(s: &str, len: usize) -> bool {
    s.len() == len && s.chars().all(|c| c.is_ascii_digit())
}

fn is_alpha(s: &str) -> bool {
    !s.is_empty() && s.chars().all(char::is_alphabetic)
}

fn parse_layout(text: &str, layout: Layout) -> Option<Date> {
    Date::parse(text, layout)
        .ok()
        .filter(|date| is_within_bounds(*date))
}

fn named_month(month: &str, year: &str) -> Option<Date> {
    if !is_digits(year, 4) {
        return None;
    }
    calendar_date(year.parse::<i32>().ok()?, month_from_name(month)?, 1)
}

fn parse_month_name_year(text: &str) -> Option<Date> {
    match text.split('/').collect::<Vec<&str>>().as_slice() {
        [month, year] => named_month(month, year),
        _ => None,
    }
}

fn parse_month_abbrev_short_year(text: &str) -> Option<Date> {
    match text.split('-').collect::<Vec<&str>>().as_slice() {
        [month, yy] if is_alpha(month) && is_digits(yy, 2) => {
            let yy: i32 = yy.parse::<u8>().ok()?.into();
            calendar_date(2000 + yy, month_from_name(month)?, 1)
        }
        _ => None,
    }
}

/// `MM/YYYY` carries no day, so it goes through [`Parsed`] rather than
/// [`Date::parse`].
fn parse_numeric_month_year(text: &str) -> Option<Date> {
    let mut parsed: Parsed = Parsed::new();
    let rest: &[u8] = parsed.parse_items(text.as_bytes(), MONTH_YEAR).ok()?;
    if !rest.is_empty() {
        return None;
    }
    calendar_date(parsed.year()?, u8::from(parsed.month()?), 1)
}

fn parse_fallback(text: &str) -> Option<Date> {
    // ISO date-time: keep the date part.
    if text.len() > 10 && text.is_char_boundary(10) {
        let (head, tail) = text.split_at(10);
        if (tail.starts_with('T') || tail.starts_with(' '))
            && let Some(date) = parse_layout(head, ISO_DATE)
        {
            return Some(date);
        }
    }

    if let Some(date) = FALLBACK_LAYOUTS
        .into_iter()
        .find_map(|layout| parse_layout(text, layout))
    {
        return Some(date);
    }

    if let [month, year] = text.split('-').collect::<Vec<&str>>().as_slice()
        && is_alpha(month)
    {
        return named_month(month, year);
    }

    match text.split_whitespace().collect::<Vec<&str>>().as_slice() {
        [month, year] => named_month(month, year),
        [month, de, year] if normalize_key(de) == "de" => named_month(month, year),
        _ => None,
    }
}

/// Parses a date cell. Returns `None` for anything it cannot interpret.
#[must_use]
pub fn parse_date(text: &str) -> Option<Date> {
    let text: &str = text.trim();
    if text.is_empty() {
        return None;
    }

    parse_layout(text, DAY_MONTH_YEAR)
        .or_else(|| parse_month_name_year(text))
        .or_else(|| parse_month_abbrev_short_year(text))
        .or_else(|| parse_numeric_month_year(text))
        .or_else(|| parse_layout(text, ISO_DATE))
        .or_else(|| parse_fallback(text))
}

/// Parses an optional cell, treating `None` like an unparsable value.
#[must_use]
pub fn parse_optional_date(text: Option<&str>) -> Option<Date> {
    text.and_then(parse_date)
}

/// Formats a date as `DD/MM/YYYY`.
#[must_use]
pub fn format_date(date: Date) -> String {
    date.format(DISPLAY_FORMAT)
        .unwrap_or_else(|_| date.to_string())
}

/// Formats an optional date, producing an empty string for `None` so
/// display code can print the result directly.
#[must_use]
pub fn format_optional_date(date: Option<Date>) -> String {
    date.map_or_else(String::new, format_date)
}

/// Adds (or subtracts) whole days.
#[must_use]
pub fn add_days(date: Date, days: i64) -> Option<Date> {
    date.checked_add(Duration::days(days))
}

/// Adds regulatory months of thirty days each.
#[must_use]
pub fn add_regulatory_months(date: Date, months: u32) -> Option<Date> {
    add_days(date, i64::from(months) * DAYS_PER_MONTH)
}

/// Adds calendar years, moving February 29 to February 28 when the target
/// year is not a leap year.
#[must_use]
pub fn add_years(date: Date, years: u32) -> Option<Date> {
    let year: i32 = date.year().checked_add(i32::try_from(years).ok()?)?;
    Date::from_calendar_date(year, date.month(), date.day())
        .or_else(|_| Date::from_calendar_date(year, date.month(), date.day() - 1))
        .ok()
}

/// Signed number of days from `from` to `to`.
#[must_use]
pub fn days_between(from: Date, to: Date) -> i64 {
    (to - from).whole_days()
}
