//! Temporal resolver: pulls a date window out of a free-text message.
//!
//! Resolution is an ordered list of recognizers tried against the message,
//! stopping at the first one that fires:
//!
//! 1. explicit range (`from 1/3/2025 to 10/3/2025`)
//! 2. explicit date (`15/03/2025`, `1-4-25`, `2025-03-15`)
//! 3. month name, optionally followed by a year (`march 2025`, `mar`)
//! 4. bare year (2024, 2025 or 2026)
//! 5. relative period (`today`, `last month`, `this week`, `last 30 days`, ...)
//!
//! All windows are closed: a transaction at midnight of the first day and one
//! at 23:59:59 of the last day are both inside.
//!
//! Weeks are rolling 7-day windows ending today, not calendar weeks:
//! - this week: today-6 ..= today
//! - last week: today-13 ..= today-7

use chrono::{Datelike, Days, NaiveDate, NaiveDateTime, NaiveTime};
use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;
use tracing::debug;

use crate::transaction::Transaction;

/// Supported bare-year literals
pub const YEAR_RANGE: std::ops::RangeInclusive<i32> = 2024..=2026;

/// Closed interval of timestamps
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateWindow {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl DateWindow {
    /// Whole days from `first` 00:00 through the end of `last`
    pub fn days(first: NaiveDate, last: NaiveDate) -> Self {
        Self {
            start: first.and_time(NaiveTime::MIN),
            end: end_of_day(last),
        }
    }

    pub fn day(day: NaiveDate) -> Self {
        Self::days(day, day)
    }

    pub fn month(year: i32, month: u32) -> Option<Self> {
        let first = NaiveDate::from_ymd_opt(year, month, 1)?;
        Some(Self::days(first, last_day_of_month(year, month)?))
    }

    pub fn year(year: i32) -> Option<Self> {
        let first = NaiveDate::from_ymd_opt(year, 1, 1)?;
        let last = NaiveDate::from_ymd_opt(year, 12, 31)?;
        Some(Self::days(first, last))
    }

    pub fn contains(&self, at: NaiveDateTime) -> bool {
        self.start <= at && at <= self.end
    }
}

/// Relative period keywords understood by the resolver
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RelativePeriod {
    Today,
    Yesterday,
    ThisMonth,
    LastMonth,
    ThisWeek,
    LastWeek,
    ThisYear,
    LastYear,
    LastNDays(u32),
}

impl RelativePeriod {
    /// Window for this period as seen from `now`
    pub fn window(&self, now: NaiveDateTime) -> Option<DateWindow> {
        let today = now.date();
        match *self {
            RelativePeriod::Today => Some(DateWindow::day(today)),
            RelativePeriod::Yesterday => Some(DateWindow::day(today.pred_opt()?)),
            RelativePeriod::ThisMonth => DateWindow::month(today.year(), today.month()),
            RelativePeriod::LastMonth => {
                let (y, m) = previous_month(today.year(), today.month());
                DateWindow::month(y, m)
            }
            RelativePeriod::ThisWeek => Some(DateWindow::days(
                today.checked_sub_days(Days::new(6))?,
                today,
            )),
            RelativePeriod::LastWeek => Some(DateWindow::days(
                today.checked_sub_days(Days::new(13))?,
                today.checked_sub_days(Days::new(7))?,
            )),
            RelativePeriod::ThisYear => DateWindow::year(today.year()),
            RelativePeriod::LastYear => DateWindow::year(today.year() - 1),
            RelativePeriod::LastNDays(0) => None,
            RelativePeriod::LastNDays(n) => Some(DateWindow::days(
                today.checked_sub_days(Days::new(u64::from(n) - 1))?,
                today,
            )),
        }
    }
}

/// Outcome of temporal resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TemporalMatch {
    /// `from A to B`, both days inclusive, `first <= last`
    Range { first: NaiveDate, last: NaiveDate },
    ExplicitDate(NaiveDate),
    MonthYear { year: i32, month: u32 },
    /// Month with no year: that month in every year
    MonthOnly { month: u32 },
    YearOnly { year: i32 },
    Relative { period: RelativePeriod, window: DateWindow },
}

impl TemporalMatch {
    /// Concrete window, if the match maps to one (`MonthOnly` spans all years)
    pub fn window(&self) -> Option<DateWindow> {
        match *self {
            TemporalMatch::Range { first, last } => Some(DateWindow::days(first, last)),
            TemporalMatch::ExplicitDate(d) => Some(DateWindow::day(d)),
            TemporalMatch::MonthYear { year, month } => DateWindow::month(year, month),
            TemporalMatch::MonthOnly { .. } => None,
            TemporalMatch::YearOnly { year } => DateWindow::year(year),
            TemporalMatch::Relative { window, .. } => Some(window),
        }
    }

    pub fn matches(&self, txn: &Transaction) -> bool {
        match self {
            TemporalMatch::MonthOnly { month } => txn.date.month() == *month,
            other => other.window().is_some_and(|w| w.contains(txn.date)),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            TemporalMatch::Range { .. } => "range",
            TemporalMatch::ExplicitDate(_) => "explicit-date",
            TemporalMatch::MonthYear { .. } => "month-year",
            TemporalMatch::MonthOnly { .. } => "month",
            TemporalMatch::YearOnly { .. } => "year",
            TemporalMatch::Relative { .. } => "relative",
        }
    }
}

type Recognizer = fn(&str, NaiveDateTime) -> Option<TemporalMatch>;

/// Priority order; first hit wins
const RECOGNIZERS: [Recognizer; 5] = [
    recognize_range,
    recognize_explicit_date,
    recognize_month,
    recognize_year,
    recognize_relative,
];

/// Resolve the message against `now`, or `None` when no temporal signal exists
pub fn resolve(text: &str, now: NaiveDateTime) -> Option<TemporalMatch> {
    let m = RECOGNIZERS.iter().find_map(|recognizer| recognizer(text, now))?;
    debug!(kind = m.kind(), ?m, "temporal match");
    Some(m)
}

static DATE_LITERAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(\d{1,2})[-/](\d{1,2})[-/](\d{4}|\d{2})\b").expect("valid date regex")
});

static ISO_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(\d{4})-(\d{1,2})-(\d{1,2})\b").expect("valid iso date regex")
});

static FROM_TO: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"(?i)\bfrom\s+(\d{1,2}[-/]\d{1,2}[-/](?:\d{4}|\d{2}))",
        r"\s+(?:to|till|until)\s+(\d{1,2}[-/]\d{1,2}[-/](?:\d{4}|\d{2}))\b"
    ))
    .expect("valid from-to regex")
});

static MONTH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"(?i)\b(jan(?:uary)?|feb(?:ruary)?|mar(?:ch)?|apr(?:il)?|may|june?|july?|aug(?:ust)?",
        r"|sep(?:t(?:ember)?)?|oct(?:ober)?|nov(?:ember)?|dec(?:ember)?)\b",
        r"(?:,?\s*(\d{4})\b)?"
    ))
    .expect("valid month regex")
});

static YEAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(202[4-6])\b").expect("valid year regex"));

static RELATIVE: LazyLock<Vec<(RelativePeriod, Regex)>> = LazyLock::new(|| {
    [
        (RelativePeriod::Today, r"\btoday\b"),
        (RelativePeriod::Yesterday, r"\byesterday\b"),
        (RelativePeriod::ThisMonth, r"\b(?:this|current)\s+month\b"),
        (RelativePeriod::LastMonth, r"\b(?:last|previous)\s+month\b"),
        (RelativePeriod::ThisWeek, r"\b(?:this|current)\s+week\b"),
        (RelativePeriod::LastWeek, r"\b(?:last|previous)\s+week\b"),
        (RelativePeriod::ThisYear, r"\b(?:this|current)\s+year\b"),
        (RelativePeriod::LastYear, r"\b(?:last|previous)\s+year\b"),
    ]
    .into_iter()
    .map(|(p, pat)| (p, Regex::new(&format!("(?i){pat}")).expect("valid relative regex")))
    .collect()
});

static LAST_N_DAYS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:last|past|previous)\s+(\d{1,4})\s+days?\b").expect("valid last-n-days regex")
});

/// Parse `D[-/]M[-/]Y`; two-digit years are taken as 20YY
pub fn parse_date_literal(s: &str) -> Option<NaiveDate> {
    let caps = DATE_LITERAL.captures(s.trim())?;
    let day: u32 = caps[1].parse().ok()?;
    let month: u32 = caps[2].parse().ok()?;
    let mut year: i32 = caps[3].parse().ok()?;
    if caps[3].len() == 2 {
        year += 2000;
    }
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Parse `YYYY-MM-DD`
pub fn parse_iso_date(s: &str) -> Option<NaiveDate> {
    let caps = ISO_DATE.captures(s.trim())?;
    NaiveDate::from_ymd_opt(caps[1].parse().ok()?, caps[2].parse().ok()?, caps[3].parse().ok()?)
}

/// `from DATE to DATE` phrase, if present and both dates are valid
pub fn explicit_range(text: &str) -> Option<(NaiveDate, NaiveDate)> {
    let caps = FROM_TO.captures(text)?;
    Some((parse_date_literal(&caps[1])?, parse_date_literal(&caps[2])?))
}

/// Bare 2024-2026 year token, ignoring years that belong to numeric dates
pub fn bare_year(text: &str) -> Option<i32> {
    let stripped = DATE_LITERAL.replace_all(text, " ");
    let stripped = ISO_DATE.replace_all(&stripped, " ");
    let caps = YEAR.captures(&stripped)?;
    caps[1].parse().ok()
}

fn recognize_range(text: &str, _now: NaiveDateTime) -> Option<TemporalMatch> {
    let (a, b) = explicit_range(text)?;
    let (first, last) = if a <= b { (a, b) } else { (b, a) };
    Some(TemporalMatch::Range { first, last })
}

fn recognize_explicit_date(text: &str, _now: NaiveDateTime) -> Option<TemporalMatch> {
    DATE_LITERAL
        .find_iter(text)
        .find_map(|m| parse_date_literal(m.as_str()))
        .or_else(|| ISO_DATE.find_iter(text).find_map(|m| parse_iso_date(m.as_str())))
        .map(TemporalMatch::ExplicitDate)
}

fn recognize_month(text: &str, _now: NaiveDateTime) -> Option<TemporalMatch> {
    let caps = MONTH.captures(text)?;
    let month = month_number(&caps[1])?;
    match caps.get(2).and_then(|y| y.as_str().parse::<i32>().ok()) {
        Some(year) if NaiveDate::from_ymd_opt(year, month, 1).is_some() => {
            Some(TemporalMatch::MonthYear { year, month })
        }
        _ => Some(TemporalMatch::MonthOnly { month }),
    }
}

fn recognize_year(text: &str, _now: NaiveDateTime) -> Option<TemporalMatch> {
    bare_year(text)
        .filter(|y| YEAR_RANGE.contains(y))
        .map(|year| TemporalMatch::YearOnly { year })
}

fn recognize_relative(text: &str, now: NaiveDateTime) -> Option<TemporalMatch> {
    let period = RELATIVE
        .iter()
        .find(|(_, re)| re.is_match(text))
        .map(|(p, _)| *p)
        .or_else(|| {
            let caps = LAST_N_DAYS.captures(text)?;
            caps[1].parse().ok().map(RelativePeriod::LastNDays)
        })?;
    let window = period.window(now)?;
    Some(TemporalMatch::Relative { period, window })
}

fn month_number(name: &str) -> Option<u32> {
    let lower = name.to_lowercase();
    let m = match lower.get(..3)? {
        "jan" => 1,
        "feb" => 2,
        "mar" => 3,
        "apr" => 4,
        "may" => 5,
        "jun" => 6,
        "jul" => 7,
        "aug" => 8,
        "sep" => 9,
        "oct" => 10,
        "nov" => 11,
        "dec" => 12,
        _ => return None,
    };
    Some(m)
}

/// 23:59:59.999999999 of `day`
pub fn end_of_day(day: NaiveDate) -> NaiveDateTime {
    day.and_time(NaiveTime::from_hms_nano_opt(23, 59, 59, 999_999_999).unwrap_or(NaiveTime::MIN))
}

pub fn last_day_of_month(year: i32, month: u32) -> Option<NaiveDate> {
    let (ny, nm) = if month == 12 { (year + 1, 1) } else { (year, month + 1) };
    NaiveDate::from_ymd_opt(ny, nm, 1)?.pred_opt()
}

fn previous_month(year: i32, month: u32) -> (i32, u32) {
    if month == 1 { (year - 1, 12) } else { (year, month - 1) }
}
