//! Refinement stages: amount, date range, type, recurrence, account, category.
//!
//! Each stage is a pure function over the running candidate set. A stage that
//! finds no trigger phrase in the message returns `None` and the set passes
//! through untouched. A stage that fires reads its input according to the
//! [`SeedPolicy`]: with `RestartFromHistory` an empty running set is replaced by
//! the full history first, so e.g. "expenses in march 2023" still returns all
//! expenses when march 2023 has no rows. That restart is intended behaviour.

use chrono::{Datelike, NaiveDateTime};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use tracing::debug;

use crate::taxonomy;
use crate::temporal::{self, DateWindow};
use crate::transaction::{Transaction, TransactionType};

/// Where a firing stage takes its input from when the running set is empty
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SeedPolicy {
    /// Start over from the full history
    #[default]
    RestartFromHistory,
    /// Stay empty
    KeepEmpty,
}

/// What every stage gets to look at besides the candidates
#[derive(Debug, Clone, Copy)]
pub struct QueryContext<'t> {
    pub text: &'t str,
    pub now: NaiveDateTime,
}

pub type StageFn =
    for<'a> fn(&[&'a Transaction], &QueryContext<'_>) -> Option<Vec<&'a Transaction>>;

pub struct RefinementStage {
    pub name: &'static str,
    pub apply: StageFn,
}

/// Application order
pub const STAGES: [RefinementStage; 7] = [
    RefinementStage { name: "amount-threshold", apply: amount_threshold },
    RefinementStage { name: "amount-range", apply: amount_range },
    RefinementStage { name: "date-range", apply: date_range },
    RefinementStage { name: "type", apply: transaction_type },
    RefinementStage { name: "recurrence", apply: recurrence },
    RefinementStage { name: "account", apply: account },
    RefinementStage { name: "category", apply: category },
];

/// Input for a firing stage under `policy`
pub fn seed<'a>(
    current: &[&'a Transaction],
    history: &'a [Transaction],
    policy: SeedPolicy,
) -> Vec<&'a Transaction> {
    if current.is_empty() && policy == SeedPolicy::RestartFromHistory {
        history.iter().collect()
    } else {
        current.to_vec()
    }
}

/// Thread `candidates` through every stage in order
pub fn refine<'a>(
    candidates: Vec<&'a Transaction>,
    history: &'a [Transaction],
    ctx: &QueryContext<'_>,
    policy: SeedPolicy,
) -> Vec<&'a Transaction> {
    STAGES.iter().fold(candidates, |acc, stage| {
        let input = seed(&acc, history, policy);
        match (stage.apply)(&input, ctx) {
            Some(out) => {
                debug!(stage = stage.name, before = input.len(), after = out.len(), "refined");
                out
            }
            None => acc,
        }
    })
}

const CURRENCY: &str = r"(?:(₹|rs\.?|inr)\s*)?";
const NUMBER: &str = r"(\d[\d,]*(?:\.\d+)?)";

static THRESHOLD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?i)\b(more than|greater than|above|over|less than|below|under)\s*{CURRENCY}{NUMBER}"
    ))
    .expect("valid threshold regex")
});

static BETWEEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?i)\bbetween\s+(?:the\s+)?{CURRENCY}{NUMBER}(st|nd|rd|th)?\s+(?:and|to|&)\s+(?:the\s+)?{CURRENCY}{NUMBER}(st|nd|rd|th)?\b"
    ))
    .expect("valid between regex")
});

static INCOME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:income|incomes|earned|earning|earnings|salary|received|credited)\b")
        .expect("valid income regex")
});

static EXPENSE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:expenses?|spent|spend|spending|paid|debited|purchases?|bought)\b")
        .expect("valid expense regex")
});

static ONE_TIME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:one[- ]?time|one[- ]off|single|non[- ]?recurring)\b")
        .expect("valid one-time regex")
});

static RECURRING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:recurring|subscriptions?|repeating|repeated|autopay)\b")
        .expect("valid recurring regex")
});

static ACCOUNT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:from\s+(?:the|my)\s+)?(savings|credit|debit|current)\s+account\b")
        .expect("valid account regex")
});

/// Parse a captured amount; anything non-numeric means "no filter"
fn parse_amount(raw: &str) -> Option<f64> {
    raw.replace(',', "").parse::<f64>().ok().filter(|v| v.is_finite())
}

fn amount_threshold<'a>(input: &[&'a Transaction], ctx: &QueryContext<'_>) -> Option<Vec<&'a Transaction>> {
    let caps = THRESHOLD.captures(ctx.text)?;
    let limit = parse_amount(&caps[3])?;
    let above = matches!(
        caps[1].to_lowercase().as_str(),
        "more than" | "greater than" | "above" | "over"
    );
    Some(
        input
            .iter()
            .copied()
            .filter(|t| if above { t.amount > limit } else { t.amount < limit })
            .collect(),
    )
}

/// A parsed `between X and Y` clause
#[derive(Debug, Clone, Copy, PartialEq)]
struct Between {
    low: f64,
    high: f64,
    currency: bool,
    ordinal: bool,
}

impl Between {
    /// Day-of-month range rather than an amount range: an ordinal suffix
    /// (`the 5th and 20th`), no currency marker, both bounds whole days.
    /// Plain numbers are always amounts.
    fn is_day_range(&self) -> bool {
        let day_like = |v: f64| v.fract() == 0.0 && (1.0..=31.0).contains(&v);
        self.ordinal && !self.currency && day_like(self.low) && day_like(self.high)
    }
}

fn between_clause(text: &str) -> Option<Between> {
    let caps = BETWEEN.captures(text)?;
    let mut low = parse_amount(&caps[2])?;
    let mut high = parse_amount(&caps[5])?;
    if low > high {
        std::mem::swap(&mut low, &mut high);
    }
    Some(Between {
        low,
        high,
        currency: caps.get(1).is_some() || caps.get(4).is_some(),
        ordinal: caps.get(3).is_some() || caps.get(6).is_some(),
    })
}

fn amount_range<'a>(input: &[&'a Transaction], ctx: &QueryContext<'_>) -> Option<Vec<&'a Transaction>> {
    let b = between_clause(ctx.text).filter(|b| !b.is_day_range())?;
    Some(
        input
            .iter()
            .copied()
            .filter(|t| b.low <= t.amount && t.amount <= b.high)
            .collect(),
    )
}

/// Window for a `from DATE to DATE` or a day-of-month `between` phrase.
///
/// Day ranges are taken in the month of `now`; days past the end of that
/// month are clamped to its last day.
pub fn date_range_window(text: &str, now: NaiveDateTime) -> Option<DateWindow> {
    if let Some((a, b)) = temporal::explicit_range(text) {
        let (first, last) = if a <= b { (a, b) } else { (b, a) };
        return Some(DateWindow::days(first, last));
    }

    let b = between_clause(text).filter(Between::is_day_range)?;
    let today = now.date();
    let month_end = temporal::last_day_of_month(today.year(), today.month())?;
    let clamp = |v: f64| (v as u32).clamp(1, month_end.day());
    let first = today.with_day(clamp(b.low))?;
    let last = today.with_day(clamp(b.high))?;
    Some(DateWindow::days(first, last))
}

fn date_range<'a>(input: &[&'a Transaction], ctx: &QueryContext<'_>) -> Option<Vec<&'a Transaction>> {
    let window = date_range_window(ctx.text, ctx.now)?;
    Some(input.iter().copied().filter(|t| window.contains(t.date)).collect())
}

/// Income or expense, when exactly one of the two vocabularies appears
pub fn requested_type(text: &str) -> Option<TransactionType> {
    match (INCOME.is_match(text), EXPENSE.is_match(text)) {
        (true, false) => Some(TransactionType::Income),
        (false, true) => Some(TransactionType::Expense),
        _ => None,
    }
}

fn transaction_type<'a>(input: &[&'a Transaction], ctx: &QueryContext<'_>) -> Option<Vec<&'a Transaction>> {
    let kind = requested_type(ctx.text)?;
    Some(input.iter().copied().filter(|t| t.kind == kind).collect())
}

/// `Some(true)` for recurring, `Some(false)` for one-time
pub fn requested_recurrence(text: &str) -> Option<bool> {
    if ONE_TIME.is_match(text) {
        Some(false)
    } else if RECURRING.is_match(text) {
        Some(true)
    } else {
        None
    }
}

fn recurrence<'a>(input: &[&'a Transaction], ctx: &QueryContext<'_>) -> Option<Vec<&'a Transaction>> {
    let recurring = requested_recurrence(ctx.text)?;
    Some(input.iter().copied().filter(|t| t.is_recurring == recurring).collect())
}

fn account<'a>(input: &[&'a Transaction], ctx: &QueryContext<'_>) -> Option<Vec<&'a Transaction>> {
    let caps = ACCOUNT.captures(ctx.text)?;
    let wanted = caps[1].to_lowercase();
    Some(
        input
            .iter()
            .copied()
            .filter(|t| {
                t.account.as_ref().is_some_and(|a| {
                    a.kind.to_lowercase().contains(&wanted) || a.name.to_lowercase().contains(&wanted)
                })
            })
            .collect(),
    )
}

fn category<'a>(input: &[&'a Transaction], ctx: &QueryContext<'_>) -> Option<Vec<&'a Transaction>> {
    let cat = taxonomy::detect_category(ctx.text)?;
    Some(input.iter().copied().filter(|t| cat.matches(t)).collect())
}
