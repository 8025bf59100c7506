//! Ranking: "top 5", "smallest", "latest 3" and friends.

use regex::Regex;
use serde::Serialize;
use std::cmp::Ordering;
use std::sync::LazyLock;

use crate::transaction::Transaction;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SortField {
    Amount,
    Date,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SortDirection {
    Ascending,
    Descending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SortSpec {
    pub field: SortField,
    pub direction: SortDirection,
    pub limit: usize,
}

static SMALLEST: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(?:smallest|lowest)\b").expect("valid regex"));

static BIGGEST: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(?:top|biggest|largest|highest)\b").expect("valid regex"));

static LATEST: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(?:latest|recent)\b").expect("valid regex"));

static LIMIT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:top|latest|recent|first|last)\s+(\d+)(\s+(?:days?|weeks?|months?|years?))?\b")
        .expect("valid limit regex")
});

/// Sort request in the message, if it uses ranking language
pub fn sort_spec(text: &str, default_limit: usize) -> Option<SortSpec> {
    let (field, direction) = if SMALLEST.is_match(text) {
        (SortField::Amount, SortDirection::Ascending)
    } else if BIGGEST.is_match(text) {
        (SortField::Amount, SortDirection::Descending)
    } else if LATEST.is_match(text) {
        (SortField::Date, SortDirection::Descending)
    } else {
        return None;
    };

    Some(SortSpec {
        field,
        direction,
        limit: requested_limit(text).unwrap_or(default_limit),
    })
}

/// `top N` / `latest N` count; `last N days` is a period, not a count
fn requested_limit(text: &str) -> Option<usize> {
    LIMIT
        .captures_iter(text)
        .filter(|c| c.get(2).is_none())
        .find_map(|c| c[1].parse::<usize>().ok())
        .filter(|n| *n > 0)
}

/// Sorted, truncated copy; the input order is left alone
pub fn apply<'a>(items: &[&'a Transaction], spec: &SortSpec) -> Vec<&'a Transaction> {
    let mut out = items.to_vec();
    out.sort_by(|a, b| {
        let ord = match spec.field {
            SortField::Amount => a.amount.partial_cmp(&b.amount).unwrap_or(Ordering::Equal),
            SortField::Date => a.date.cmp(&b.date),
        };
        match spec.direction {
            SortDirection::Ascending => ord,
            SortDirection::Descending => ord.reverse(),
        }
    });
    out.truncate(spec.limit);
    out
}
