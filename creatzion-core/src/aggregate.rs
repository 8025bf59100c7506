//! Aggregation and payload shaping for the final candidate set

use chrono::{Datelike, NaiveDateTime};
use serde::Serialize;

use crate::transaction::Transaction;

/// Rows shown in a detail payload
pub const DISPLAY_ROWS: usize = 15;

const MONTH_NAMES: [&str; 12] = [
    "January", "February", "March", "April", "May", "June", "July", "August", "September",
    "October", "November", "December",
];

/// Count, sum and date span over a full (untruncated) set
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Summary {
    pub count: usize,
    pub total: f64,
    pub first: Option<NaiveDateTime>,
    pub last: Option<NaiveDateTime>,
}

impl Summary {
    pub fn of(items: &[&Transaction]) -> Self {
        Self {
            count: items.len(),
            total: items.iter().map(|t| t.amount).sum(),
            first: items.iter().map(|t| t.date).min(),
            last: items.iter().map(|t| t.date).max(),
        }
    }
}

/// What the caller renders and feeds into the prompt
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum ResultPayload {
    YearSummary(YearSummary),
    Detail(DetailResult),
}

impl ResultPayload {
    pub fn count(&self) -> usize {
        match self {
            ResultPayload::YearSummary(y) => y.transactions.len(),
            ResultPayload::Detail(d) => d.count,
        }
    }
}

/// Full set for a bare-year question, rolled up by month on demand
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YearSummary {
    pub year: i32,
    pub transactions: Vec<Transaction>,
}

/// First rows for display plus totals over everything that matched
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetailResult {
    pub transactions: Vec<Transaction>,
    pub total: f64,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthTotal {
    pub month: u32,
    pub name: &'static str,
    pub count: usize,
    pub total: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyRollup {
    pub year: i32,
    /// Calendar order, months without rows omitted
    pub months: Vec<MonthTotal>,
    pub count: usize,
    pub total: f64,
}

impl YearSummary {
    pub fn monthly_rollup(&self) -> MonthlyRollup {
        let mut buckets = [(0usize, 0.0f64); 12];
        for t in &self.transactions {
            let slot = &mut buckets[t.date.month0() as usize];
            slot.0 += 1;
            slot.1 += t.amount;
        }

        let months: Vec<MonthTotal> = buckets
            .iter()
            .enumerate()
            .filter(|(_, (count, _))| *count > 0)
            .map(|(i, (count, total))| MonthTotal {
                month: i as u32 + 1,
                name: MONTH_NAMES[i],
                count: *count,
                total: *total,
            })
            .collect();

        MonthlyRollup {
            year: self.year,
            count: months.iter().map(|m| m.count).sum(),
            total: months.iter().map(|m| m.total).sum(),
            months,
        }
    }
}

/// Shape the final set. `year_only` carries the year of a bare-year query that
/// nothing more specific narrowed.
pub fn shape(items: &[&Transaction], year_only: Option<i32>, display_rows: usize) -> ResultPayload {
    match year_only {
        Some(year) => ResultPayload::YearSummary(YearSummary {
            year,
            transactions: items.iter().map(|t| (*t).clone()).collect(),
        }),
        None => {
            let summary = Summary::of(items);
            ResultPayload::Detail(DetailResult {
                transactions: items.iter().take(display_rows).map(|t| (*t).clone()).collect(),
                total: summary.total,
                count: summary.count,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transaction::TransactionType;
    use chrono::NaiveDate;

    fn txn(m: u32, d: u32, amount: f64) -> Transaction {
        let date = NaiveDate::from_ymd_opt(2024, m, d).unwrap().and_hms_opt(10, 0, 0).unwrap();
        Transaction::new(format!("{m}-{d}"), date, "x", amount, TransactionType::Expense)
    }

    #[test]
    fn test_detail_total_covers_truncated_rows() {
        let h: Vec<_> = (1..=20).map(|d| txn(1, d, 100.0)).collect();
        let refs: Vec<&Transaction> = h.iter().collect();
        match shape(&refs, None, DISPLAY_ROWS) {
            ResultPayload::Detail(d) => {
                assert_eq!(d.transactions.len(), 15);
                assert_eq!(d.count, 20);
                assert_eq!(d.total, 2000.0);
            }
            other => panic!("expected detail, got {other:?}"),
        }
    }

    #[test]
    fn test_summary_date_span() {
        let h = vec![txn(3, 5, 1.0), txn(1, 2, 2.0), txn(7, 9, 3.0)];
        let refs: Vec<&Transaction> = h.iter().collect();
        let s = Summary::of(&refs);
        assert_eq!(s.count, 3);
        assert_eq!(s.total, 6.0);
        assert_eq!(s.first.unwrap().date(), NaiveDate::from_ymd_opt(2024, 1, 2).unwrap());
        assert_eq!(s.last.unwrap().date(), NaiveDate::from_ymd_opt(2024, 7, 9).unwrap());

        let empty = Summary::of(&[]);
        assert_eq!(empty.count, 0);
        assert!(empty.first.is_none());
    }

    #[test]
    fn test_monthly_rollup_skips_empty_months() {
        let h = vec![txn(1, 2, 100.0), txn(1, 20, 50.0), txn(3, 1, 25.5)];
        let refs: Vec<&Transaction> = h.iter().collect();
        let ResultPayload::YearSummary(y) = shape(&refs, Some(2024), DISPLAY_ROWS) else {
            panic!("expected year summary");
        };
        let r = y.monthly_rollup();
        assert_eq!(r.months.len(), 2);
        assert_eq!(r.months[0].name, "January");
        assert_eq!(r.months[0].count, 2);
        assert_eq!(r.months[0].total, 150.0);
        assert_eq!(r.months[1].month, 3);
        assert_eq!(r.count, 3);
        assert_eq!(r.total, 175.5);
    }

    #[test]
    fn test_payload_json_tag() {
        let h = vec![txn(1, 2, 100.0)];
        let refs: Vec<&Transaction> = h.iter().collect();
        let v = serde_json::to_value(shape(&refs, None, DISPLAY_ROWS)).unwrap();
        assert_eq!(v["kind"], "detail");
        assert_eq!(v["count"], 1);
    }
}
