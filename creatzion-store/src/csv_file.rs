//! CSV-backed store.
//!
//! One row per transaction, all users in one file:
//!   user,id,date,description,category,amount,type,is_recurring,recurring_interval,account_name,account_type
//!
//! `date` is `YYYY-MM-DD` or `YYYY-MM-DDTHH:MM:SS`. Empty optional columns
//! read as absent.

use std::path::{Path, PathBuf};

use creatzion_core::transaction::{self, RecurringInterval, Transaction, TransactionType};
use serde::Deserialize;
use tracing::debug;

use crate::error::{Result, StoreError};
use crate::{newest_first, TransactionStore};

pub const HEADER: [&str; 11] = [
    "user",
    "id",
    "date",
    "description",
    "category",
    "amount",
    "type",
    "is_recurring",
    "recurring_interval",
    "account_name",
    "account_type",
];

/// A raw CSV row, before validation
#[derive(Debug, Deserialize)]
struct CsvRow {
    user: String,
    id: String,
    date: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    category: String,
    amount: String,
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    is_recurring: String,
    #[serde(default)]
    recurring_interval: String,
    #[serde(default)]
    account_name: String,
    #[serde(default)]
    account_type: String,
}

fn non_empty(s: String) -> Option<String> {
    let t = s.trim();
    (!t.is_empty()).then(|| t.to_string())
}

fn parse_flag(s: &str) -> Option<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "" | "false" | "no" | "0" => Some(false),
        "true" | "yes" | "1" => Some(true),
        _ => None,
    }
}

impl CsvRow {
    fn into_transaction(self, line: u64) -> Result<Transaction> {
        let invalid = |reason: String| StoreError::InvalidRecord { line, reason };

        let date = transaction::parse_datetime(&self.date)
            .ok_or_else(|| invalid(format!("bad date '{}'", self.date)))?;
        let amount: f64 = self
            .amount
            .trim()
            .replace(',', "")
            .parse()
            .map_err(|_| invalid(format!("bad amount '{}'", self.amount)))?;
        let kind = TransactionType::parse(&self.kind)
            .ok_or_else(|| invalid(format!("bad type '{}'", self.kind)))?;
        let is_recurring = parse_flag(&self.is_recurring)
            .ok_or_else(|| invalid(format!("bad is_recurring '{}'", self.is_recurring)))?;
        let recurring_interval = match self.recurring_interval.trim() {
            "" => None,
            raw => Some(
                RecurringInterval::parse(raw)
                    .ok_or_else(|| invalid(format!("bad recurring_interval '{raw}'")))?,
            ),
        };

        let mut txn = Transaction::new(self.id.trim(), date, "", amount.abs(), kind);
        txn.description = non_empty(self.description);
        txn.category = non_empty(self.category);
        txn.is_recurring = is_recurring;
        txn.recurring_interval = recurring_interval.filter(|_| is_recurring);
        if let Some(name) = non_empty(self.account_name) {
            txn = txn.with_account(name, self.account_type.trim());
        }
        Ok(txn)
    }
}

/// Re-reads the file on every call, so edits show up without a restart
#[derive(Debug, Clone)]
pub struct CsvStore {
    path: PathBuf,
}

impl CsvStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Every row in the file for `user`, in file order
    pub fn load_user(&self, user: &str) -> Result<Vec<Transaction>> {
        let mut rdr = csv::ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::Headers)
            .from_path(&self.path)?;

        let mut out = Vec::new();
        for (i, result) in rdr.deserialize::<CsvRow>().enumerate() {
            let row = result?;
            // header is line 1
            let line = i as u64 + 2;
            if !row.user.trim().eq_ignore_ascii_case(user) {
                continue;
            }
            out.push(row.into_transaction(line)?);
        }
        debug!(path = %self.path.display(), user, rows = out.len(), "loaded csv");
        Ok(out)
    }
}

impl TransactionStore for CsvStore {
    fn recent(&self, user: &str, limit: usize) -> Result<Vec<Transaction>> {
        Ok(newest_first(self.load_user(user)?, limit))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_csv(body: &str) -> tempfile::NamedTempFile {
        let mut f = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        writeln!(f, "{}", HEADER.join(",")).unwrap();
        write!(f, "{body}").unwrap();
        f.flush().unwrap();
        f
    }

    #[test]
    fn test_recent_filters_user_and_sorts() {
        let f = write_csv(
            "asha,t1,2025-01-05,Rent,Housing,15000,EXPENSE,true,MONTHLY,HDFC Savings,SAVINGS\n\
             ravi,t2,2025-01-06,Salary,,90000,INCOME,false,,,\n\
             asha,t3,2025-02-01T18:30:00,Swiggy,Food,\"1,250.50\",expense,,,,\n\
             asha,t4,2024-12-31,Bonus,,5000,INCOME,,,,\n",
        );
        let store = CsvStore::new(f.path());
        let rows = store.recent("asha", 10).unwrap();
        let ids: Vec<&str> = rows.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["t3", "t1", "t4"]);

        assert_eq!(rows[0].amount, 1250.5);
        assert_eq!(rows[0].kind, TransactionType::Expense);
        assert_eq!(rows[1].recurring_interval, Some(RecurringInterval::Monthly));
        assert_eq!(rows[1].account.as_ref().unwrap().kind, "SAVINGS");
        assert_eq!(rows[2].category(), "Uncategorized");

        assert_eq!(store.recent("asha", 1).unwrap().len(), 1);
        assert!(store.recent("nobody", 10).unwrap().is_empty());
    }

    #[test]
    fn test_invalid_row_reports_line() {
        let f = write_csv(
            "asha,t1,2025-01-05,Rent,Housing,15000,EXPENSE,,,,\n\
             asha,t2,not-a-date,Rent,Housing,15000,EXPENSE,,,,\n",
        );
        match CsvStore::new(f.path()).recent("asha", 10) {
            Err(StoreError::InvalidRecord { line, reason }) => {
                assert_eq!(line, 3);
                assert!(reason.contains("not-a-date"));
            }
            other => panic!("expected invalid record, got {other:?}"),
        }
    }

    #[test]
    fn test_interval_ignored_without_flag() {
        let f = write_csv("asha,t1,2025-01-05,Gym,Health,999,EXPENSE,false,MONTHLY,,\n");
        let rows = CsvStore::new(f.path()).recent("asha", 10).unwrap();
        assert!(!rows[0].is_recurring);
        assert_eq!(rows[0].recurring_interval, None);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = CsvStore::new("/nonexistent/txns.csv").recent("asha", 10).unwrap_err();
        assert!(matches!(err, StoreError::Csv(_) | StoreError::Io(_)));
    }
}
