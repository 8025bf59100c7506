//! In-memory store, for tests and embedding callers that already hold the data.

use std::collections::HashMap;

use creatzion_core::Transaction;

use crate::error::Result;
use crate::{newest_first, TransactionStore};

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    by_user: HashMap<String, Vec<Transaction>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, user: impl Into<String>, txn: Transaction) {
        self.by_user.entry(user.into()).or_default().push(txn);
    }

    pub fn with_user(mut self, user: impl Into<String>, txns: Vec<Transaction>) -> Self {
        self.by_user.entry(user.into()).or_default().extend(txns);
        self
    }

    pub fn users(&self) -> impl Iterator<Item = &str> {
        self.by_user.keys().map(|k| k.as_str())
    }
}

impl TransactionStore for MemoryStore {
    fn recent(&self, user: &str, limit: usize) -> Result<Vec<Transaction>> {
        let rows = self.by_user.get(user).cloned().unwrap_or_default();
        Ok(newest_first(rows, limit))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use creatzion_core::TransactionType;

    fn txn(id: &str, day: u32) -> Transaction {
        let date = NaiveDate::from_ymd_opt(2025, 1, day).unwrap().and_hms_opt(8, 0, 0).unwrap();
        Transaction::new(id, date, id, 10.0, TransactionType::Expense)
    }

    #[test]
    fn test_limit_and_order() {
        let mut store = MemoryStore::new().with_user("asha", vec![txn("a", 3), txn("b", 9)]);
        store.insert("asha", txn("c", 5));
        let ids: Vec<String> = store.recent("asha", 2).unwrap().into_iter().map(|t| t.id).collect();
        assert_eq!(ids, vec!["b", "c"]);
        assert!(store.recent("ravi", 10).unwrap().is_empty());
        assert_eq!(store.users().collect::<Vec<_>>(), vec!["asha"]);
    }
}
