//! JSON-backed store: an object mapping user id to that user's transactions.
//!
//! ```json
//! { "asha": [ { "id": "t1", "date": "2025-01-05", "amount": 15000, "type": "EXPENSE" } ] }
//! ```

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use creatzion_core::Transaction;
use tracing::debug;

use crate::error::Result;
use crate::{newest_first, TransactionStore};

#[derive(Debug, Clone)]
pub struct JsonStore {
    path: PathBuf,
}

impl JsonStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn load(&self) -> Result<HashMap<String, Vec<Transaction>>> {
        let raw = fs::read_to_string(&self.path)?;
        let map: HashMap<String, Vec<Transaction>> = serde_json::from_str(&raw)?;
        debug!(path = %self.path.display(), users = map.len(), "loaded json");
        Ok(map)
    }
}

impl TransactionStore for JsonStore {
    fn recent(&self, user: &str, limit: usize) -> Result<Vec<Transaction>> {
        let rows = self.load()?.remove(user).unwrap_or_default();
        Ok(newest_first(rows, limit))
    }
}
