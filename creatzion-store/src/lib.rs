//! creatzion-store: per-user transaction retrieval from CSV files, JSON files
//! or memory.

pub mod csv_file;
pub mod error;
pub mod json_file;
pub mod memory;

use std::path::Path;

use creatzion_core::Transaction;

pub use csv_file::CsvStore;
pub use error::{Result, StoreError};
pub use json_file::JsonStore;
pub use memory::MemoryStore;

/// Default number of transactions handed to the engine per request
pub const DEFAULT_FETCH_LIMIT: usize = 100;

/// Source of a user's transaction history
pub trait TransactionStore {
    /// Up to `limit` transactions for `user`, newest first. Unknown users get
    /// an empty list.
    fn recent(&self, user: &str, limit: usize) -> Result<Vec<Transaction>>;
}

/// Pick a file-backed store from the extension (`.csv` or `.json`)
pub fn open(path: impl AsRef<Path>) -> Result<Box<dyn TransactionStore + Send + Sync>> {
    let path = path.as_ref();
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    match ext.as_deref() {
        Some("csv") => Ok(Box::new(CsvStore::new(path))),
        Some("json") => Ok(Box::new(JsonStore::new(path))),
        _ => Err(StoreError::UnsupportedFormat(path.display().to_string())),
    }
}

/// Sort newest first (stable for equal timestamps) and keep `limit` rows
pub(crate) fn newest_first(mut rows: Vec<Transaction>, limit: usize) -> Vec<Transaction> {
    rows.sort_by(|a, b| b.date.cmp(&a.date));
    rows.truncate(limit);
    rows
}
