//! Keyword fallback: when no date signal is present, match the meaningful
//! words of the message against transaction descriptions and categories.

use crate::transaction::Transaction;

const STOP_WORDS: [&str; 18] = [
    "how", "much", "did", "spent", "the", "what", "show", "me", "my", "all", "on", "in", "can",
    "you", "give", "only", "and", "for",
];

/// Whitespace tokens, lowercased, minus short words and stop words
pub fn tokenize(text: &str) -> Vec<String> {
    text.split_whitespace()
        .map(|t| t.to_lowercase())
        .filter(|t| t.chars().count() > 2)
        .filter(|t| !STOP_WORDS.contains(&t.as_str()))
        .collect()
}

/// True when any token is a substring of the description or the category
pub fn matches_any(txn: &Transaction, tokens: &[String]) -> bool {
    let desc = txn.description().to_lowercase();
    let category = txn.category().to_lowercase();
    tokens
        .iter()
        .any(|t| desc.contains(t.as_str()) || category.contains(t.as_str()))
}
