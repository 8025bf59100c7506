//! Query classifier: a cheap keyword gate deciding whether a chat message is
//! about the user's transactions at all.
//!
//! Recall beats precision here. A false positive only costs a filtering pass
//! that ends in "no results"; a false negative hides the user's data.

use regex::Regex;
use std::sync::LazyLock;

use crate::taxonomy;

static TRANSACTION_QUERY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"(?i)",
        // financial nouns and verbs
        r"\b(?:transactions?|spen[dt]|spending|expenses?|income|salary|payments?|paid|pay|bills?",
        r"|money|rupees?|rs\.?|inr|amount|budget|purchases?|bought|cost|earned|earnings|balance",
        r"|accounts?|subscriptions?|recurring|savings|credit|debit|refunds?|transfers?)\b",
        r"|₹",
        // date words
        r"|\b(?:today|yesterday|week|weeks|month|months|year|years|days|daily|weekly|monthly|yearly|recent|latest)\b",
        // month names
        r"|\b(?:jan(?:uary)?|feb(?:ruary)?|mar(?:ch)?|apr(?:il)?|may|june?|july?|aug(?:ust)?",
        r"|sep(?:t(?:ember)?)?|oct(?:ober)?|nov(?:ember)?|dec(?:ember)?)\b",
        // year literals and numeric dates
        r"|\b202[4-6]\b",
        r"|\b\d{1,2}[-/]\d{1,2}[-/]\d{2,4}\b",
        // interrogatives and ranking words
        r"|\b(?:show|list|how much|what|total|top|biggest|largest|highest|smallest|lowest)\b",
    ))
    .expect("valid classifier regex")
});

/// True when the message looks like a question about the user's transactions
pub fn is_transaction_query(text: &str) -> bool {
    TRANSACTION_QUERY.is_match(text) || taxonomy::mentions_category(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_financial_nouns() {
        assert!(is_transaction_query("my expenses please"));
        assert!(is_transaction_query("How much did I SPEND"));
        assert!(is_transaction_query("any refunds?"));
    }

    #[test]
    fn test_dates_and_years() {
        assert!(is_transaction_query("march 2025"));
        assert!(is_transaction_query("2024"));
        assert!(is_transaction_query("12/03/2025"));
        assert!(is_transaction_query("yesterday"));
        assert!(!is_transaction_query("2023"));
    }

    #[test]
    fn test_category_words() {
        assert!(is_transaction_query("groceries"));
        assert!(is_transaction_query("netflix"));
    }

    #[test]
    fn test_rupee_sign() {
        assert!(is_transaction_query("anything over ₹500"));
    }

    #[test]
    fn test_small_talk_is_not_a_query() {
        assert!(!is_transaction_query("hello there"));
        assert!(!is_transaction_query("I feel a bit anxious"));
        assert!(!is_transaction_query("thank you!"));
    }
}
