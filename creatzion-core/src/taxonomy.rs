//! Fixed category taxonomy used to recognise category words in a message and
//! to match transactions against them.
//!
//! Each category owns a synonym regex. Matching is deterministic: the first
//! category (in table order) whose regex hits the message wins.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

use crate::transaction::Transaction;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Category {
    #[serde(rename = "housing")]
    Housing,
    #[serde(rename = "food")]
    Food,
    #[serde(rename = "transport")]
    Transport,
    #[serde(rename = "entertainment")]
    Entertainment,
    #[serde(rename = "shopping")]
    Shopping,
    #[serde(rename = "utilities")]
    Utilities,
    #[serde(rename = "education")]
    Education,
    #[serde(rename = "health")]
    Health,
    #[serde(rename = "travel")]
    Travel,
}

impl Category {
    pub const ALL: [Category; 9] = [
        Category::Housing,
        Category::Food,
        Category::Transport,
        Category::Entertainment,
        Category::Shopping,
        Category::Utilities,
        Category::Education,
        Category::Health,
        Category::Travel,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Category::Housing => "housing",
            Category::Food => "food",
            Category::Transport => "transport",
            Category::Entertainment => "entertainment",
            Category::Shopping => "shopping",
            Category::Utilities => "utilities",
            Category::Education => "education",
            Category::Health => "health",
            Category::Travel => "travel",
        }
    }

    fn synonyms(&self) -> &'static str {
        match self {
            Category::Housing => r"housing|house|home|rent|mortgage|apartment|flat|maintenance",
            Category::Food => {
                r"food|groceries|grocery|restaurants?|dining|lunch|dinner|breakfast|swiggy|zomato|snacks?|cafe"
            }
            Category::Transport => {
                r"transport|transportation|commute|uber|ola|rapido|taxi|cab|fuel|petrol|diesel|metro|bus|train"
            }
            Category::Entertainment => {
                r"entertainment|movies?|cinema|netflix|spotify|prime video|hotstar|concerts?|games?|gaming"
            }
            Category::Shopping => r"shopping|amazon|flipkart|myntra|clothes|clothing|shoes|mall",
            Category::Utilities => {
                r"utilities|utility|electricity|water bill|gas bill|internet|wifi|broadband|mobile recharge|phone bill|recharge"
            }
            Category::Education => r"education|school|college|tuition|course|courses|books?|exam fees?",
            Category::Health => {
                r"health|healthcare|medical|medicine|doctor|hospital|pharmacy|clinic|insurance|gym|fitness"
            }
            Category::Travel => r"travel|trip|flights?|hotels?|vacation|holiday|tour|airbnb",
        }
    }

    /// True when the transaction's category or description mentions this category
    pub fn matches(&self, txn: &Transaction) -> bool {
        let re = &TABLE[self.index()].1;
        re.is_match(txn.category()) || re.is_match(txn.description())
    }

    fn index(&self) -> usize {
        Category::ALL
            .iter()
            .position(|c| c == self)
            .unwrap_or_default()
    }
}

static TABLE: LazyLock<Vec<(Category, Regex)>> = LazyLock::new(|| {
    Category::ALL
        .iter()
        .map(|c| {
            let pattern = format!(r"(?i)\b(?:{})\b", c.synonyms());
            (*c, Regex::new(&pattern).expect("valid category regex"))
        })
        .collect()
});

/// First category mentioned in the message, in table order
pub fn detect_category(text: &str) -> Option<Category> {
    TABLE
        .iter()
        .find(|(_, re)| re.is_match(text))
        .map(|(c, _)| *c)
}

/// Whether any category word appears in the message
pub fn mentions_category(text: &str) -> bool {
    detect_category(text).is_some()
}
