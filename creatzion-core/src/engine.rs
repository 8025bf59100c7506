//! Query engine: message + history + reference time → result payload.
//!
//! Pipeline:
//! 1. classifier gate
//! 2. temporal resolver, or keyword fallback when no date signal exists
//! 3. refinement stages (see [`crate::refine`])
//! 4. "show / list / all" fallback to the most recent rows
//! 5. ranking / limiting
//! 6. aggregation and payload shaping
//!
//! Every stage is total; a message that matches nothing ends in
//! [`QueryOutcome::NoData`], never an error.

use chrono::NaiveDateTime;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use tracing::debug;

use crate::aggregate::{self, ResultPayload, Summary, DISPLAY_ROWS};
use crate::classifier;
use crate::keyword;
use crate::rank::{self, SortSpec};
use crate::refine::{self, QueryContext, SeedPolicy};
use crate::taxonomy;
use crate::temporal::{self, TemporalMatch};
use crate::transaction::Transaction;

/// Tunables, mirrored by the `[engine]` config section
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineOptions {
    /// Rows kept in a detail payload
    pub display_rows: usize,
    /// Rows returned by the "show / list / all" fallback
    pub fallback_rows: usize,
    /// Limit used when ranking language carries no number
    pub default_rank_limit: usize,
    pub seed_policy: SeedPolicy,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            display_rows: DISPLAY_ROWS,
            fallback_rows: 10,
            default_rank_limit: 10,
            seed_policy: SeedPolicy::RestartFromHistory,
        }
    }
}

/// Working state of one request
#[derive(Debug, Clone)]
pub struct QueryIntent<'a> {
    pub candidates: Vec<&'a Transaction>,
    /// Still a plain "2024"-style question with nothing more specific
    pub is_year_only: bool,
    pub temporal: Option<TemporalMatch>,
    pub sort: Option<SortSpec>,
    /// Keyword fallback tokens, when that path ran
    pub keywords: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "kebab-case")]
pub enum QueryOutcome {
    /// Message is not about transactions; nothing was filtered
    NotAQuery,
    /// A transaction question with no matching rows
    NoData,
    Found {
        payload: ResultPayload,
        summary: Summary,
    },
}

impl QueryOutcome {
    pub fn payload(&self) -> Option<&ResultPayload> {
        match self {
            QueryOutcome::Found { payload, .. } => Some(payload),
            _ => None,
        }
    }
}

static SHOW_ALL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(?:show|list|all)\b").expect("valid regex"));

#[derive(Debug, Clone, Default)]
pub struct QueryEngine {
    options: EngineOptions,
}

impl QueryEngine {
    pub fn new(options: EngineOptions) -> Self {
        Self { options }
    }

    /// Run the whole pipeline. `history` is newest-first, as the store returns it.
    pub fn run(&self, text: &str, history: &[Transaction], now: NaiveDateTime) -> QueryOutcome {
        if !classifier::is_transaction_query(text) {
            debug!("not a transaction query");
            return QueryOutcome::NotAQuery;
        }

        let intent = self.intent(text, history, now);
        if intent.candidates.is_empty() {
            debug!("no matching transactions");
            return QueryOutcome::NoData;
        }

        let summary = Summary::of(&intent.candidates);
        let year = if intent.is_year_only { temporal::bare_year(text) } else { None };
        let payload = aggregate::shape(&intent.candidates, year, self.options.display_rows);
        debug!(count = summary.count, total = summary.total, year_summary = year.is_some(), "query done");
        QueryOutcome::Found { payload, summary }
    }

    /// Filtering and ranking without the classifier gate or payload shaping
    pub fn intent<'a>(&self, text: &str, history: &'a [Transaction], now: NaiveDateTime) -> QueryIntent<'a> {
        let policy = self.options.seed_policy;
        let ctx = QueryContext { text, now };

        let temporal = temporal::resolve(text, now);
        let mut keywords = None;
        let mut candidates: Vec<&Transaction> = match &temporal {
            Some(m) => history.iter().filter(|t| m.matches(t)).collect(),
            None => {
                let tokens = keyword::tokenize(text);
                let hits = history
                    .iter()
                    .filter(|t| keyword::matches_any(t, &tokens))
                    .collect();
                debug!(?tokens, "keyword fallback");
                keywords = Some(tokens);
                hits
            }
        };
        debug!(count = candidates.len(), "initial candidates");

        let mut is_year_only = matches!(temporal, Some(TemporalMatch::YearOnly { .. }))
            && !taxonomy::mentions_category(text);

        candidates = refine::refine(candidates, history, &ctx, policy);

        if candidates.is_empty() && SHOW_ALL.is_match(text) {
            candidates = most_recent(history, self.options.fallback_rows);
            is_year_only = false;
            debug!(count = candidates.len(), "show-all fallback");
        }

        let sort = rank::sort_spec(text, self.options.default_rank_limit);
        if let Some(spec) = &sort {
            let input = refine::seed(&candidates, history, policy);
            candidates = rank::apply(&input, spec);
            is_year_only = false;
            debug!(?spec, count = candidates.len(), "ranked");
        }

        QueryIntent {
            candidates,
            is_year_only,
            temporal,
            sort,
            keywords,
        }
    }
}

/// Newest `n` rows, regardless of the order `history` arrived in
fn most_recent(history: &[Transaction], n: usize) -> Vec<&Transaction> {
    let mut rows: Vec<&Transaction> = history.iter().collect();
    rows.sort_by(|a, b| b.date.cmp(&a.date));
    rows.truncate(n);
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transaction::TransactionType;
    use chrono::NaiveDate;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 6, 15).unwrap().and_hms_opt(12, 0, 0).unwrap()
    }

    fn txn(id: &str, y: i32, m: u32, d: u32, amount: f64) -> Transaction {
        let date = NaiveDate::from_ymd_opt(y, m, d).unwrap().and_hms_opt(10, 0, 0).unwrap();
        Transaction::new(id, date, id, amount, TransactionType::Expense)
    }

    fn history() -> Vec<Transaction> {
        vec![
            txn("Swiggy lunch", 2025, 6, 14, 350.0).with_category("Food"),
            txn("Rent June", 2025, 6, 1, 15000.0).with_category("Housing"),
            txn("Uber ride", 2025, 5, 20, 220.0).with_category("Transport"),
            txn("Rent Jan", 2024, 1, 1, 14000.0).with_category("Housing"),
            txn("Groceries", 2024, 3, 9, 1800.0).with_category("Food"),
        ]
    }

    #[test]
    fn test_not_a_query() {
        let engine = QueryEngine::default();
        assert_eq!(engine.run("hello friend", &history(), now()), QueryOutcome::NotAQuery);
    }

    #[test]
    fn test_no_data_is_distinct() {
        let engine = QueryEngine::new(EngineOptions {
            seed_policy: SeedPolicy::KeepEmpty,
            ..EngineOptions::default()
        });
        assert_eq!(engine.run("expenses on 1/1/2026", &history(), now()), QueryOutcome::NoData);
    }

    #[test]
    fn test_year_only_flag() {
        let engine = QueryEngine::default();
        let h = history();
        assert!(engine.intent("2024", &h, now()).is_year_only);
        assert!(!engine.intent("2024 housing", &h, now()).is_year_only);
    }

    #[test]
    fn test_year_only_yields_year_summary() {
        let engine = QueryEngine::default();
        let out = engine.run("2024", &history(), now());
        match out.payload() {
            Some(ResultPayload::YearSummary(y)) => {
                assert_eq!(y.year, 2024);
                assert_eq!(y.transactions.len(), 2);
            }
            other => panic!("expected year summary, got {other:?}"),
        }

        let out = engine.run("2024 housing", &history(), now());
        match out.payload() {
            Some(ResultPayload::Detail(d)) => {
                assert_eq!(d.count, 1);
                assert_eq!(d.transactions[0].id, "Rent Jan");
            }
            other => panic!("expected detail, got {other:?}"),
        }
    }

    #[test]
    fn test_keyword_fallback_skipped_when_temporal_matches() {
        let engine = QueryEngine::default();
        let h = history();
        let intent = engine.intent("ride in march 2024", &h, now());
        assert!(intent.keywords.is_none());
        // March 2024 has only groceries; "ride" is not used as a keyword
        assert_eq!(intent.candidates.len(), 1);
        assert_eq!(intent.candidates[0].id, "Groceries");

        let intent = engine.intent("uber rides", &h, now());
        assert!(intent.keywords.is_some());
        assert_eq!(intent.candidates[0].id, "Uber ride");
    }

    #[test]
    fn test_from_to_range_skips_keyword_matching() {
        let engine = QueryEngine::default();
        let h = vec![
            txn("Rent April", 2025, 4, 6, 15000.0),
            txn("Rent March", 2025, 3, 6, 15000.0),
            txn("Refund from Amazon", 2025, 3, 5, 899.0),
        ];
        let intent = engine.intent("show transactions from 1/3/2025 to 10/3/2025", &h, now());
        assert!(intent.keywords.is_none());
        assert!(matches!(intent.temporal, Some(TemporalMatch::Range { .. })));
        let ids: Vec<&str> = intent.candidates.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["Rent March", "Refund from Amazon"]);
    }

    #[test]
    fn test_iso_date_is_not_a_year_summary() {
        let engine = QueryEngine::default();
        let out = engine.run("expenses on 2025-06-14", &history(), now());
        match out.payload() {
            Some(ResultPayload::Detail(d)) => {
                assert_eq!(d.count, 1);
                assert_eq!(d.transactions[0].id, "Swiggy lunch");
            }
            other => panic!("expected detail, got {other:?}"),
        }
    }

    #[test]
    fn test_show_all_fallback() {
        let engine = QueryEngine::default();
        let h = history();
        let intent = engine.intent("show me everything please", &h, now());
        assert_eq!(intent.candidates.len(), 5);
        assert_eq!(intent.candidates[0].id, "Swiggy lunch");

        // without show/list/all the empty set stands
        let intent = engine.intent("anything zzz", &h, now());
        assert!(intent.candidates.is_empty());
    }

    #[test]
    fn test_refinement_restarts_from_history() {
        let engine = QueryEngine::default();
        let h = history();
        // December 2023 is empty; "housing" re-seeds from the whole history
        let intent = engine.intent("housing in december 2023", &h, now());
        assert_eq!(intent.candidates.len(), 2);
    }

    #[test]
    fn test_ranking_seeds_from_history() {
        let engine = QueryEngine::default();
        let h = history();
        let intent = engine.intent("top 2", &h, now());
        let amounts: Vec<f64> = intent.candidates.iter().map(|t| t.amount).collect();
        assert_eq!(amounts, vec![15000.0, 14000.0]);
        assert!(intent.sort.is_some());
    }

    #[test]
    fn test_relative_period_end_to_end() {
        let engine = QueryEngine::default();
        let out = engine.run("what did I spend this month", &history(), now());
        let Some(ResultPayload::Detail(d)) = out.payload() else {
            panic!("expected detail");
        };
        assert_eq!(d.count, 2);
        assert_eq!(d.total, 15350.0);
    }
}
