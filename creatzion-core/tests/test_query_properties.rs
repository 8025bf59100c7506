use chrono::{NaiveDate, NaiveDateTime};
use creatzion_core::{
    ChatService, ConversationHistory, LanguageModel, QueryEngine, QueryOutcome, ReplySource,
    ResultPayload, Transaction, TransactionType,
};

fn at(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .unwrap()
        .and_hms_opt(h, min, s)
        .unwrap()
}

fn now() -> NaiveDateTime {
    at(2025, 6, 15, 12, 0, 0)
}

fn item(id: &str, date: NaiveDateTime, amount: f64) -> Transaction {
    Transaction::new(id, date, "item", amount, TransactionType::Expense)
}

fn amounts_of(outcome: &QueryOutcome) -> Vec<f64> {
    match outcome.payload() {
        Some(ResultPayload::Detail(d)) => d.transactions.iter().map(|t| t.amount).collect(),
        Some(ResultPayload::YearSummary(y)) => y.transactions.iter().map(|t| t.amount).collect(),
        None => Vec::new(),
    }
}

#[test]
fn test_month_window_includes_both_boundaries() {
    let history = vec![
        item("before", at(2025, 2, 28, 23, 59, 59), 1.0),
        item("first", at(2025, 3, 1, 0, 0, 0), 2.0),
        item("last", at(2025, 3, 31, 23, 59, 59), 3.0),
        item("after", at(2025, 4, 1, 0, 0, 0), 4.0),
    ];
    let out = QueryEngine::default().run("transactions in march 2025", &history, now());
    assert_eq!(amounts_of(&out), vec![2.0, 3.0]);
}

#[test]
fn test_explicit_date_covers_whole_day() {
    let history = vec![
        item("midnight", at(2025, 3, 15, 0, 0, 0), 1.0),
        item("late", at(2025, 3, 15, 23, 59, 59), 2.0),
        item("next", at(2025, 3, 16, 0, 0, 0), 3.0),
    ];
    let out = QueryEngine::default().run("what happened on 15/03/2025", &history, now());
    assert_eq!(amounts_of(&out), vec![1.0, 2.0]);
}

#[test]
fn test_amount_range_inclusive() {
    let history: Vec<_> = [499.0, 500.0, 1000.0, 2000.0, 2001.0]
        .iter()
        .enumerate()
        .map(|(i, a)| item(&format!("t{i}"), at(2025, 5, 1 + i as u32, 10, 0, 0), *a))
        .collect();
    let out = QueryEngine::default().run("expenses between ₹500 and ₹2000", &history, now());
    assert_eq!(amounts_of(&out), vec![500.0, 1000.0, 2000.0]);
}

#[test]
fn test_detail_total_covers_all_matches() {
    let history: Vec<_> = (1..=20)
        .map(|d| item(&format!("t{d}"), at(2025, 1, d, 9, 0, 0), 100.0))
        .collect();
    let out = QueryEngine::default().run("show all transactions in january 2025", &history, now());
    let Some(ResultPayload::Detail(d)) = out.payload() else {
        panic!("expected detail, got {out:?}");
    };
    assert_eq!(d.transactions.len(), 15);
    assert_eq!(d.count, 20);
    assert_eq!(d.total, 2000.0);
}

#[test]
fn test_keyword_fallback_only_without_date_signal() {
    let history = vec![
        Transaction::new("a", at(2025, 3, 2, 9, 0, 0), "Metro card", 300.0, TransactionType::Expense),
        Transaction::new("b", at(2025, 4, 2, 9, 0, 0), "Metro card", 300.0, TransactionType::Expense),
    ];
    let engine = QueryEngine::default();
    let intent = engine.intent("metro in march", &history, now());
    assert!(intent.keywords.is_none());
    assert_eq!(intent.candidates.len(), 1);

    let intent = engine.intent("metro card", &history, now());
    assert_eq!(intent.keywords.as_deref(), Some(&["metro".to_string(), "card".to_string()][..]));
    assert_eq!(intent.candidates.len(), 2);
}

#[test]
fn test_top_three() {
    let history: Vec<_> = [10.0, 50.0, 30.0, 90.0, 20.0]
        .iter()
        .enumerate()
        .map(|(i, a)| item(&format!("t{i}"), at(2025, 5, 1 + i as u32, 10, 0, 0), *a))
        .collect();
    let out = QueryEngine::default().run("top 3", &history, now());
    assert_eq!(amounts_of(&out), vec![90.0, 50.0, 30.0]);
}

#[test]
fn test_year_only_flag() {
    let history = vec![
        item("a", at(2024, 1, 5, 9, 0, 0), 10.0).with_category("Housing"),
        item("b", at(2024, 2, 5, 9, 0, 0), 20.0).with_category("Food"),
    ];
    let engine = QueryEngine::default();
    assert!(engine.intent("2024", &history, now()).is_year_only);
    assert!(!engine.intent("2024 housing", &history, now()).is_year_only);

    let out = engine.run("2024", &history, now());
    assert!(matches!(out.payload(), Some(ResultPayload::YearSummary(_))));
}

struct NeverCalled;

impl LanguageModel for NeverCalled {
    fn complete(&self, _prompt: &str) -> anyhow::Result<String> {
        panic!("model must not be called for special replies");
    }
}

#[test]
fn test_special_reply_overrides_query() {
    let history = ConversationHistory::new(10);
    let service = ChatService::new(QueryEngine::default(), &history);
    for msg in ["creatzion top 3 expenses in 2024", "Yashwanth spent how much?"] {
        let reply = service.respond(
            msg,
            now(),
            || panic!("transactions must not be fetched for special replies"),
            &NeverCalled,
        );
        assert_eq!(reply.source, ReplySource::Special);
        assert!(reply.outcome.is_none());
    }
    assert_eq!(history.len(), 2);
}

#[test]
fn test_empty_result_is_no_data() {
    let out = QueryEngine::default().run("transactions in march 2025", &[], now());
    assert_eq!(out, QueryOutcome::NoData);
}
