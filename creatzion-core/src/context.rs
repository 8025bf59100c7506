//! Prompt assembly: the transaction context block and the full model prompt.

use crate::aggregate::{ResultPayload, Summary};
use crate::engine::QueryOutcome;
use crate::transaction::Transaction;

pub const NO_DATA_NOTICE: &str = "No transactions found for this period.";

const PERSONA: &str = "You are Creatzion AI, an emotional, multilingual and friendly assistant. Your job is:

1. Understand the user's language and reply in the same language (for example Hindi, Tamil, Telugu, English).
2. Give friendly financial advice focused on India: savings tips, salary management, gold price info.
3. Offer emotional support when the user feels sad, anxious or stressed. Use positive words like:
   - \"You are not alone, I am here for you ❤️\"
   - \"It's okay to feel this way. Everything will be alright 🌈\"
   - \"Let's take a deep breath together 🌼\"
4. Always show money amounts in Indian Rupees (₹).
5. If someone asks about the gold price you can say: \"Gold price in India is approximately ₹6000 per gram\" (just an estimate).
6. Be very friendly, emotional and supportive. Never be robotic.
7. Keep the conversation memory. Continue from the last conversation instead of restarting.
8. Don't add greetings like \"Namaste\" unless the user does.";

/// Text block describing the engine result, or `None` when the message was not
/// a transaction question.
pub fn context_string(outcome: &QueryOutcome) -> Option<String> {
    match outcome {
        QueryOutcome::NotAQuery => None,
        QueryOutcome::NoData => Some(NO_DATA_NOTICE.to_string()),
        QueryOutcome::Found { payload, summary } => Some(match payload {
            ResultPayload::Detail(d) => detail_context(&d.transactions, summary),
            ResultPayload::YearSummary(y) => {
                let rollup = y.monthly_rollup();
                let mut out = format!(
                    "Year {} summary: {} transactions, total {}.\n",
                    rollup.year,
                    rollup.count,
                    rupees(rollup.total)
                );
                for m in &rollup.months {
                    out.push_str(&format!(
                        "- {}: {} transactions, {}\n",
                        m.name,
                        m.count,
                        rupees(m.total)
                    ));
                }
                out.trim_end().to_string()
            }
        }),
    }
}

fn detail_context(rows: &[Transaction], summary: &Summary) -> String {
    let mut out = format!(
        "Matching transactions: {}, total {}",
        summary.count,
        rupees(summary.total)
    );
    if let (Some(first), Some(last)) = (summary.first, summary.last) {
        out.push_str(&format!(
            ", from {} to {}",
            first.format("%Y-%m-%d"),
            last.format("%Y-%m-%d")
        ));
    }
    out.push_str(".\n");
    if rows.len() < summary.count {
        out.push_str(&format!("Showing the first {}:\n", rows.len()));
    }
    for t in rows {
        out.push_str(&format!("- {}\n", row_line(t)));
    }
    out.trim_end().to_string()
}

/// One transaction as a single prompt line
pub fn row_line(t: &Transaction) -> String {
    let mut line = format!(
        "{} | {} | {} | {} | {}",
        t.day(),
        t.description(),
        t.category(),
        t.kind.as_str(),
        rupees(t.amount)
    );
    if let Some(iv) = t.recurring_interval.filter(|_| t.is_recurring) {
        line.push_str(&format!(" | recurring {}", iv.label()));
    }
    if let Some(acct) = &t.account {
        line.push_str(&format!(" | {}", acct.name));
    }
    line
}

pub fn rupees(amount: f64) -> String {
    format!("₹{amount:.2}")
}

/// Full prompt: persona, numbered history (oldest first), optional transaction
/// context, then the latest message.
pub fn build_prompt(history: &[String], context: Option<&str>, latest: &str) -> String {
    let mut out = String::from(PERSONA);
    out.push_str("\n\nConversation History:\n");
    for (i, msg) in history.iter().enumerate() {
        out.push_str(&format!("User{}: {}\n", i + 1, msg));
    }
    if let Some(ctx) = context {
        out.push_str("\nThe user's transactions relevant to this message:\n");
        out.push_str(ctx);
        out.push('\n');
    }
    out.push_str(&format!("\nNow, the latest message:\n\"{latest}\"\n\n"));
    out.push_str("Reply nicely, in the user's language, showing care and practical advice.");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::{shape, DISPLAY_ROWS};
    use crate::transaction::{RecurringInterval, TransactionType};
    use chrono::NaiveDate;

    fn txn(m: u32, d: u32, amount: f64) -> Transaction {
        let date = NaiveDate::from_ymd_opt(2024, m, d).unwrap().and_hms_opt(9, 0, 0).unwrap();
        Transaction::new(format!("{m}-{d}"), date, "Rent", amount, TransactionType::Expense)
            .with_category("Housing")
    }

    fn found(items: &[Transaction], year: Option<i32>) -> QueryOutcome {
        let refs: Vec<&Transaction> = items.iter().collect();
        QueryOutcome::Found {
            payload: shape(&refs, year, DISPLAY_ROWS),
            summary: Summary::of(&refs),
        }
    }

    #[test]
    fn test_not_a_query_has_no_context() {
        assert_eq!(context_string(&QueryOutcome::NotAQuery), None);
        assert_eq!(context_string(&QueryOutcome::NoData).as_deref(), Some(NO_DATA_NOTICE));
    }

    #[test]
    fn test_detail_context() {
        let items = vec![txn(1, 1, 15000.0), txn(2, 1, 15000.5)];
        let ctx = context_string(&found(&items, None)).unwrap();
        assert!(ctx.starts_with("Matching transactions: 2, total ₹30000.50, from 2024-01-01 to 2024-02-01."));
        assert!(ctx.contains("- 2024-01-01 | Rent | Housing | EXPENSE | ₹15000.00"));
        assert!(!ctx.contains("Showing the first"));
    }

    #[test]
    fn test_detail_context_mentions_truncation() {
        let items: Vec<_> = (1..=20).map(|d| txn(3, d, 10.0)).collect();
        let ctx = context_string(&found(&items, None)).unwrap();
        assert!(ctx.contains("Matching transactions: 20, total ₹200.00"));
        assert!(ctx.contains("Showing the first 15:"));
        assert_eq!(ctx.lines().filter(|l| l.starts_with("- ")).count(), 15);
    }

    #[test]
    fn test_year_context_lists_months() {
        let items = vec![txn(1, 1, 100.0), txn(1, 9, 50.0), txn(4, 2, 20.0)];
        let ctx = context_string(&found(&items, Some(2024))).unwrap();
        assert!(ctx.starts_with("Year 2024 summary: 3 transactions, total ₹170.00."));
        assert!(ctx.contains("- January: 2 transactions, ₹150.00"));
        assert!(ctx.contains("- April: 1 transactions, ₹20.00"));
        assert!(!ctx.contains("February"));
    }

    #[test]
    fn test_row_line_extras() {
        let t = txn(1, 1, 99.0)
            .with_recurring(RecurringInterval::Monthly)
            .with_account("HDFC Savings", "SAVINGS");
        assert_eq!(
            row_line(&t),
            "2024-01-01 | Rent | Housing | EXPENSE | ₹99.00 | recurring Monthly | HDFC Savings"
        );
    }

    #[test]
    fn test_prompt_layout() {
        let history = vec!["hi".to_string(), "rent in 2024".to_string()];
        let prompt = build_prompt(&history, Some("ctx line"), "rent in 2024");
        assert!(prompt.starts_with("You are Creatzion AI"));
        assert!(prompt.contains("User1: hi\nUser2: rent in 2024\n"));
        assert!(prompt.contains("ctx line"));
        assert!(prompt.contains("Now, the latest message:\n\"rent in 2024\""));

        let prompt = build_prompt(&[], None, "hello");
        assert!(!prompt.contains("relevant to this message"));
    }
}
