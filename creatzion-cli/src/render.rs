//! Plain-text rendering of engine results for the terminal

use comfy_table::{Cell, Table};
use creatzion_core::context::{rupees, NO_DATA_NOTICE};
use creatzion_core::{DetailResult, QueryOutcome, ResultPayload, Summary, Transaction, YearSummary};

pub fn render_outcome(outcome: &QueryOutcome) -> String {
    match outcome {
        QueryOutcome::NotAQuery => "That doesn't look like a question about your transactions.".to_string(),
        QueryOutcome::NoData => NO_DATA_NOTICE.to_string(),
        QueryOutcome::Found { payload, summary } => match payload {
            ResultPayload::Detail(d) => render_detail(d, summary),
            ResultPayload::YearSummary(y) => render_year(y),
        },
    }
}

fn recurring_label(t: &Transaction) -> &'static str {
    match t.recurring_interval {
        Some(iv) if t.is_recurring => iv.label(),
        _ if t.is_recurring => "Yes",
        _ => "One-time",
    }
}

fn render_detail(d: &DetailResult, summary: &Summary) -> String {
    let mut table = Table::new();
    table.set_header(vec!["Date", "Description", "Category", "Type", "Amount", "Recurring"]);
    for t in &d.transactions {
        table.add_row(vec![
            Cell::new(t.day()),
            Cell::new(t.description()),
            Cell::new(t.category()),
            Cell::new(t.kind.as_str()),
            Cell::new(rupees(t.amount)),
            Cell::new(recurring_label(t)),
        ]);
    }

    let mut out = format!("{table}\n");
    if d.transactions.len() < d.count {
        out.push_str(&format!("Showing {} of {} transactions", d.transactions.len(), d.count));
    } else {
        out.push_str(&format!("{} transactions", d.count));
    }
    out.push_str(&format!(" | Total {}", rupees(d.total)));
    if let (Some(first), Some(last)) = (summary.first, summary.last) {
        out.push_str(&format!(" | {} to {}", first.format("%Y-%m-%d"), last.format("%Y-%m-%d")));
    }
    out
}

fn render_year(y: &YearSummary) -> String {
    let rollup = y.monthly_rollup();
    let mut table = Table::new();
    table.set_header(vec!["Month", "Transactions", "Total"]);
    for m in &rollup.months {
        table.add_row(vec![
            Cell::new(m.name),
            Cell::new(m.count),
            Cell::new(rupees(m.total)),
        ]);
    }
    table.add_row(vec![
        Cell::new("Total"),
        Cell::new(rollup.count),
        Cell::new(rupees(rollup.total)),
    ]);

    format!("Monthly summary for {}\n{table}", rollup.year)
}
