//! View-models for the rendered regions.
//!
//! Every load builds a region from scratch; nothing here is patched in place.

use crate::api::{Customer, InvoiceRow, KpiSummary};

/// "Record Payment" action bound to one rendered row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentAction {
    pub invoice_id: i64,
    pub invoice_no: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KpiPanel {
    pub invoiced: String,
    pub received: String,
    pub outstanding: String,
    pub overdue: String,
}

impl KpiPanel {
    pub fn render(summary: &KpiSummary, currency_symbol: &str) -> Self {
        Self {
            invoiced: format_currency(summary.total_invoiced, currency_symbol),
            received: format_currency(summary.total_received, currency_symbol),
            outstanding: format_currency(summary.total_outstanding, currency_symbol),
            overdue: format_percent(summary.percent_overdue),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedRow {
    pub invoice_no: String,
    pub customer_name: String,
    pub invoice_date: String,
    pub due_date: String,
    pub amount_total: String,
    pub status: String,
    pub outstanding: String,
    /// Carries the overdue styling; mirrors the server flag.
    pub overdue: bool,
    pub action: PaymentAction,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct InvoiceTable {
    pub rows: Vec<RenderedRow>,
}

impl InvoiceTable {
    pub fn render(rows: &[InvoiceRow], currency_symbol: &str) -> Self {
        let rows = rows
            .iter()
            .map(|row| RenderedRow {
                invoice_no: row.invoice_no.clone(),
                customer_name: row.customer_name.clone(),
                invoice_date: row.invoice_date.format("%Y-%m-%d").to_string(),
                due_date: row
                    .due_date
                    .map(|d| d.format("%Y-%m-%d").to_string())
                    .unwrap_or_else(|| "-".to_string()),
                amount_total: format_currency(row.amount_total, currency_symbol),
                status: row.status.to_string(),
                outstanding: format_currency(row.outstanding, currency_symbol),
                overdue: row.overdue,
                action: PaymentAction {
                    invoice_id: row.id,
                    invoice_no: row.invoice_no.clone(),
                },
            })
            .collect();
        Self { rows }
    }

    /// Action of the 1-based row `index`, as shown in the table's # column
    pub fn action(&self, index: usize) -> Option<&PaymentAction> {
        index.checked_sub(1).and_then(|i| self.rows.get(i)).map(|r| &r.action)
    }

    /// Action of the row showing `invoice_no`
    pub fn action_for(&self, invoice_no: &str) -> Option<&PaymentAction> {
        self.rows
            .iter()
            .find(|r| r.invoice_no == invoice_no)
            .map(|r| &r.action)
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Customer filter options, "All" first
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomerOption {
    pub value: String,
    pub label: String,
}

pub fn customer_options(customers: &[Customer]) -> Vec<CustomerOption> {
    std::iter::once(CustomerOption {
        value: String::new(),
        label: "All".to_string(),
    })
    .chain(customers.iter().map(|c| CustomerOption {
        value: c.id.to_string(),
        label: c.name.clone(),
    }))
    .collect()
}

/// Format money with the symbol prefixed, thousands grouping and two decimals
pub fn format_currency(value: f64, currency_symbol: &str) -> String {
    let value = if value.is_finite() { value } else { 0.0 };
    let rounded = format!("{:.2}", value.abs());
    let (whole, frac) = rounded.split_once('.').unwrap_or((rounded.as_str(), "00"));
    let grouped = group_thousands(whole);
    // "-0.00" is shown as "0.00"
    let sign = if value < 0.0 && rounded != "0.00" { "-" } else { "" };
    format!("{sign}{currency_symbol}{grouped}.{frac}")
}

fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);

    for (i, ch) in digits.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }

    out.chars().rev().collect()
}

/// Overdue share as shown on the KPI panel, e.g. `12.5%` or `40%`
pub fn format_percent(value: f64) -> String {
    let value = if value.is_finite() { value } else { 0.0 };
    let text = format!("{value:.2}");
    let text = text.trim_end_matches('0').trim_end_matches('.');
    let text = if text == "-0" { "0" } else { text };
    format!("{text}%")
}
