//! Terminal drawing of the dashboard regions.

use tabled::{settings::Style, Table, Tabled};

use crate::dashboard::{
    format_currency, AppState, Chart, ChartKind, CustomerOption, InvoiceTable, KpiPanel,
};

const BAR_WIDTH: usize = 40;

#[derive(Tabled)]
struct CustomerLine {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "NAME")]
    name: String,
}

#[derive(Tabled)]
struct KpiLine {
    #[tabled(rename = "INVOICED")]
    invoiced: String,
    #[tabled(rename = "RECEIVED")]
    received: String,
    #[tabled(rename = "OUTSTANDING")]
    outstanding: String,
    #[tabled(rename = "OVERDUE")]
    overdue: String,
}

#[derive(Tabled)]
struct InvoiceLine {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "!")]
    marker: &'static str,
    #[tabled(rename = "NUMBER")]
    number: String,
    #[tabled(rename = "CUSTOMER")]
    customer: String,
    #[tabled(rename = "DATE")]
    date: String,
    #[tabled(rename = "DUE")]
    due: String,
    #[tabled(rename = "TOTAL")]
    total: String,
    #[tabled(rename = "STATUS")]
    status: String,
    #[tabled(rename = "OUTSTANDING")]
    outstanding: String,
}

/// Marker shown in the `!` column of overdue rows
pub const OVERDUE_MARKER: &str = "!";

pub fn customers(options: &[CustomerOption]) -> String {
    let rows = options.iter().map(|o| CustomerLine {
        id: if o.value.is_empty() {
            "-".to_string()
        } else {
            o.value.clone()
        },
        name: o.label.clone(),
    });
    Table::new(rows).with(Style::rounded()).to_string()
}

pub fn kpis(panel: &KpiPanel) -> String {
    let line = KpiLine {
        invoiced: panel.invoiced.clone(),
        received: panel.received.clone(),
        outstanding: panel.outstanding.clone(),
        overdue: panel.overdue.clone(),
    };
    Table::new([line]).with(Style::rounded()).to_string()
}

pub fn invoices(table: &InvoiceTable) -> String {
    if table.is_empty() {
        return "No invoices match the current filters.".to_string();
    }

    let rows = table.rows.iter().enumerate().map(|(idx, row)| InvoiceLine {
        index: idx + 1,
        marker: if row.overdue { OVERDUE_MARKER } else { "" },
        number: row.invoice_no.clone(),
        customer: row.customer_name.clone(),
        date: row.invoice_date.clone(),
        due: row.due_date.clone(),
        total: row.amount_total.clone(),
        status: row.status.clone(),
        outstanding: row.outstanding.clone(),
    });
    Table::new(rows).with(Style::rounded()).to_string()
}

/// Horizontal bars, one block per dataset, scaled to the largest value shown
pub fn chart(chart: &Chart, currency_symbol: &str) -> String {
    let spec = chart.spec();
    let title = match spec.kind {
        ChartKind::Bar => "Outstanding by customer",
        ChartKind::Line => "Monthly trend",
    };

    if spec.labels.is_empty() {
        return format!("{title}\n  (no data)");
    }

    let max = spec
        .datasets
        .iter()
        .flat_map(|d| d.data.iter().copied())
        .fold(0.0_f64, f64::max);
    let label_width = spec.labels.iter().map(|l| l.chars().count()).max().unwrap_or(0);

    let mut out = vec![title.to_string()];
    for dataset in &spec.datasets {
        if spec.datasets.len() > 1 {
            out.push(format!("{}:", dataset.label));
        }
        for (label, value) in spec.labels.iter().zip(&dataset.data) {
            let len = if max > 0.0 {
                ((value.max(0.0) / max) * BAR_WIDTH as f64).round() as usize
            } else {
                0
            };
            out.push(format!(
                "  {label:<label_width$} {bar:<width$} {amount}",
                bar = "█".repeat(len),
                width = BAR_WIDTH,
                amount = format_currency(*value, currency_symbol),
            ));
        }
    }
    out.join("\n")
}

/// Every rendered region of the dashboard, top to bottom
pub fn dashboard(state: &AppState, currency_symbol: &str) -> String {
    let mut sections = Vec::new();
    if let Some(panel) = &state.kpis {
        sections.push(kpis(panel));
    }
    if let Some(table) = &state.invoices {
        sections.push(invoices(table));
    }
    if let Some(current) = state.chart.current() {
        sections.push(chart(current, currency_symbol));
    }
    sections.join("\n\n")
}
