use chrono::NaiveDate;
use clap::ValueEnum;
use std::fmt;

use crate::query::QueryParams;

/// Number of customers shown by the top-customers chart
pub const TOP_CUSTOMERS_LIMIT: u32 = 5;

/// Columns the invoice endpoint can sort by
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
#[value(rename_all = "snake_case")]
pub enum SortField {
    InvoiceNo,
    CustomerName,
    InvoiceDate,
    DueDate,
    AmountTotal,
    Status,
    Outstanding,
}

impl SortField {
    pub fn as_str(self) -> &'static str {
        match self {
            SortField::InvoiceNo => "invoice_no",
            SortField::CustomerName => "customer_name",
            SortField::InvoiceDate => "invoice_date",
            SortField::DueDate => "due_date",
            SortField::AmountTotal => "amount_total",
            SortField::Status => "status",
            SortField::Outstanding => "outstanding",
        }
    }
}

impl fmt::Display for SortField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_str(self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ChartMode {
    /// Outstanding balance of the top customers (bar)
    #[default]
    Top,
    /// Invoiced vs received per month (line)
    Monthly,
}

impl fmt::Display for ChartMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChartMode::Top => f.write_str("top"),
            ChartMode::Monthly => f.write_str("monthly"),
        }
    }
}

/// Customer and date range, the part of the filter applied as one unit
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Scope {
    pub customer_id: Option<String>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

/// Everything the user has chosen to scope the dashboard by
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterState {
    pub scope: Scope,
    pub search: Option<String>,
    pub sort_field: Option<SortField>,
    pub sort_order: Option<SortOrder>,
    pub chart_mode: ChartMode,
}

impl FilterState {
    pub fn kpi_query(&self) -> String {
        QueryParams::new()
            .push("customer_id", self.scope.customer_id.as_ref())
            .push("from", self.scope.from)
            .push("to", self.scope.to)
            .build()
    }

    pub fn invoice_query(&self) -> String {
        QueryParams::new()
            .push("customer_id", self.scope.customer_id.as_ref())
            .push("from", self.scope.from)
            .push("to", self.scope.to)
            .push("q", self.search.as_ref())
            .push("sort", self.sort_field.map(SortField::as_str))
            .push("order", self.sort_order.map(SortOrder::as_str))
            .build()
    }

    /// Charts are scoped by date range only.
    pub fn chart_query(&self) -> String {
        let params = QueryParams::new()
            .push("from", self.scope.from)
            .push("to", self.scope.to);
        match self.chart_mode {
            ChartMode::Top => params.push("limit", TOP_CUSTOMERS_LIMIT).build(),
            ChartMode::Monthly => params.build(),
        }
    }
}

pub fn parse_date(input: &str) -> crate::error::Result<NaiveDate> {
    NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d")
        .map_err(|_| crate::error::DashError::InvalidDate(input.to_string()))
}
