use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::de;

/// Customer filter option
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Customer {
    pub id: i64,
    pub name: String,
}

/// Aggregate totals for the current scope
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct KpiSummary {
    #[serde(deserialize_with = "de::amount")]
    pub total_invoiced: f64,
    #[serde(deserialize_with = "de::amount")]
    pub total_received: f64,
    #[serde(deserialize_with = "de::amount")]
    pub total_outstanding: f64,
    /// 0-100
    #[serde(deserialize_with = "de::amount")]
    pub percent_overdue: f64,
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum InvoiceStatus {
    Paid,
    Unpaid,
    Overdue,
    #[serde(other)]
    Unknown,
}

impl fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            InvoiceStatus::Paid => "paid",
            InvoiceStatus::Unpaid => "unpaid",
            InvoiceStatus::Overdue => "overdue",
            InvoiceStatus::Unknown => "unknown",
        };
        f.write_str(label)
    }
}

/// One invoice as listed by the API. `overdue` is computed server-side.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct InvoiceRow {
    pub id: i64,
    pub invoice_no: String,
    pub customer_name: String,
    #[serde(deserialize_with = "de::date")]
    pub invoice_date: NaiveDate,
    #[serde(default, deserialize_with = "de::optional_date")]
    pub due_date: Option<NaiveDate>,
    #[serde(deserialize_with = "de::amount")]
    pub amount_total: f64,
    pub status: InvoiceStatus,
    #[serde(default, deserialize_with = "de::amount")]
    pub outstanding: f64,
    #[serde(default, deserialize_with = "de::flag")]
    pub overdue: bool,
}

/// Validated payment, posted as `{invoice_id, amount, payment_date}`
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct PaymentDraft {
    pub invoice_id: i64,
    pub amount: f64,
    pub payment_date: NaiveDate,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct TopCustomer {
    pub name: String,
    #[serde(deserialize_with = "de::amount")]
    pub outstanding: f64,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct MonthlyPoint {
    /// First day of the month
    #[serde(deserialize_with = "de::date")]
    pub month: NaiveDate,
    #[serde(deserialize_with = "de::amount")]
    pub invoiced: f64,
    #[serde(deserialize_with = "de::amount")]
    pub received: f64,
}
