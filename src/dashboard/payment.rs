use chrono::NaiveDate;
use tracing::debug;

use super::view::PaymentAction;
use crate::api::PaymentDraft;
use crate::error::{DashError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ModalState {
    #[default]
    Closed,
    Open,
    Submitting,
}

/// The "Record Payment" modal.
///
/// `closed -> open -> submitting -> closed` on success, back to `open` on
/// failure. The form fields are plain text, exactly as typed; they are only
/// parsed when a submission starts.
#[derive(Debug, Default)]
pub struct PaymentRecorder {
    state: ModalState,
    invoice_id: Option<i64>,
    invoice_no: Option<String>,
    pub amount: String,
    pub payment_date: String,
}

impl PaymentRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> ModalState {
        self.state
    }

    pub fn is_open(&self) -> bool {
        self.state != ModalState::Closed
    }

    pub fn invoice_id(&self) -> Option<i64> {
        self.invoice_id
    }

    pub fn invoice_no(&self) -> Option<&str> {
        self.invoice_no.as_deref()
    }

    /// Show the form for one invoice: amount cleared, date set to `today`.
    pub fn open(&mut self, action: &PaymentAction, today: NaiveDate) {
        debug!(invoice = %action.invoice_no, "payment form opened");
        self.state = ModalState::Open;
        self.invoice_id = Some(action.invoice_id);
        self.invoice_no = Some(action.invoice_no.clone());
        self.amount.clear();
        self.payment_date = today.format("%Y-%m-%d").to_string();
    }

    pub fn close(&mut self) {
        self.state = ModalState::Closed;
        self.invoice_id = None;
        self.invoice_no = None;
        self.amount.clear();
        self.payment_date.clear();
    }

    pub fn set_amount(&mut self, amount: impl Into<String>) {
        self.amount = amount.into();
    }

    pub fn set_date(&mut self, date: impl Into<String>) {
        self.payment_date = date.into();
    }

    /// Validate the form and move to `submitting`.
    ///
    /// On a validation error the form stays open and untouched.
    pub fn begin_submit(&mut self) -> Result<PaymentDraft> {
        if self.state != ModalState::Open {
            return Err(DashError::PaymentNotOpen);
        }
        let draft = self.draft()?;
        self.state = ModalState::Submitting;
        Ok(draft)
    }

    /// The POST went through: the form closes and its contents are discarded.
    pub fn submit_succeeded(&mut self) {
        self.close();
    }

    /// The POST failed: back to `open`, fields as the user left them.
    pub fn submit_failed(&mut self) {
        if self.state == ModalState::Submitting {
            self.state = ModalState::Open;
        }
    }

    fn draft(&self) -> Result<PaymentDraft> {
        let invoice_id = self
            .invoice_id
            .ok_or_else(|| DashError::validation("No invoice selected."))?;

        let amount = self.amount.trim();
        let date = self.payment_date.trim();
        if amount.is_empty() || date.is_empty() {
            return Err(DashError::validation("Please fill amount and date."));
        }

        let amount = amount
            .parse::<f64>()
            .ok()
            .filter(|a| a.is_finite() && *a > 0.0)
            .ok_or_else(|| DashError::validation("Amount must be a positive number."))?;

        let payment_date = NaiveDate::parse_from_str(date, "%Y-%m-%d")
            .map_err(|_| DashError::validation("Payment date must be YYYY-MM-DD."))?;

        Ok(PaymentDraft {
            invoice_id,
            amount,
            payment_date,
        })
    }
}
