use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;
use ureq::Agent;

use super::{Customer, DashboardApi, InvoiceRow, KpiSummary, MonthlyPoint, PaymentDraft, TopCustomer};
use crate::config::ApiSettings;
use crate::error::{DashError, Result};
use crate::query::with_query;

/// Blocking JSON client for the invoicing API
pub struct HttpApi {
    agent: Agent,
    base_url: String,
}

impl HttpApi {
    pub fn new(settings: &ApiSettings) -> Self {
        // Error text lives in the body of non-2xx responses.
        let agent: Agent = Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(settings.timeout_secs)))
            .http_status_as_error(false)
            .build()
            .into();

        Self {
            agent,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str, query: &str) -> String {
        format!("{}{}", self.base_url, with_query(path, query))
    }

    fn get_json<T: DeserializeOwned>(&self, path: &str, query: &str) -> Result<T> {
        let url = self.url(path, query);
        debug!(%url, "GET");

        let mut response = self
            .agent
            .get(&url)
            .header("Accept", "application/json")
            .call()
            .map_err(|source| DashError::Transport {
                url: url.clone(),
                source,
            })?;

        let status = response.status();
        let body = response
            .body_mut()
            .read_to_string()
            .map_err(|source| DashError::Transport {
                url: url.clone(),
                source,
            })?;

        if !status.is_success() {
            return Err(DashError::Http {
                status: status.as_u16(),
                body,
            });
        }

        serde_json::from_str(&body).map_err(|source| DashError::Decode { url, source })
    }
}

impl DashboardApi for HttpApi {
    fn customers(&self) -> Result<Vec<Customer>> {
        self.get_json("/api/customers", "")
    }

    fn kpis(&self, query: &str) -> Result<KpiSummary> {
        self.get_json("/api/kpis", query)
    }

    fn invoices(&self, query: &str) -> Result<Vec<InvoiceRow>> {
        self.get_json("/api/invoices", query)
    }

    fn top_customers(&self, query: &str) -> Result<Vec<TopCustomer>> {
        self.get_json("/api/top-customers", query)
    }

    fn monthly(&self, query: &str) -> Result<Vec<MonthlyPoint>> {
        self.get_json("/api/monthly", query)
    }

    fn record_payment(&self, draft: &PaymentDraft) -> Result<()> {
        let url = self.url("/api/payments", "");
        let payload = serde_json::to_string(draft).map_err(|source| DashError::Decode {
            url: url.clone(),
            source,
        })?;
        debug!(%url, invoice_id = draft.invoice_id, "POST");

        let mut response = self
            .agent
            .post(&url)
            .header("Content-Type", "application/json")
            .send(payload.as_str())
            .map_err(|source| DashError::Transport {
                url: url.clone(),
                source,
            })?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let body = response
            .body_mut()
            .read_to_string()
            .map_err(|source| DashError::Transport { url, source })?;
        Err(DashError::Http {
            status: status.as_u16(),
            body,
        })
    }
}
