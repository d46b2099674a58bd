mod de;
mod http;
mod models;

pub use http::HttpApi;
pub use models::{
    Customer, InvoiceRow, InvoiceStatus, KpiSummary, MonthlyPoint, PaymentDraft, TopCustomer,
};

use crate::error::Result;

/// The remote invoicing API.
///
/// Query arguments are pre-built query strings (without the leading `?`),
/// possibly empty. Implementations must be shareable across the scoped
/// threads used for parallel loads.
pub trait DashboardApi: Send + Sync {
    fn customers(&self) -> Result<Vec<Customer>>;

    fn kpis(&self, query: &str) -> Result<KpiSummary>;

    fn invoices(&self, query: &str) -> Result<Vec<InvoiceRow>>;

    fn top_customers(&self, query: &str) -> Result<Vec<TopCustomer>>;

    fn monthly(&self, query: &str) -> Result<Vec<MonthlyPoint>>;

    fn record_payment(&self, draft: &PaymentDraft) -> Result<()>;
}

impl<T: DashboardApi + ?Sized> DashboardApi for &T {
    fn customers(&self) -> Result<Vec<Customer>> {
        (**self).customers()
    }

    fn kpis(&self, query: &str) -> Result<KpiSummary> {
        (**self).kpis(query)
    }

    fn invoices(&self, query: &str) -> Result<Vec<InvoiceRow>> {
        (**self).invoices(query)
    }

    fn top_customers(&self, query: &str) -> Result<Vec<TopCustomer>> {
        (**self).top_customers(query)
    }

    fn monthly(&self, query: &str) -> Result<Vec<MonthlyPoint>> {
        (**self).monthly(query)
    }

    fn record_payment(&self, draft: &PaymentDraft) -> Result<()> {
        (**self).record_payment(draft)
    }
}
