mod chart;
mod filter;
mod payment;
mod sequence;
mod trigger;
mod view;

pub use chart::{Chart, ChartKind, ChartSeries, ChartSpec, ChartSurface, Dataset};
pub use filter::{
    parse_date, ChartMode, FilterState, Scope, SortField, SortOrder, TOP_CUSTOMERS_LIMIT,
};
pub use payment::{ModalState, PaymentRecorder};
pub use sequence::{Region, RequestSequencer, Ticket};
pub use trigger::{RefreshPlan, Trigger};
pub use view::{
    customer_options, format_currency, format_percent, CustomerOption, InvoiceTable, KpiPanel,
    PaymentAction, RenderedRow,
};

use chrono::{Local, NaiveDate};
use std::thread;
use tracing::{debug, info, warn};

use crate::api::{Customer, DashboardApi, InvoiceRow, KpiSummary};
use crate::error::{DashError, Result};

/// Everything currently on screen plus the filter that produced it
#[derive(Debug, Default)]
pub struct AppState {
    pub filter: FilterState,
    pub customers: Vec<CustomerOption>,
    pub kpis: Option<KpiPanel>,
    pub invoices: Option<InvoiceTable>,
    pub chart: ChartSurface,
    pub payment: PaymentRecorder,
}

/// Result of a saved payment
#[derive(Debug)]
pub enum PaymentOutcome {
    /// Every region was reloaded.
    Refreshed,
    /// The payment is stored but a reload failed; that region keeps its
    /// previous render.
    RefreshFailed(DashError),
}

/// One issued load: which region, under which ticket, with what query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadRequest {
    pub ticket: Ticket,
    pub query: String,
    pub chart_mode: ChartMode,
}

/// A successfully fetched response, not yet rendered
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Customers(Vec<Customer>),
    Kpis(KpiSummary),
    Invoices(Vec<InvoiceRow>),
    Chart(ChartSeries),
}

impl Payload {
    pub fn region(&self) -> Region {
        match self {
            Payload::Customers(_) => Region::Customers,
            Payload::Kpis(_) => Region::Kpis,
            Payload::Invoices(_) => Region::Invoices,
            Payload::Chart(_) => Region::Chart,
        }
    }
}

/// Perform the GET behind a load request
pub fn fetch<A: DashboardApi + ?Sized>(api: &A, request: &LoadRequest) -> Result<Payload> {
    debug!(region = %request.ticket.region, seq = request.ticket.seq, query = %request.query, "fetching");
    match request.ticket.region {
        Region::Customers => api.customers().map(Payload::Customers),
        Region::Kpis => api.kpis(&request.query).map(Payload::Kpis),
        Region::Invoices => api.invoices(&request.query).map(Payload::Invoices),
        Region::Chart => match request.chart_mode {
            ChartMode::Top => api
                .top_customers(&request.query)
                .map(|rows| Payload::Chart(ChartSeries::TopCustomers(rows))),
            ChartMode::Monthly => api
                .monthly(&request.query)
                .map(|points| Payload::Chart(ChartSeries::Monthly(points))),
        },
    }
}

/// The dashboard controller: owns the state, issues loads, runs triggers.
pub struct Dashboard<A> {
    api: A,
    state: AppState,
    sequencer: RequestSequencer,
    currency_symbol: String,
}

impl<A: DashboardApi> Dashboard<A> {
    pub fn new(api: A, currency_symbol: impl Into<String>) -> Self {
        Self {
            api,
            state: AppState::default(),
            sequencer: RequestSequencer::new(),
            currency_symbol: currency_symbol.into(),
        }
    }

    pub fn with_filter(mut self, filter: FilterState) -> Self {
        self.state.filter = filter;
        self
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn filter(&self) -> &FilterState {
        &self.state.filter
    }

    pub fn filter_mut(&mut self) -> &mut FilterState {
        &mut self.state.filter
    }

    pub fn currency_symbol(&self) -> &str {
        &self.currency_symbol
    }

    /// Issue a ticket for `region` and snapshot the query it will use.
    pub fn request(&mut self, region: Region) -> LoadRequest {
        let filter = &self.state.filter;
        let query = match region {
            Region::Customers => String::new(),
            Region::Kpis => filter.kpi_query(),
            Region::Invoices => filter.invoice_query(),
            Region::Chart => filter.chart_query(),
        };
        let chart_mode = filter.chart_mode;
        LoadRequest {
            ticket: self.sequencer.issue(region),
            query,
            chart_mode,
        }
    }

    pub fn fetch(&self, request: &LoadRequest) -> Result<Payload> {
        fetch(&self.api, request)
    }

    /// Render a fetched payload into its region, replacing what was there.
    ///
    /// Returns `false` and leaves the region alone when a newer request for
    /// the same region has been issued since `ticket`.
    pub fn apply(&mut self, ticket: Ticket, payload: Payload) -> bool {
        if payload.region() != ticket.region {
            warn!(ticket = %ticket.region, payload = %payload.region(), "payload does not match ticket");
            return false;
        }
        if !self.sequencer.is_current(ticket) {
            warn!(region = %ticket.region, seq = ticket.seq, "discarding stale response");
            return false;
        }

        match payload {
            Payload::Customers(customers) => {
                self.state.customers = customer_options(&customers);
            }
            Payload::Kpis(summary) => {
                self.state.kpis = Some(KpiPanel::render(&summary, &self.currency_symbol));
            }
            Payload::Invoices(rows) => {
                self.state.invoices = Some(InvoiceTable::render(&rows, &self.currency_symbol));
            }
            Payload::Chart(series) => {
                self.state.chart.mount(ChartSpec::from(&series));
            }
        }
        debug!(region = %ticket.region, seq = ticket.seq, "region rendered");
        true
    }

    /// Request, fetch and apply a single region.
    pub fn load(&mut self, region: Region) -> Result<()> {
        let request = self.request(region);
        let payload = self.fetch(&request)?;
        self.apply(request.ticket, payload);
        Ok(())
    }

    pub fn load_customers(&mut self) -> Result<()> {
        self.load(Region::Customers)
    }

    pub fn load_kpis(&mut self) -> Result<()> {
        self.load(Region::Kpis)
    }

    pub fn load_invoices(&mut self) -> Result<()> {
        self.load(Region::Invoices)
    }

    pub fn load_chart(&mut self) -> Result<()> {
        self.load(Region::Chart)
    }

    /// Load several regions concurrently.
    ///
    /// Each region succeeds or fails on its own; the first error is returned
    /// after every successful response has been applied.
    pub fn load_parallel(&mut self, regions: &[Region]) -> Result<()> {
        if let [region] = regions {
            return self.load(*region);
        }

        let requests: Vec<LoadRequest> = regions.iter().map(|r| self.request(*r)).collect();
        let api = &self.api;
        let results: Vec<Result<Payload>> = thread::scope(|s| {
            let handles: Vec<_> = requests
                .iter()
                .map(|request| s.spawn(move || fetch(api, request)))
                .collect();
            handles
                .into_iter()
                .map(|h| h.join().unwrap_or_else(|panic| std::panic::resume_unwind(panic)))
                .collect()
        });

        let mut first_error = None;
        for (request, result) in requests.iter().zip(results) {
            match result {
                Ok(payload) => {
                    self.apply(request.ticket, payload);
                }
                Err(err) => {
                    warn!(region = %request.ticket.region, error = %err, "load failed");
                    first_error.get_or_insert(err);
                }
            }
        }
        first_error.map_or(Ok(()), Err)
    }

    /// Apply a trigger's filter change, then reload the regions it affects.
    pub fn dispatch(&mut self, trigger: Trigger) -> Result<()> {
        debug!(?trigger, "dispatch");
        let plan = trigger.plan();

        let filter = &mut self.state.filter;
        match trigger {
            Trigger::ApplyFilters(scope) => filter.scope = scope,
            Trigger::SearchInput(text) => filter.search = Some(text),
            Trigger::SortChanged { field, order } => {
                filter.sort_field = field;
                filter.sort_order = order;
            }
            Trigger::ChartModeChanged(mode) => filter.chart_mode = mode,
            Trigger::InitialLoad | Trigger::PaymentRecorded => {}
        }

        for region in plan.sequential {
            self.load(*region)?;
        }
        self.load_parallel(plan.parallel)
    }

    pub fn payment(&self) -> &PaymentRecorder {
        &self.state.payment
    }

    pub fn payment_mut(&mut self) -> &mut PaymentRecorder {
        &mut self.state.payment
    }

    /// Open the payment form for a rendered row action, dated today.
    pub fn open_payment(&mut self, action: &PaymentAction) {
        self.open_payment_on(action, Local::now().date_naive());
    }

    pub fn open_payment_on(&mut self, action: &PaymentAction, today: NaiveDate) {
        self.state.payment.open(action, today);
    }

    /// Open the payment form for the 1-based `row` of the invoice table.
    pub fn open_payment_for_row(&mut self, row: usize) -> Result<()> {
        let action = self
            .state
            .invoices
            .as_ref()
            .and_then(|table| table.action(row))
            .cloned()
            .ok_or_else(|| DashError::InvalidRow(row.to_string()))?;
        self.open_payment(&action);
        Ok(())
    }

    pub fn close_payment(&mut self) {
        self.state.payment.close();
    }

    /// Validate and post the open payment form; refresh everything on success.
    ///
    /// Validation errors make no request. A rejected payment leaves the form
    /// open with its fields intact. Once the server accepts the payment the
    /// call succeeds, even if the refresh that follows does not.
    pub fn submit_payment(&mut self) -> Result<PaymentOutcome> {
        let draft = self.state.payment.begin_submit()?;

        if let Err(err) = self.api.record_payment(&draft) {
            self.state.payment.submit_failed();
            warn!(invoice_id = draft.invoice_id, error = %err, "payment rejected");
            return Err(DashError::PaymentFailed(Box::new(err)));
        }

        info!(
            invoice_id = draft.invoice_id,
            amount = draft.amount,
            date = %draft.payment_date,
            "payment recorded"
        );
        self.state.payment.submit_succeeded();
        match self.dispatch(Trigger::PaymentRecorded) {
            Ok(()) => Ok(PaymentOutcome::Refreshed),
            Err(err) => {
                warn!(error = %err, "refresh after payment failed");
                Ok(PaymentOutcome::RefreshFailed(err))
            }
        }
    }
}
