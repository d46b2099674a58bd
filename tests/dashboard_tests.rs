use chrono::NaiveDate;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use invoice_dash::api::{
    Customer, DashboardApi, InvoiceRow, InvoiceStatus, KpiSummary, MonthlyPoint, PaymentDraft,
    TopCustomer,
};
use invoice_dash::dashboard::{
    ChartKind, ChartMode, Dashboard, ModalState, PaymentAction, PaymentOutcome, Region, Scope,
    SortField, SortOrder, Trigger,
};
use invoice_dash::{DashError, Result};

/// In-memory API that records every call as "METHOD path[?query]"
#[derive(Default)]
struct FakeApi {
    calls: Mutex<Vec<String>>,
    invoices_by_query: HashMap<String, Vec<InvoiceRow>>,
    default_invoices: Vec<InvoiceRow>,
    payment_error: Option<(u16, String)>,
    fail_kpis: AtomicBool,
    payments: Mutex<Vec<PaymentDraft>>,
}

impl FakeApi {
    fn log(&self, method: &str, path: &str, query: &str) {
        let entry = if query.is_empty() {
            format!("{method} {path}")
        } else {
            format!("{method} {path}?{query}")
        };
        self.calls.lock().unwrap().push(entry);
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    fn count(&self, prefix: &str) -> usize {
        self.calls().iter().filter(|c| c.starts_with(prefix)).count()
    }
}

impl DashboardApi for FakeApi {
    fn customers(&self) -> Result<Vec<Customer>> {
        self.log("GET", "/api/customers", "");
        Ok(vec![
            Customer {
                id: 1,
                name: "Acme".to_string(),
            },
            Customer {
                id: 2,
                name: "Globex".to_string(),
            },
        ])
    }

    fn kpis(&self, query: &str) -> Result<KpiSummary> {
        self.log("GET", "/api/kpis", query);
        if self.fail_kpis.load(Ordering::SeqCst) {
            return Err(DashError::Http {
                status: 503,
                body: "kpis unavailable".to_string(),
            });
        }
        Ok(KpiSummary {
            total_invoiced: 15000.0,
            total_received: 5000.0,
            total_outstanding: 10000.0,
            percent_overdue: 33.33,
        })
    }

    fn invoices(&self, query: &str) -> Result<Vec<InvoiceRow>> {
        self.log("GET", "/api/invoices", query);
        Ok(self
            .invoices_by_query
            .get(query)
            .cloned()
            .unwrap_or_else(|| self.default_invoices.clone()))
    }

    fn top_customers(&self, query: &str) -> Result<Vec<TopCustomer>> {
        self.log("GET", "/api/top-customers", query);
        Ok(vec![TopCustomer {
            name: "Acme".to_string(),
            outstanding: 7500.0,
        }])
    }

    fn monthly(&self, query: &str) -> Result<Vec<MonthlyPoint>> {
        self.log("GET", "/api/monthly", query);
        Ok(vec![MonthlyPoint {
            month: date(2024, 3, 1),
            invoiced: 15000.0,
            received: 5000.0,
        }])
    }

    fn record_payment(&self, draft: &PaymentDraft) -> Result<()> {
        self.log("POST", "/api/payments", "");
        if let Some((status, body)) = &self.payment_error {
            return Err(DashError::Http {
                status: *status,
                body: body.clone(),
            });
        }
        self.payments.lock().unwrap().push(draft.clone());
        Ok(())
    }
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn invoice(id: i64, no: &str, customer: &str, overdue: bool) -> InvoiceRow {
    InvoiceRow {
        id,
        invoice_no: no.to_string(),
        customer_name: customer.to_string(),
        invoice_date: date(2024, 2, 1),
        due_date: Some(date(2024, 3, 1)),
        amount_total: 5000.0,
        status: if overdue {
            InvoiceStatus::Overdue
        } else {
            InvoiceStatus::Unpaid
        },
        outstanding: 5000.0,
        overdue,
    }
}

fn sample_api() -> FakeApi {
    FakeApi {
        default_invoices: vec![
            invoice(1001, "INV-1001", "Acme", true),
            invoice(1002, "INV-1002", "Globex", false),
        ],
        ..FakeApi::default()
    }
}

#[test]
fn initial_load_fetches_customers_first() {
    let api = sample_api();
    let mut dash = Dashboard::new(&api, "₹");

    dash.dispatch(Trigger::InitialLoad).unwrap();

    let calls = api.calls();
    assert_eq!(calls.len(), 4);
    assert_eq!(calls[0], "GET /api/customers");
    let mut rest = calls[1..].to_vec();
    rest.sort();
    assert_eq!(
        rest,
        vec![
            "GET /api/invoices",
            "GET /api/kpis",
            "GET /api/top-customers?limit=5",
        ]
    );

    let state = dash.state();
    assert_eq!(state.customers.len(), 3);
    assert_eq!(state.customers[0].label, "All");
    let kpis = state.kpis.as_ref().unwrap();
    assert_eq!(kpis.invoiced, "₹15,000.00");
    assert_eq!(kpis.overdue, "33.33%");
    assert_eq!(state.invoices.as_ref().unwrap().rows.len(), 2);
    assert_eq!(state.chart.live_instances(), 1);
}

#[test]
fn apply_filters_scopes_every_region() {
    let api = sample_api();
    let mut dash = Dashboard::new(&api, "₹");

    dash.dispatch(Trigger::ApplyFilters(Scope {
        customer_id: Some("2".to_string()),
        from: Some(date(2024, 1, 1)),
        to: Some(date(2024, 6, 30)),
    }))
    .unwrap();

    let mut calls = api.calls();
    calls.sort();
    assert_eq!(
        calls,
        vec![
            "GET /api/invoices?customer_id=2&from=2024-01-01&to=2024-06-30",
            "GET /api/kpis?customer_id=2&from=2024-01-01&to=2024-06-30",
            "GET /api/top-customers?from=2024-01-01&to=2024-06-30&limit=5",
        ]
    );
}

#[test]
fn search_and_sort_reload_invoices_only() {
    let api = sample_api();
    let mut dash = Dashboard::new(&api, "₹");

    dash.dispatch(Trigger::SearchInput("INV-10".to_string()))
        .unwrap();
    dash.dispatch(Trigger::SortChanged {
        field: Some(SortField::DueDate),
        order: Some(SortOrder::Asc),
    })
    .unwrap();

    assert_eq!(
        api.calls(),
        vec![
            "GET /api/invoices?q=INV-10",
            "GET /api/invoices?q=INV-10&sort=due_date&order=asc",
        ]
    );
    assert!(dash.state().kpis.is_none());
}

#[test]
fn chart_mode_change_reloads_chart_only() {
    let api = sample_api();
    let mut dash = Dashboard::new(&api, "₹");

    dash.dispatch(Trigger::ChartModeChanged(ChartMode::Monthly))
        .unwrap();

    assert_eq!(api.calls(), vec!["GET /api/monthly"]);
    let chart = dash.state().chart.current().unwrap();
    assert_eq!(chart.spec().kind, ChartKind::Line);
    assert_eq!(chart.spec().labels, vec!["2024-03"]);
}

#[test]
fn chart_loader_keeps_a_single_instance() {
    let api = sample_api();
    let mut dash = Dashboard::new(&api, "₹");

    dash.load_chart().unwrap();
    let first = dash.state().chart.current().unwrap().id();
    dash.load_chart().unwrap();

    assert_eq!(dash.state().chart.live_instances(), 1);
    assert_ne!(dash.state().chart.current().unwrap().id(), first);

    dash.dispatch(Trigger::ChartModeChanged(ChartMode::Monthly))
        .unwrap();
    assert_eq!(dash.state().chart.live_instances(), 1);
}

#[test]
fn invoice_loader_is_idempotent() {
    let api = sample_api();
    let mut dash = Dashboard::new(&api, "₹");

    dash.load_invoices().unwrap();
    let first = dash.state().invoices.clone().unwrap();
    dash.load_invoices().unwrap();

    assert_eq!(dash.state().invoices.as_ref().unwrap(), &first);
}

#[test]
fn overdue_marker_follows_server_flag() {
    let mut api = sample_api();
    // Status says overdue but the server flag does not: the flag wins.
    let mut mismatched = invoice(1003, "INV-1003", "Initech", false);
    mismatched.status = InvoiceStatus::Overdue;
    api.default_invoices.push(mismatched);
    let mut dash = Dashboard::new(&api, "₹");

    dash.load_invoices().unwrap();

    let table = dash.state().invoices.as_ref().unwrap();
    let flagged: Vec<&str> = table
        .rows
        .iter()
        .filter(|r| r.overdue)
        .map(|r| r.invoice_no.as_str())
        .collect();
    assert_eq!(flagged, vec!["INV-1001"]);
}

#[test]
fn rows_carry_their_payment_action() {
    let api = sample_api();
    let mut dash = Dashboard::new(&api, "₹");
    dash.load_invoices().unwrap();

    let table = dash.state().invoices.as_ref().unwrap();
    assert_eq!(
        table.action(2),
        Some(&PaymentAction {
            invoice_id: 1002,
            invoice_no: "INV-1002".to_string(),
        })
    );
}

#[test]
fn latest_issued_request_wins_the_race() {
    let mut api = sample_api();
    api.invoices_by_query
        .insert("q=alpha".to_string(), vec![invoice(1, "INV-A", "Acme", false)]);
    api.invoices_by_query
        .insert("q=beta".to_string(), vec![invoice(2, "INV-B", "Globex", false)]);
    let mut dash = Dashboard::new(&api, "₹");

    dash.filter_mut().search = Some("alpha".to_string());
    let request_a = dash.request(Region::Invoices);
    dash.filter_mut().search = Some("beta".to_string());
    let request_b = dash.request(Region::Invoices);

    let payload_a = dash.fetch(&request_a).unwrap();
    let payload_b = dash.fetch(&request_b).unwrap();

    // B resolves first, A arrives last and must be discarded.
    assert!(dash.apply(request_b.ticket, payload_b));
    assert!(!dash.apply(request_a.ticket, payload_a));

    let rows = &dash.state().invoices.as_ref().unwrap().rows;
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].invoice_no, "INV-B");
}

#[test]
fn failed_load_keeps_previous_render() {
    let api = sample_api();
    let mut dash = Dashboard::new(&api, "₹");
    dash.dispatch(Trigger::ApplyFilters(Scope::default()))
        .unwrap();
    let before = dash.state().kpis.clone();

    api.fail_kpis.store(true, Ordering::SeqCst);
    let err = dash
        .dispatch(Trigger::ApplyFilters(Scope::default()))
        .unwrap_err();

    assert!(err.to_string().contains("kpis unavailable"));
    assert_eq!(dash.state().kpis, before);
    // The other regions of the same trigger still refreshed.
    assert_eq!(api.count("GET /api/invoices"), 2);
    assert_eq!(dash.state().chart.live_instances(), 1);
}

#[test]
fn successful_payment_closes_form_and_refreshes_once() {
    let api = sample_api();
    let mut dash = Dashboard::new(&api, "₹");
    dash.dispatch(Trigger::InitialLoad).unwrap();
    api.clear_calls();

    let action = dash
        .state()
        .invoices
        .as_ref()
        .and_then(|t| t.action_for("INV-1002"))
        .cloned()
        .unwrap();
    dash.open_payment_on(&action, date(2024, 3, 15));
    assert_eq!(dash.payment().payment_date, "2024-03-15");
    dash.payment_mut().set_amount("2500.00");

    let outcome = dash.submit_payment().unwrap();

    assert!(matches!(outcome, PaymentOutcome::Refreshed));
    assert_eq!(dash.payment().state(), ModalState::Closed);
    let calls = api.calls();
    assert_eq!(calls[0], "POST /api/payments");
    assert_eq!(calls.len(), 4);
    assert_eq!(api.count("GET /api/kpis"), 1);
    assert_eq!(api.count("GET /api/invoices"), 1);
    assert_eq!(api.count("GET /api/top-customers"), 1);

    let payments = api.payments.lock().unwrap();
    assert_eq!(
        payments.as_slice(),
        &[PaymentDraft {
            invoice_id: 1002,
            amount: 2500.0,
            payment_date: date(2024, 3, 15),
        }]
    );
}

#[test]
fn failed_refresh_after_saved_payment_is_not_a_payment_error() {
    let api = sample_api();
    let mut dash = Dashboard::new(&api, "₹");
    dash.dispatch(Trigger::InitialLoad).unwrap();
    let kpis_before = dash.state().kpis.clone();
    api.fail_kpis.store(true, Ordering::SeqCst);

    dash.open_payment_on(
        &PaymentAction {
            invoice_id: 1002,
            invoice_no: "INV-1002".to_string(),
        },
        date(2024, 3, 15),
    );
    dash.payment_mut().set_amount("2500.00");

    let outcome = dash.submit_payment().unwrap();

    match outcome {
        PaymentOutcome::RefreshFailed(err) => {
            assert!(err.to_string().contains("kpis unavailable"));
        }
        PaymentOutcome::Refreshed => panic!("refresh should have failed"),
    }
    assert_eq!(api.payments.lock().unwrap().len(), 1);
    assert_eq!(dash.payment().state(), ModalState::Closed);
    assert_eq!(dash.state().kpis, kpis_before);
    assert_eq!(api.count("POST /api/payments"), 1);
}

#[test]
fn blank_amount_makes_no_request() {
    let api = sample_api();
    let mut dash = Dashboard::new(&api, "₹");
    dash.open_payment(&PaymentAction {
        invoice_id: 1002,
        invoice_no: "INV-1002".to_string(),
    });

    let err = dash.submit_payment().unwrap_err();

    assert!(matches!(err, DashError::Validation(_)));
    assert!(err.to_string().contains("Please fill amount and date"));
    assert!(api.calls().is_empty());
    assert_eq!(dash.payment().state(), ModalState::Open);
}

#[test]
fn rejected_payment_keeps_entered_values() {
    let api = FakeApi {
        payment_error: Some((500, "insufficient invoice balance".to_string())),
        ..sample_api()
    };
    let mut dash = Dashboard::new(&api, "₹");
    dash.open_payment_on(
        &PaymentAction {
            invoice_id: 1002,
            invoice_no: "INV-1002".to_string(),
        },
        date(2024, 3, 1),
    );
    dash.payment_mut().set_amount("2500.00");
    dash.payment_mut().set_date("2024-03-15");

    let err = dash.submit_payment().unwrap_err();

    assert!(err.to_string().contains("insufficient invoice balance"));
    assert_eq!(dash.payment().state(), ModalState::Open);
    assert_eq!(dash.payment().amount, "2500.00");
    assert_eq!(dash.payment().payment_date, "2024-03-15");
    assert_eq!(api.calls(), vec!["POST /api/payments"]);

    // Retry without re-entering anything.
    assert!(matches!(
        dash.submit_payment(),
        Err(DashError::PaymentFailed(_))
    ));
    assert_eq!(api.count("POST /api/payments"), 2);
}

#[test]
fn open_payment_for_unknown_row_fails() {
    let api = sample_api();
    let mut dash = Dashboard::new(&api, "₹");
    dash.load_invoices().unwrap();

    assert!(matches!(
        dash.open_payment_for_row(9),
        Err(DashError::InvalidRow(_))
    ));
    dash.open_payment_for_row(1).unwrap();
    assert_eq!(dash.payment().invoice_no(), Some("INV-1001"));
    assert_eq!(dash.payment().amount, "");
}
