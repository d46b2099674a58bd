//! Mock invoicing API for CLI tests.

use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[derive(Clone)]
pub struct Route {
    pub method: &'static str,
    pub path: &'static str,
    pub status: u16,
    pub body: String,
}

impl Route {
    pub fn get(path: &'static str, body: &str) -> Self {
        Self {
            method: "GET",
            path,
            status: 200,
            body: body.to_string(),
        }
    }

    pub fn post(path: &'static str, status: u16, body: &str) -> Self {
        Self {
            method: "POST",
            path,
            status,
            body: body.to_string(),
        }
    }

    pub fn with_status(self, status: u16) -> Self {
        Self { status, ..self }
    }
}

/// A request as seen by the server: "METHOD path[?query]" plus the raw body
#[derive(Debug, Clone)]
pub struct Seen {
    pub line: String,
    pub body: String,
}

/// Start a mock server answering `routes`; anything else gets a 404
pub async fn start(routes: Vec<Route>) -> MockServer {
    let server = MockServer::start().await;
    for route in routes {
        Mock::given(method(route.method))
            .and(path(route.path))
            .respond_with(
                ResponseTemplate::new(route.status).set_body_raw(route.body, "application/json"),
            )
            .mount(&server)
            .await;
    }
    server
}

pub async fn seen(server: &MockServer) -> Vec<Seen> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .into_iter()
        .map(|request| {
            let target = match request.url.query() {
                Some(query) => format!("{}?{query}", request.url.path()),
                None => request.url.path().to_string(),
            };
            Seen {
                line: format!("{} {target}", request.method),
                body: String::from_utf8_lossy(&request.body).into_owned(),
            }
        })
        .collect()
}

pub async fn count(server: &MockServer, prefix: &str) -> usize {
    seen(server)
        .await
        .iter()
        .filter(|s| s.line.starts_with(prefix))
        .count()
}

pub const CUSTOMERS: &str = r#"[{"id": 1, "name": "Acme"}, {"id": 2, "name": "Globex"}]"#;

pub const KPIS: &str = r#"{"totalInvoiced": 15000.0, "totalReceived": 5000.0, "totalOutstanding": 10000.0, "percentOverdue": 50.0}"#;

// Dates as Flask's jsonify writes MySQL DATE columns.
pub const INVOICES: &str = r#"[
  {"id": 1001, "invoice_no": "INV-1001", "customer_name": "Acme", "invoice_date": "Fri, 05 Jan 2024 00:00:00 GMT",
   "due_date": "Sun, 04 Feb 2024 00:00:00 GMT", "amount_total": "10000.00", "status": "overdue", "outstanding": 7500, "overdue": true},
  {"id": 1002, "invoice_no": "INV-1002", "customer_name": "Globex", "invoice_date": "2024-02-10",
   "due_date": null, "amount_total": 5000, "status": "unpaid", "outstanding": 2500, "overdue": false}
]"#;

pub const TOP_CUSTOMERS: &str = r#"[{"id": 1, "name": "Acme", "outstanding": 7500}, {"id": 2, "name": "Globex", "outstanding": 2500}]"#;

pub const MONTHLY: &str = r#"[{"month": "2024-01-01", "invoiced": 10000, "received": 2500}, {"month": "2024-02-01", "invoiced": 5000, "received": 2500}]"#;

pub fn api_routes() -> Vec<Route> {
    vec![
        Route::get("/api/customers", CUSTOMERS),
        Route::get("/api/kpis", KPIS),
        Route::get("/api/invoices", INVOICES),
        Route::get("/api/top-customers", TOP_CUSTOMERS),
        Route::get("/api/monthly", MONTHLY),
    ]
}
