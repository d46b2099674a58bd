use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::{debug, info};

use crate::api::{MonthlyPoint, TopCustomer};

/// Series as returned by the API; the shape depends on the chart mode
#[derive(Debug, Clone, PartialEq)]
pub enum ChartSeries {
    TopCustomers(Vec<TopCustomer>),
    Monthly(Vec<MonthlyPoint>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    Bar,
    Line,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    pub label: String,
    pub data: Vec<f64>,
}

/// Declarative description of a chart: kind, x labels and datasets
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSpec {
    pub kind: ChartKind,
    pub labels: Vec<String>,
    pub datasets: Vec<Dataset>,
}

impl From<&ChartSeries> for ChartSpec {
    fn from(series: &ChartSeries) -> Self {
        match series {
            ChartSeries::TopCustomers(rows) => ChartSpec {
                kind: ChartKind::Bar,
                labels: rows.iter().map(|r| r.name.clone()).collect(),
                datasets: vec![Dataset {
                    label: "Outstanding".to_string(),
                    data: rows.iter().map(|r| r.outstanding).collect(),
                }],
            },
            ChartSeries::Monthly(points) => ChartSpec {
                kind: ChartKind::Line,
                labels: points
                    .iter()
                    .map(|p| p.month.format("%Y-%m").to_string())
                    .collect(),
                datasets: vec![
                    Dataset {
                        label: "Invoiced".to_string(),
                        data: points.iter().map(|p| p.invoiced).collect(),
                    },
                    Dataset {
                        label: "Received".to_string(),
                        data: points.iter().map(|p| p.received).collect(),
                    },
                ],
            },
        }
    }
}

/// A mounted chart. Dropping it destroys it.
#[derive(Debug)]
pub struct Chart {
    id: u64,
    spec: ChartSpec,
    live: Arc<AtomicUsize>,
}

impl Chart {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn spec(&self) -> &ChartSpec {
        &self.spec
    }
}

impl Drop for Chart {
    fn drop(&mut self) {
        self.live.fetch_sub(1, Ordering::SeqCst);
        debug!(chart = self.id, "chart destroyed");
    }
}

/// The single drawing surface. Holds at most one chart at a time.
#[derive(Debug, Default)]
pub struct ChartSurface {
    current: Option<Chart>,
    live: Arc<AtomicUsize>,
    next_id: u64,
}

impl ChartSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Destroy the current chart, if any, then build one from `spec`.
    pub fn mount(&mut self, spec: ChartSpec) -> &Chart {
        self.destroy();

        self.next_id += 1;
        self.live.fetch_add(1, Ordering::SeqCst);
        info!(chart = self.next_id, kind = ?spec.kind, points = spec.labels.len(), "chart mounted");

        self.current.insert(Chart {
            id: self.next_id,
            spec,
            live: Arc::clone(&self.live),
        })
    }

    pub fn destroy(&mut self) {
        self.current.take();
    }

    pub fn current(&self) -> Option<&Chart> {
        self.current.as_ref()
    }

    /// Charts created by this surface that have not been destroyed yet
    pub fn live_instances(&self) -> usize {
        self.live.load(Ordering::SeqCst)
    }
}
