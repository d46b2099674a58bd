use std::fmt;

/// Independently rendered regions of the dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Region {
    Customers,
    Kpis,
    Invoices,
    Chart,
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Region::Customers => "customers",
            Region::Kpis => "kpis",
            Region::Invoices => "invoices",
            Region::Chart => "chart",
        };
        f.write_str(name)
    }
}

/// Identifies one issued request for a region
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    pub region: Region,
    pub seq: u64,
}

/// Per-region request counters. Only the most recently issued ticket of a
/// region may write to it; anything older is stale.
#[derive(Debug, Default)]
pub struct RequestSequencer {
    customers: u64,
    kpis: u64,
    invoices: u64,
    chart: u64,
}

impl RequestSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    fn counter_mut(&mut self, region: Region) -> &mut u64 {
        match region {
            Region::Customers => &mut self.customers,
            Region::Kpis => &mut self.kpis,
            Region::Invoices => &mut self.invoices,
            Region::Chart => &mut self.chart,
        }
    }

    fn counter(&self, region: Region) -> u64 {
        match region {
            Region::Customers => self.customers,
            Region::Kpis => self.kpis,
            Region::Invoices => self.invoices,
            Region::Chart => self.chart,
        }
    }

    pub fn issue(&mut self, region: Region) -> Ticket {
        let counter = self.counter_mut(region);
        *counter += 1;
        Ticket {
            region,
            seq: *counter,
        }
    }

    pub fn is_current(&self, ticket: Ticket) -> bool {
        self.counter(ticket.region) == ticket.seq
    }
}
