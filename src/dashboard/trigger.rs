use super::filter::{ChartMode, Scope, SortField, SortOrder};
use super::sequence::Region;

/// User actions that cause data to be (re)loaded
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Trigger {
    InitialLoad,
    ApplyFilters(Scope),
    SearchInput(String),
    SortChanged {
        field: Option<SortField>,
        order: Option<SortOrder>,
    },
    ChartModeChanged(ChartMode),
    PaymentRecorded,
}

/// Regions to reload for a trigger.
///
/// `sequential` regions load one after the other and must all succeed before
/// the `parallel` set starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshPlan {
    pub sequential: &'static [Region],
    pub parallel: &'static [Region],
}

const FULL: &[Region] = &[Region::Kpis, Region::Invoices, Region::Chart];

impl Trigger {
    pub fn plan(&self) -> RefreshPlan {
        match self {
            Trigger::InitialLoad => RefreshPlan {
                sequential: &[Region::Customers],
                parallel: FULL,
            },
            Trigger::ApplyFilters(_) | Trigger::PaymentRecorded => RefreshPlan {
                sequential: &[],
                parallel: FULL,
            },
            Trigger::SearchInput(_) | Trigger::SortChanged { .. } => RefreshPlan {
                sequential: &[],
                parallel: &[Region::Invoices],
            },
            Trigger::ChartModeChanged(_) => RefreshPlan {
                sequential: &[],
                parallel: &[Region::Chart],
            },
        }
    }
}
