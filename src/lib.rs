pub mod api;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod query;
pub mod render;

pub use api::{DashboardApi, HttpApi};
pub use config::{ApiSettings, Config, DisplaySettings};
pub use dashboard::{AppState, Dashboard, FilterState, Region, Trigger};
pub use error::{DashError, Result};
pub use query::build_query;
