//! Court performance statistics.
//!
//! Long-format statistic rows (`Court,Year,Metric,Value,Unit`) are loaded
//! per year, indexed, and reshaped into the wide series and indicator cards
//! a dashboard renders. The [`generate`] module produces those yearly files
//! from three wide source tables.

pub mod config;
pub mod dashboard;
pub mod error;
pub mod generate;
pub mod index;
pub mod loader;
pub mod metrics;
pub mod output;
pub mod reports;
pub mod types;
pub mod util;

pub use dashboard::{Dashboard, LoadOutcome, LoadState};
pub use error::{DashboardError, Result};
pub use index::MetricIndex;
pub use types::{MetricRow, StatRow};
