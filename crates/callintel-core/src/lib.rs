#![deny(clippy::all)]

mod aggregator;
pub mod error;
pub mod events;
pub mod grid;
mod locations;
mod months;
pub mod range;
mod reports;
pub mod store;

pub use aggregator::*;
pub use error::{ReportError, Result};
pub use events::{CallEvent, CallType, CompletedCall, MissedCall, PurposeEvent};
pub use grid::{build_grid, Axis, Cell, Grid, GridRow, KeyMatch};
pub use locations::list_locations;
pub use months::{list_months, month_end, month_label};
pub use range::{parse_bound, Bound, DateRange};
pub use reports::*;
pub use store::{open_store, CallQuery, CallSnapshot, CallStore, PurposeCatalog, ReportStore};

use serde::Serialize;

/// Call volume per call type (rows) and location (columns).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CallVolumeReport {
    pub locations: Vec<String>,
    pub call_types: Vec<String>,
    pub volume_data: Grid,
    pub count_data: Vec<Vec<String>>,
}

/// Completed calls per purpose (rows) and location (columns).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CallPurposeReport {
    pub locations: Vec<String>,
    pub purposes: Vec<String>,
    pub purpose_data: Grid,
    pub count_data: Vec<Vec<String>>,
    /// Total per purpose across all locations, in purpose order.
    pub sum_data: Vec<String>,
}

/// Calls per month (rows) and call type (columns) at one location.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CallTrendReport {
    pub location_name: String,
    pub locations: Vec<String>,
    pub period: Vec<String>,
    pub call_types: Vec<String>,
    pub trend_data: Grid,
    pub count_data: Vec<Vec<String>>,
}
