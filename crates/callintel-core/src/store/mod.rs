//! Read-only call stores
//!
//! The report assemblers never touch storage directly; they ask a
//! [`CallStore`] for one consistent [`CallSnapshot`] per request and a
//! [`PurposeCatalog`] for the controlled purpose list.

pub mod memory;
pub mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use crate::error::{ReportError, Result};
use crate::events::{CompletedCall, MissedCall};
use crate::grid::KeyMatch;
use std::path::Path;

/// What a report needs from the store. Date filtering is applied by the
/// report itself, so stores only narrow by location.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallQuery {
    /// Case-insensitive location filter.
    pub location: Option<String>,
}

impl CallQuery {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn at_location(location: impl Into<String>) -> Self {
        Self {
            location: Some(location.into()),
        }
    }

    pub fn matches_location(&self, location_name: &str) -> bool {
        match self.location.as_deref() {
            Some(wanted) => KeyMatch::CaseInsensitive.matches(wanted, location_name),
            None => true,
        }
    }
}

/// One consistent read of both call sources.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CallSnapshot {
    /// Location names from every record of both sources, ignoring the query.
    pub location_names: Vec<String>,
    pub completed: Vec<CompletedCall>,
    pub missed: Vec<MissedCall>,
}

impl CallSnapshot {
    /// Builds a snapshot from full record sets, narrowing the calls by
    /// `query` while keeping every location name.
    pub fn from_records(
        completed: &[CompletedCall],
        missed: &[MissedCall],
        query: &CallQuery,
    ) -> Self {
        let location_names = completed
            .iter()
            .map(|c| c.location_name.clone())
            .chain(missed.iter().map(|m| m.location_name.clone()))
            .collect();

        Self {
            location_names,
            completed: completed
                .iter()
                .filter(|c| query.matches_location(&c.location_name))
                .cloned()
                .collect(),
            missed: missed
                .iter()
                .filter(|m| query.matches_location(&m.location_name))
                .cloned()
                .collect(),
        }
    }
}

pub trait CallStore {
    fn snapshot(&self, query: &CallQuery) -> Result<CallSnapshot>;
}

pub trait PurposeCatalog {
    /// The controlled list of purposes, in catalog order.
    fn purposes(&self) -> Result<Vec<String>>;
}

/// A store that serves every report.
pub trait ReportStore: CallStore + PurposeCatalog {}

impl<T: CallStore + PurposeCatalog> ReportStore for T {}

/// Opens a JSON snapshot or a SQLite database, chosen by file extension.
pub fn open_store(path: &Path) -> Result<Box<dyn ReportStore>> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "json" => Ok(Box::new(MemoryStore::from_path(path)?)),
        "db" | "sqlite" | "sqlite3" => Ok(Box::new(SqliteStore::open(path)?)),
        _ => Err(ReportError::Store(format!(
            "unsupported data file '{}' (expected .json, .db, .sqlite or .sqlite3)",
            path.display()
        ))),
    }
}
