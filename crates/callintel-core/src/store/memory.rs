use super::{CallQuery, CallSnapshot, CallStore, PurposeCatalog};
use crate::error::Result;
use crate::events::{CompletedCall, MissedCall};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Call records held in memory, usually loaded from a JSON export:
///
/// ```json
/// {
///   "validCalls":   [{ "locationName": "Lab A", "eventTime": "2024-01-05T10:00:00",
///                      "callType": "Incoming", "callPurpose": "Cleaning" }],
///   "missedCalls":  [{ "locationName": "Lab B", "eventTime": "2024-01-10T09:00:00" }],
///   "callPurposes": ["Cleaning", "Billing"]
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemoryStore {
    #[serde(default)]
    pub valid_calls: Vec<CompletedCall>,
    #[serde(default)]
    pub missed_calls: Vec<MissedCall>,
    #[serde(default)]
    pub call_purposes: Vec<String>,
}

impl MemoryStore {
    pub fn new(
        valid_calls: Vec<CompletedCall>,
        missed_calls: Vec<MissedCall>,
        call_purposes: Vec<String>,
    ) -> Self {
        Self {
            valid_calls,
            missed_calls,
            call_purposes,
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let store = Self::from_json_str(&content)?;
        tracing::debug!(
            path = %path.display(),
            valid = store.valid_calls.len(),
            missed = store.missed_calls.len(),
            purposes = store.call_purposes.len(),
            "loaded call snapshot"
        );
        Ok(store)
    }
}

impl CallStore for MemoryStore {
    fn snapshot(&self, query: &CallQuery) -> Result<CallSnapshot> {
        Ok(CallSnapshot::from_records(
            &self.valid_calls,
            &self.missed_calls,
            query,
        ))
    }
}

impl PurposeCatalog for MemoryStore {
    fn purposes(&self) -> Result<Vec<String>> {
        Ok(self.call_purposes.clone())
    }
}
