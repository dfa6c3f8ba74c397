//! Call records as stored, and the event views the aggregator reads.

use chrono::NaiveDateTime;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Call category. `Missed` has no stored field: it is assigned to every
/// record read from the missed-call source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CallType {
    Missed,
    Incoming,
    Outgoing,
}

impl CallType {
    /// Column order of every call-type axis.
    pub const ALL: [CallType; 3] = [CallType::Missed, CallType::Incoming, CallType::Outgoing];

    pub fn label(self) -> &'static str {
        match self {
            CallType::Missed => "Missed",
            CallType::Incoming => "Incoming",
            CallType::Outgoing => "Outgoing",
        }
    }

    /// Exact, case-sensitive label match. `"incoming"` is not a call type.
    pub fn from_label(label: &str) -> Option<CallType> {
        CallType::ALL.into_iter().find(|t| t.label() == label)
    }

    pub fn labels() -> Vec<String> {
        CallType::ALL.iter().map(|t| t.label().to_string()).collect()
    }
}

impl fmt::Display for CallType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A completed ("valid") call as stored. `call_type` stays raw text so that
/// records with an unknown or absent type can be read and then ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletedCall {
    #[serde(alias = "labName")]
    pub location_name: String,
    #[serde(
        deserialize_with = "deserialize_instant",
        serialize_with = "serialize_instant"
    )]
    pub event_time: NaiveDateTime,
    #[serde(default)]
    pub call_type: Option<String>,
    #[serde(default)]
    pub call_purpose: Option<String>,
}

/// A missed call as stored: no type, no purpose.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MissedCall {
    #[serde(alias = "labName")]
    pub location_name: String,
    #[serde(
        deserialize_with = "deserialize_instant",
        serialize_with = "serialize_instant"
    )]
    pub event_time: NaiveDateTime,
}

/// Unified view over both sources for the volume and trend reports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallEvent<'a> {
    pub location_name: &'a str,
    pub timestamp: NaiveDateTime,
    pub call_type: CallType,
}

/// Purpose view over completed calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PurposeEvent<'a> {
    pub location_name: &'a str,
    pub timestamp: NaiveDateTime,
    pub purpose: Option<&'a str>,
}

impl CompletedCall {
    /// `None` when the stored type is absent or not an exact call-type label.
    pub fn call_event(&self) -> Option<CallEvent<'_>> {
        let call_type = CallType::from_label(self.call_type.as_deref()?)?;
        Some(CallEvent {
            location_name: &self.location_name,
            timestamp: self.event_time,
            call_type,
        })
    }

    pub fn purpose_event(&self) -> PurposeEvent<'_> {
        PurposeEvent {
            location_name: &self.location_name,
            timestamp: self.event_time,
            purpose: self.call_purpose.as_deref(),
        }
    }
}

impl MissedCall {
    pub fn call_event(&self) -> CallEvent<'_> {
        CallEvent {
            location_name: &self.location_name,
            timestamp: self.event_time,
            call_type: CallType::Missed,
        }
    }
}

/// Grouping key for location names: upper-case fold, so `"lab a"` and
/// `"Lab A"` land in one group.
pub fn fold_location(name: &str) -> String {
    name.trim().to_uppercase()
}

/// `fold_location(a) == fold_location(b)` without allocating.
pub fn same_location(a: &str, b: &str) -> bool {
    a.trim()
        .chars()
        .flat_map(char::to_uppercase)
        .eq(b.trim().chars().flat_map(char::to_uppercase))
}

fn deserialize_instant<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    crate::range::parse_instant(&raw)
        .ok_or_else(|| serde::de::Error::custom(format!("invalid event time '{}'", raw)))
}

fn serialize_instant<S>(value: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&value.format("%Y-%m-%dT%H:%M:%S").to_string())
}
