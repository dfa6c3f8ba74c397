//! Parallel grouping of call events
//!
//! Uses rayon for the map-reduce over the event slice. The sparse output is
//! sorted so folding it into a grid is deterministic.

use crate::events::{fold_location, CallEvent, PurposeEvent};
use crate::months::month_label;
use rayon::prelude::*;
use std::collections::HashMap;

/// Number of events sharing one `(row, column)` key.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct GroupCount {
    pub row: String,
    pub column: String,
    pub count: u64,
}

/// Groups `events` by the exact key pair produced by `key`. Events for which
/// `key` returns `None` are not counted.
pub fn aggregate<T, F>(events: &[T], key: F) -> Vec<GroupCount>
where
    T: Sync,
    F: Fn(&T) -> Option<(String, String)> + Sync + Send,
{
    if events.is_empty() {
        return Vec::new();
    }

    let counts: HashMap<(String, String), u64> = events
        .par_iter()
        .fold(HashMap::new, |mut acc: HashMap<(String, String), u64>, event| {
            if let Some(pair) = key(event) {
                *acc.entry(pair).or_insert(0) += 1;
            }
            acc
        })
        .reduce(HashMap::new, |mut a, b| {
            for (pair, count) in b {
                *a.entry(pair).or_insert(0) += count;
            }
            a
        });

    let mut groups: Vec<GroupCount> = counts
        .into_iter()
        .map(|((row, column), count)| GroupCount { row, column, count })
        .collect();
    groups.sort_unstable();
    groups
}

/// `(call type, location)` for the volume grid.
pub fn volume_key(event: &CallEvent<'_>) -> Option<(String, String)> {
    Some((
        event.call_type.label().to_string(),
        fold_location(event.location_name),
    ))
}

/// `(purpose, location)` for the purpose grid. Calls without a purpose are
/// not counted anywhere.
pub fn purpose_key(event: &PurposeEvent<'_>) -> Option<(String, String)> {
    let purpose = event.purpose?;
    Some((purpose.to_string(), fold_location(event.location_name)))
}

/// `(month label, call type)` for the trend grid.
pub fn trend_key(event: &CallEvent<'_>) -> Option<(String, String)> {
    Some((
        month_label(event.timestamp),
        event.call_type.label().to_string(),
    ))
}
