//! Report assembly
//!
//! Each report resolves its axes, allocates a zero-filled grid and folds one
//! aggregation pass per call source into it. The `build_*` functions work on
//! an already-read snapshot; the `call_*` functions read one from a store.

use crate::aggregator::{aggregate, purpose_key, trend_key, volume_key};
use crate::error::{ReportError, Result};
use crate::events::{CallEvent, CallType, PurposeEvent};
use crate::grid::{build_grid, Axis, KeyMatch};
use crate::locations::list_locations;
use crate::months::list_months;
use crate::range::DateRange;
use crate::store::{CallQuery, CallSnapshot, CallStore, PurposeCatalog};
use crate::{CallPurposeReport, CallTrendReport, CallVolumeReport};

fn directory(snapshot: &CallSnapshot) -> Vec<String> {
    list_locations(snapshot.location_names.iter().map(String::as_str))
}

fn completed_events<'a>(snapshot: &'a CallSnapshot, range: &DateRange) -> Vec<CallEvent<'a>> {
    snapshot
        .completed
        .iter()
        .filter_map(|c| c.call_event())
        .filter(|e| range.contains(e.timestamp))
        .collect()
}

fn missed_events<'a>(snapshot: &'a CallSnapshot, range: &DateRange) -> Vec<CallEvent<'a>> {
    snapshot
        .missed
        .iter()
        .map(|m| m.call_event())
        .filter(|e| range.contains(e.timestamp))
        .collect()
}

/// Call types × locations over completed and missed calls in `range`.
pub fn build_volume_report(snapshot: &CallSnapshot, range: &DateRange) -> Result<CallVolumeReport> {
    let locations = directory(snapshot);
    let call_types = CallType::labels();

    let grid = build_grid(
        Axis::required("call types", call_types.clone()),
        Axis::optional("locations", locations.clone()),
    )?;

    let missed = missed_events(snapshot, range);
    let completed = completed_events(snapshot, range);
    tracing::debug!(
        missed = missed.len(),
        completed = completed.len(),
        "aggregating call volume"
    );

    let grid = grid
        .fill(
            &aggregate(&missed, volume_key),
            KeyMatch::Exact,
            KeyMatch::CaseInsensitive,
        )
        .fill(
            &aggregate(&completed, volume_key),
            KeyMatch::Exact,
            KeyMatch::CaseInsensitive,
        );

    Ok(CallVolumeReport {
        locations,
        call_types,
        count_data: grid.count_rows(),
        volume_data: grid,
    })
}

/// Catalog purposes × locations over completed calls in `range`.
pub fn build_purpose_report(
    snapshot: &CallSnapshot,
    purposes: Vec<String>,
    range: &DateRange,
) -> Result<CallPurposeReport> {
    let locations = directory(snapshot);

    let grid = build_grid(
        Axis::optional("purposes", purposes),
        Axis::optional("locations", locations.clone()),
    )?;

    let events: Vec<PurposeEvent<'_>> = snapshot
        .completed
        .iter()
        .map(|c| c.purpose_event())
        .filter(|e| range.contains(e.timestamp))
        .collect();
    tracing::debug!(completed = events.len(), "aggregating call purposes");

    let grid = grid.fill(
        &aggregate(&events, purpose_key),
        KeyMatch::Exact,
        KeyMatch::CaseInsensitive,
    );

    Ok(CallPurposeReport {
        locations,
        purposes: grid.row_keys(),
        count_data: grid.count_rows(),
        sum_data: grid.row_totals().iter().map(u64::to_string).collect(),
        purpose_data: grid,
    })
}

/// Months of `range` × call types for one location.
pub fn build_trend_report(
    snapshot: &CallSnapshot,
    location_name: &str,
    range: &DateRange,
) -> Result<CallTrendReport> {
    let location_name = required_location(location_name)?;
    let locations = directory(snapshot);
    let period = list_months(range.from(), range.to());
    let call_types = CallType::labels();

    let grid = build_grid(
        Axis::optional("months", period.clone()),
        Axis::required("call types", call_types.clone()),
    )?;

    let at_location = CallQuery::at_location(location_name);
    let completed: Vec<CallEvent<'_>> = completed_events(snapshot, range)
        .into_iter()
        .filter(|e| at_location.matches_location(e.location_name))
        .collect();
    let missed: Vec<CallEvent<'_>> = missed_events(snapshot, range)
        .into_iter()
        .filter(|e| at_location.matches_location(e.location_name))
        .collect();
    tracing::debug!(
        location = location_name,
        months = period.len(),
        missed = missed.len(),
        completed = completed.len(),
        "aggregating call trend"
    );

    let grid = grid
        .fill(&aggregate(&completed, trend_key), KeyMatch::Exact, KeyMatch::Exact)
        .fill(&aggregate(&missed, trend_key), KeyMatch::Exact, KeyMatch::Exact);

    Ok(CallTrendReport {
        location_name: location_name.to_string(),
        locations,
        period,
        call_types,
        count_data: grid.count_rows(),
        trend_data: grid,
    })
}

fn required_location(location_name: &str) -> Result<&str> {
    let trimmed = location_name.trim();
    if trimmed.is_empty() {
        return Err(ReportError::MissingRequiredParameter("locationName"));
    }
    Ok(trimmed)
}

pub fn call_volume_report<S>(store: &S, range: &DateRange) -> Result<CallVolumeReport>
where
    S: CallStore + ?Sized,
{
    let snapshot = store.snapshot(&CallQuery::all())?;
    build_volume_report(&snapshot, range)
}

pub fn call_purpose_report<S>(store: &S, range: &DateRange) -> Result<CallPurposeReport>
where
    S: CallStore + PurposeCatalog + ?Sized,
{
    let purposes = store.purposes()?;
    let snapshot = store.snapshot(&CallQuery::all())?;
    build_purpose_report(&snapshot, purposes, range)
}

pub fn call_trend_report<S>(
    store: &S,
    location_name: &str,
    range: &DateRange,
) -> Result<CallTrendReport>
where
    S: CallStore + ?Sized,
{
    let location_name = required_location(location_name)?;
    let snapshot = store.snapshot(&CallQuery::at_location(location_name))?;
    build_trend_report(&snapshot, location_name, range)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{CompletedCall, MissedCall};
    use crate::store::MemoryStore;
    use chrono::{NaiveDate, NaiveDateTime};

    fn at(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap()
    }

    fn day_range(from: (i32, u32, u32), to: (i32, u32, u32)) -> DateRange {
        let from = NaiveDate::from_ymd_opt(from.0, from.1, from.2)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let to = NaiveDate::from_ymd_opt(to.0, to.1, to.2)
            .unwrap()
            .and_hms_opt(23, 59, 59)
            .unwrap();
        DateRange::new(from, to).unwrap()
    }

    fn january() -> DateRange {
        day_range((2024, 1, 1), (2024, 1, 31))
    }

    fn completed(
        location: &str,
        time: NaiveDateTime,
        call_type: Option<&str>,
        purpose: Option<&str>,
    ) -> CompletedCall {
        CompletedCall {
            location_name: location.to_string(),
            event_time: time,
            call_type: call_type.map(str::to_string),
            call_purpose: purpose.map(str::to_string),
        }
    }

    fn missed(location: &str, time: NaiveDateTime) -> MissedCall {
        MissedCall {
            location_name: location.to_string(),
            event_time: time,
        }
    }

    /// Two labs, a case variant, and one missed call in January 2024.
    fn lab_store() -> MemoryStore {
        MemoryStore::new(
            vec![
                completed("Lab A", at(2024, 1, 5), Some("Incoming"), Some("Cleaning")),
                completed("lab a", at(2024, 1, 20), Some("Incoming"), Some("Cleaning")),
            ],
            vec![missed("Lab B", at(2024, 1, 10))],
            vec!["Cleaning".to_string()],
        )
    }

    #[test]
    fn test_volume_report_end_to_end() {
        let report = call_volume_report(&lab_store(), &january()).unwrap();

        assert_eq!(report.locations, vec!["Lab A", "Lab B"]);
        assert_eq!(report.call_types, vec!["Missed", "Incoming", "Outgoing"]);
        assert_eq!(report.volume_data.count("Incoming", "Lab A"), Some(2));
        assert_eq!(report.volume_data.count("Incoming", "Lab B"), Some(0));
        assert_eq!(report.volume_data.count("Missed", "Lab A"), Some(0));
        assert_eq!(report.volume_data.count("Missed", "Lab B"), Some(1));
        assert_eq!(
            report.count_data,
            vec![vec!["0", "1"], vec!["2", "0"], vec!["0", "0"]]
        );
    }

    #[test]
    fn test_purpose_report_end_to_end() {
        let report = call_purpose_report(&lab_store(), &january()).unwrap();

        assert_eq!(report.purposes, vec!["Cleaning"]);
        assert_eq!(report.purpose_data.count("Cleaning", "Lab A"), Some(2));
        assert_eq!(report.purpose_data.count("Cleaning", "Lab B"), Some(0));
        assert_eq!(report.sum_data, vec!["2"]);
        assert_eq!(report.count_data, vec![vec!["2", "0"]]);
    }

    #[test]
    fn test_volume_sum_equals_typed_events_in_range() {
        let store = MemoryStore::new(
            vec![
                completed("Lab A", at(2024, 3, 1), Some("Incoming"), None),
                completed("Lab A", at(2024, 3, 2), Some("Outgoing"), None),
                completed("Lab B", at(2024, 3, 3), None, None),
                completed("Lab B", at(2024, 3, 4), Some("outgoing"), None),
                completed("Lab C", at(2024, 5, 1), Some("Incoming"), None),
            ],
            vec![
                missed("Lab B", at(2024, 3, 5)),
                missed("LAB C", at(2024, 3, 6)),
                missed("Lab C", at(2024, 2, 28)),
            ],
            Vec::new(),
        );

        let report = call_volume_report(&store, &day_range((2024, 3, 1), (2024, 3, 31))).unwrap();
        // Incoming + Outgoing + two missed; null and lower-case types never count.
        assert_eq!(report.volume_data.total(), 4);
        assert_eq!(report.locations, vec!["LAB C", "Lab A", "Lab B"]);
        assert_eq!(report.volume_data.count("Missed", "LAB C"), Some(1));
    }

    #[test]
    fn test_blank_location_calls_are_counted() {
        let store = MemoryStore::new(
            vec![
                completed("", at(2024, 1, 3), Some("Incoming"), Some("Cleaning")),
                completed("Lab A", at(2024, 1, 4), Some("Incoming"), Some("Cleaning")),
            ],
            vec![missed("  ", at(2024, 1, 5))],
            vec!["Cleaning".to_string()],
        );

        let volume = call_volume_report(&store, &january()).unwrap();
        assert_eq!(volume.locations, vec!["", "Lab A"]);
        assert_eq!(volume.volume_data.total(), 3);
        assert_eq!(volume.volume_data.count("Incoming", ""), Some(1));
        assert_eq!(volume.volume_data.count("Missed", ""), Some(1));

        let purpose = call_purpose_report(&store, &january()).unwrap();
        assert_eq!(purpose.sum_data, vec!["2"]);
        assert_eq!(purpose.purpose_data.count("Cleaning", ""), Some(1));
    }

    #[test]
    fn test_directory_ignores_range() {
        let store = MemoryStore::new(
            vec![completed("Lab Old", at(2020, 6, 1), Some("Incoming"), None)],
            vec![missed("Lab New", at(2024, 1, 10))],
            Vec::new(),
        );

        let report = call_volume_report(&store, &day_range((2024, 1, 1), (2024, 1, 31))).unwrap();
        assert_eq!(report.locations, vec!["Lab New", "Lab Old"]);
        assert_eq!(report.volume_data.count("Incoming", "Lab Old"), Some(0));
    }

    #[test]
    fn test_columns_identical_across_rows() {
        let report = call_volume_report(&lab_store(), &january()).unwrap();
        for row in report.volume_data.rows() {
            let names: Vec<&str> = row.cells.iter().map(|c| c.name.as_str()).collect();
            assert_eq!(names, vec!["Lab A", "Lab B"]);
        }
    }

    #[test]
    fn test_volume_with_no_locations() {
        let report = call_volume_report(&MemoryStore::default(), &january()).unwrap();
        assert!(report.locations.is_empty());
        assert_eq!(report.count_data, vec![Vec::<String>::new(); 3]);
    }

    #[test]
    fn test_purpose_null_and_unknown_purposes_excluded() {
        let store = MemoryStore::new(
            vec![
                completed("Lab A", at(2024, 1, 2), Some("Incoming"), Some("Billing")),
                completed("Lab A", at(2024, 1, 3), Some("Incoming"), None),
                completed("Lab B", at(2024, 1, 4), Some("Outgoing"), Some("billing")),
                completed("Lab B", at(2024, 1, 5), Some("Outgoing"), Some("Gossip")),
                completed("Lab B", at(2024, 1, 6), Some("Outgoing"), Some("Billing")),
                completed("Lab B", at(2024, 2, 6), Some("Outgoing"), Some("Billing")),
            ],
            Vec::new(),
            vec!["Billing".to_string(), "Cleaning".to_string()],
        );

        let report = call_purpose_report(&store, &day_range((2024, 1, 1), (2024, 1, 31))).unwrap();
        assert_eq!(report.purposes, vec!["Billing", "Cleaning"]);
        assert_eq!(report.purpose_data.count("Billing", "Lab A"), Some(1));
        assert_eq!(report.purpose_data.count("Billing", "Lab B"), Some(1));
        assert_eq!(report.sum_data, vec!["2", "0"]);
        assert_eq!(report.purpose_data.total(), 2);
    }

    #[test]
    fn test_purpose_report_with_empty_catalog() {
        let mut store = lab_store();
        store.call_purposes.clear();

        let report = call_purpose_report(&store, &day_range((2024, 1, 1), (2024, 1, 31))).unwrap();
        assert!(report.purposes.is_empty());
        assert!(report.count_data.is_empty());
        assert!(report.sum_data.is_empty());
    }

    #[test]
    fn test_trend_report_cells() {
        let store = MemoryStore::new(
            vec![
                completed("Lab A", at(2024, 1, 5), Some("Incoming"), None),
                completed("lab a", at(2024, 1, 25), Some("Incoming"), None),
                completed("Lab A", at(2024, 2, 7), Some("Outgoing"), None),
                completed("Lab B", at(2024, 1, 5), Some("Incoming"), None),
                completed("Lab A", at(2024, 4, 1), Some("Incoming"), None),
            ],
            vec![missed("LAB A", at(2024, 3, 3)), missed("Lab B", at(2024, 3, 3))],
            Vec::new(),
        );

        let range = day_range((2024, 1, 1), (2024, 3, 31));
        let report = call_trend_report(&store, "Lab A", &range).unwrap();

        assert_eq!(report.location_name, "Lab A");
        assert_eq!(report.locations, vec!["LAB A", "Lab B"]);
        assert_eq!(report.period, vec!["January 2024", "February 2024", "March 2024"]);
        assert_eq!(report.trend_data.count("January 2024", "Incoming"), Some(2));
        assert_eq!(report.trend_data.count("February 2024", "Outgoing"), Some(1));
        assert_eq!(report.trend_data.count("March 2024", "Missed"), Some(1));
        assert_eq!(report.trend_data.total(), 4);
        assert_eq!(
            report.count_data,
            vec![
                vec!["0", "2", "0"],
                vec!["0", "0", "1"],
                vec!["1", "0", "0"],
            ]
        );
    }

    #[test]
    fn test_trend_requires_location() {
        let range = day_range((2024, 1, 1), (2024, 1, 31));
        for name in ["", "   "] {
            let err = call_trend_report(&lab_store(), name, &range).unwrap_err();
            assert_eq!(err, ReportError::MissingRequiredParameter("locationName"));
        }
    }

    #[test]
    fn test_trend_for_unknown_location_is_all_zero() {
        let range = day_range((2024, 1, 1), (2024, 2, 29));
        let report = call_trend_report(&lab_store(), "Lab Z", &range).unwrap();
        assert_eq!(report.period.len(), 2);
        assert_eq!(report.trend_data.total(), 0);
    }

    #[test]
    fn test_reports_are_idempotent() {
        let store = lab_store();
        let range = day_range((2024, 1, 1), (2024, 1, 31));

        let first = serde_json::to_string(&call_volume_report(&store, &range).unwrap()).unwrap();
        let second = serde_json::to_string(&call_volume_report(&store, &range).unwrap()).unwrap();
        assert_eq!(first, second);

        let first = serde_json::to_string(&call_purpose_report(&store, &range).unwrap()).unwrap();
        let second = serde_json::to_string(&call_purpose_report(&store, &range).unwrap()).unwrap();
        assert_eq!(first, second);

        let trend = || call_trend_report(&store, "Lab A", &range).unwrap();
        let first = serde_json::to_string(&trend()).unwrap();
        let second = serde_json::to_string(&trend()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_volume_report_json_shape() {
        let report = call_volume_report(&lab_store(), &january()).unwrap();
        let value = serde_json::to_value(&report).unwrap();

        assert_eq!(value["locations"], serde_json::json!(["Lab A", "Lab B"]));
        assert_eq!(value["callTypes"][0], "Missed");
        assert_eq!(value["volumeData"]["Incoming"][0]["name"], "Lab A");
        assert_eq!(value["volumeData"]["Incoming"][0]["count"], 2);
        assert_eq!(value["countData"][1][0], "2");
    }
}
