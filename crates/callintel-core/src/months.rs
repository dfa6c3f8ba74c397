//! Calendar-month axis for the trend report.

use chrono::{Datelike, Months, NaiveDate, NaiveDateTime};

/// `"March 2024"`. chrono's month names are English regardless of host
/// locale, so labels are stable across machines.
pub fn month_label(instant: NaiveDateTime) -> String {
    instant.format("%B %Y").to_string()
}

/// Last calendar day of the month containing `date`.
pub fn month_end(date: NaiveDate) -> NaiveDate {
    let first = NaiveDate::from_ymd_opt(date.year(), date.month(), 1).unwrap_or(date);
    first
        .checked_add_months(Months::new(1))
        .and_then(|next| next.pred_opt())
        .unwrap_or(NaiveDate::MAX)
}

/// Ordered month labels from the month of `from` through the month of `to`,
/// both inclusive. Empty when `from` is after `to`.
pub fn list_months(from: NaiveDateTime, to: NaiveDateTime) -> Vec<String> {
    let start = from.date();
    let end = month_end(to.date());

    let mut months = Vec::new();
    if from > to {
        return months;
    }

    for step in 0u32.. {
        // Offsets are taken from `start` (not chained) so a 31st does not
        // drift to the 28th after February.
        let Some(current) = start.checked_add_months(Months::new(step)) else {
            break;
        };
        if current > end {
            break;
        }
        months.push(current.format("%B %Y").to_string());
    }

    months
}
