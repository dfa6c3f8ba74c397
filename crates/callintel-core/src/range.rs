//! Inclusive report windows and the parsing of their bounds.

use crate::error::{ReportError, Result};
use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime};

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Which end of a window a bare date stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
    Start,
    End,
}

/// Inclusive `[from, to]` window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    from: NaiveDateTime,
    to: NaiveDateTime,
}

impl DateRange {
    pub fn new(from: NaiveDateTime, to: NaiveDateTime) -> Result<Self> {
        if from > to {
            return Err(ReportError::InvalidRange(format!(
                "from {} is after to {}",
                from, to
            )));
        }
        Ok(Self { from, to })
    }

    /// Fills in missing bounds: `to` defaults to `now`, `from` to `now`
    /// shifted by `from_offset_days` (normally negative).
    pub fn resolve(
        from: Option<NaiveDateTime>,
        to: Option<NaiveDateTime>,
        from_offset_days: i64,
        now: NaiveDateTime,
    ) -> Result<Self> {
        let to = to.unwrap_or(now);
        let from = match from {
            Some(from) => from,
            None => Duration::try_days(from_offset_days)
                .and_then(|offset| now.checked_add_signed(offset))
                .ok_or_else(|| {
                    ReportError::InvalidRange(format!(
                        "default offset of {} days is out of range",
                        from_offset_days
                    ))
                })?,
        };
        Self::new(from, to)
    }

    pub fn from(&self) -> NaiveDateTime {
        self.from
    }

    pub fn to(&self) -> NaiveDateTime {
        self.to
    }

    pub fn contains(&self, instant: NaiveDateTime) -> bool {
        instant >= self.from && instant <= self.to
    }
}

/// Parses a stored or user-supplied instant. Bare dates are midnight.
pub fn parse_instant(text: &str) -> Option<NaiveDateTime> {
    parse_with_bound(text, Bound::Start)
}

/// Parses a window bound. A bare date means the first instant of the day for
/// `Bound::Start` and the last for `Bound::End`.
pub fn parse_bound(text: &str, bound: Bound) -> Result<NaiveDateTime> {
    parse_with_bound(text, bound)
        .ok_or_else(|| ReportError::InvalidRange(format!("'{}' is not a valid date", text)))
}

fn parse_with_bound(text: &str, bound: Bound) -> Option<NaiveDateTime> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.naive_local());
    }

    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(text, format) {
            return Some(dt);
        }
    }

    let date = NaiveDate::parse_from_str(text, "%Y-%m-%d").ok()?;
    let time = match bound {
        Bound::Start => NaiveTime::MIN,
        Bound::End => NaiveTime::from_hms_nano_opt(23, 59, 59, 999_999_999)?,
    };
    Some(date.and_time(time))
}
