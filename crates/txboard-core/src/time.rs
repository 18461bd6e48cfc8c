//! Date parsing and timestamp windows for filtering transactions

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};

/// Inclusive timestamp window; an open side matches everything
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

impl TimeWindow {
    pub fn new(start: Option<DateTime<Utc>>, end: Option<DateTime<Utc>>) -> Self {
        Self { start, end }
    }

    /// Check if a timestamp is within the window
    pub fn contains(&self, ts: &DateTime<Utc>) -> bool {
        match (self.start, self.end) {
            (None, None) => true,
            (Some(s), None) => *ts >= s,
            (None, Some(e)) => *ts <= e,
            (Some(s), Some(e)) => *ts >= s && *ts <= e,
        }
    }
}

/// Parse a calendar date from `YYYY-MM-DD` or the date part of an RFC 3339 instant
pub fn parse_date(value: &str) -> Result<NaiveDate, String> {
    let value = value.trim();
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Ok(date);
    }
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc).date_naive())
        .map_err(|_| format!("expected YYYY-MM-DD or an RFC 3339 timestamp, got '{}'", value))
}

/// Parse a lower bound; a bare date means the first instant of that day (UTC)
pub fn parse_start_bound(value: &str) -> Result<DateTime<Utc>, String> {
    parse_bound(value, NaiveTime::MIN)
}

/// Parse an upper bound; a bare date means the last instant of that day (UTC)
pub fn parse_end_bound(value: &str) -> Result<DateTime<Utc>, String> {
    let last = NaiveTime::from_hms_nano_opt(23, 59, 59, 999_999_999).unwrap_or(NaiveTime::MIN);
    parse_bound(value, last)
}

fn parse_bound(value: &str, time_of_day: NaiveTime) -> Result<DateTime<Utc>, String> {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map(|date| date.and_time(time_of_day).and_utc())
        .map_err(|_| format!("expected YYYY-MM-DD or an RFC 3339 timestamp, got '{}'", value))
}

/// Every calendar day in `[start, end]`, in order
pub fn days_between(start: NaiveDate, end: NaiveDate) -> impl Iterator<Item = NaiveDate> {
    start.iter_days().take_while(move |d| *d <= end)
}
