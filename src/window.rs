//! Reporting window construction.
//!
//! Date-only inputs are interpreted in a fixed +09:00 civil offset: the start
//! date maps to 00:00:00 and the end date to 23:59:59 of that offset, and both
//! are normalized to UTC. No timezone database is consulted.

use crate::error::{ActivityError, ConfigField, Result};
use chrono::{DateTime, FixedOffset, NaiveDate, SecondsFormat, TimeZone, Utc};
use regex::Regex;
use serde::Serialize;
use std::fmt;
use std::sync::LazyLock;

/// Format description reported back on validation failures.
pub const EXPECTED_DATE_FORMAT: &str = "YYYY-MM-DD";

/// Offset of the civil time used to anchor date-only inputs, in seconds east of UTC.
pub const CIVIL_OFFSET_SECS: i32 = 9 * 3600;

const END_OF_DAY_HOUR: u32 = 23;
const END_OF_DAY_MIN: u32 = 59;
const END_OF_DAY_SEC: u32 = 59;

// ASCII digits only; `\d` would also accept other Unicode digits.
static RE_DATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{4}-[0-9]{2}-[0-9]{2}$").unwrap());

/// The inclusive range of instants a report covers.
///
/// `start <= end` is not enforced. An inverted window is legal and contains
/// no instants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReportWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl ReportWindow {
    /// Builds the window from raw start and end date strings.
    pub fn from_dates(start: Option<&str>, end: Option<&str>) -> Result<Self> {
        Ok(Self {
            start: build_start(start)?,
            end: build_end(end)?,
        })
    }

    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        instant >= self.start && instant <= self.end
    }

    /// Start instant as an RFC 3339 UTC string, as sent to the API.
    pub fn since(&self) -> String {
        self.start.to_rfc3339_opts(SecondsFormat::Secs, true)
    }

    /// End instant as an RFC 3339 UTC string, as sent to the API.
    pub fn until(&self) -> String {
        self.end.to_rfc3339_opts(SecondsFormat::Secs, true)
    }
}

impl fmt::Display for ReportWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ~ {}", self.since(), self.until())
    }
}

/// Checks that `value` is a zero-padded `YYYY-MM-DD` string naming a real calendar date.
pub fn validate_date(value: &str) -> Result<NaiveDate> {
    let invalid = || ActivityError::InvalidDateFormat {
        value: value.to_string(),
        expected: EXPECTED_DATE_FORMAT,
    };

    // chrono alone accepts unpadded fields such as "2023-5-1"
    if !RE_DATE.is_match(value) {
        return Err(invalid());
    }

    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| invalid())
}

/// Start of the given day (00:00:00 at +09:00), as a UTC instant.
pub fn build_start(value: Option<&str>) -> Result<DateTime<Utc>> {
    let date = required_date(value, ConfigField::StartDate)?;
    anchor(date, 0, 0, 0)
}

/// End of the given day (23:59:59 at +09:00), as a UTC instant.
pub fn build_end(value: Option<&str>) -> Result<DateTime<Utc>> {
    let date = required_date(value, ConfigField::EndDate)?;
    anchor(date, END_OF_DAY_HOUR, END_OF_DAY_MIN, END_OF_DAY_SEC)
}

fn required_date(value: Option<&str>, field: ConfigField) -> Result<NaiveDate> {
    match value {
        Some(v) if !v.trim().is_empty() => validate_date(v),
        _ => Err(ActivityError::MissingConfiguration(field)),
    }
}

/// Reads `date` at the given wall-clock time in the civil offset and normalizes it to UTC.
fn anchor(date: NaiveDate, hour: u32, min: u32, sec: u32) -> Result<DateTime<Utc>> {
    let civil = date.and_hms_opt(hour, min, sec);
    FixedOffset::east_opt(CIVIL_OFFSET_SECS)
        .zip(civil)
        .and_then(|(offset, civil)| offset.from_local_datetime(&civil).single())
        .map(|dt| dt.with_timezone(&Utc))
        .ok_or_else(|| ActivityError::InvalidDateFormat {
            value: date.format("%Y-%m-%d").to_string(),
            expected: EXPECTED_DATE_FORMAT,
        })
}
