// src/timestamps.rs
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TimestampError {
    #[error("empty value")]
    Empty,
    #[error("unrecognized timestamp '{0}'")]
    UnrecognizedTimestamp(String),
    #[error("unrecognized date '{0}'")]
    UnrecognizedDate(String),
    #[error("unrecognized clock time '{0}' (expected HH:MM)")]
    UnrecognizedClock(String),
}

// --- Accepted Formats ---

// Telematics exports disagree on layout; order is most to least common.
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%m/%d/%Y %I:%M:%S %p",
    "%m/%d/%Y %I:%M %p",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y"];

const CLOCK_FORMATS: &[&str] = &["%H:%M:%S", "%H:%M", "%I:%M %p", "%I:%M:%S %p"];

/// Parses an event timestamp into local wall-clock time.
///
/// Values carrying an explicit offset (`...Z`, `...+02:00`) keep the wall
/// time as written; the offset is dropped since shift bounds are wall times.
pub fn parse_timestamp(raw: &str) -> Result<NaiveDateTime, TimestampError> {
    let value = raw.trim();
    if value.is_empty() {
        return Err(TimestampError::Empty);
    }

    if let Ok(with_offset) = DateTime::parse_from_rfc3339(value) {
        return Ok(with_offset.naive_local());
    }

    let value = value.strip_suffix('Z').unwrap_or(value);
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .ok_or_else(|| TimestampError::UnrecognizedTimestamp(raw.trim().to_string()))
}

pub fn parse_date(raw: &str) -> Result<NaiveDate, TimestampError> {
    let value = raw.trim();
    if value.is_empty() {
        return Err(TimestampError::Empty);
    }
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(value, fmt).ok())
        .ok_or_else(|| TimestampError::UnrecognizedDate(value.to_string()))
}

/// Parses a shift boundary such as `07:00` or `5:30 PM`.
pub fn parse_clock(raw: &str) -> Result<NaiveTime, TimestampError> {
    let value = raw.trim();
    if value.is_empty() {
        return Err(TimestampError::Empty);
    }
    CLOCK_FORMATS
        .iter()
        .find_map(|fmt| NaiveTime::parse_from_str(value, fmt).ok())
        .ok_or_else(|| TimestampError::UnrecognizedClock(value.to_string()))
}

/// Combines separate date and time cells, as some exports split them.
pub fn parse_split_timestamp(date: &str, time: &str) -> Result<NaiveDateTime, TimestampError> {
    let date = parse_date(date)?;
    let time = parse_clock(time)?;
    Ok(date.and_time(time))
}
