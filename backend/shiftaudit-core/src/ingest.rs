// src/ingest.rs
use chrono::NaiveDateTime;
use csv::{ReaderBuilder, StringRecord, Trim};
use serde::{Deserialize, Serialize};
use std::{fs::File, io::Read, path::Path};
use tracing::{debug, info, warn};

use crate::error::AuditError;
use crate::model::{ActivityRecord, EventKind, VehicleEvent};
use crate::normalize::{normalize_driver_name, DriverKey};
use crate::timestamps::{parse_split_timestamp, parse_timestamp};

// --- Header Aliases ---

const DRIVER_ALIASES: &[&str] = &["driver", "driver name", "operator", "employee", "employee name"];
const ASSET_ALIASES: &[&str] = &["asset", "asset id", "vehicle", "vehicle id", "unit", "unit id"];
const TIMESTAMP_ALIASES: &[&str] = &[
    "timestamp",
    "datetime",
    "date/time",
    "date time",
    "event timestamp",
    "event datetime",
];
const DATE_ALIASES: &[&str] = &["date", "event date"];
const TIME_ALIASES: &[&str] = &["time", "event time"];
const EVENT_ALIASES: &[&str] = &["event", "event type", "type", "activity", "status"];
const LOCATION_ALIASES: &[&str] = &["location", "job", "site", "job site", "job location"];
const START_ALIASES: &[&str] = &["start", "start time", "scheduled start", "job start", "begin"];
const END_ALIASES: &[&str] = &["end", "end time", "scheduled end", "job end", "finish"];

/// A row that was skipped during ingestion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowIssue {
    pub source: String,
    pub line: u64,
    pub reason: String,
}

/// Parsed rows plus the rows that could not be used.
#[derive(Debug, Clone)]
pub struct Ingested<T> {
    pub records: Vec<T>,
    pub issues: Vec<RowIssue>,
}

impl<T> Default for Ingested<T> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            issues: Vec::new(),
        }
    }
}

fn normalize_header(header: &str) -> String {
    header
        .trim_start_matches('\u{feff}')
        .trim()
        .replace('_', " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

fn find_column(headers: &[String], aliases: &[&str]) -> Option<usize> {
    // Alias order wins over header order, so "driver" beats "employee name".
    aliases
        .iter()
        .find_map(|alias| headers.iter().position(|h| h == alias))
}

fn require_column(
    headers: &[String],
    aliases: &[&str],
    column: &'static str,
    source_name: &str,
) -> Result<usize, AuditError> {
    find_column(headers, aliases).ok_or_else(|| AuditError::MissingColumn {
        column,
        source_name: source_name.to_string(),
        headers: headers.to_vec(),
    })
}

fn cell<'r>(record: &'r StringRecord, idx: usize) -> &'r str {
    record.get(idx).unwrap_or("").trim()
}

fn optional_cell(record: &StringRecord, idx: Option<usize>) -> Option<String> {
    idx.map(|i| cell(record, i))
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn csv_reader<R: Read>(reader: R) -> csv::Reader<R> {
    ReaderBuilder::new()
        .flexible(true)
        .trim(Trim::All)
        .from_reader(reader)
}

fn read_headers<R: Read>(reader: &mut csv::Reader<R>) -> Result<Vec<String>, AuditError> {
    Ok(reader.headers()?.iter().map(normalize_header).collect())
}

enum TimestampColumns {
    Single(usize),
    Split { date: usize, time: usize },
}

impl TimestampColumns {
    fn resolve(headers: &[String], source_name: &str) -> Result<Self, AuditError> {
        if let Some(idx) = find_column(headers, TIMESTAMP_ALIASES) {
            return Ok(TimestampColumns::Single(idx));
        }
        match (find_column(headers, DATE_ALIASES), find_column(headers, TIME_ALIASES)) {
            (Some(date), Some(time)) => Ok(TimestampColumns::Split { date, time }),
            _ => Err(AuditError::MissingColumn {
                column: "timestamp",
                source_name: source_name.to_string(),
                headers: headers.to_vec(),
            }),
        }
    }

    fn parse(&self, record: &StringRecord) -> Result<NaiveDateTime, String> {
        let parsed = match self {
            TimestampColumns::Single(idx) => parse_timestamp(cell(record, *idx)),
            TimestampColumns::Split { date, time } => {
                parse_split_timestamp(cell(record, *date), cell(record, *time))
            }
        };
        parsed.map_err(|e| format!("timestamp: {}", e))
    }
}

// Shared per-row driver lookup; the issue text is what operators see.
fn row_driver(record: &StringRecord, idx: usize) -> Result<DriverKey, String> {
    let raw = cell(record, idx);
    normalize_driver_name(raw).ok_or_else(|| {
        if raw.is_empty() {
            "driver is empty".to_string()
        } else {
            format!("driver '{}' is unassigned", raw)
        }
    })
}

fn line_of(record: &StringRecord, fallback: u64) -> u64 {
    record.position().map(|p| p.line()).unwrap_or(fallback)
}

fn push_issue<T>(out: &mut Ingested<T>, source_name: &str, line: u64, reason: String) {
    warn!("Skipping {} line {}: {}", source_name, line, reason);
    out.issues.push(RowIssue {
        source: source_name.to_string(),
        line,
        reason,
    });
}

// --- Vehicle Event Log ---

/// Reads the vehicle event log. Unusable rows are logged and reported as
/// issues; only a missing mandatory column fails the whole read.
pub fn read_vehicle_events<R: Read>(
    reader: R,
    source_name: &str,
) -> Result<Ingested<VehicleEvent>, AuditError> {
    let mut csv = csv_reader(reader);
    let headers = read_headers(&mut csv)?;

    let driver_col = require_column(&headers, DRIVER_ALIASES, "driver", source_name)?;
    let event_col = require_column(&headers, EVENT_ALIASES, "event type", source_name)?;
    let asset_col = find_column(&headers, ASSET_ALIASES);
    let timestamp_cols = TimestampColumns::resolve(&headers, source_name)?;
    debug!(
        "{}: driver col {}, event col {}, asset col {:?}",
        source_name, driver_col, event_col, asset_col
    );

    let mut out = Ingested::default();
    for (row_idx, row) in csv.records().enumerate() {
        let fallback_line = row_idx as u64 + 2;
        let record = match row {
            Ok(record) => record,
            Err(e) => {
                let line = e.position().map(|p| p.line()).unwrap_or(fallback_line);
                push_issue(&mut out, source_name, line, format!("unreadable row: {}", e));
                continue;
            }
        };
        let line = line_of(&record, fallback_line);

        let parsed = row_driver(&record, driver_col).and_then(|driver| {
            let timestamp = timestamp_cols.parse(&record)?;
            Ok(VehicleEvent {
                driver,
                asset: optional_cell(&record, asset_col),
                timestamp,
                kind: EventKind::parse(cell(&record, event_col)),
            })
        });

        match parsed {
            Ok(event) => out.records.push(event),
            Err(reason) => push_issue(&mut out, source_name, line, reason),
        }
    }

    info!(
        "Read {} vehicle events from {} ({} rows skipped)",
        out.records.len(),
        source_name,
        out.issues.len()
    );
    Ok(out)
}

// --- Activity Log ---

pub fn read_activity_records<R: Read>(
    reader: R,
    source_name: &str,
) -> Result<Ingested<ActivityRecord>, AuditError> {
    let mut csv = csv_reader(reader);
    let headers = read_headers(&mut csv)?;

    let driver_col = require_column(&headers, DRIVER_ALIASES, "driver", source_name)?;
    let start_col = require_column(&headers, START_ALIASES, "start", source_name)?;
    let end_col = find_column(&headers, END_ALIASES);
    let asset_col = find_column(&headers, ASSET_ALIASES);
    let location_col = find_column(&headers, LOCATION_ALIASES);

    let mut out = Ingested::default();
    for (row_idx, row) in csv.records().enumerate() {
        let fallback_line = row_idx as u64 + 2;
        let record = match row {
            Ok(record) => record,
            Err(e) => {
                let line = e.position().map(|p| p.line()).unwrap_or(fallback_line);
                push_issue(&mut out, source_name, line, format!("unreadable row: {}", e));
                continue;
            }
        };
        let line = line_of(&record, fallback_line);

        let parsed = row_driver(&record, driver_col).and_then(|driver| {
            let start = parse_timestamp(cell(&record, start_col))
                .map_err(|e| format!("start: {}", e))?;
            // A blank end means the job is still open
            let end = match optional_cell(&record, end_col) {
                Some(raw) => Some(parse_timestamp(&raw).map_err(|e| format!("end: {}", e))?),
                None => None,
            };
            if let Some(end) = end {
                if end < start {
                    return Err(format!("end {} is before start {}", end, start));
                }
            }
            Ok(ActivityRecord {
                driver,
                asset: optional_cell(&record, asset_col),
                location: optional_cell(&record, location_col),
                start,
                end,
            })
        });

        match parsed {
            Ok(activity) => out.records.push(activity),
            Err(reason) => push_issue(&mut out, source_name, line, reason),
        }
    }

    info!(
        "Read {} activity records from {} ({} rows skipped)",
        out.records.len(),
        source_name,
        out.issues.len()
    );
    Ok(out)
}

// --- Roster ---

/// Reads a list of drivers expected on the job regardless of the activity log.
pub fn read_roster<R: Read>(reader: R, source_name: &str) -> Result<Ingested<DriverKey>, AuditError> {
    let mut csv = csv_reader(reader);
    let headers = read_headers(&mut csv)?;
    let driver_col = require_column(&headers, DRIVER_ALIASES, "driver", source_name)?;

    let mut out = Ingested::default();
    for (row_idx, row) in csv.records().enumerate() {
        let fallback_line = row_idx as u64 + 2;
        match row {
            Ok(record) => match row_driver(&record, driver_col) {
                Ok(driver) => {
                    if !out.records.contains(&driver) {
                        out.records.push(driver);
                    }
                }
                Err(reason) => {
                    push_issue(&mut out, source_name, line_of(&record, fallback_line), reason)
                }
            },
            Err(e) => push_issue(
                &mut out,
                source_name,
                fallback_line,
                format!("unreadable row: {}", e),
            ),
        }
    }
    info!("Read {} roster drivers from {}", out.records.len(), source_name);
    Ok(out)
}

// --- Path Helpers ---

fn open(path: &Path) -> Result<File, AuditError> {
    File::open(path).map_err(AuditError::io(format!("opening {}", path.display())))
}

pub fn read_vehicle_events_from_path(path: &Path) -> Result<Ingested<VehicleEvent>, AuditError> {
    read_vehicle_events(open(path)?, &path.display().to_string())
}

pub fn read_activity_records_from_path(path: &Path) -> Result<Ingested<ActivityRecord>, AuditError> {
    read_activity_records(open(path)?, &path.display().to_string())
}

pub fn read_roster_from_path(path: &Path) -> Result<Ingested<DriverKey>, AuditError> {
    read_roster(open(path)?, &path.display().to_string())
}
