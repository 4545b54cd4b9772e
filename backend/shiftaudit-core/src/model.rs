// src/model.rs
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::normalize::DriverKey;

// --- Event Types ---

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    KeyOn,
    KeyOff,
    Other(String),
}

const KEY_ON_LABELS: [&str; 6] = ["keyon", "ignitionon", "engineon", "poweron", "ignon", "enginestart"];
const KEY_OFF_LABELS: [&str; 6] = ["keyoff", "ignitionoff", "engineoff", "poweroff", "ignoff", "enginestop"];

impl EventKind {
    /// Maps an event-type cell onto a key event. Matching ignores case,
    /// spacing and punctuation, so "Key On", "KEY-ON" and "key_on" agree.
    pub fn parse(raw: &str) -> Self {
        let compact: String = raw
            .chars()
            .filter(|c| c.is_alphanumeric())
            .flat_map(|c| c.to_lowercase())
            .collect();

        if KEY_ON_LABELS.contains(&compact.as_str()) {
            EventKind::KeyOn
        } else if KEY_OFF_LABELS.contains(&compact.as_str()) {
            EventKind::KeyOff
        } else {
            EventKind::Other(raw.trim().to_string())
        }
    }
}

// --- Log Records ---

/// One row of the vehicle event log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleEvent {
    pub driver: DriverKey,
    pub asset: Option<String>,
    pub timestamp: NaiveDateTime,
    pub kind: EventKind,
}

/// One row of the activity (job assignment) log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityRecord {
    pub driver: DriverKey,
    pub asset: Option<String>,
    pub location: Option<String>,
    pub start: NaiveDateTime,
    pub end: Option<NaiveDateTime>,
}

// --- Classification Result ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AttendanceStatus {
    #[serde(rename = "On Time")]
    OnTime,
    #[serde(rename = "Late")]
    Late,
    #[serde(rename = "Early End")]
    EarlyEnd,
    #[serde(rename = "Not On Job")]
    NotOnJob,
}

impl AttendanceStatus {
    /// Report order.
    pub const ALL: [AttendanceStatus; 4] = [
        AttendanceStatus::OnTime,
        AttendanceStatus::Late,
        AttendanceStatus::EarlyEnd,
        AttendanceStatus::NotOnJob,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            AttendanceStatus::OnTime => "On Time",
            AttendanceStatus::Late => "Late",
            AttendanceStatus::EarlyEnd => "Early End",
            AttendanceStatus::NotOnJob => "Not On Job",
        }
    }
}

impl fmt::Display for AttendanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
