// src/classify.rs
use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::debug;

use crate::error::AuditError;
use crate::grouping::DriverDay;
use crate::model::AttendanceStatus;

// --- Shift Policy ---

/// Where a driver's scheduled start/end comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScheduleSource {
    /// The policy's fixed shift boundaries for every driver.
    #[default]
    Fixed,
    /// The driver's own activity-log start/end on the date, falling back to
    /// the fixed boundaries where the log has none.
    ActivityLog,
}

impl FromStr for ScheduleSource {
    type Err = AuditError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "fixed" => Ok(ScheduleSource::Fixed),
            "activity_log" | "activity" => Ok(ScheduleSource::ActivityLog),
            other => Err(AuditError::InvalidPolicy(format!(
                "unknown schedule source '{}' (expected 'fixed' or 'activity_log')",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShiftPolicy {
    pub start: NaiveTime,
    pub end: NaiveTime,
    pub late_tolerance_minutes: u32,
    pub early_tolerance_minutes: u32,
    pub schedule_source: ScheduleSource,
}

pub const DEFAULT_SHIFT_START: (u32, u32) = (7, 0);
pub const DEFAULT_SHIFT_END: (u32, u32) = (17, 0);

impl Default for ShiftPolicy {
    fn default() -> Self {
        Self {
            start: NaiveTime::from_hms_opt(DEFAULT_SHIFT_START.0, DEFAULT_SHIFT_START.1, 0)
                .unwrap_or_default(),
            end: NaiveTime::from_hms_opt(DEFAULT_SHIFT_END.0, DEFAULT_SHIFT_END.1, 0)
                .unwrap_or_default(),
            late_tolerance_minutes: 0,
            early_tolerance_minutes: 0,
            schedule_source: ScheduleSource::Fixed,
        }
    }
}

impl ShiftPolicy {
    pub fn validate(&self) -> Result<(), AuditError> {
        if self.end <= self.start {
            return Err(AuditError::InvalidPolicy(format!(
                "shift end {} must be after shift start {}",
                self.end.format("%H:%M"),
                self.start.format("%H:%M")
            )));
        }
        let shift_minutes = (self.end - self.start).num_minutes();
        for (name, tolerance) in [
            ("late", self.late_tolerance_minutes),
            ("early-end", self.early_tolerance_minutes),
        ] {
            if i64::from(tolerance) >= shift_minutes {
                return Err(AuditError::InvalidPolicy(format!(
                    "{} tolerance of {} minutes is not shorter than the {}-minute shift",
                    name, tolerance, shift_minutes
                )));
            }
        }
        Ok(())
    }

    /// Scheduled start and end for one driver on `date`.
    pub fn scheduled_bounds(&self, day: &DriverDay, date: NaiveDate) -> (NaiveDateTime, NaiveDateTime) {
        let fixed = (date.and_time(self.start), date.and_time(self.end));
        match self.schedule_source {
            ScheduleSource::Fixed => fixed,
            ScheduleSource::ActivityLog => {
                // Only bounds that fall on the date itself replace the fixed ones
                let start = day.activity_start_on(date).unwrap_or(fixed.0);
                let end = day.activity_end_on(date).unwrap_or(fixed.1);
                if end <= start {
                    fixed
                } else {
                    (start, end)
                }
            }
        }
    }
}

// --- Classification ---

/// The outcome for one driver on one date.
///
/// `first_key_on` / `last_key_off` fall back to the first / last event of any
/// kind when the log has no explicit key event; `inferred_times` marks that.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriverClassification {
    pub driver: String,
    pub driver_key: String,
    pub status: AttendanceStatus,
    pub also_early_end: bool,
    pub scheduled_start: NaiveDateTime,
    pub scheduled_end: NaiveDateTime,
    pub first_key_on: Option<NaiveDateTime>,
    pub last_key_off: Option<NaiveDateTime>,
    pub inferred_times: bool,
    pub minutes_late: i64,
    pub minutes_early: i64,
    pub event_count: usize,
    pub assets: Vec<String>,
    pub locations: Vec<String>,
}

/// Applies the status rules, first match wins:
/// no events -> Not On Job; start after schedule + late tolerance -> Late;
/// end before schedule - early tolerance -> Early End; otherwise On Time.
pub fn classify_driver(day: &DriverDay, date: NaiveDate, policy: &ShiftPolicy) -> DriverClassification {
    let (scheduled_start, scheduled_end) = policy.scheduled_bounds(day, date);

    let mut result = DriverClassification {
        driver: day.driver.display.clone(),
        driver_key: day.driver.key.clone(),
        status: AttendanceStatus::NotOnJob,
        also_early_end: false,
        scheduled_start,
        scheduled_end,
        first_key_on: None,
        last_key_off: None,
        inferred_times: false,
        minutes_late: 0,
        minutes_early: 0,
        event_count: day.event_count,
        assets: day.assets.iter().cloned().collect(),
        locations: day.locations.iter().cloned().collect(),
    };

    let (Some(started), Some(ended)) = (
        day.first_key_on.or(day.first_event),
        day.last_key_off.or(day.last_event),
    ) else {
        debug!("{}: no events on {}, Not On Job", result.driver, date);
        return result;
    };

    result.first_key_on = Some(started);
    result.last_key_off = Some(ended);
    result.inferred_times = day.first_key_on.is_none() || day.last_key_off.is_none();
    result.minutes_late = (started - scheduled_start).num_minutes().max(0);
    result.minutes_early = (scheduled_end - ended).num_minutes().max(0);

    let late_cutoff = scheduled_start + Duration::minutes(i64::from(policy.late_tolerance_minutes));
    let early_cutoff = scheduled_end - Duration::minutes(i64::from(policy.early_tolerance_minutes));
    let late = started > late_cutoff;
    let early = ended < early_cutoff;

    result.status = if late {
        AttendanceStatus::Late
    } else if early {
        AttendanceStatus::EarlyEnd
    } else {
        AttendanceStatus::OnTime
    };
    result.also_early_end = late && early;

    debug!(
        "{}: {} (start {}, end {}, late {}m, early {}m)",
        result.driver, result.status, started, ended, result.minutes_late, result.minutes_early
    );
    result
}

pub fn classify_day(days: &[DriverDay], date: NaiveDate, policy: &ShiftPolicy) -> Vec<DriverClassification> {
    days.iter().map(|day| classify_driver(day, date, policy)).collect()
}
