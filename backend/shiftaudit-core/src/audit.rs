// src/audit.rs
use chrono::{Datelike, NaiveDate};
use std::path::Path;
use tracing::{info, warn};

use crate::aggregate::{month_to_date, summarize};
use crate::classify::{classify_day, ShiftPolicy};
use crate::error::AuditError;
use crate::filter::{activity_on, events_on};
use crate::grouping::group_driver_days;
use crate::ingest::{self, RowIssue};
use crate::model::{ActivityRecord, VehicleEvent};
use crate::normalize::DriverKey;
use crate::report::{DailyReport, MtdReport};

// --- Inputs ---

/// Both logs (and an optional roster) after ingestion, with every skipped row.
#[derive(Debug, Clone, Default)]
pub struct AuditInputs {
    pub events: Vec<VehicleEvent>,
    pub activity: Vec<ActivityRecord>,
    pub roster: Vec<DriverKey>,
    pub issues: Vec<RowIssue>,
}

impl AuditInputs {
    pub fn load(events: &Path, activity: &Path, roster: Option<&Path>) -> Result<Self, AuditError> {
        let events = ingest::read_vehicle_events_from_path(events)?;
        let activity = ingest::read_activity_records_from_path(activity)?;
        let roster = match roster {
            Some(path) => ingest::read_roster_from_path(path)?,
            None => ingest::Ingested::default(),
        };
        Ok(Self::from_parts(events, activity, roster))
    }

    /// Same as [`AuditInputs::load`] for CSV text already in memory.
    pub fn from_csv_text(
        events_csv: &str,
        activity_csv: &str,
        roster_csv: Option<&str>,
    ) -> Result<Self, AuditError> {
        let events = ingest::read_vehicle_events(events_csv.as_bytes(), "events")?;
        let activity = ingest::read_activity_records(activity_csv.as_bytes(), "activity")?;
        let roster = match roster_csv {
            Some(text) => ingest::read_roster(text.as_bytes(), "roster")?,
            None => ingest::Ingested::default(),
        };
        Ok(Self::from_parts(events, activity, roster))
    }

    fn from_parts(
        events: ingest::Ingested<VehicleEvent>,
        activity: ingest::Ingested<ActivityRecord>,
        roster: ingest::Ingested<DriverKey>,
    ) -> Self {
        let mut issues = events.issues;
        issues.extend(activity.issues);
        issues.extend(roster.issues);
        Self {
            events: events.records,
            activity: activity.records,
            roster: roster.records,
            issues,
        }
    }
}

// --- Audit Service ---

/// Runs the filter -> group -> classify -> aggregate pipeline over loaded logs.
pub struct ShiftAudit {
    inputs: AuditInputs,
    policy: ShiftPolicy,
}

impl ShiftAudit {
    pub fn new(inputs: AuditInputs, policy: ShiftPolicy) -> Result<Self, AuditError> {
        policy.validate()?;
        if !inputs.issues.is_empty() {
            warn!("{} input rows were skipped during ingestion", inputs.issues.len());
        }
        Ok(Self { inputs, policy })
    }

    pub fn daily(&self, date: NaiveDate) -> DailyReport {
        let events = events_on(&self.inputs.events, date);
        let activity = activity_on(&self.inputs.activity, date);
        let days = group_driver_days(&events, &activity, &self.inputs.roster);
        let drivers = classify_day(&days, date, &self.policy);
        let summary = summarize(date, &drivers);

        info!(
            "{}: {} drivers ({} events, {} activity rows)",
            date,
            summary.total_drivers,
            events.len(),
            activity.len()
        );

        DailyReport {
            date,
            policy: self.policy.clone(),
            summary,
            drivers,
            issues: self.inputs.issues.clone(),
        }
    }

    /// Runs the daily audit for each date from the 1st of `through`'s month
    /// up to and including `through`.
    pub fn month_to_date(&self, through: NaiveDate) -> Result<MtdReport, AuditError> {
        let from = through
            .with_day(1)
            .ok_or_else(|| AuditError::InvalidDate(through.to_string()))?;

        let reports: Vec<DailyReport> = from
            .iter_days()
            .take_while(|d| *d <= through)
            .map(|d| {
                let mut report = self.daily(d);
                // Issues are reported once on the roll-up
                report.issues.clear();
                report
            })
            .collect();

        let summary = month_to_date(
            from,
            through,
            reports.iter().map(|r| (&r.summary, r.drivers.as_slice())),
        );
        info!(
            "Month to date {}..{}: {} driver-days",
            from, through, summary.driver_days
        );

        Ok(MtdReport {
            policy: self.policy.clone(),
            summary,
            issues: self.inputs.issues.clone(),
        })
    }
}
