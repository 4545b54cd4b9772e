// src/grouping.rs
use chrono::{NaiveDate, NaiveDateTime};
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

use crate::model::{ActivityRecord, EventKind, VehicleEvent};
use crate::normalize::DriverKey;

/// Everything observed for one driver on one date.
#[derive(Debug, Clone, PartialEq)]
pub struct DriverDay {
    pub driver: DriverKey,
    pub first_key_on: Option<NaiveDateTime>,
    pub last_key_off: Option<NaiveDateTime>,
    // Any event kind; used when the log has no explicit key events
    pub first_event: Option<NaiveDateTime>,
    pub last_event: Option<NaiveDateTime>,
    pub event_count: usize,
    pub assets: BTreeSet<String>,
    pub locations: BTreeSet<String>,
    // (start, end) of every activity record touching the date, overnight ones included
    pub activity_spans: Vec<(NaiveDateTime, Option<NaiveDateTime>)>,
    pub on_activity_log: bool,
    pub on_roster: bool,
}

impl DriverDay {
    fn new(driver: DriverKey) -> Self {
        Self {
            driver,
            first_key_on: None,
            last_key_off: None,
            first_event: None,
            last_event: None,
            event_count: 0,
            assets: BTreeSet::new(),
            locations: BTreeSet::new(),
            activity_spans: Vec::new(),
            on_activity_log: false,
            on_roster: false,
        }
    }

    pub fn has_events(&self) -> bool {
        self.event_count > 0
    }

    /// Earliest activity start that falls on `date`.
    pub fn activity_start_on(&self, date: NaiveDate) -> Option<NaiveDateTime> {
        self.activity_spans
            .iter()
            .map(|(start, _)| *start)
            .filter(|start| start.date() == date)
            .min()
    }

    /// Latest activity end that falls on `date`.
    pub fn activity_end_on(&self, date: NaiveDate) -> Option<NaiveDateTime> {
        self.activity_spans
            .iter()
            .filter_map(|(_, end)| *end)
            .filter(|end| end.date() == date)
            .max()
    }

    fn record_event(&mut self, event: &VehicleEvent) {
        let ts = event.timestamp;
        self.event_count += 1;
        self.first_event = Some(self.first_event.map_or(ts, |t| t.min(ts)));
        self.last_event = Some(self.last_event.map_or(ts, |t| t.max(ts)));

        match event.kind {
            EventKind::KeyOn => {
                self.first_key_on = Some(self.first_key_on.map_or(ts, |t| t.min(ts)));
            }
            EventKind::KeyOff => {
                self.last_key_off = Some(self.last_key_off.map_or(ts, |t| t.max(ts)));
            }
            EventKind::Other(_) => {}
        }

        if let Some(asset) = &event.asset {
            self.assets.insert(asset.clone());
        }
    }

    fn record_activity(&mut self, record: &ActivityRecord) {
        self.on_activity_log = true;
        self.activity_spans.push((record.start, record.end));
        if let Some(asset) = &record.asset {
            self.assets.insert(asset.clone());
        }
        if let Some(location) = &record.location {
            self.locations.insert(location.clone());
        }
    }
}

/// Groups one date's rows by normalized driver.
///
/// The driver universe is the union of the activity log, the event log and
/// the roster. Output is sorted by driver key. The first spelling seen wins
/// the display name, with activity rows read first.
pub fn group_driver_days(
    events: &[&VehicleEvent],
    activity: &[&ActivityRecord],
    roster: &[DriverKey],
) -> Vec<DriverDay> {
    let mut days: BTreeMap<String, DriverDay> = BTreeMap::new();

    for record in activity {
        days.entry(record.driver.key.clone())
            .or_insert_with(|| DriverDay::new(record.driver.clone()))
            .record_activity(record);
    }

    for event in events {
        days.entry(event.driver.key.clone())
            .or_insert_with(|| DriverDay::new(event.driver.clone()))
            .record_event(event);
    }

    for driver in roster {
        days.entry(driver.key.clone())
            .or_insert_with(|| DriverDay::new(driver.clone()))
            .on_roster = true;
    }

    debug!(
        "Grouped {} events and {} activity rows into {} drivers",
        events.len(),
        activity.len(),
        days.len()
    );
    days.into_values().collect()
}
