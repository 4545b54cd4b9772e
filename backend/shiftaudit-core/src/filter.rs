// src/filter.rs
use chrono::NaiveDate;

use crate::model::{ActivityRecord, VehicleEvent};

/// Events whose timestamp falls on `date`.
pub fn events_on(events: &[VehicleEvent], date: NaiveDate) -> Vec<&VehicleEvent> {
    events.iter().filter(|e| e.timestamp.date() == date).collect()
}

/// Activity records starting on `date`, or whose start..end span covers it
/// (overnight and multi-day jobs).
pub fn activity_on(records: &[ActivityRecord], date: NaiveDate) -> Vec<&ActivityRecord> {
    records
        .iter()
        .filter(|r| {
            let start = r.start.date();
            start == date || r.end.is_some_and(|end| start <= date && end.date() >= date)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::EventKind;
    use crate::normalize::normalize_driver_name;
    use crate::timestamps::parse_timestamp;

    fn event(ts: &str) -> VehicleEvent {
        VehicleEvent {
            driver: normalize_driver_name("Jane Doe").unwrap(),
            asset: None,
            timestamp: parse_timestamp(ts).unwrap(),
            kind: EventKind::KeyOn,
        }
    }

    fn activity(start: &str, end: Option<&str>) -> ActivityRecord {
        ActivityRecord {
            driver: normalize_driver_name("Jane Doe").unwrap(),
            asset: None,
            location: None,
            start: parse_timestamp(start).unwrap(),
            end: end.map(|e| parse_timestamp(e).unwrap()),
        }
    }

    fn may(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, day).unwrap()
    }

    #[test]
    fn keeps_only_events_on_target_date() {
        let events = vec![
            event("2024-04-30 23:59:59"),
            event("2024-05-01 00:00:00"),
            event("2024-05-01 17:30:00"),
            event("2024-05-02 06:00:00"),
        ];
        let kept = events_on(&events, may(1));
        assert_eq!(kept.len(), 2);
        assert!(kept.iter().all(|e| e.timestamp.date() == may(1)));
    }

    #[test]
    fn activity_spanning_midnight_covers_both_days() {
        let records = vec![
            activity("2024-04-30 22:00", Some("2024-05-01 06:00")),
            activity("2024-05-01 07:00", None),
            activity("2024-05-02 07:00", Some("2024-05-02 17:00")),
        ];
        assert_eq!(activity_on(&records, may(1)).len(), 2);
        let april_30 = NaiveDate::from_ymd_opt(2024, 4, 30).unwrap();
        assert_eq!(activity_on(&records, april_30).len(), 1);
        assert_eq!(activity_on(&records, may(2)).len(), 1);
        assert_eq!(activity_on(&records, may(3)).len(), 0);
    }
}
