// src/classification_tests.rs

#[cfg(test)]
mod tests {
    use crate::classify::*;
    use crate::grouping::{group_driver_days, DriverDay};
    use crate::model::*;
    use crate::normalize::normalize_driver_name;
    use crate::timestamps::{parse_clock, parse_timestamp};
    use chrono::{NaiveDate, NaiveDateTime};

    // Helper function to build a driver's day from (timestamp, event) pairs
    fn driver_day(driver: &str, events: &[(&str, &str)]) -> DriverDay {
        let events: Vec<VehicleEvent> = events
            .iter()
            .map(|(ts, kind)| VehicleEvent {
                driver: normalize_driver_name(driver).unwrap(),
                asset: Some("TRK-01".to_string()),
                timestamp: parse_timestamp(ts).unwrap(),
                kind: EventKind::parse(kind),
            })
            .collect();
        let refs: Vec<&VehicleEvent> = events.iter().collect();
        let roster = vec![normalize_driver_name(driver).unwrap()];
        group_driver_days(&refs, &[], &roster).remove(0)
    }

    fn audit_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()
    }

    fn ts(s: &str) -> NaiveDateTime {
        parse_timestamp(s).unwrap()
    }

    fn policy_with_tolerance(late: u32, early: u32) -> ShiftPolicy {
        ShiftPolicy {
            late_tolerance_minutes: late,
            early_tolerance_minutes: early,
            ..ShiftPolicy::default()
        }
    }

    fn status_of(events: &[(&str, &str)], policy: &ShiftPolicy) -> AttendanceStatus {
        classify_driver(&driver_day("Jane Doe", events), audit_date(), policy).status
    }

    // --- Rule table ---

    #[test]
    fn test_driver_without_events_is_not_on_job() {
        let day = driver_day("Jane Doe", &[]);
        let result = classify_driver(&day, audit_date(), &ShiftPolicy::default());

        assert_eq!(result.status, AttendanceStatus::NotOnJob);
        assert_eq!(result.first_key_on, None);
        assert_eq!(result.last_key_off, None);
        assert_eq!(result.minutes_late, 0);
        assert_eq!(result.scheduled_start, ts("2024-05-01 07:00:00"));
    }

    #[test]
    fn test_key_on_before_start_and_key_off_after_end_is_on_time() {
        let status = status_of(
            &[("2024-05-01 06:45", "Key On"), ("2024-05-01 17:10", "Key Off")],
            &ShiftPolicy::default(),
        );
        assert_eq!(status, AttendanceStatus::OnTime);
    }

    #[test]
    fn test_exact_boundaries_are_on_time() {
        let status = status_of(
            &[("2024-05-01 07:00:00", "Key On"), ("2024-05-01 17:00:00", "Key Off")],
            &ShiftPolicy::default(),
        );
        assert_eq!(status, AttendanceStatus::OnTime);
    }

    #[test]
    fn test_one_second_after_start_is_late_without_tolerance() {
        let day = driver_day(
            "Jane Doe",
            &[("2024-05-01 07:00:01", "Key On"), ("2024-05-01 17:30", "Key Off")],
        );
        let result = classify_driver(&day, audit_date(), &ShiftPolicy::default());
        assert_eq!(result.status, AttendanceStatus::Late);
        // Whole minutes only
        assert_eq!(result.minutes_late, 0);
    }

    #[test]
    fn test_late_tolerance_is_inclusive() {
        let policy = policy_with_tolerance(10, 0);
        let events_at_cutoff = [("2024-05-01 07:10", "Key On"), ("2024-05-01 17:00", "Key Off")];
        let events_past_cutoff = [("2024-05-01 07:11", "Key On"), ("2024-05-01 17:00", "Key Off")];

        assert_eq!(status_of(&events_at_cutoff, &policy), AttendanceStatus::OnTime);
        assert_eq!(status_of(&events_past_cutoff, &policy), AttendanceStatus::Late);
    }

    #[test]
    fn test_key_off_before_end_is_early_end() {
        let day = driver_day(
            "Jane Doe",
            &[("2024-05-01 06:55", "Key On"), ("2024-05-01 16:15", "Key Off")],
        );
        let result = classify_driver(&day, audit_date(), &ShiftPolicy::default());
        assert_eq!(result.status, AttendanceStatus::EarlyEnd);
        assert_eq!(result.minutes_early, 45);
        assert!(!result.also_early_end);
    }

    #[test]
    fn test_early_tolerance_is_inclusive() {
        let policy = policy_with_tolerance(0, 15);
        let at_cutoff = [("2024-05-01 06:55", "Key On"), ("2024-05-01 16:45", "Key Off")];
        let past_cutoff = [("2024-05-01 06:55", "Key On"), ("2024-05-01 16:44", "Key Off")];

        assert_eq!(status_of(&at_cutoff, &policy), AttendanceStatus::OnTime);
        assert_eq!(status_of(&past_cutoff, &policy), AttendanceStatus::EarlyEnd);
    }

    #[test]
    fn test_late_takes_precedence_over_early_end() {
        let day = driver_day(
            "Jane Doe",
            &[("2024-05-01 08:30", "Key On"), ("2024-05-01 15:00", "Key Off")],
        );
        let result = classify_driver(&day, audit_date(), &ShiftPolicy::default());
        assert_eq!(result.status, AttendanceStatus::Late);
        assert!(result.also_early_end);
        assert_eq!(result.minutes_late, 90);
        assert_eq!(result.minutes_early, 120);
    }

    #[test]
    fn test_earliest_key_on_and_latest_key_off_are_used() {
        // Mid-day key cycle must not make the driver look late or early
        let status = status_of(
            &[
                ("2024-05-01 06:58", "Key On"),
                ("2024-05-01 12:00", "Key Off"),
                ("2024-05-01 12:30", "Key On"),
                ("2024-05-01 17:02", "Key Off"),
            ],
            &ShiftPolicy::default(),
        );
        assert_eq!(status, AttendanceStatus::OnTime);
    }

    #[test]
    fn test_missing_key_events_fall_back_to_any_event() {
        let day = driver_day(
            "Jane Doe",
            &[("2024-05-01 07:20", "Idle"), ("2024-05-01 17:05", "Moving")],
        );
        let result = classify_driver(&day, audit_date(), &ShiftPolicy::default());
        assert_eq!(result.status, AttendanceStatus::Late);
        assert!(result.inferred_times);
        assert_eq!(result.first_key_on, Some(ts("2024-05-01 07:20")));
        assert_eq!(result.last_key_off, Some(ts("2024-05-01 17:05")));
    }

    #[test]
    fn test_key_on_only_uses_last_event_as_end() {
        let day = driver_day("Jane Doe", &[("2024-05-01 06:50", "Key On")]);
        let result = classify_driver(&day, audit_date(), &ShiftPolicy::default());
        // Only one event: it is both the start and the end of the day
        assert_eq!(result.status, AttendanceStatus::EarlyEnd);
        assert!(result.inferred_times);
    }

    #[test]
    fn test_custom_shift_boundaries() {
        let policy = ShiftPolicy {
            start: parse_clock("06:00").unwrap(),
            end: parse_clock("14:30").unwrap(),
            ..ShiftPolicy::default()
        };
        let status = status_of(
            &[("2024-05-01 06:05", "Key On"), ("2024-05-01 14:45", "Key Off")],
            &policy,
        );
        assert_eq!(status, AttendanceStatus::Late);
    }

    // --- Activity-log schedules ---

    #[test]
    fn test_activity_log_schedule_overrides_fixed_bounds() {
        let mut day = driver_day(
            "Jane Doe",
            &[("2024-05-01 09:55", "Key On"), ("2024-05-01 15:05", "Key Off")],
        );
        day.activity_spans.push((ts("2024-05-01 10:00"), Some(ts("2024-05-01 15:00"))));

        let fixed = classify_driver(&day, audit_date(), &ShiftPolicy::default());
        assert_eq!(fixed.status, AttendanceStatus::Late);

        let policy = ShiftPolicy {
            schedule_source: ScheduleSource::ActivityLog,
            ..ShiftPolicy::default()
        };
        let from_log = classify_driver(&day, audit_date(), &policy);
        assert_eq!(from_log.status, AttendanceStatus::OnTime);
        assert_eq!(from_log.scheduled_start, ts("2024-05-01 10:00"));
    }

    #[test]
    fn test_activity_bounds_from_other_days_are_ignored() {
        let mut day = driver_day("Jane Doe", &[("2024-05-01 06:59", "Key On"), ("2024-05-01 17:00", "Key Off")]);
        day.activity_spans.push((ts("2024-04-30 22:00"), Some(ts("2024-05-02 06:00"))));
        let policy = ShiftPolicy {
            schedule_source: ScheduleSource::ActivityLog,
            ..ShiftPolicy::default()
        };
        let result = classify_driver(&day, audit_date(), &policy);
        assert_eq!(result.scheduled_start, ts("2024-05-01 07:00"));
        assert_eq!(result.scheduled_end, ts("2024-05-01 17:00"));
        assert_eq!(result.status, AttendanceStatus::OnTime);
    }

    #[test]
    fn test_overnight_job_does_not_hide_same_day_activity_start() {
        let mut day = driver_day(
            "Jane Doe",
            &[("2024-05-01 09:55", "Key On"), ("2024-05-01 15:05", "Key Off")],
        );
        day.activity_spans.push((ts("2024-04-30 22:00"), Some(ts("2024-05-01 03:00"))));
        day.activity_spans.push((ts("2024-05-01 10:00"), Some(ts("2024-05-01 15:00"))));
        let policy = ShiftPolicy {
            schedule_source: ScheduleSource::ActivityLog,
            ..ShiftPolicy::default()
        };

        let result = classify_driver(&day, audit_date(), &policy);
        assert_eq!(result.scheduled_start, ts("2024-05-01 10:00"));
        assert_eq!(result.scheduled_end, ts("2024-05-01 15:00"));
        assert_eq!(result.status, AttendanceStatus::OnTime);
    }

    // --- Policy validation ---

    #[test]
    fn test_policy_validation() {
        assert!(ShiftPolicy::default().validate().is_ok());

        let inverted = ShiftPolicy {
            start: parse_clock("17:00").unwrap(),
            end: parse_clock("07:00").unwrap(),
            ..ShiftPolicy::default()
        };
        assert!(inverted.validate().is_err());

        assert!(policy_with_tolerance(600, 0).validate().is_err());
        assert!(policy_with_tolerance(599, 599).validate().is_ok());
    }

    #[test]
    fn test_schedule_source_parsing() {
        assert_eq!("fixed".parse::<ScheduleSource>().unwrap(), ScheduleSource::Fixed);
        assert_eq!("Activity-Log".parse::<ScheduleSource>().unwrap(), ScheduleSource::ActivityLog);
        assert!("roster".parse::<ScheduleSource>().is_err());
    }
}
