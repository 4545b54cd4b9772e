// src/aggregate.rs
use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::classify::DriverClassification;
use crate::model::AttendanceStatus;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCount {
    pub status: AttendanceStatus,
    pub count: usize,
    pub percentage: Decimal,
}

/// Count and share of one date's drivers per status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailySummary {
    pub date: NaiveDate,
    pub total_drivers: usize,
    pub statuses: Vec<StatusCount>,
    /// On Time share among drivers who were on the job at all.
    pub on_time_rate_on_job: Decimal,
}

impl DailySummary {
    pub fn count(&self, status: AttendanceStatus) -> usize {
        self.statuses
            .iter()
            .find(|s| s.status == status)
            .map_or(0, |s| s.count)
    }

    pub fn percentage(&self, status: AttendanceStatus) -> Decimal {
        self.statuses
            .iter()
            .find(|s| s.status == status)
            .map_or(Decimal::ZERO, |s| s.percentage)
    }
}

/// `count / total` as a percentage rounded to two places; zero when `total` is zero.
pub fn percentage(count: usize, total: usize) -> Decimal {
    if total == 0 {
        return Decimal::ZERO;
    }
    (Decimal::from(count) * dec!(100) / Decimal::from(total)).round_dp(2)
}

fn tally(statuses: impl Iterator<Item = AttendanceStatus>) -> BTreeMap<AttendanceStatus, usize> {
    let mut counts: BTreeMap<AttendanceStatus, usize> =
        AttendanceStatus::ALL.iter().map(|s| (*s, 0)).collect();
    for status in statuses {
        *counts.entry(status).or_insert(0) += 1;
    }
    counts
}

fn status_counts(counts: &BTreeMap<AttendanceStatus, usize>, total: usize) -> Vec<StatusCount> {
    AttendanceStatus::ALL
        .iter()
        .map(|status| {
            let count = counts.get(status).copied().unwrap_or(0);
            StatusCount {
                status: *status,
                count,
                percentage: percentage(count, total),
            }
        })
        .collect()
}

fn on_time_rate(counts: &BTreeMap<AttendanceStatus, usize>, total: usize) -> Decimal {
    let not_on_job = counts.get(&AttendanceStatus::NotOnJob).copied().unwrap_or(0);
    let on_time = counts.get(&AttendanceStatus::OnTime).copied().unwrap_or(0);
    percentage(on_time, total.saturating_sub(not_on_job))
}

pub fn summarize(date: NaiveDate, classifications: &[DriverClassification]) -> DailySummary {
    let counts = tally(classifications.iter().map(|c| c.status));
    let total = classifications.len();
    DailySummary {
        date,
        total_drivers: total,
        statuses: status_counts(&counts, total),
        on_time_rate_on_job: on_time_rate(&counts, total),
    }
}

// --- Month To Date ---

/// One driver's statuses across the days of a month-to-date run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriverTally {
    /// Display name from the first day the driver appears.
    pub driver: String,
    pub on_time: usize,
    pub late: usize,
    pub early_end: usize,
    pub not_on_job: usize,
}

impl DriverTally {
    fn add(&mut self, status: AttendanceStatus) {
        match status {
            AttendanceStatus::OnTime => self.on_time += 1,
            AttendanceStatus::Late => self.late += 1,
            AttendanceStatus::EarlyEnd => self.early_end += 1,
            AttendanceStatus::NotOnJob => self.not_on_job += 1,
        }
    }

    pub fn days(&self) -> usize {
        self.on_time + self.late + self.early_end + self.not_on_job
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MtdSummary {
    pub from: NaiveDate,
    pub through: NaiveDate,
    pub days: Vec<DailySummary>,
    /// Driver-days across the whole range.
    pub driver_days: usize,
    pub statuses: Vec<StatusCount>,
    pub on_time_rate_on_job: Decimal,
    /// Keyed by normalized driver key, so every spelling lands on one tally.
    pub drivers: BTreeMap<String, DriverTally>,
}

/// Rolls daily results into a month-to-date summary. Percentages are
/// recomputed from summed counts, not averaged across days.
pub fn month_to_date<'a>(
    from: NaiveDate,
    through: NaiveDate,
    daily: impl IntoIterator<Item = (&'a DailySummary, &'a [DriverClassification])>,
) -> MtdSummary {
    let mut days = Vec::new();
    let mut drivers: BTreeMap<String, DriverTally> = BTreeMap::new();
    let mut all_statuses = Vec::new();

    for (summary, classifications) in daily {
        days.push(summary.clone());
        for c in classifications {
            drivers
                .entry(c.driver_key.clone())
                .or_insert_with(|| DriverTally {
                    driver: c.driver.clone(),
                    ..DriverTally::default()
                })
                .add(c.status);
            all_statuses.push(c.status);
        }
    }

    let driver_days = all_statuses.len();
    let counts = tally(all_statuses.into_iter());
    MtdSummary {
        from,
        through,
        days,
        driver_days,
        statuses: status_counts(&counts, driver_days),
        on_time_rate_on_job: on_time_rate(&counts, driver_days),
        drivers,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timestamps::parse_timestamp;

    fn classification(driver: &str, status: AttendanceStatus) -> DriverClassification {
        DriverClassification {
            driver: driver.to_string(),
            driver_key: driver.to_uppercase(),
            status,
            also_early_end: false,
            scheduled_start: parse_timestamp("2024-05-01 07:00").unwrap(),
            scheduled_end: parse_timestamp("2024-05-01 17:00").unwrap(),
            first_key_on: None,
            last_key_off: None,
            inferred_times: false,
            minutes_late: 0,
            minutes_early: 0,
            event_count: 0,
            assets: vec![],
            locations: vec![],
        }
    }

    fn may(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, day).unwrap()
    }

    #[test]
    fn percentages_round_to_two_places() {
        assert_eq!(percentage(1, 3), dec!(33.33));
        assert_eq!(percentage(2, 3), dec!(66.67));
        assert_eq!(percentage(3, 3), dec!(100));
        assert_eq!(percentage(0, 0), Decimal::ZERO);
    }

    #[test]
    fn summarize_counts_every_status_in_report_order() {
        let classified = vec![
            classification("A", AttendanceStatus::OnTime),
            classification("B", AttendanceStatus::OnTime),
            classification("C", AttendanceStatus::Late),
            classification("D", AttendanceStatus::NotOnJob),
        ];
        let summary = summarize(may(1), &classified);

        assert_eq!(summary.total_drivers, 4);
        let order: Vec<AttendanceStatus> = summary.statuses.iter().map(|s| s.status).collect();
        assert_eq!(order, AttendanceStatus::ALL.to_vec());
        assert_eq!(summary.count(AttendanceStatus::OnTime), 2);
        assert_eq!(summary.count(AttendanceStatus::EarlyEnd), 0);
        assert_eq!(summary.percentage(AttendanceStatus::OnTime), dec!(50));
        assert_eq!(summary.percentage(AttendanceStatus::Late), dec!(25));
        assert_eq!(summary.on_time_rate_on_job, dec!(66.67));
    }

    #[test]
    fn summarize_empty_day_is_all_zero() {
        let summary = summarize(may(1), &[]);
        assert_eq!(summary.total_drivers, 0);
        assert!(summary.statuses.iter().all(|s| s.count == 0 && s.percentage.is_zero()));
        assert!(summary.on_time_rate_on_job.is_zero());
    }

    #[test]
    fn month_to_date_sums_counts_and_tallies_drivers() {
        let day1 = vec![
            classification("Jane Doe", AttendanceStatus::OnTime),
            classification("Sam Roe", AttendanceStatus::Late),
        ];
        let day2 = vec![
            classification("Jane Doe", AttendanceStatus::EarlyEnd),
            classification("Sam Roe", AttendanceStatus::Late),
            classification("Al Poe", AttendanceStatus::NotOnJob),
        ];
        let s1 = summarize(may(1), &day1);
        let s2 = summarize(may(2), &day2);

        let mtd = month_to_date(may(1), may(2), [(&s1, day1.as_slice()), (&s2, day2.as_slice())]);

        assert_eq!(mtd.days.len(), 2);
        assert_eq!(mtd.driver_days, 5);
        assert_eq!(mtd.statuses[1].status, AttendanceStatus::Late);
        assert_eq!(mtd.statuses[1].count, 2);
        assert_eq!(mtd.statuses[1].percentage, dec!(40));
        assert_eq!(mtd.drivers["SAM ROE"].late, 2);
        assert_eq!(mtd.drivers["JANE DOE"].days(), 2);
        assert_eq!(mtd.drivers["JANE DOE"].driver, "Jane Doe");
        assert_eq!(mtd.drivers["AL POE"].not_on_job, 1);
        // 1 on time out of 4 driver-days on the job
        assert_eq!(mtd.on_time_rate_on_job, dec!(25));
    }

    #[test]
    fn month_to_date_merges_spellings_of_one_driver() {
        let mut day1 = vec![classification("Ian McAllister", AttendanceStatus::OnTime)];
        let mut day2 = vec![classification("Ian Mcallister", AttendanceStatus::Late)];
        day1[0].driver_key = "IAN MCALLISTER".to_string();
        day2[0].driver_key = "IAN MCALLISTER".to_string();
        let s1 = summarize(may(1), &day1);
        let s2 = summarize(may(2), &day2);

        let mtd = month_to_date(may(1), may(2), [(&s1, day1.as_slice()), (&s2, day2.as_slice())]);

        assert_eq!(mtd.drivers.len(), 1);
        let tally = &mtd.drivers["IAN MCALLISTER"];
        assert_eq!(tally.driver, "Ian McAllister");
        assert_eq!(tally.on_time, 1);
        assert_eq!(tally.late, 1);
    }
}
