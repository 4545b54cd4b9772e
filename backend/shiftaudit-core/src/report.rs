// src/report.rs
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::{
    fmt::Write as _,
    fs::{self, File},
    path::{Path, PathBuf},
};
use tracing::info;

use crate::aggregate::{DailySummary, MtdSummary};
use crate::classify::{DriverClassification, ShiftPolicy};
use crate::error::AuditError;
use crate::ingest::RowIssue;
use crate::model::AttendanceStatus;

// --- Report Structures ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyReport {
    pub date: NaiveDate,
    pub policy: ShiftPolicy,
    pub summary: DailySummary,
    pub drivers: Vec<DriverClassification>,
    pub issues: Vec<RowIssue>,
}

impl DailyReport {
    pub fn drivers_with_status(&self, status: AttendanceStatus) -> impl Iterator<Item = &DriverClassification> {
        self.drivers.iter().filter(move |d| d.status == status)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MtdReport {
    pub policy: ShiftPolicy,
    pub summary: MtdSummary,
    pub issues: Vec<RowIssue>,
}

// --- Writers ---

fn ensure_parent(path: &Path) -> Result<(), AuditError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .map_err(AuditError::io(format!("creating {}", parent.display())))?;
    }
    Ok(())
}

/// Writes any report as pretty-printed JSON, creating parent directories.
pub fn write_json<T: Serialize>(path: &Path, report: &T) -> Result<(), AuditError> {
    ensure_parent(path)?;
    let file = File::create(path).map_err(AuditError::io(format!("creating {}", path.display())))?;
    serde_json::to_writer_pretty(file, report)?;
    info!("Wrote {}", path.display());
    Ok(())
}

const DETAIL_HEADERS: [&str; 10] = [
    "date",
    "driver",
    "status",
    "also_early_end",
    "first_key_on",
    "last_key_off",
    "minutes_late",
    "minutes_early",
    "assets",
    "locations",
];

fn fmt_time(t: Option<NaiveDateTime>) -> String {
    t.map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_default()
}

/// Per-driver detail, one row per classification.
pub fn write_detail_csv(path: &Path, report: &DailyReport) -> Result<(), AuditError> {
    ensure_parent(path)?;
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(DETAIL_HEADERS)?;

    let date = report.date.format("%Y-%m-%d").to_string();
    for d in &report.drivers {
        writer.write_record([
            date.clone(),
            d.driver.clone(),
            d.status.label().to_string(),
            d.also_early_end.to_string(),
            fmt_time(d.first_key_on),
            fmt_time(d.last_key_off),
            d.minutes_late.to_string(),
            d.minutes_early.to_string(),
            d.assets.join("; "),
            d.locations.join("; "),
        ])?;
    }
    writer.flush().map_err(AuditError::io(format!("flushing {}", path.display())))?;
    info!("Wrote {} driver rows to {}", report.drivers.len(), path.display());
    Ok(())
}

pub fn daily_output_paths(out_dir: &Path, date: NaiveDate) -> (PathBuf, PathBuf) {
    let stamp = date.format("%Y-%m-%d");
    (
        out_dir.join(format!("summary_{}.json", stamp)),
        out_dir.join(format!("drivers_{}.csv", stamp)),
    )
}

pub fn mtd_output_path(out_dir: &Path, through: NaiveDate) -> PathBuf {
    out_dir.join(format!("mtd_{}.json", through.format("%Y-%m-%d")))
}

// --- Console Rendering ---

/// Plain-text status table for terminal output.
pub fn render_summary(summary: &DailySummary) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Driver classification for {}", summary.date);
    let _ = writeln!(out, "{:<12} {:>6} {:>8}", "Status", "Count", "Percent");
    for s in &summary.statuses {
        let _ = writeln!(out, "{:<12} {:>6} {:>7}%", s.status.label(), s.count, s.percentage);
    }
    let _ = writeln!(out, "{:<12} {:>6}", "Total", summary.total_drivers);
    let _ = writeln!(out, "On time (of drivers on job): {}%", summary.on_time_rate_on_job);
    out
}

pub fn render_mtd(summary: &MtdSummary) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Month to date {} .. {} ({} days)", summary.from, summary.through, summary.days.len());
    for s in &summary.statuses {
        let _ = writeln!(out, "{:<12} {:>6} {:>7}%", s.status.label(), s.count, s.percentage);
    }
    let _ = writeln!(out, "{:<12} {:>6}", "Driver-days", summary.driver_days);
    let _ = writeln!(out, "On time (of drivers on job): {}%", summary.on_time_rate_on_job);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::summarize;
    use crate::timestamps::parse_timestamp;

    fn sample_report() -> DailyReport {
        let date = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        let drivers = vec![DriverClassification {
            driver: "Jane Doe".to_string(),
            driver_key: "JANE DOE".to_string(),
            status: AttendanceStatus::Late,
            also_early_end: true,
            scheduled_start: parse_timestamp("2024-05-01 07:00").unwrap(),
            scheduled_end: parse_timestamp("2024-05-01 17:00").unwrap(),
            first_key_on: Some(parse_timestamp("2024-05-01 07:30").unwrap()),
            last_key_off: Some(parse_timestamp("2024-05-01 16:00").unwrap()),
            inferred_times: false,
            minutes_late: 30,
            minutes_early: 60,
            event_count: 2,
            assets: vec!["TRK-01".to_string(), "TRK-02".to_string()],
            locations: vec!["North Yard".to_string()],
        }];
        DailyReport {
            date,
            policy: ShiftPolicy::default(),
            summary: summarize(date, &drivers),
            drivers,
            issues: vec![],
        }
    }

    #[test]
    fn json_report_round_trips_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("summary.json");
        let report = sample_report();

        write_json(&path, &report).unwrap();
        let text = fs::read_to_string(&path).unwrap();
        assert!(text.contains("\"Late\""));
        let back: DailyReport = serde_json::from_str(&text).unwrap();
        assert_eq!(back, report);
    }

    #[test]
    fn detail_csv_has_header_and_one_row_per_driver() {
        let dir = tempfile::tempdir().unwrap();
        let (_, csv_path) = daily_output_paths(dir.path(), sample_report().date);
        write_detail_csv(&csv_path, &sample_report()).unwrap();

        let text = fs::read_to_string(&csv_path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("date,driver,status"));
        assert_eq!(
            lines[1],
            "2024-05-01,Jane Doe,Late,true,2024-05-01 07:30:00,2024-05-01 16:00:00,30,60,TRK-01; TRK-02,North Yard"
        );
        assert!(csv_path.ends_with("drivers_2024-05-01.csv"));
    }

    #[test]
    fn rendered_summary_lists_every_status() {
        let text = render_summary(&sample_report().summary);
        for status in AttendanceStatus::ALL {
            assert!(text.contains(status.label()));
        }
        assert!(text.contains("Total"));
    }
}
