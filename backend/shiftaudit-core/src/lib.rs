// src/lib.rs
//! Driver shift-punctuality audit.
//!
//! Reads a vehicle event log (key on / key off per driver and asset) and an
//! activity log (driver, asset, job location, start/end), restricts both to a
//! target date, and classifies every driver as On Time, Late, Early End or
//! Not On Job against the configured shift boundaries.

pub mod aggregate;
pub mod audit;
pub mod classify;
pub mod config;
pub mod error;
pub mod filter;
pub mod grouping;
pub mod ingest;
pub mod model;
pub mod normalize;
pub mod report;
pub mod server;
pub mod timestamps;

#[cfg(test)]
mod classification_tests;

pub use aggregate::{month_to_date, summarize, DailySummary, MtdSummary, StatusCount};
pub use audit::{AuditInputs, ShiftAudit};
pub use classify::{classify_driver, DriverClassification, ScheduleSource, ShiftPolicy};
pub use config::{AppConfig, PolicyOverrides};
pub use error::AuditError;
pub use model::{ActivityRecord, AttendanceStatus, EventKind, VehicleEvent};
pub use normalize::{normalize_driver_name, DriverKey};
pub use report::{DailyReport, MtdReport};
