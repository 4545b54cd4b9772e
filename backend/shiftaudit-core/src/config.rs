// src/config.rs
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::classify::{ScheduleSource, ShiftPolicy};
use crate::error::AuditError;
use crate::timestamps::parse_clock;

pub const ENV_PREFIX: &str = "SHIFTAUDIT_";

fn default_shift_start() -> String {
    "07:00".to_string()
}
fn default_shift_end() -> String {
    "17:00".to_string()
}
fn default_schedule_source() -> String {
    "fixed".to_string()
}
fn default_output_dir() -> PathBuf {
    PathBuf::from("reports")
}
fn default_server_host() -> String {
    "127.0.0.1".to_string()
}
fn default_server_port() -> u16 {
    3000
}

/// Settings read from `SHIFTAUDIT_*` environment variables (and `.env`).
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_shift_start")]
    pub shift_start: String,
    #[serde(default = "default_shift_end")]
    pub shift_end: String,
    #[serde(default)]
    pub late_tolerance_minutes: u32,
    #[serde(default)]
    pub early_tolerance_minutes: u32,
    #[serde(default = "default_schedule_source")]
    pub schedule_source: String,
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    #[serde(default = "default_server_host")]
    pub server_host: String,
    #[serde(default = "default_server_port")]
    pub server_port: u16,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, AuditError> {
        // Load .env file if it exists
        dotenv::dotenv().ok();
        envy::prefixed(ENV_PREFIX)
            .from_env::<AppConfig>()
            .map_err(|e| AuditError::Config(e.to_string()))
    }

    /// Builds config from explicit key/value pairs (keys carry the prefix).
    pub fn from_pairs<I>(pairs: I) -> Result<Self, AuditError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        envy::prefixed(ENV_PREFIX)
            .from_iter::<_, AppConfig>(pairs)
            .map_err(|e| AuditError::Config(e.to_string()))
    }

    /// The shift policy these settings describe, validated.
    pub fn policy(&self) -> Result<ShiftPolicy, AuditError> {
        let policy = ShiftPolicy {
            start: parse_clock(&self.shift_start)?,
            end: parse_clock(&self.shift_end)?,
            late_tolerance_minutes: self.late_tolerance_minutes,
            early_tolerance_minutes: self.early_tolerance_minutes,
            schedule_source: self.schedule_source.parse()?,
        };
        policy.validate()?;
        Ok(policy)
    }
}

// --- Per-run Overrides ---

/// Policy fields a single CLI run or HTTP request may override.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyOverrides {
    pub shift_start: Option<String>,
    pub shift_end: Option<String>,
    pub late_tolerance_minutes: Option<u32>,
    pub early_tolerance_minutes: Option<u32>,
    pub schedule_source: Option<ScheduleSource>,
}

impl PolicyOverrides {
    pub fn apply(&self, base: &ShiftPolicy) -> Result<ShiftPolicy, AuditError> {
        let mut policy = base.clone();
        if let Some(start) = &self.shift_start {
            policy.start = parse_clock(start)?;
        }
        if let Some(end) = &self.shift_end {
            policy.end = parse_clock(end)?;
        }
        if let Some(minutes) = self.late_tolerance_minutes {
            policy.late_tolerance_minutes = minutes;
        }
        if let Some(minutes) = self.early_tolerance_minutes {
            policy.early_tolerance_minutes = minutes;
        }
        if let Some(source) = self.schedule_source {
            policy.schedule_source = source;
        }
        policy.validate()?;
        Ok(policy)
    }
}
