// src/error.rs
use thiserror::Error;

use crate::timestamps::TimestampError;

#[derive(Error, Debug)]
pub enum AuditError {
    #[error("File I/O error ({context}): {source}")]
    Io {
        source: std::io::Error,
        context: String,
    },
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("JSON serialization/deserialization failed: {0}")]
    SerdeJson(#[from] serde_json::Error),
    #[error("Missing required column '{column}' in {source_name} (found: {headers:?})")]
    MissingColumn {
        column: &'static str,
        source_name: String,
        headers: Vec<String>,
    },
    #[error("Invalid shift policy: {0}")]
    InvalidPolicy(String),
    #[error("Invalid date '{0}'")]
    InvalidDate(String),
    #[error("Invalid time value: {0}")]
    InvalidTime(#[from] TimestampError),
    #[error("Configuration error: {0}")]
    Config(String),
}

impl AuditError {
    /// Wraps an I/O error with the path or operation it came from.
    pub fn io(context: impl Into<String>) -> impl FnOnce(std::io::Error) -> AuditError {
        let context = context.into();
        move |source| AuditError::Io { source, context }
    }

    /// True when the error was caused by the caller's input rather than the host.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            AuditError::Csv(_)
                | AuditError::MissingColumn { .. }
                | AuditError::InvalidPolicy(_)
                | AuditError::InvalidDate(_)
                | AuditError::InvalidTime(_)
        )
    }
}
