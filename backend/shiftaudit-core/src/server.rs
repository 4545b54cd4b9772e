// src/server.rs
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::{net::SocketAddr, sync::Arc};
use thiserror::Error;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::audit::{AuditInputs, ShiftAudit};
use crate::classify::ShiftPolicy;
use crate::config::{AppConfig, PolicyOverrides};
use crate::error::AuditError;
use crate::report::{DailyReport, MtdReport};
use crate::timestamps::parse_date;

// --- Error Handling ---

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Invalid {field} '{value}' (expected YYYY-MM-DD or MM/DD/YYYY)")]
    InvalidRequestDate { field: &'static str, value: String },
    #[error("Audit rejected the request: {0}")]
    BadInput(AuditError),
    #[error("Audit failed: {0}")]
    Internal(AuditError),
}

impl From<AuditError> for ApiError {
    fn from(err: AuditError) -> Self {
        if err.is_input_error() {
            ApiError::BadInput(err)
        } else {
            ApiError::Internal(err)
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        error!("Error occurred: {:?}", self); // Log the original error

        let (status_code, message) = match &self {
            ApiError::InvalidRequestDate { .. } => (StatusCode::BAD_REQUEST, self.to_string()),
            ApiError::BadInput(err) => (StatusCode::BAD_REQUEST, err.to_string()),
            ApiError::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error. Check logs.".to_string(),
            ),
        };

        (status_code, Json(json!({ "error": message }))).into_response()
    }
}

// --- Requests ---

/// The logs for one audit, as CSV text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditLogs {
    pub events_csv: String,
    pub activity_csv: String,
    #[serde(default)]
    pub roster_csv: Option<String>,
    #[serde(default)]
    pub policy: PolicyOverrides,
}

impl AuditLogs {
    fn into_audit(self, base: &ShiftPolicy) -> Result<ShiftAudit, AuditError> {
        let policy = self.policy.apply(base)?;
        let inputs =
            AuditInputs::from_csv_text(&self.events_csv, &self.activity_csv, self.roster_csv.as_deref())?;
        ShiftAudit::new(inputs, policy)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyAuditRequest {
    pub date: String,
    #[serde(flatten)]
    pub logs: AuditLogs,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MtdAuditRequest {
    pub through: String,
    #[serde(flatten)]
    pub logs: AuditLogs,
}

fn request_date(field: &'static str, raw: &str) -> Result<chrono::NaiveDate, ApiError> {
    parse_date(raw).map_err(|_| ApiError::InvalidRequestDate {
        field,
        value: raw.to_string(),
    })
}

// --- Router ---

#[derive(Debug, Clone)]
pub struct AppState {
    pub default_policy: ShiftPolicy,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/audit/daily", post(audit_daily))
        .route("/api/audit/mtd", post(audit_mtd))
        .layer(TraceLayer::new_for_http())
        .with_state(Arc::new(state))
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

async fn audit_daily(
    State(state): State<Arc<AppState>>,
    Json(request): Json<DailyAuditRequest>,
) -> Result<Json<DailyReport>, ApiError> {
    let date = request_date("date", &request.date)?;
    let audit = request.logs.into_audit(&state.default_policy)?;
    Ok(Json(audit.daily(date)))
}

async fn audit_mtd(
    State(state): State<Arc<AppState>>,
    Json(request): Json<MtdAuditRequest>,
) -> Result<Json<MtdReport>, ApiError> {
    let through = request_date("through", &request.through)?;
    let audit = request.logs.into_audit(&state.default_policy)?;
    Ok(Json(audit.month_to_date(through)?))
}

/// Binds the configured address and serves until the process exits.
pub async fn serve(config: &AppConfig) -> Result<(), AuditError> {
    let state = AppState {
        default_policy: config.policy()?,
    };
    let addr = format!("{}:{}", config.server_host, config.server_port);
    let addr: SocketAddr = addr
        .parse()
        .map_err(|e| AuditError::Config(format!("invalid server address '{}': {}", addr, e)))?;

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(AuditError::io(format!("binding {}", addr)))?;
    info!("Listening on http://{}", addr);
    axum::serve(listener, router(state))
        .await
        .map_err(AuditError::io("serving HTTP"))
}
