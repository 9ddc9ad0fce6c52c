//! Health check endpoint

use std::sync::Arc;
use std::time::Instant;

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::{ChargePointRepository, TransactionRepository};

/// Health state shared with the handler
#[derive(Clone)]
pub struct HealthState {
    pub started_at: Arc<Instant>,
    pub charge_points: Arc<dyn ChargePointRepository>,
    pub transactions: Arc<dyn TransactionRepository>,
}

/// Service status summary
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// `ok` while the registries answer, `degraded` otherwise
    pub status: String,
    /// Service version (from Cargo.toml)
    pub version: String,
    /// Seconds since the service started
    pub uptime_seconds: u64,
    /// Registered charge points
    pub charge_points: u32,
    /// Sessions currently running
    pub active_transactions: u32,
}

/// Service health
///
/// Reports the version, uptime and registry counts. Meant for
/// availability monitoring; no authorization required.
#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse),
        (status = 503, description = "A registry is not answering", body = HealthResponse)
    )
)]
pub async fn health_check(
    State(state): State<HealthState>,
) -> (StatusCode, Json<HealthResponse>) {
    let charge_points = state.charge_points.find_all().await;
    let transactions = state.transactions.find_all_active().await;

    let (status, code) = if charge_points.is_ok() && transactions.is_ok() {
        ("ok", StatusCode::OK)
    } else {
        ("degraded", StatusCode::SERVICE_UNAVAILABLE)
    };

    let response = HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.started_at.elapsed().as_secs(),
        charge_points: charge_points.map(|cps| cps.len() as u32).unwrap_or(0),
        active_transactions: transactions.map(|txs| txs.len() as u32).unwrap_or(0),
    };

    (code, Json(response))
}

// ── Tests ──────────────────────────────────────────────────────
