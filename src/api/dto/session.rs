//! Session command DTOs

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

/// Remote session start request
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[schema(example = json!({
    "charge_point_id": "CP001",
    "connector_id": 1,
    "ocpp_id_tag": "RFID-0412"
}))]
pub struct StartSessionRequest {
    #[validate(length(min = 1, message = "charge_point_id is required"))]
    pub charge_point_id: String,
    #[validate(range(min = 1, message = "connector_id must be ≥ 1"))]
    pub connector_id: u32,
    /// Authorization token, 1–20 characters per OCPP
    #[validate(length(min = 1, max = 20, message = "ocpp_id_tag must be 1–20 characters"))]
    pub ocpp_id_tag: String,
}

/// Remote session stop request
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[schema(example = json!({
    "charge_point_id": "CP001",
    "transaction_id": 1
}))]
pub struct StopSessionRequest {
    #[validate(length(min = 1, message = "charge_point_id is required"))]
    pub charge_point_id: String,
    #[validate(range(min = 1, message = "transaction_id must be positive"))]
    pub transaction_id: i32,
}

/// Charge point selector for path-addressed stop operations
#[derive(Debug, Deserialize, IntoParams)]
pub struct StopSessionQuery {
    /// Charge point the transaction runs on
    pub charge_point_id: String,
}

/// Device acknowledgement for a dispatched command
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({
    "charge_point_id": "CP001",
    "response": "Accepted"
}))]
pub struct SessionAckDto {
    pub charge_point_id: String,
    /// Answer payload recorded for this charge point, e.g. `Accepted`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response: Option<String>,
}

/// Transaction id of a freshly opened session
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({"transaction_id": 1}))]
pub struct StartedSessionDto {
    pub transaction_id: i32,
}
