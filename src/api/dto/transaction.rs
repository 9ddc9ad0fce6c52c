//! Transaction DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::Transaction;

/// Charging session record
///
/// Meter values are passed through as the raw strings the station
/// reported. The stop fields stay absent while the session is active.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({
    "id": 1,
    "charge_point_id": "CP001",
    "connector_id": 1,
    "ocpp_id_tag": "RFID-0412",
    "start_timestamp": "2024-01-15T10:00:00Z",
    "start_value": "0",
    "stop_timestamp": "2024-01-15T12:00:00Z",
    "stop_value": "5000",
    "stop_reason": "Remote",
    "active": false
}))]
pub struct TransactionDto {
    pub id: i32,
    pub charge_point_id: String,
    pub connector_id: u32,
    pub ocpp_id_tag: String,
    pub start_timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop_timestamp: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop_value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop_reason: Option<String>,
    /// `true` while no stop timestamp has been recorded
    pub active: bool,
}

impl TransactionDto {
    pub fn from_domain(tx: Transaction) -> Self {
        let active = tx.is_active();
        Self {
            id: tx.id,
            charge_point_id: tx.charge_point_id,
            connector_id: tx.connector_id,
            ocpp_id_tag: tx.ocpp_id_tag,
            start_timestamp: tx.start_timestamp,
            start_value: tx.start_value,
            stop_timestamp: tx.stop_timestamp,
            stop_value: tx.stop_value,
            stop_reason: tx.stop_reason,
            active,
        }
    }
}
