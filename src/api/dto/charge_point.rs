//! Charge point DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{ChargePoint, Connector};

/// Registered charge point
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({
    "charge_point_id": "CP001",
    "ocpp_protocol": "ocpp1.6J",
    "registered_at": "2024-01-15T10:30:00Z",
    "last_heartbeat": "2024-01-15T12:00:00Z",
    "connectors": [{"connector_id": 1, "status": "Available"}]
}))]
pub struct ChargePointDto {
    pub charge_point_id: String,
    /// Protocol in composite form, e.g. `ocpp1.6J` or `ocpp1.5S`
    pub ocpp_protocol: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Station endpoint address (SOAP charge points only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint_address: Option<String>,
    pub registered_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_heartbeat: Option<DateTime<Utc>>,
    pub connectors: Vec<ConnectorStatusDto>,
}

impl ChargePointDto {
    pub fn from_domain(cp: ChargePoint) -> Self {
        Self {
            charge_point_id: cp.id,
            ocpp_protocol: cp.ocpp_protocol,
            description: cp.description,
            endpoint_address: cp.endpoint_address,
            registered_at: cp.registered_at,
            last_heartbeat: cp.last_heartbeat,
            connectors: cp
                .connectors
                .into_iter()
                .map(ConnectorStatusDto::from_domain)
                .collect(),
        }
    }
}

/// Last reported status of a single connector
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({
    "connector_id": 1,
    "status": "Charging",
    "error_code": null
}))]
pub struct ConnectorStatusDto {
    pub connector_id: u32,
    /// OCPP status, e.g. `Available`, `Charging`, `Faulted`
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
}

impl ConnectorStatusDto {
    pub fn from_domain(connector: Connector) -> Self {
        Self {
            connector_id: connector.id,
            status: connector.status.to_string(),
            error_code: connector.error_code,
        }
    }
}

/// Heartbeat and connector status summary for one charge point
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ChargePointStatusDto {
    pub charge_point_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_heartbeat: Option<DateTime<Utc>>,
    pub connectors: Vec<ConnectorStatusDto>,
}

impl ChargePointStatusDto {
    pub fn from_domain(cp: ChargePoint) -> Self {
        Self {
            charge_point_id: cp.id,
            last_heartbeat: cp.last_heartbeat,
            connectors: cp
                .connectors
                .into_iter()
                .map(ConnectorStatusDto::from_domain)
                .collect(),
        }
    }
}
