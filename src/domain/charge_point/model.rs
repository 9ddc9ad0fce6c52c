//! Charge Point domain entity

use chrono::{DateTime, Utc};

use super::super::error::DispatchError;
use super::super::ocpp::{OcppProtocol, OcppTransport};

/// Connector status on a charge point
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectorStatus {
    Available,
    Preparing,
    Charging,
    SuspendedEV,
    SuspendedEVSE,
    Finishing,
    Reserved,
    Unavailable,
    Faulted,
}

impl Default for ConnectorStatus {
    fn default() -> Self {
        Self::Available
    }
}

impl std::fmt::Display for ConnectorStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Available => write!(f, "Available"),
            Self::Preparing => write!(f, "Preparing"),
            Self::Charging => write!(f, "Charging"),
            Self::SuspendedEV => write!(f, "SuspendedEV"),
            Self::SuspendedEVSE => write!(f, "SuspendedEVSE"),
            Self::Finishing => write!(f, "Finishing"),
            Self::Reserved => write!(f, "Reserved"),
            Self::Unavailable => write!(f, "Unavailable"),
            Self::Faulted => write!(f, "Faulted"),
        }
    }
}

/// Connector on a charge point
#[derive(Debug, Clone)]
pub struct Connector {
    pub id: u32,
    pub status: ConnectorStatus,
    pub error_code: Option<String>,
    pub status_timestamp: Option<DateTime<Utc>>,
}

impl Connector {
    pub fn new(id: u32) -> Self {
        Self {
            id,
            status: ConnectorStatus::default(),
            error_code: None,
            status_timestamp: None,
        }
    }
}

/// Dispatch target resolved from a registered charge point.
///
/// For SOAP charge points the endpoint address is the station's HTTP
/// endpoint; for JSON charge points delivery goes through the open
/// WebSocket connection and no address is needed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChargePointSelect {
    pub transport: OcppTransport,
    pub charge_point_id: String,
    pub endpoint_address: Option<String>,
}

/// Charge Point entity
#[derive(Debug, Clone)]
pub struct ChargePoint {
    /// Unique identifier (the OCPP charge box id)
    pub id: String,
    /// Stored protocol in composite form, e.g. `"ocpp1.6J"`
    pub ocpp_protocol: String,
    /// Station endpoint address (SOAP charge points only)
    pub endpoint_address: Option<String>,
    /// Free-form description
    pub description: Option<String>,
    /// When the charge point was registered
    pub registered_at: DateTime<Utc>,
    /// Last heartbeat received
    pub last_heartbeat: Option<DateTime<Utc>>,
    /// Connectors
    pub connectors: Vec<Connector>,
}

impl ChargePoint {
    pub fn new(id: impl Into<String>, protocol: OcppProtocol) -> Self {
        Self {
            id: id.into(),
            ocpp_protocol: protocol.composite_value(),
            endpoint_address: None,
            description: None,
            registered_at: Utc::now(),
            last_heartbeat: None,
            connectors: Vec::new(),
        }
    }

    /// Decode the stored protocol value.
    ///
    /// Re-resolved on every dispatch so that a registry update takes
    /// effect immediately. An undecodable value is a configuration
    /// defect and aborts the operation.
    pub fn protocol(&self) -> Result<OcppProtocol, DispatchError> {
        OcppProtocol::from_composite(&self.ocpp_protocol)
            .ok_or_else(|| DispatchError::UnsupportedProtocol(self.ocpp_protocol.clone()))
    }

    /// Dispatch target for this charge point under the given transport.
    pub fn select(&self, transport: OcppTransport) -> ChargePointSelect {
        ChargePointSelect {
            transport,
            charge_point_id: self.id.clone(),
            endpoint_address: self.endpoint_address.clone(),
        }
    }

    pub fn update_heartbeat(&mut self, at: DateTime<Utc>) {
        self.last_heartbeat = Some(at);
    }

    pub fn get_connector(&self, id: u32) -> Option<&Connector> {
        self.connectors.iter().find(|c| c.id == id)
    }

    pub fn update_connector_status(
        &mut self,
        connector_id: u32,
        status: ConnectorStatus,
        at: DateTime<Utc>,
    ) {
        if let Some(connector) = self.connectors.iter_mut().find(|c| c.id == connector_id) {
            connector.status = status;
            connector.status_timestamp = Some(at);
        } else {
            // Create the connector on first status report
            let mut connector = Connector::new(connector_id);
            connector.status = status;
            connector.status_timestamp = Some(at);
            self.connectors.push(connector);
            self.connectors.sort_by_key(|c| c.id);
        }
    }
}

// ── Tests ──────────────────────────────────────────────────────
