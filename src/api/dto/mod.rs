//! API DTOs

pub mod charge_point;
pub mod common;
pub mod session;
pub mod transaction;

pub use charge_point::{ChargePointDto, ChargePointStatusDto, ConnectorStatusDto};
pub use common::ApiResponse;
pub use session::{
    SessionAckDto, StartSessionRequest, StartedSessionDto, StopSessionQuery, StopSessionRequest,
};
pub use transaction::TransactionDto;
