//! Charge Point aggregate
//!
//! Contains the ChargePoint entity, the dispatch target value object,
//! and the repository interface.

pub mod model;
pub mod repository;

pub use model::{ChargePoint, ChargePointSelect, Connector, ConnectorStatus};
pub use repository::ChargePointRepository;
