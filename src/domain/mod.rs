pub mod charge_point;
pub mod error;
pub mod id_tag;
pub mod ocpp;
pub mod transaction;

// Re-export commonly used types
pub use charge_point::{
    ChargePoint, ChargePointRepository, ChargePointSelect, Connector, ConnectorStatus,
};
pub use error::{DispatchError, DispatchResult, DomainError, DomainResult};
pub use id_tag::OcppTagRepository;
pub use ocpp::{OcppProtocol, OcppTransport, OcppVersion};
pub use transaction::{Transaction, TransactionRepository};
