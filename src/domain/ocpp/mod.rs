//! OCPP protocol shared types
//!
//! Value objects related to the OCPP protocol that don't belong
//! to a single aggregate.

pub mod protocol;

pub use protocol::{OcppProtocol, OcppTransport, OcppVersion};
