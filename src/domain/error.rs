//! Domain errors
//!
//! Hard faults only. Expected business outcomes of a dispatch (device
//! rejection, confirmation timeout) are not errors; they are reported
//! as values through [`PollOutcome`](crate::application::polling::PollOutcome).

use thiserror::Error;

/// Result type for repository operations.
pub type DomainResult<T> = Result<T, DomainError>;

/// Result type for dispatch operations.
pub type DispatchResult<T> = Result<T, DispatchError>;

/// Errors raised by the storage seams.
#[derive(Debug, Clone, Error)]
pub enum DomainError {
    #[error("Not found: {entity} with {field}={value}")]
    NotFound {
        entity: &'static str,
        field: &'static str,
        value: String,
    },

    #[error("Storage error: {0}")]
    Storage(String),
}

/// Faults that abort a dispatch operation before or during delivery.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// No charge point is registered under the given id.
    #[error("Charge point is missing: {0}")]
    UnknownChargePoint(String),

    /// The stored protocol value could not be decoded. This is a
    /// configuration defect, not a caller mistake.
    #[error("Unsupported OCPP protocol: {0}")]
    UnsupportedProtocol(String),

    /// The engine is draining and no longer accepts new operations.
    #[error("Dispatch engine is shutting down")]
    Unavailable,

    #[error(transparent)]
    Storage(#[from] DomainError),
}

// ── Tests ──────────────────────────────────────────────────────
