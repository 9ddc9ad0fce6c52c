//! Command dispatch toward charge points
//!
//! ## Architecture
//!
//! ```text
//! SessionService ──► VersionedInvoker ──► v1.5 / v1.6 client
//!       │                                        │
//!  confirmation                           register task,
//!    polling                              invoke channel
//!       │                                        │
//!   TaskStore ◄────── device answers ──── CommandChannel
//! ```
//!
//! - [`TaskStore`] — registry of dispatched commands, keyed by task id;
//!   confirmation polling reads it, the delivery side writes answers into it.
//! - [`VersionedInvoker`] — picks the client matching a charge point's
//!   stored protocol version.
//! - [`CommandChannel`] — the wire seam. Framing and transport live behind
//!   it; this crate ships a simulated implementation.

pub mod client;
pub mod invoker;
pub mod task;
pub mod task_store;

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::{ChargePointSelect, OcppVersion};

// ── Re-exports ─────────────────────────────────────────────────────

pub use client::OcppCommandClient;
pub use invoker::VersionedInvoker;
pub use task::{CommunicationTask, RequestResult};
pub use task_store::{create_task_store, SharedTaskStore, TaskStore};

/// OCPP action dispatched to a charge point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandAction {
    RemoteStartTransaction,
    RemoteStopTransaction,
}

impl CommandAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RemoteStartTransaction => "RemoteStartTransaction",
            Self::RemoteStopTransaction => "RemoteStopTransaction",
        }
    }
}

impl std::fmt::Display for CommandAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Parameters for a RemoteStartTransaction dispatch.
#[derive(Debug, Clone)]
pub struct RemoteStartParams {
    pub target: ChargePointSelect,
    pub connector_id: u32,
    pub id_tag: String,
}

/// Parameters for a RemoteStopTransaction dispatch.
#[derive(Debug, Clone)]
pub struct RemoteStopParams {
    pub target: ChargePointSelect,
    pub transaction_id: i32,
}

/// Delivery failure on the outbound channel.
#[derive(Debug, Clone, Error)]
pub enum ChannelError {
    #[error("Charge point unreachable: {0}")]
    Unreachable(String),

    #[error("Failed to send: {0}")]
    SendFailed(String),
}

/// Outbound delivery seam for device commands.
///
/// Implementations own framing and transport (SOAP call, WebSocket
/// frame). They answer asynchronously by writing into the [`TaskStore`]
/// under the given task id; an `Err` here means the command never left
/// the central system.
#[async_trait]
pub trait CommandChannel: Send + Sync {
    async fn remote_start(
        &self,
        version: OcppVersion,
        target: &ChargePointSelect,
        task_id: i32,
        connector_id: u32,
        id_tag: &str,
    ) -> Result<(), ChannelError>;

    async fn remote_stop(
        &self,
        version: OcppVersion,
        target: &ChargePointSelect,
        task_id: i32,
        transaction_id: i32,
    ) -> Result<(), ChannelError>;
}

/// Version-specific charge point service client.
///
/// One implementation per supported protocol version. A dispatch always
/// yields a pollable task id; delivery problems are recorded on the task
/// instead of being returned.
#[async_trait]
pub trait ChargePointServiceClient: Send + Sync {
    fn version(&self) -> OcppVersion;
    async fn remote_start_transaction(&self, params: RemoteStartParams) -> i32;
    async fn remote_stop_transaction(&self, params: RemoteStopParams) -> i32;
}
