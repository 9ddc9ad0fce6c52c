//! REST API module for the session dispatch engine
//!
//! Provides HTTP endpoints for starting and stopping charging sessions,
//! confirming their outcome and inspecting stations and transactions.

pub mod dto;
pub mod handlers;
pub mod router;
pub mod validated_json;

pub use router::create_api_router;
pub use validated_json::ValidatedJson;
