//! # OCPP Session Dispatch
//!
//! Command dispatch and confirmation polling for OCPP 1.5/1.6 charging stations.
//!
//! ## Architecture
//!
//! The project follows Clean Architecture principles:
//!
//! - **domain**: Core business entities, types and traits
//! - **application**: Command tasks, polling engine and session services
//! - **infrastructure**: External concerns (in-memory storage, station simulator, shutdown)
//! - **api**: REST API with Swagger documentation

pub mod api;
pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::{default_config_path, AppConfig};

// Re-export API router
pub use api::create_api_router;
