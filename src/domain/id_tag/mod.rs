//! OCPP tag aggregate
//!
//! Only the repository interface; the engine treats id tags as opaque
//! strings.

pub mod repository;

pub use repository::OcppTagRepository;
