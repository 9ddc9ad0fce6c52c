//! OCPP tag repository interface
//!
//! The dispatch engine only needs to know which id tags exist; tag
//! lifecycle (expiry, blocking, parent tags) lives elsewhere.

use async_trait::async_trait;

use crate::domain::DomainResult;

#[async_trait]
pub trait OcppTagRepository: Send + Sync {
    /// All known id tags, sorted.
    async fn id_tags(&self) -> DomainResult<Vec<String>>;

    /// Register a tag. Returns `true` when the tag was not known before.
    async fn add(&self, id_tag: String) -> DomainResult<bool>;
}
