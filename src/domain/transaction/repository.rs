//! Transaction repository interface

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::model::Transaction;
use crate::domain::DomainResult;

#[async_trait]
pub trait TransactionRepository: Send + Sync {
    /// Ids of transactions on the given connector that have not stopped
    /// yet, in ascending id order. Confirmation polling picks the first
    /// entry, so the order must be stable across calls.
    async fn active_transaction_ids(
        &self,
        charge_point_id: &str,
        connector_id: u32,
    ) -> DomainResult<Vec<i32>>;

    async fn find_by_id(&self, id: i32) -> DomainResult<Option<Transaction>>;
    async fn find_all_active(&self) -> DomainResult<Vec<Transaction>>;
    async fn find_active_by_id_tag(&self, ocpp_id_tag: &str) -> DomainResult<Vec<Transaction>>;

    async fn insert_started(&self, transaction: Transaction) -> DomainResult<()>;
    async fn mark_stopped(
        &self,
        id: i32,
        at: DateTime<Utc>,
        stop_value: Option<String>,
        reason: Option<String>,
    ) -> DomainResult<()>;

    async fn next_id(&self) -> i32;
}
