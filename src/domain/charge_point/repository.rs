//! Charge Point repository interface

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::model::{ChargePoint, ConnectorStatus};
use crate::domain::DomainResult;

#[async_trait]
pub trait ChargePointRepository: Send + Sync {
    async fn save(&self, charge_point: ChargePoint) -> DomainResult<()>;
    async fn find_by_id(&self, id: &str) -> DomainResult<Option<ChargePoint>>;
    async fn find_all(&self) -> DomainResult<Vec<ChargePoint>>;
    async fn update_heartbeat(&self, id: &str, at: DateTime<Utc>) -> DomainResult<()>;
    async fn update_connector_status(
        &self,
        id: &str,
        connector_id: u32,
        status: ConnectorStatus,
        at: DateTime<Utc>,
    ) -> DomainResult<()>;
}
