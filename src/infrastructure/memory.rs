//! In-memory repositories
//!
//! Backing store for development, demos, and tests. Collections are
//! `DashMap`s so the polling tasks and the HTTP handlers can read and
//! write concurrently without a global lock.

use std::sync::atomic::{AtomicI32, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::{DashMap, DashSet};

use crate::domain::{
    ChargePoint, ChargePointRepository, ConnectorStatus, DomainError, DomainResult,
    OcppTagRepository, Transaction, TransactionRepository,
};

fn not_found(entity: &'static str, field: &'static str, value: impl Into<String>) -> DomainError {
    DomainError::NotFound {
        entity,
        field,
        value: value.into(),
    }
}

/// In-memory charge point registry
pub struct InMemoryChargePoints {
    charge_points: DashMap<String, ChargePoint>,
}

impl InMemoryChargePoints {
    pub fn new() -> Self {
        Self {
            charge_points: DashMap::new(),
        }
    }
}

impl Default for InMemoryChargePoints {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ChargePointRepository for InMemoryChargePoints {
    async fn save(&self, charge_point: ChargePoint) -> DomainResult<()> {
        self.charge_points
            .insert(charge_point.id.clone(), charge_point);
        Ok(())
    }

    async fn find_by_id(&self, id: &str) -> DomainResult<Option<ChargePoint>> {
        Ok(self.charge_points.get(id).map(|cp| cp.clone()))
    }

    async fn find_all(&self) -> DomainResult<Vec<ChargePoint>> {
        let mut all: Vec<ChargePoint> = self
            .charge_points
            .iter()
            .map(|e| e.value().clone())
            .collect();
        all.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(all)
    }

    async fn update_heartbeat(&self, id: &str, at: DateTime<Utc>) -> DomainResult<()> {
        let mut cp = self
            .charge_points
            .get_mut(id)
            .ok_or_else(|| not_found("charge point", "id", id))?;
        cp.update_heartbeat(at);
        Ok(())
    }

    async fn update_connector_status(
        &self,
        id: &str,
        connector_id: u32,
        status: ConnectorStatus,
        at: DateTime<Utc>,
    ) -> DomainResult<()> {
        let mut cp = self
            .charge_points
            .get_mut(id)
            .ok_or_else(|| not_found("charge point", "id", id))?;
        cp.update_connector_status(connector_id, status, at);
        Ok(())
    }
}

/// In-memory transaction records
pub struct InMemoryTransactions {
    transactions: DashMap<i32, Transaction>,
    transaction_counter: AtomicI32,
}

impl InMemoryTransactions {
    pub fn new() -> Self {
        Self {
            transactions: DashMap::new(),
            transaction_counter: AtomicI32::new(1),
        }
    }
}

impl Default for InMemoryTransactions {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TransactionRepository for InMemoryTransactions {
    async fn active_transaction_ids(
        &self,
        charge_point_id: &str,
        connector_id: u32,
    ) -> DomainResult<Vec<i32>> {
        let mut ids: Vec<i32> = self
            .transactions
            .iter()
            .filter(|t| {
                t.charge_point_id == charge_point_id
                    && t.connector_id == connector_id
                    && t.is_active()
            })
            .map(|t| t.id)
            .collect();
        // DashMap iteration order is arbitrary; the contract is ascending.
        ids.sort_unstable();
        Ok(ids)
    }

    async fn find_by_id(&self, id: i32) -> DomainResult<Option<Transaction>> {
        Ok(self.transactions.get(&id).map(|t| t.clone()))
    }

    async fn find_all_active(&self) -> DomainResult<Vec<Transaction>> {
        let mut active: Vec<Transaction> = self
            .transactions
            .iter()
            .filter(|t| t.is_active())
            .map(|t| t.clone())
            .collect();
        active.sort_by_key(|t| t.id);
        Ok(active)
    }

    async fn find_active_by_id_tag(&self, ocpp_id_tag: &str) -> DomainResult<Vec<Transaction>> {
        let mut active: Vec<Transaction> = self
            .transactions
            .iter()
            .filter(|t| t.is_active() && t.ocpp_id_tag == ocpp_id_tag)
            .map(|t| t.clone())
            .collect();
        active.sort_by_key(|t| t.id);
        Ok(active)
    }

    async fn insert_started(&self, transaction: Transaction) -> DomainResult<()> {
        self.transactions.insert(transaction.id, transaction);
        Ok(())
    }

    async fn mark_stopped(
        &self,
        id: i32,
        at: DateTime<Utc>,
        stop_value: Option<String>,
        reason: Option<String>,
    ) -> DomainResult<()> {
        let mut tx = self
            .transactions
            .get_mut(&id)
            .ok_or_else(|| not_found("transaction", "id", id.to_string()))?;
        tx.stop(at, stop_value, reason);
        Ok(())
    }

    async fn next_id(&self) -> i32 {
        self.transaction_counter.fetch_add(1, Ordering::SeqCst)
    }
}

/// In-memory id tag registry
pub struct InMemoryOcppTags {
    id_tags: DashSet<String>,
}

impl InMemoryOcppTags {
    pub fn new() -> Self {
        Self {
            id_tags: DashSet::new(),
        }
    }
}

impl Default for InMemoryOcppTags {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl OcppTagRepository for InMemoryOcppTags {
    async fn id_tags(&self) -> DomainResult<Vec<String>> {
        let mut tags: Vec<String> = self.id_tags.iter().map(|t| t.clone()).collect();
        tags.sort_unstable();
        Ok(tags)
    }

    async fn add(&self, id_tag: String) -> DomainResult<bool> {
        Ok(self.id_tags.insert(id_tag))
    }
}

// ── Tests ──────────────────────────────────────────────────────
