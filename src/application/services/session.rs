//! Charging session orchestration
//!
//! Front door of the dispatch engine. Each operation resolves the charge
//! point, dispatches the command through the version-matched client and
//! polls for the kind of confirmation the caller asked for: the device
//! acknowledgement, or the transaction record the station produces later.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::{Semaphore, SemaphorePermit};
use tracing::info;

use super::super::commands::{
    RemoteStartParams, RemoteStopParams, SharedTaskStore, VersionedInvoker,
};
use super::super::polling::{PollOutcome, PollSettings};
use super::task_waiter::TaskResultWaiter;
use super::transaction_waiter::TransactionWaiter;
use crate::domain::{
    ChargePointRepository, ChargePointSelect, DispatchError, DispatchResult, OcppProtocol,
    Transaction, TransactionRepository,
};

fn record_session(operation: &'static str, outcome: &'static str, start: Instant) {
    metrics::histogram!("ocpp_session_duration_seconds", "operation" => operation)
        .record(start.elapsed().as_secs_f64());
    metrics::counter!("ocpp_session_outcomes_total", "operation" => operation, "outcome" => outcome)
        .increment(1);
}

/// Timing knobs for the session operations.
#[derive(Debug, Clone, Copy)]
pub struct SessionSettings {
    /// Poll budget for device acknowledgements.
    pub ack: PollSettings,
    /// Poll budget for the transaction to open.
    pub start: PollSettings,
    /// Poll budget for the transaction to close.
    pub stop: PollSettings,
    /// Upper bound on operations blocked in a poll at the same time.
    pub max_concurrent_polls: usize,
}

impl Default for SessionSettings {
    fn default() -> Self {
        let interval = Duration::from_millis(250);
        Self {
            ack: PollSettings::new(Duration::from_secs(10), interval),
            start: PollSettings::new(Duration::from_secs(5), interval),
            stop: PollSettings::new(Duration::from_secs(60), interval),
            max_concurrent_polls: 64,
        }
    }
}

/// Session start and stop operations with blocking confirmation.
pub struct SessionService {
    charge_points: Arc<dyn ChargePointRepository>,
    invoker: VersionedInvoker,
    task_waiter: TaskResultWaiter,
    transaction_waiter: TransactionWaiter,
    poll_permits: Arc<Semaphore>,
}

pub type SharedSessionService = Arc<SessionService>;

impl SessionService {
    pub fn new(
        charge_points: Arc<dyn ChargePointRepository>,
        transactions: Arc<dyn TransactionRepository>,
        invoker: VersionedInvoker,
        tasks: SharedTaskStore,
        settings: SessionSettings,
    ) -> Self {
        Self {
            charge_points,
            invoker,
            task_waiter: TaskResultWaiter::new(tasks, settings.ack),
            transaction_waiter: TransactionWaiter::new(
                transactions,
                settings.start,
                settings.stop,
            ),
            poll_permits: Arc::new(Semaphore::new(settings.max_concurrent_polls)),
        }
    }

    /// Dispatch RemoteStartTransaction and wait for the device answer.
    ///
    /// The success value is the acknowledgement payload. A station that
    /// answers `Rejected` is a completed exchange with that payload; the
    /// poll itself only rejects when the exchange failed.
    pub async fn start_session(
        &self,
        charge_point_id: &str,
        connector_id: u32,
        id_tag: &str,
    ) -> DispatchResult<PollOutcome<Option<String>>> {
        let _permit = self.checkout_permit().await?;
        let started = Instant::now();
        info!(charge_point_id, connector_id, id_tag, "Starting session");

        let task_id = self
            .dispatch_start(charge_point_id, connector_id, id_tag)
            .await?;
        let outcome = self.task_waiter.await_result(task_id, charge_point_id).await;

        record_session("start_session", outcome.kind(), started);
        Ok(outcome)
    }

    /// Dispatch RemoteStartTransaction and wait until the transaction
    /// record shows up, returning its id.
    pub async fn await_session_started(
        &self,
        charge_point_id: &str,
        connector_id: u32,
        id_tag: &str,
    ) -> DispatchResult<PollOutcome<i32>> {
        let _permit = self.checkout_permit().await?;
        let started = Instant::now();
        info!(
            charge_point_id,
            connector_id, id_tag, "Starting session, waiting for the transaction"
        );

        self.dispatch_start(charge_point_id, connector_id, id_tag)
            .await?;
        let outcome = self
            .transaction_waiter
            .await_started(charge_point_id, connector_id)
            .await;

        record_session("await_session_started", outcome.kind(), started);
        Ok(outcome)
    }

    /// Dispatch RemoteStopTransaction and wait for the device answer.
    pub async fn stop_session(
        &self,
        charge_point_id: &str,
        transaction_id: i32,
    ) -> DispatchResult<PollOutcome<Option<String>>> {
        let _permit = self.checkout_permit().await?;
        let started = Instant::now();
        info!(charge_point_id, transaction_id, "Stopping session");

        let task_id = self.dispatch_stop(charge_point_id, transaction_id).await?;
        let outcome = self.task_waiter.await_result(task_id, charge_point_id).await;

        record_session("stop_session", outcome.kind(), started);
        Ok(outcome)
    }

    /// Dispatch RemoteStopTransaction without waiting for the answer.
    ///
    /// The exchange still runs through the task store, so the
    /// acknowledgement can be inspected later under the returned task id.
    pub async fn stop_session_detached(
        &self,
        charge_point_id: &str,
        transaction_id: i32,
    ) -> DispatchResult<i32> {
        if self.poll_permits.is_closed() {
            return Err(DispatchError::Unavailable);
        }
        let started = Instant::now();
        info!(
            charge_point_id,
            transaction_id, "Stopping session, not waiting for the answer"
        );

        let task_id = self.dispatch_stop(charge_point_id, transaction_id).await?;

        record_session("stop_session_detached", "dispatched", started);
        Ok(task_id)
    }

    /// Dispatch RemoteStopTransaction and wait until the stop timestamp
    /// is recorded, returning the final transaction record.
    pub async fn await_session_stopped(
        &self,
        charge_point_id: &str,
        transaction_id: i32,
    ) -> DispatchResult<PollOutcome<Transaction>> {
        let _permit = self.checkout_permit().await?;
        let started = Instant::now();
        info!(
            charge_point_id,
            transaction_id, "Stopping session, waiting for the final record"
        );

        self.dispatch_stop(charge_point_id, transaction_id).await?;
        let outcome = self.transaction_waiter.await_stopped(transaction_id).await;

        record_session("await_session_stopped", outcome.kind(), started);
        Ok(outcome)
    }

    /// Stop taking new operations. Polls already in flight keep their
    /// permits and run to completion.
    pub fn drain(&self) {
        self.poll_permits.close();
    }

    async fn checkout_permit(&self) -> DispatchResult<SemaphorePermit<'_>> {
        self.poll_permits
            .acquire()
            .await
            .map_err(|_| DispatchError::Unavailable)
    }

    async fn resolve_target(
        &self,
        charge_point_id: &str,
    ) -> DispatchResult<(OcppProtocol, ChargePointSelect)> {
        let charge_point = self
            .charge_points
            .find_by_id(charge_point_id)
            .await?
            .ok_or_else(|| DispatchError::UnknownChargePoint(charge_point_id.to_string()))?;
        let protocol = charge_point.protocol()?;
        let target = charge_point.select(protocol.transport);
        Ok((protocol, target))
    }

    async fn dispatch_start(
        &self,
        charge_point_id: &str,
        connector_id: u32,
        id_tag: &str,
    ) -> DispatchResult<i32> {
        let (protocol, target) = self.resolve_target(charge_point_id).await?;
        let params = RemoteStartParams {
            target,
            connector_id,
            id_tag: id_tag.to_string(),
        };
        let task_id = self
            .invoker
            .select(protocol.version)
            .remote_start_transaction(params)
            .await;
        Ok(task_id)
    }

    async fn dispatch_stop(
        &self,
        charge_point_id: &str,
        transaction_id: i32,
    ) -> DispatchResult<i32> {
        let (protocol, target) = self.resolve_target(charge_point_id).await?;
        let params = RemoteStopParams {
            target,
            transaction_id,
        };
        let task_id = self
            .invoker
            .select(protocol.version)
            .remote_stop_transaction(params)
            .await;
        Ok(task_id)
    }
}

// ── Tests ──────────────────────────────────────────────────────
