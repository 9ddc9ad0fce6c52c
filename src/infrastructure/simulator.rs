//! Simulated charge points
//!
//! Stands in for the SOAP and WebSocket delivery paths so the whole
//! dispatch and confirmation loop can run without station hardware.
//! Answers are written into the task store after a configurable delay,
//! the same way a real transport implementation would.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use tracing::{debug, warn};

use crate::application::commands::{ChannelError, CommandChannel, SharedTaskStore};
use crate::domain::{
    ChargePointRepository, ChargePointSelect, ConnectorStatus, OcppVersion, Transaction,
    TransactionRepository,
};

/// How the simulated station reacts to a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimulatedBehavior {
    /// Acknowledge with `Accepted` and carry the command out.
    Accept,
    /// Acknowledge with `Rejected` and do nothing.
    Reject,
    /// Fail the exchange, as a broken SOAP call or WebSocket would.
    Error,
    /// Never answer. Exercises the confirmation timeouts.
    Silent,
}

impl SimulatedBehavior {
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "accept" => Some(Self::Accept),
            "reject" => Some(Self::Reject),
            "error" => Some(Self::Error),
            "silent" => Some(Self::Silent),
            _ => None,
        }
    }
}

impl std::fmt::Display for SimulatedBehavior {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Accept => write!(f, "accept"),
            Self::Reject => write!(f, "reject"),
            Self::Error => write!(f, "error"),
            Self::Silent => write!(f, "silent"),
        }
    }
}

/// Command channel backed by simulated stations.
///
/// On `Accept` the simulation goes beyond the acknowledgement: a started
/// transaction shows up in the transaction records one answer delay after
/// the ack, and a stopped one gets its stop timestamp, which is exactly
/// the evidence the correlation waiters poll for.
pub struct SimulatedCommandChannel {
    tasks: SharedTaskStore,
    transactions: Arc<dyn TransactionRepository>,
    charge_points: Arc<dyn ChargePointRepository>,
    behavior: SimulatedBehavior,
    answer_delay: Duration,
}

impl SimulatedCommandChannel {
    pub fn new(
        tasks: SharedTaskStore,
        transactions: Arc<dyn TransactionRepository>,
        charge_points: Arc<dyn ChargePointRepository>,
        behavior: SimulatedBehavior,
        answer_delay: Duration,
    ) -> Self {
        Self {
            tasks,
            transactions,
            charge_points,
            behavior,
            answer_delay,
        }
    }

    fn answer_later(&self, task_id: i32, charge_point_id: &str, response: &'static str) {
        let tasks = self.tasks.clone();
        let charge_point_id = charge_point_id.to_string();
        let delay = self.answer_delay;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            tasks.record_response(task_id, &charge_point_id, response);
        });
    }

    fn fail_later(&self, task_id: i32, charge_point_id: &str) {
        let tasks = self.tasks.clone();
        let charge_point_id = charge_point_id.to_string();
        let delay = self.answer_delay;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            tasks.record_error(task_id, &charge_point_id, "simulated delivery failure");
        });
    }

    fn accept_start(
        &self,
        task_id: i32,
        charge_point_id: String,
        connector_id: u32,
        id_tag: String,
    ) {
        let tasks = self.tasks.clone();
        let transactions = self.transactions.clone();
        let charge_points = self.charge_points.clone();
        let delay = self.answer_delay;

        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            tasks.record_response(task_id, &charge_point_id, "Accepted");

            // The station ramps up and reports the new transaction a
            // moment after the acknowledgement.
            tokio::time::sleep(delay).await;
            let id = transactions.next_id().await;
            let mut transaction = Transaction::new(id, charge_point_id.clone(), connector_id, id_tag);
            transaction.start_value = Some("0".into());
            if let Err(err) = transactions.insert_started(transaction).await {
                warn!(task_id, error = %err, "Simulated start could not record the transaction");
                return;
            }
            if let Err(err) = charge_points
                .update_connector_status(
                    &charge_point_id,
                    connector_id,
                    ConnectorStatus::Charging,
                    Utc::now(),
                )
                .await
            {
                debug!(
                    charge_point_id = charge_point_id.as_str(),
                    error = %err,
                    "Connector status not updated"
                );
            }
        });
    }

    fn accept_stop(&self, task_id: i32, charge_point_id: String, transaction_id: i32) {
        let tasks = self.tasks.clone();
        let transactions = self.transactions.clone();
        let charge_points = self.charge_points.clone();
        let delay = self.answer_delay;

        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let active = match transactions.find_by_id(transaction_id).await {
                Ok(Some(tx)) if tx.is_active() => tx,
                Ok(_) => {
                    // A station refuses to stop a transaction it is not
                    // running.
                    tasks.record_response(task_id, &charge_point_id, "Rejected");
                    return;
                }
                Err(err) => {
                    warn!(task_id, error = %err, "Simulated stop could not look up the transaction");
                    tasks.record_error(task_id, &charge_point_id, "simulated lookup failure");
                    return;
                }
            };
            tasks.record_response(task_id, &charge_point_id, "Accepted");

            tokio::time::sleep(delay).await;
            if let Err(err) = transactions
                .mark_stopped(
                    transaction_id,
                    Utc::now(),
                    Some("1000".into()),
                    Some("Remote".into()),
                )
                .await
            {
                warn!(task_id, error = %err, "Simulated stop could not close the transaction");
                return;
            }
            if let Err(err) = charge_points
                .update_connector_status(
                    &charge_point_id,
                    active.connector_id,
                    ConnectorStatus::Available,
                    Utc::now(),
                )
                .await
            {
                debug!(
                    charge_point_id = charge_point_id.as_str(),
                    error = %err,
                    "Connector status not updated"
                );
            }
        });
    }
}

#[async_trait]
impl CommandChannel for SimulatedCommandChannel {
    async fn remote_start(
        &self,
        version: OcppVersion,
        target: &ChargePointSelect,
        task_id: i32,
        connector_id: u32,
        id_tag: &str,
    ) -> Result<(), ChannelError> {
        debug!(
            charge_point_id = target.charge_point_id.as_str(),
            task_id,
            %version,
            transport = %target.transport,
            behavior = %self.behavior,
            "Simulating RemoteStartTransaction delivery"
        );
        match self.behavior {
            SimulatedBehavior::Silent => {}
            SimulatedBehavior::Error => self.fail_later(task_id, &target.charge_point_id),
            SimulatedBehavior::Reject => {
                self.answer_later(task_id, &target.charge_point_id, "Rejected")
            }
            SimulatedBehavior::Accept => self.accept_start(
                task_id,
                target.charge_point_id.clone(),
                connector_id,
                id_tag.to_string(),
            ),
        }
        Ok(())
    }

    async fn remote_stop(
        &self,
        version: OcppVersion,
        target: &ChargePointSelect,
        task_id: i32,
        transaction_id: i32,
    ) -> Result<(), ChannelError> {
        debug!(
            charge_point_id = target.charge_point_id.as_str(),
            task_id,
            %version,
            transport = %target.transport,
            behavior = %self.behavior,
            "Simulating RemoteStopTransaction delivery"
        );
        match self.behavior {
            SimulatedBehavior::Silent => {}
            SimulatedBehavior::Error => self.fail_later(task_id, &target.charge_point_id),
            SimulatedBehavior::Reject => {
                self.answer_later(task_id, &target.charge_point_id, "Rejected")
            }
            SimulatedBehavior::Accept => {
                self.accept_stop(task_id, target.charge_point_id.clone(), transaction_id)
            }
        }
        Ok(())
    }
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::commands::{create_task_store, CommandAction};
    use crate::domain::{ChargePoint, OcppProtocol, OcppTransport};
    use crate::infrastructure::memory::{InMemoryChargePoints, InMemoryTransactions};

    struct Fixture {
        tasks: SharedTaskStore,
        transactions: Arc<InMemoryTransactions>,
        charge_points: Arc<InMemoryChargePoints>,
        channel: SimulatedCommandChannel,
    }

    async fn fixture(behavior: SimulatedBehavior) -> Fixture {
        let tasks = create_task_store();
        let transactions = Arc::new(InMemoryTransactions::new());
        let charge_points = Arc::new(InMemoryChargePoints::new());
        charge_points
            .save(ChargePoint::new("CP001", OcppProtocol::V16_JSON))
            .await
            .unwrap();

        let channel = SimulatedCommandChannel::new(
            tasks.clone(),
            transactions.clone(),
            charge_points.clone(),
            behavior,
            Duration::from_millis(300),
        );

        Fixture {
            tasks,
            transactions,
            charge_points,
            channel,
        }
    }

    fn target() -> ChargePointSelect {
        ChargePointSelect {
            transport: OcppTransport::Json,
            charge_point_id: "CP001".into(),
            endpoint_address: None,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn accepted_start_answers_then_opens_a_transaction() {
        let f = fixture(SimulatedBehavior::Accept).await;
        let task_id = f
            .tasks
            .create(CommandAction::RemoteStartTransaction, vec![target()]);
        f.channel
            .remote_start(OcppVersion::V16, &target(), task_id, 1, "TAG-1")
            .await
            .unwrap();

        // Acknowledgement lands first, the transaction record later.
        tokio::time::sleep(Duration::from_millis(350)).await;
        let snapshot = f.tasks.snapshot(task_id).unwrap();
        assert!(snapshot.finished());
        assert_eq!(
            snapshot.result_for("CP001").unwrap().response.as_deref(),
            Some("Accepted")
        );
        assert!(f
            .transactions
            .active_transaction_ids("CP001", 1)
            .await
            .unwrap()
            .is_empty());

        tokio::time::sleep(Duration::from_millis(300)).await;
        let ids = f.transactions.active_transaction_ids("CP001", 1).await.unwrap();
        assert_eq!(ids, vec![1]);

        let cp = f.charge_points.find_by_id("CP001").await.unwrap().unwrap();
        assert_eq!(
            cp.get_connector(1).map(|c| c.status.clone()),
            Some(ConnectorStatus::Charging)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn rejected_start_answers_without_a_transaction() {
        let f = fixture(SimulatedBehavior::Reject).await;
        let task_id = f
            .tasks
            .create(CommandAction::RemoteStartTransaction, vec![target()]);
        f.channel
            .remote_start(OcppVersion::V16, &target(), task_id, 1, "TAG-1")
            .await
            .unwrap();

        tokio::time::sleep(Duration::from_secs(2)).await;
        let snapshot = f.tasks.snapshot(task_id).unwrap();
        assert!(snapshot.finished());
        assert_eq!(snapshot.error_count, 0);
        assert_eq!(
            snapshot.result_for("CP001").unwrap().response.as_deref(),
            Some("Rejected")
        );
        assert!(f
            .transactions
            .active_transaction_ids("CP001", 1)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn failing_exchange_records_a_task_error() {
        let f = fixture(SimulatedBehavior::Error).await;
        let task_id = f
            .tasks
            .create(CommandAction::RemoteStartTransaction, vec![target()]);
        f.channel
            .remote_start(OcppVersion::V16, &target(), task_id, 1, "TAG-1")
            .await
            .unwrap();

        tokio::time::sleep(Duration::from_millis(350)).await;
        let snapshot = f.tasks.snapshot(task_id).unwrap();
        assert!(snapshot.finished());
        assert_eq!(snapshot.error_count, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn silent_station_never_answers() {
        let f = fixture(SimulatedBehavior::Silent).await;
        let task_id = f
            .tasks
            .create(CommandAction::RemoteStartTransaction, vec![target()]);
        f.channel
            .remote_start(OcppVersion::V16, &target(), task_id, 1, "TAG-1")
            .await
            .unwrap();

        tokio::time::sleep(Duration::from_secs(60)).await;
        let snapshot = f.tasks.snapshot(task_id).unwrap();
        assert!(!snapshot.finished());
        assert_eq!(snapshot.error_count, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn accepted_stop_closes_the_transaction_and_frees_the_connector() {
        let f = fixture(SimulatedBehavior::Accept).await;
        let tx_id = f.transactions.next_id().await;
        f.transactions
            .insert_started(Transaction::new(tx_id, "CP001", 1, "TAG-1"))
            .await
            .unwrap();
        f.charge_points
            .update_connector_status("CP001", 1, ConnectorStatus::Charging, Utc::now())
            .await
            .unwrap();

        let task_id = f
            .tasks
            .create(CommandAction::RemoteStopTransaction, vec![target()]);
        f.channel
            .remote_stop(OcppVersion::V16, &target(), task_id, tx_id)
            .await
            .unwrap();

        tokio::time::sleep(Duration::from_secs(1)).await;
        let snapshot = f.tasks.snapshot(task_id).unwrap();
        assert_eq!(
            snapshot.result_for("CP001").unwrap().response.as_deref(),
            Some("Accepted")
        );

        let stopped = f.transactions.find_by_id(tx_id).await.unwrap().unwrap();
        assert!(!stopped.is_active());
        assert_eq!(stopped.stop_reason.as_deref(), Some("Remote"));

        let cp = f.charge_points.find_by_id("CP001").await.unwrap().unwrap();
        assert_eq!(
            cp.get_connector(1).map(|c| c.status.clone()),
            Some(ConnectorStatus::Available)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn stop_of_an_unknown_transaction_is_rejected_by_the_station() {
        let f = fixture(SimulatedBehavior::Accept).await;
        let task_id = f
            .tasks
            .create(CommandAction::RemoteStopTransaction, vec![target()]);
        f.channel
            .remote_stop(OcppVersion::V16, &target(), task_id, 404)
            .await
            .unwrap();

        tokio::time::sleep(Duration::from_millis(350)).await;
        let snapshot = f.tasks.snapshot(task_id).unwrap();
        assert!(snapshot.finished());
        assert_eq!(snapshot.error_count, 0);
        assert_eq!(
            snapshot.result_for("CP001").unwrap().response.as_deref(),
            Some("Rejected")
        );
    }

    #[test]
    fn behavior_parsing_is_case_insensitive() {
        assert_eq!(
            SimulatedBehavior::parse("Accept"),
            Some(SimulatedBehavior::Accept)
        );
        assert_eq!(
            SimulatedBehavior::parse("SILENT"),
            Some(SimulatedBehavior::Silent)
        );
        assert_eq!(SimulatedBehavior::parse("explode"), None);
    }
}
