//! Transaction correlation waiter
//!
//! The command acknowledgement only says the station accepted the request.
//! Whether a transaction actually opened or closed shows up later, through
//! the station's own transaction notifications. This waiter watches the
//! transaction records for that evidence.

use std::sync::Arc;

use tracing::warn;

use super::super::polling::{timed_poll, PollOutcome, PollSettings};
use crate::domain::{Transaction, TransactionRepository};

/// Polls the transaction records until a start or stop becomes visible.
pub struct TransactionWaiter {
    transactions: Arc<dyn TransactionRepository>,
    start_settings: PollSettings,
    stop_settings: PollSettings,
}

impl TransactionWaiter {
    pub fn new(
        transactions: Arc<dyn TransactionRepository>,
        start_settings: PollSettings,
        stop_settings: PollSettings,
    ) -> Self {
        Self {
            transactions,
            start_settings,
            stop_settings,
        }
    }

    /// Wait until a transaction opens on the given connector and return
    /// its id.
    ///
    /// Takes the first id of the ascending active set, so the answer is
    /// deterministic even when several transactions are active at once.
    pub async fn await_started(
        &self,
        charge_point_id: &str,
        connector_id: u32,
    ) -> PollOutcome<i32> {
        let repo = self.transactions.clone();
        let charge_point = charge_point_id.to_string();

        let outcome = timed_poll(
            self.start_settings,
            move || {
                let repo = repo.clone();
                let charge_point = charge_point.clone();
                async move {
                    match repo.active_transaction_ids(&charge_point, connector_id).await {
                        Ok(ids) => ids.into_iter().next(),
                        Err(err) => {
                            warn!(
                                charge_point_id = charge_point.as_str(),
                                connector_id,
                                error = %err,
                                "Active transaction query failed, treating as not started yet"
                            );
                            None
                        }
                    }
                }
            },
            |first| first.is_some(),
            // Correlation has no error channel, the station either writes
            // the record in time or it does not.
            |_| false,
            |first| first,
            |_| String::new(),
            "transaction_start",
        )
        .await;

        match outcome {
            PollOutcome::Success(Some(id)) => PollOutcome::Success(id),
            PollOutcome::Success(None) | PollOutcome::TimedOut => PollOutcome::TimedOut,
            PollOutcome::Rejected(reason) => PollOutcome::Rejected(reason),
        }
    }

    /// Wait until the transaction's stop timestamp is recorded and return
    /// the final record.
    pub async fn await_stopped(&self, transaction_id: i32) -> PollOutcome<Transaction> {
        let repo = self.transactions.clone();

        let outcome = timed_poll(
            self.stop_settings,
            move || {
                let repo = repo.clone();
                async move {
                    match repo.find_by_id(transaction_id).await {
                        Ok(tx) => tx.filter(|t| t.stop_timestamp.is_some()),
                        Err(err) => {
                            warn!(
                                transaction_id,
                                error = %err,
                                "Transaction lookup failed, treating as not stopped yet"
                            );
                            None
                        }
                    }
                }
            },
            |tx| tx.is_some(),
            |_| false,
            |tx| tx,
            |_| String::new(),
            "transaction_stop",
        )
        .await;

        match outcome {
            PollOutcome::Success(Some(tx)) => PollOutcome::Success(tx),
            PollOutcome::Success(None) | PollOutcome::TimedOut => PollOutcome::TimedOut,
            PollOutcome::Rejected(reason) => PollOutcome::Rejected(reason),
        }
    }
}

// ── Tests ──────────────────────────────────────────────────────
