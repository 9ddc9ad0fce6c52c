//! Transaction domain entity

use chrono::{DateTime, Utc};

/// Charging transaction
///
/// A transaction is active exactly as long as it has no stop timestamp.
/// Meter values are kept as the raw strings the station reports; the
/// engine never does arithmetic on them.
#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    /// Unique transaction ID
    pub id: i32,
    /// Charge point the transaction runs on
    pub charge_point_id: String,
    /// Connector ID
    pub connector_id: u32,
    /// ID tag that started the transaction
    pub ocpp_id_tag: String,
    /// When the transaction started
    pub start_timestamp: DateTime<Utc>,
    /// Meter reading at start, as reported
    pub start_value: Option<String>,
    /// When the transaction stopped; `None` while active
    pub stop_timestamp: Option<DateTime<Utc>>,
    /// Meter reading at stop, as reported
    pub stop_value: Option<String>,
    /// Stop reason reported by the station
    pub stop_reason: Option<String>,
}

impl Transaction {
    pub fn new(
        id: i32,
        charge_point_id: impl Into<String>,
        connector_id: u32,
        ocpp_id_tag: impl Into<String>,
    ) -> Self {
        Self {
            id,
            charge_point_id: charge_point_id.into(),
            connector_id,
            ocpp_id_tag: ocpp_id_tag.into(),
            start_timestamp: Utc::now(),
            start_value: None,
            stop_timestamp: None,
            stop_value: None,
            stop_reason: None,
        }
    }

    /// Active means the stop timestamp has not been recorded yet.
    pub fn is_active(&self) -> bool {
        self.stop_timestamp.is_none()
    }

    pub fn stop(&mut self, at: DateTime<Utc>, stop_value: Option<String>, reason: Option<String>) {
        self.stop_timestamp = Some(at);
        self.stop_value = stop_value;
        self.stop_reason = reason;
    }
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_tx() -> Transaction {
        Transaction::new(1, "CP001", 1, "TAG-001")
    }

    #[test]
    fn new_transaction_is_active() {
        let tx = sample_tx();
        assert!(tx.is_active());
        assert!(tx.stop_timestamp.is_none());
        assert!(tx.stop_value.is_none());
    }

    #[test]
    fn stop_clears_active() {
        let mut tx = sample_tx();
        tx.stop(Utc::now(), Some("5000".into()), Some("Remote".into()));
        assert!(!tx.is_active());
        assert_eq!(tx.stop_value.as_deref(), Some("5000"));
        assert_eq!(tx.stop_reason.as_deref(), Some("Remote"));
    }

    #[test]
    fn active_is_driven_by_stop_timestamp_alone() {
        let mut tx = sample_tx();
        // A stop value without a timestamp does not end the transaction.
        tx.stop_value = Some("4000".into());
        assert!(tx.is_active());
        tx.stop_timestamp = Some(Utc::now());
        assert!(!tx.is_active());
    }
}
