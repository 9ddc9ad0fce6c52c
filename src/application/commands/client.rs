//! Version-tagged command client
//!
//! A dispatch registers the task first and then hands the command to the
//! channel. Delivery failures are recorded on the task rather than
//! returned, so the caller always gets a task id it can poll.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use super::task_store::SharedTaskStore;
use super::{
    ChargePointServiceClient, CommandAction, CommandChannel, RemoteStartParams, RemoteStopParams,
};
use crate::domain::OcppVersion;

/// Record command dispatch latency to Prometheus.
fn record_dispatch_latency(action: &'static str, start: std::time::Instant) {
    let duration = start.elapsed().as_secs_f64();
    metrics::histogram!("ocpp_dispatch_latency_seconds", "action" => action).record(duration);
    metrics::counter!("ocpp_dispatches_total", "action" => action).increment(1);
}

/// Command client bound to one protocol version.
pub struct OcppCommandClient {
    version: OcppVersion,
    channel: Arc<dyn CommandChannel>,
    tasks: SharedTaskStore,
}

impl OcppCommandClient {
    pub fn new(
        version: OcppVersion,
        channel: Arc<dyn CommandChannel>,
        tasks: SharedTaskStore,
    ) -> Self {
        Self {
            version,
            channel,
            tasks,
        }
    }
}

#[async_trait]
impl ChargePointServiceClient for OcppCommandClient {
    fn version(&self) -> OcppVersion {
        self.version
    }

    async fn remote_start_transaction(&self, params: RemoteStartParams) -> i32 {
        let task_id = self.tasks.create(
            CommandAction::RemoteStartTransaction,
            vec![params.target.clone()],
        );
        let start = std::time::Instant::now();
        info!(
            task_id,
            charge_point_id = params.target.charge_point_id.as_str(),
            connector_id = params.connector_id,
            version = %self.version,
            "Dispatching RemoteStartTransaction"
        );

        if let Err(err) = self
            .channel
            .remote_start(
                self.version,
                &params.target,
                task_id,
                params.connector_id,
                &params.id_tag,
            )
            .await
        {
            warn!(
                task_id,
                charge_point_id = params.target.charge_point_id.as_str(),
                error = %err,
                "RemoteStartTransaction delivery failed"
            );
            self.tasks
                .record_error(task_id, &params.target.charge_point_id, err.to_string());
        }

        record_dispatch_latency("remote_start", start);
        task_id
    }

    async fn remote_stop_transaction(&self, params: RemoteStopParams) -> i32 {
        let task_id = self.tasks.create(
            CommandAction::RemoteStopTransaction,
            vec![params.target.clone()],
        );
        let start = std::time::Instant::now();
        info!(
            task_id,
            charge_point_id = params.target.charge_point_id.as_str(),
            transaction_id = params.transaction_id,
            version = %self.version,
            "Dispatching RemoteStopTransaction"
        );

        if let Err(err) = self
            .channel
            .remote_stop(self.version, &params.target, task_id, params.transaction_id)
            .await
        {
            warn!(
                task_id,
                charge_point_id = params.target.charge_point_id.as_str(),
                error = %err,
                "RemoteStopTransaction delivery failed"
            );
            self.tasks
                .record_error(task_id, &params.target.charge_point_id, err.to_string());
        }

        record_dispatch_latency("remote_stop", start);
        task_id
    }
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::super::{create_task_store, ChannelError};
    use super::*;
    use crate::domain::{ChargePointSelect, OcppTransport};

    use std::sync::Mutex;

    fn target(id: &str) -> ChargePointSelect {
        ChargePointSelect {
            transport: OcppTransport::Json,
            charge_point_id: id.into(),
            endpoint_address: None,
        }
    }

    /// Channel that records every invocation and answers as configured.
    #[derive(Default)]
    struct RecordingChannel {
        fail_delivery: bool,
        calls: Mutex<Vec<(OcppVersion, String, i32)>>,
    }

    #[async_trait]
    impl CommandChannel for RecordingChannel {
        async fn remote_start(
            &self,
            version: OcppVersion,
            target: &ChargePointSelect,
            task_id: i32,
            _connector_id: u32,
            _id_tag: &str,
        ) -> Result<(), ChannelError> {
            self.calls.lock().unwrap().push((
                version,
                target.charge_point_id.clone(),
                task_id,
            ));
            if self.fail_delivery {
                Err(ChannelError::SendFailed("socket closed".into()))
            } else {
                Ok(())
            }
        }

        async fn remote_stop(
            &self,
            version: OcppVersion,
            target: &ChargePointSelect,
            task_id: i32,
            _transaction_id: i32,
        ) -> Result<(), ChannelError> {
            self.calls.lock().unwrap().push((
                version,
                target.charge_point_id.clone(),
                task_id,
            ));
            if self.fail_delivery {
                Err(ChannelError::SendFailed("socket closed".into()))
            } else {
                Ok(())
            }
        }
    }

    #[tokio::test]
    async fn dispatch_registers_task_before_delivery() {
        let tasks = create_task_store();
        let channel = Arc::new(RecordingChannel::default());
        let client = OcppCommandClient::new(OcppVersion::V16, channel.clone(), tasks.clone());

        let task_id = client
            .remote_start_transaction(RemoteStartParams {
                target: target("CP001"),
                connector_id: 1,
                id_tag: "TAG-001".into(),
            })
            .await;

        let task = tasks.snapshot(task_id).unwrap();
        assert!(!task.finished());
        assert_eq!(task.targets.len(), 1);

        let calls = channel.calls.lock().unwrap();
        assert_eq!(calls.as_slice(), &[(OcppVersion::V16, "CP001".into(), task_id)]);
    }

    #[tokio::test]
    async fn delivery_failure_is_recorded_as_task_error() {
        let tasks = create_task_store();
        let channel = Arc::new(RecordingChannel {
            fail_delivery: true,
            ..Default::default()
        });
        let client = OcppCommandClient::new(OcppVersion::V15, channel, tasks.clone());

        let task_id = client
            .remote_stop_transaction(RemoteStopParams {
                target: target("CP002"),
                transaction_id: 9,
            })
            .await;

        let task = tasks.snapshot(task_id).unwrap();
        assert!(task.finished());
        assert_eq!(task.error_count, 1);
        assert!(task
            .result_for("CP002")
            .unwrap()
            .error_message
            .as_deref()
            .unwrap()
            .contains("socket closed"));
    }

    #[tokio::test]
    async fn client_passes_its_version_to_the_channel() {
        let tasks = create_task_store();
        let channel = Arc::new(RecordingChannel::default());
        let client = OcppCommandClient::new(OcppVersion::V15, channel.clone(), tasks);

        client
            .remote_start_transaction(RemoteStartParams {
                target: target("CP003"),
                connector_id: 2,
                id_tag: "TAG-002".into(),
            })
            .await;

        let calls = channel.calls.lock().unwrap();
        assert_eq!(calls[0].0, OcppVersion::V15);
    }
}
