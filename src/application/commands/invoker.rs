//! Version dispatch
//!
//! Every dispatch goes through exactly one of the two version clients.
//! The version enum is closed, so a decodable protocol always maps to a
//! client; undecodable stored values are rejected before this point.

use std::sync::Arc;

use super::task_store::SharedTaskStore;
use super::{ChargePointServiceClient, CommandChannel, OcppCommandClient};
use crate::domain::OcppVersion;

/// Pair of version-specific command clients.
pub struct VersionedInvoker {
    v15: Arc<dyn ChargePointServiceClient>,
    v16: Arc<dyn ChargePointServiceClient>,
}

impl VersionedInvoker {
    pub fn new(
        v15: Arc<dyn ChargePointServiceClient>,
        v16: Arc<dyn ChargePointServiceClient>,
    ) -> Self {
        Self { v15, v16 }
    }

    /// Standard wiring: one command client per version over a shared
    /// channel and task store.
    pub fn over_channel(channel: Arc<dyn CommandChannel>, tasks: SharedTaskStore) -> Self {
        Self::new(
            Arc::new(OcppCommandClient::new(
                OcppVersion::V15,
                channel.clone(),
                tasks.clone(),
            )),
            Arc::new(OcppCommandClient::new(OcppVersion::V16, channel, tasks)),
        )
    }

    /// Client for the given protocol version.
    pub fn select(&self, version: OcppVersion) -> &dyn ChargePointServiceClient {
        match version {
            OcppVersion::V15 => self.v15.as_ref(),
            OcppVersion::V16 => self.v16.as_ref(),
        }
    }
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::super::{RemoteStartParams, RemoteStopParams};
    use super::*;
    use crate::domain::{ChargePointSelect, OcppTransport};

    use std::sync::atomic::{AtomicU32, Ordering};

    use async_trait::async_trait;

    /// Counts dispatches without delivering anything.
    struct CountingClient {
        version: OcppVersion,
        starts: AtomicU32,
        stops: AtomicU32,
    }

    impl CountingClient {
        fn new(version: OcppVersion) -> Arc<Self> {
            Arc::new(Self {
                version,
                starts: AtomicU32::new(0),
                stops: AtomicU32::new(0),
            })
        }
    }

    #[async_trait]
    impl ChargePointServiceClient for CountingClient {
        fn version(&self) -> OcppVersion {
            self.version
        }

        async fn remote_start_transaction(&self, _params: RemoteStartParams) -> i32 {
            self.starts.fetch_add(1, Ordering::SeqCst);
            1
        }

        async fn remote_stop_transaction(&self, _params: RemoteStopParams) -> i32 {
            self.stops.fetch_add(1, Ordering::SeqCst);
            1
        }
    }

    fn params() -> RemoteStartParams {
        RemoteStartParams {
            target: ChargePointSelect {
                transport: OcppTransport::Soap,
                charge_point_id: "CP001".into(),
                endpoint_address: Some("http://cp001.example/ocpp".into()),
            },
            connector_id: 1,
            id_tag: "TAG-001".into(),
        }
    }

    #[tokio::test]
    async fn v15_dispatch_touches_only_the_v15_client() {
        let v15 = CountingClient::new(OcppVersion::V15);
        let v16 = CountingClient::new(OcppVersion::V16);
        let invoker = VersionedInvoker::new(v15.clone(), v16.clone());

        invoker
            .select(OcppVersion::V15)
            .remote_start_transaction(params())
            .await;

        assert_eq!(v15.starts.load(Ordering::SeqCst), 1);
        assert_eq!(v16.starts.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn v16_dispatch_touches_only_the_v16_client() {
        let v15 = CountingClient::new(OcppVersion::V15);
        let v16 = CountingClient::new(OcppVersion::V16);
        let invoker = VersionedInvoker::new(v15.clone(), v16.clone());

        invoker
            .select(OcppVersion::V16)
            .remote_stop_transaction(RemoteStopParams {
                target: ChargePointSelect {
                    transport: OcppTransport::Json,
                    charge_point_id: "CP002".into(),
                    endpoint_address: None,
                },
                transaction_id: 4,
            })
            .await;

        assert_eq!(v16.stops.load(Ordering::SeqCst), 1);
        assert_eq!(v15.stops.load(Ordering::SeqCst), 0);
        assert_eq!(v15.starts.load(Ordering::SeqCst), 0);
    }
}
