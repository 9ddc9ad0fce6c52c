//! OCPP session dispatch service entry point.
//!
//! Wires the in-memory stores, the simulated station channel and the
//! REST API together. Reads configuration from a TOML file
//! (`~/.config/ocpp-dispatch/config.toml` by default).

use std::sync::Arc;

use metrics_exporter_prometheus::PrometheusBuilder;
use tracing::{error, info, warn};

use ocpp_dispatch::application::commands::create_task_store;
use ocpp_dispatch::application::services::TaskRetention;
use ocpp_dispatch::application::{SessionService, VersionedInvoker};
use ocpp_dispatch::config::AppConfig;
use ocpp_dispatch::domain::{ChargePoint, ChargePointRepository, OcppProtocol, OcppTagRepository};
use ocpp_dispatch::infrastructure::memory::{
    InMemoryChargePoints, InMemoryOcppTags, InMemoryTransactions,
};
use ocpp_dispatch::infrastructure::shutdown::{listen_for_shutdown_signals, ShutdownSignal};
use ocpp_dispatch::infrastructure::simulator::{SimulatedBehavior, SimulatedCommandChannel};
use ocpp_dispatch::{create_api_router, default_config_path};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // ── Load configuration ─────────────────────────────────────
    let config_path = std::env::var("OCPP_DISPATCH_CONFIG")
        .map(std::path::PathBuf::from)
        .unwrap_or_else(|_| default_config_path());
    let cfg = match AppConfig::load(&config_path) {
        Ok(cfg) => {
            // Initialize logging with configured level
            tracing_subscriber::fmt()
                .with_env_filter(
                    tracing_subscriber::EnvFilter::try_from_default_env()
                        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cfg.logging.level)),
                )
                .init();
            info!("Configuration loaded from {}", config_path.display());
            cfg
        }
        Err(e) => {
            tracing_subscriber::fmt()
                .with_env_filter(tracing_subscriber::EnvFilter::new("info"))
                .init();
            error!("Failed to load config: {}. Using defaults.", e);
            AppConfig::default()
        }
    };

    info!("Starting OCPP session dispatch service...");

    // ── Prometheus metrics recorder (must be installed before any metrics calls) ──
    let prometheus_handle = PrometheusBuilder::new()
        .install_recorder()
        .expect("Failed to install Prometheus metrics recorder");
    info!("📊 Prometheus metrics recorder installed");

    // ── Stores and command infrastructure ──────────────────────
    let charge_points = Arc::new(InMemoryChargePoints::new());
    let transactions = Arc::new(InMemoryTransactions::new());
    let ocpp_tags = Arc::new(InMemoryOcppTags::new());
    let tasks = create_task_store();

    let behavior = SimulatedBehavior::parse(&cfg.simulator.behavior).unwrap_or_else(|| {
        warn!(
            configured = cfg.simulator.behavior.as_str(),
            "Unknown simulator behavior, falling back to accept"
        );
        SimulatedBehavior::Accept
    });
    let channel = Arc::new(SimulatedCommandChannel::new(
        tasks.clone(),
        transactions.clone(),
        charge_points.clone(),
        behavior,
        cfg.simulator.answer_delay(),
    ));
    info!(%behavior, delay_ms = cfg.simulator.answer_delay_ms, "Simulated station channel ready");

    let settings = cfg.session.settings();
    let invoker = VersionedInvoker::over_channel(channel, tasks.clone());
    let sessions = Arc::new(SessionService::new(
        charge_points.clone(),
        transactions.clone(),
        invoker,
        tasks.clone(),
        settings,
    ));

    // ── Shutdown handling and retention sweeper ────────────────
    let shutdown = ShutdownSignal::new();
    tokio::spawn(listen_for_shutdown_signals(shutdown.clone()));

    let sweeper = TaskRetention::new(tasks, cfg.session.retention());
    let sweeper_handle = sweeper.start(shutdown.clone());

    seed_demo_fleet(&charge_points, &ocpp_tags).await;

    // ── REST API server ────────────────────────────────────────
    let router = create_api_router(
        sessions.clone(),
        charge_points,
        transactions,
        ocpp_tags,
        settings,
        prometheus_handle,
    );

    let addr = cfg.server.address();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("REST API server listening on http://{}", addr);
    info!("Swagger UI available at http://{}/docs/", addr);

    info!("🚀 Service started. Press Ctrl+C to shutdown gracefully.");

    let serve_shutdown = shutdown.clone();
    axum::serve(listener, router)
        .with_graceful_shutdown(async move {
            serve_shutdown.wait().await;
            info!("🛑 REST API server received shutdown signal");
        })
        .await?;

    // ── Final cleanup ──────────────────────────────────────────
    sessions.drain();
    if tokio::time::timeout(cfg.server.shutdown_timeout(), sweeper_handle)
        .await
        .is_err()
    {
        warn!("Retention sweeper did not stop within the grace period");
    }

    info!("👋 OCPP session dispatch shutdown complete");
    Ok(())
}

/// Register a small simulated fleet so the API is usable out of the box.
async fn seed_demo_fleet(charge_points: &InMemoryChargePoints, ocpp_tags: &InMemoryOcppTags) {
    let mut soap_station = ChargePoint::new("CP002", OcppProtocol::V15_SOAP);
    soap_station.endpoint_address = Some("http://192.168.0.42:8455/ocpp".to_string());

    for cp in [ChargePoint::new("CP001", OcppProtocol::V16_JSON), soap_station] {
        let id = cp.id.clone();
        if let Err(e) = charge_points.save(cp).await {
            warn!("Failed to register demo charge point {}: {}", id, e);
        }
    }

    for tag in ["DEMO-TAG-1", "DEMO-TAG-2"] {
        if let Err(e) = ocpp_tags.add(tag.to_string()).await {
            warn!("Failed to register demo id tag {}: {}", tag, e);
        }
    }

    info!("Demo fleet registered: CP001 (ocpp1.6J), CP002 (ocpp1.5S)");
}
