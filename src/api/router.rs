//! API router with Swagger UI

use std::sync::Arc;
use std::time::Instant;

use axum::routing::{delete, get, post};
use axum::Router;
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::dto::*;
use crate::api::handlers::{charge_points, health, id_tags, metrics, transactions};
use crate::application::{SessionSettings, SharedSessionService};
use crate::domain::{ChargePointRepository, OcppTagRepository, TransactionRepository};

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        // Health
        health::health_check,
        // Metrics
        metrics::render_metrics,
        // Sessions
        transactions::start_session,
        transactions::await_session_started,
        transactions::stop_session,
        transactions::await_session_stopped,
        transactions::stop_session_detached,
        // Transactions
        transactions::get_transaction,
        transactions::list_active_transactions,
        transactions::list_transactions_for_tag,
        // Charge Points
        charge_points::list_charge_points,
        charge_points::charge_point_status,
        // Id Tags
        id_tags::list_id_tags,
        id_tags::register_id_tag,
    ),
    components(
        schemas(
            // Common
            ApiResponse<String>,
            // Sessions
            StartSessionRequest,
            StopSessionRequest,
            SessionAckDto,
            StartedSessionDto,
            // Transactions
            TransactionDto,
            // Charge Points
            ChargePointDto,
            ChargePointStatusDto,
            ConnectorStatusDto,
            // Health
            health::HealthResponse,
        )
    ),
    tags(
        (name = "Sessions", description = "Remote session control. Commands are dispatched over the station's stored OCPP protocol (1.5/1.6, SOAP/JSON) and each operation blocks until the chosen confirmation arrives or its deadline passes: the plain start/stop wait for the station's acknowledgement, the `/active` variants wait for the transaction record itself."),
        (name = "Transactions", description = "Charging session records. A transaction opens when the station reports StartTransaction and stays active until its stop timestamp is recorded."),
        (name = "Charge Points", description = "Registered stations with their protocol, last heartbeat and per-connector status as last reported."),
        (name = "Id Tags", description = "Known OCPP authorization tokens (RFID cards and the like). Registration only; tag lifecycle is managed elsewhere."),
        (name = "Health", description = "Service liveness for availability monitoring."),
        (name = "Metrics", description = "Prometheus scrape endpoint."),
    ),
    info(
        title = "OCPP Session Dispatch API",
        version = "0.1.0",
        description = "REST API for dispatching OCPP 1.5/1.6 remote start and stop commands and confirming their outcome.

## Confirmation model

Every command is asynchronous on the wire. The engine correlates a dispatch with one of two confirmation channels:
- **Acknowledgement**: the station's answer to the command itself (`Accepted`/`Rejected`).
- **Transaction record**: the session row the station produces later via StartTransaction/StopTransaction.

Operations block the request until the relevant confirmation arrives or the configured deadline passes. A station rejection maps to 400, a missing confirmation to 409, an unknown charge point to 422.

## Response format

All JSON responses use a standard envelope:
```json
{\"success\": true, \"data\": {...}}
```

On failure:
```json
{\"success\": false, \"data\": null, \"error\": \"description\"}
```",
        license(
            name = "MIT"
        )
    )
)]
pub struct ApiDoc;

/// Create the API router with all routes
pub fn create_api_router(
    sessions: SharedSessionService,
    charge_points: Arc<dyn ChargePointRepository>,
    transactions: Arc<dyn TransactionRepository>,
    ocpp_tags: Arc<dyn OcppTagRepository>,
    settings: SessionSettings,
    prometheus: PrometheusHandle,
) -> Router {
    let session_state = transactions::SessionAppState {
        sessions,
        transactions: transactions.clone(),
        settings,
    };

    // Session commands and transaction queries share one state.
    let tx_routes = Router::new()
        .route(
            "/",
            post(transactions::start_session).delete(transactions::stop_session_detached),
        )
        .route(
            "/active",
            post(transactions::await_session_started).get(transactions::list_active_transactions),
        )
        .route(
            "/{transaction_id}",
            get(transactions::get_transaction).delete(transactions::stop_session),
        )
        .route(
            "/active/{transaction_id}",
            delete(transactions::await_session_stopped),
        )
        .with_state(session_state.clone());

    let tag_query_routes = Router::new()
        .route(
            "/{id_tag}/transactions",
            get(transactions::list_transactions_for_tag),
        )
        .with_state(session_state);

    let charge_point_routes = Router::new()
        .route("/", get(charge_points::list_charge_points))
        .route(
            "/{charge_point_id}/status",
            get(charge_points::charge_point_status),
        )
        .with_state(charge_points::ChargePointAppState {
            charge_points: charge_points.clone(),
        });

    let id_tag_routes = Router::new()
        .route("/", get(id_tags::list_id_tags))
        .route("/{id_tag}", post(id_tags::register_id_tag))
        .with_state(id_tags::IdTagAppState { ocpp_tags });

    let health_routes = Router::new()
        .route("/health", get(health::health_check))
        .with_state(health::HealthState {
            started_at: Arc::new(Instant::now()),
            charge_points,
            transactions,
        });

    let metrics_routes = Router::new()
        .route("/metrics", get(metrics::render_metrics))
        .with_state(metrics::MetricsState { handle: prometheus });

    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let swagger_routes = SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi());

    Router::new()
        // Swagger UI
        .merge(swagger_routes)
        // Health + Metrics
        .merge(health_routes)
        .merge(metrics_routes)
        // Sessions and transactions
        .nest("/api/v1/transactions", tx_routes)
        .nest("/api/v1/tags", tag_query_routes)
        // Charge Points
        .nest("/api/v1/charge-points", charge_point_routes)
        // Id Tags
        .nest("/api/v1/id-tags", id_tag_routes)
        // Middleware
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use metrics_exporter_prometheus::PrometheusBuilder;

    use crate::application::commands::create_task_store;
    use crate::application::{SessionService, VersionedInvoker};
    use crate::domain::ChargePoint;
    use crate::domain::OcppProtocol;
    use crate::infrastructure::memory::{
        InMemoryChargePoints, InMemoryOcppTags, InMemoryTransactions,
    };
    use crate::infrastructure::simulator::{SimulatedBehavior, SimulatedCommandChannel};

    async fn full_router() -> Router {
        let tasks = create_task_store();
        let transactions = Arc::new(InMemoryTransactions::new());
        let charge_points = Arc::new(InMemoryChargePoints::new());
        charge_points
            .save(ChargePoint::new("CP001", OcppProtocol::V16_JSON))
            .await
            .unwrap();

        let channel = Arc::new(SimulatedCommandChannel::new(
            tasks.clone(),
            transactions.clone(),
            charge_points.clone(),
            SimulatedBehavior::Accept,
            Duration::from_millis(300),
        ));
        let invoker = VersionedInvoker::over_channel(channel, tasks.clone());
        let sessions = Arc::new(SessionService::new(
            charge_points.clone(),
            transactions.clone(),
            invoker,
            tasks,
            SessionSettings::default(),
        ));

        create_api_router(
            sessions,
            charge_points,
            transactions,
            Arc::new(InMemoryOcppTags::new()),
            SessionSettings::default(),
            PrometheusBuilder::new().build_recorder().handle(),
        )
    }

    async fn send(app: &Router, req: Request<Body>) -> axum::response::Response {
        use tower::Service;
        let mut svc = app.clone().into_service();
        svc.call(req).await.unwrap()
    }

    fn get_req(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn health_is_reachable() {
        let app = full_router().await;
        let resp = send(&app, get_req("/health")).await;
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[tokio::test(start_paused = true)]
    async fn openapi_document_is_served() {
        let app = full_router().await;
        let resp = send(&app, get_req("/api-doc/openapi.json")).await;
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[tokio::test(start_paused = true)]
    async fn metrics_are_served() {
        let app = full_router().await;
        let resp = send(&app, get_req("/metrics")).await;
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[tokio::test(start_paused = true)]
    async fn session_commands_flow_through_the_nested_routes() {
        let app = full_router().await;

        let req = Request::builder()
            .method("POST")
            .uri("/api/v1/transactions")
            .header("content-type", "application/json")
            .body(Body::from(
                serde_json::to_vec(&serde_json::json!({
                    "charge_point_id": "CP001",
                    "connector_id": 1,
                    "ocpp_id_tag": "TAG-1"
                }))
                .unwrap(),
            ))
            .unwrap();

        let resp = send(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[tokio::test(start_paused = true)]
    async fn unknown_routes_are_not_found() {
        let app = full_router().await;
        let resp = send(&app, get_req("/api/v1/nope")).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }
}
