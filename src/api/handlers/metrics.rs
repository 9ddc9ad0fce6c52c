//! Prometheus metrics handler
//!
//! Exposes `GET /metrics` returning Prometheus text format.
//! The handler reads from the global `metrics-exporter-prometheus`
//! recorder installed at startup.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use metrics_exporter_prometheus::PrometheusHandle;

/// Shared state for the metrics endpoint
#[derive(Clone)]
pub struct MetricsState {
    pub handle: PrometheusHandle,
}

/// `GET /metrics` — Prometheus scrape endpoint (no auth)
#[utoipa::path(
    get,
    path = "/metrics",
    tag = "Metrics",
    responses(
        (status = 200, description = "Metrics in Prometheus text format", content_type = "text/plain")
    )
)]
pub async fn render_metrics(State(state): State<MetricsState>) -> impl IntoResponse {
    let body = state.handle.render();
    (
        StatusCode::OK,
        [("content-type", "text/plain; version=0.0.4; charset=utf-8")],
        body,
    )
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    use axum::body::Body;
    use axum::http::Request;
    use axum::routing::get;
    use axum::Router;
    use metrics_exporter_prometheus::PrometheusBuilder;

    #[tokio::test]
    async fn renders_prometheus_text() {
        // A local recorder; nothing is installed globally.
        let handle = PrometheusBuilder::new().build_recorder().handle();
        let state = MetricsState { handle };
        let app = Router::new()
            .route("/metrics", get(render_metrics))
            .with_state(state);

        use tower::Service;
        let mut svc = app.into_service();
        let resp = svc
            .call(
                Request::builder()
                    .uri("/metrics")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            resp.headers()["content-type"],
            "text/plain; version=0.0.4; charset=utf-8"
        );
    }
}
