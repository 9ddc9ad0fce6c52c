//! Charge point API handlers

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;

use crate::api::dto::{ApiResponse, ChargePointDto, ChargePointStatusDto};
use crate::domain::{ChargePointRepository, DispatchError};

/// Charge point registry state
#[derive(Clone)]
pub struct ChargePointAppState {
    pub charge_points: Arc<dyn ChargePointRepository>,
}

/// List registered charge points
///
/// Returns every known station with its stored protocol, endpoint
/// address and last reported connector statuses.
#[utoipa::path(
    get,
    path = "/api/v1/charge-points",
    tag = "Charge Points",
    responses(
        (status = 200, description = "Registered charge points", body = ApiResponse<Vec<ChargePointDto>>)
    )
)]
pub async fn list_charge_points(
    State(state): State<ChargePointAppState>,
) -> Result<
    Json<ApiResponse<Vec<ChargePointDto>>>,
    (StatusCode, Json<ApiResponse<Vec<ChargePointDto>>>),
> {
    match state.charge_points.find_all().await {
        Ok(charge_points) => {
            let dtos: Vec<ChargePointDto> = charge_points
                .into_iter()
                .map(ChargePointDto::from_domain)
                .collect();
            Ok(Json(ApiResponse::success(dtos)))
        }
        Err(e) => Err((
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiResponse::error(e.to_string())),
        )),
    }
}

/// Charge point status
///
/// Returns the last heartbeat and the per-connector statuses for one
/// station. Statuses reflect what the station last reported; an idle
/// record is not evidence the station is reachable.
#[utoipa::path(
    get,
    path = "/api/v1/charge-points/{charge_point_id}/status",
    tag = "Charge Points",
    params(
        ("charge_point_id" = String, Path, description = "Charge point id")
    ),
    responses(
        (status = 200, description = "Heartbeat and connector statuses", body = ApiResponse<ChargePointStatusDto>),
        (status = 422, description = "Unknown charge point")
    )
)]
pub async fn charge_point_status(
    State(state): State<ChargePointAppState>,
    Path(charge_point_id): Path<String>,
) -> Result<Json<ApiResponse<ChargePointStatusDto>>, (StatusCode, Json<ApiResponse<ChargePointStatusDto>>)>
{
    match state.charge_points.find_by_id(&charge_point_id).await {
        Ok(Some(cp)) => Ok(Json(ApiResponse::success(ChargePointStatusDto::from_domain(
            cp,
        )))),
        Ok(None) => Err((
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(ApiResponse::error(
                DispatchError::UnknownChargePoint(charge_point_id).to_string(),
            )),
        )),
        Err(e) => Err((
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiResponse::error(e.to_string())),
        )),
    }
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    use axum::body::Body;
    use axum::http::Request;
    use axum::routing::get;
    use axum::Router;
    use chrono::Utc;

    use crate::domain::{ChargePoint, ConnectorStatus, OcppProtocol};
    use crate::infrastructure::memory::InMemoryChargePoints;

    async fn app_with(charge_points: Arc<InMemoryChargePoints>) -> Router {
        let state = ChargePointAppState {
            charge_points,
        };
        Router::new()
            .route("/api/v1/charge-points", get(list_charge_points))
            .route(
                "/api/v1/charge-points/{charge_point_id}/status",
                get(charge_point_status),
            )
            .with_state(state)
    }

    async fn send(app: &Router, uri: &str) -> axum::response::Response {
        use tower::Service;
        let mut svc = app.clone().into_service();
        let req = Request::builder().uri(uri).body(Body::empty()).unwrap();
        svc.call(req).await.unwrap()
    }

    async fn body_json(resp: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn listing_returns_every_registered_station() {
        let repo = Arc::new(InMemoryChargePoints::new());
        repo.save(ChargePoint::new("CP002", OcppProtocol::V15_SOAP))
            .await
            .unwrap();
        repo.save(ChargePoint::new("CP001", OcppProtocol::V16_JSON))
            .await
            .unwrap();
        let app = app_with(repo).await;

        let resp = send(&app, "/api/v1/charge-points").await;

        assert_eq!(resp.status(), StatusCode::OK);
        let body = body_json(resp).await;
        let items = body["data"].as_array().unwrap();
        assert_eq!(items.len(), 2);
        // The registry lists stations in id order.
        assert_eq!(items[0]["charge_point_id"], serde_json::json!("CP001"));
        assert_eq!(items[0]["ocpp_protocol"], serde_json::json!("ocpp1.6J"));
        assert_eq!(items[1]["charge_point_id"], serde_json::json!("CP002"));
    }

    #[tokio::test]
    async fn status_reports_heartbeat_and_connectors() {
        let repo = Arc::new(InMemoryChargePoints::new());
        repo.save(ChargePoint::new("CP001", OcppProtocol::V16_JSON))
            .await
            .unwrap();
        let seen = Utc::now();
        repo.update_heartbeat("CP001", seen).await.unwrap();
        repo.update_connector_status("CP001", 1, ConnectorStatus::Charging, seen)
            .await
            .unwrap();
        let app = app_with(repo).await;

        let resp = send(&app, "/api/v1/charge-points/CP001/status").await;

        assert_eq!(resp.status(), StatusCode::OK);
        let body = body_json(resp).await;
        assert!(body["data"]["last_heartbeat"].is_string());
        let connectors = body["data"]["connectors"].as_array().unwrap();
        assert_eq!(connectors.len(), 1);
        assert_eq!(connectors[0]["connector_id"], serde_json::json!(1));
        assert_eq!(connectors[0]["status"], serde_json::json!("Charging"));
    }

    #[tokio::test]
    async fn status_of_an_unknown_station_is_unprocessable() {
        let app = app_with(Arc::new(InMemoryChargePoints::new())).await;

        let resp = send(&app, "/api/v1/charge-points/CP404/status").await;

        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body = body_json(resp).await;
        assert_eq!(
            body["error"],
            serde_json::json!("Charge point is missing: CP404")
        );
    }

    #[tokio::test]
    async fn fresh_station_has_no_heartbeat_yet() {
        let repo = Arc::new(InMemoryChargePoints::new());
        repo.save(ChargePoint::new("CP001", OcppProtocol::V16_JSON))
            .await
            .unwrap();
        let app = app_with(repo).await;

        let resp = send(&app, "/api/v1/charge-points/CP001/status").await;

        assert_eq!(resp.status(), StatusCode::OK);
        let body = body_json(resp).await;
        assert!(body["data"]["last_heartbeat"].is_null());
        assert!(body["data"]["connectors"].as_array().unwrap().is_empty());
    }
}
