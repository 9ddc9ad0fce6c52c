//! Id tag API handlers
//!
//! The dispatch engine only keeps the set of known tags; full tag
//! lifecycle (expiry, blocking, parent tags) is outside this service.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use tracing::info;

use crate::api::dto::ApiResponse;
use crate::domain::OcppTagRepository;

/// Id tag registry state
#[derive(Clone)]
pub struct IdTagAppState {
    pub ocpp_tags: Arc<dyn OcppTagRepository>,
}

/// List known id tags
#[utoipa::path(
    get,
    path = "/api/v1/id-tags",
    tag = "Id Tags",
    responses(
        (status = 200, description = "Known OCPP id tags, sorted", body = ApiResponse<Vec<String>>)
    )
)]
pub async fn list_id_tags(
    State(state): State<IdTagAppState>,
) -> Result<Json<ApiResponse<Vec<String>>>, (StatusCode, Json<ApiResponse<Vec<String>>>)> {
    match state.ocpp_tags.id_tags().await {
        Ok(tags) => Ok(Json(ApiResponse::success(tags))),
        Err(e) => Err((
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiResponse::error(e.to_string())),
        )),
    }
}

/// Register an id tag
///
/// Registration is idempotent: a tag that already exists answers 200,
/// a new one 201.
#[utoipa::path(
    post,
    path = "/api/v1/id-tags/{id_tag}",
    tag = "Id Tags",
    params(
        ("id_tag" = String, Path, description = "OCPP id tag, 1 to 20 characters")
    ),
    responses(
        (status = 201, description = "Tag registered", body = ApiResponse<String>),
        (status = 200, description = "Tag was already known", body = ApiResponse<String>),
        (status = 400, description = "Tag does not fit the OCPP length limits")
    )
)]
pub async fn register_id_tag(
    State(state): State<IdTagAppState>,
    Path(id_tag): Path<String>,
) -> Result<(StatusCode, Json<ApiResponse<String>>), (StatusCode, Json<ApiResponse<String>>)> {
    if id_tag.is_empty() || id_tag.len() > 20 {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::error("Id tag must be 1 to 20 characters")),
        ));
    }

    match state.ocpp_tags.add(id_tag.clone()).await {
        Ok(true) => {
            info!(id_tag = id_tag.as_str(), "Id tag registered");
            Ok((StatusCode::CREATED, Json(ApiResponse::success(id_tag))))
        }
        Ok(false) => Ok((StatusCode::OK, Json(ApiResponse::success(id_tag)))),
        Err(e) => Err((
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiResponse::error(e.to_string())),
        )),
    }
}

// ── Tests ──────────────────────────────────────────────────────
