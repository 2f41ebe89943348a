use crate::{
    errors::AppError,
    models::CreateTrophyRequest,
    AppState,
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::json;
use std::sync::Arc;
use tracing;
use uuid::Uuid;

/// Liveness probe.
pub async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

pub async fn list_trophies(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, AppError> {
    let trophies = state.trophy_repo.list_all().await?;
    tracing::debug!("Handler retrieved {} trophies", trophies.len());
    Ok(Json(trophies))
}

pub async fn create_trophy(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateTrophyRequest>,
) -> Result<impl IntoResponse, AppError> {
    let new = payload.validate()?;
    let trophy = state.trophy_repo.create(new).await?;

    tracing::info!(trophy_id = %trophy.id, "Trophy created successfully via handler");
    Ok((StatusCode::CREATED, Json(trophy)))
}

pub async fn delete_trophy(
    State(state): State<Arc<AppState>>,
    Path(id_str): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    // Validate UUID format before touching the store
    let trophy_id = Uuid::parse_str(&id_str)?;
    tracing::debug!(%trophy_id, "Deleting trophy via handler");

    let deleted = state.trophy_repo.delete_by_id(trophy_id).await?;

    tracing::info!(trophy_id = %deleted.id, "Trophy deleted successfully via handler");
    Ok(Json(json!({ "message": "Deleted Trophy" })))
}

/// Fallback for unmatched routes.
pub async fn route_not_found() -> AppError {
    AppError::RouteNotFound
}
