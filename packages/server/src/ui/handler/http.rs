//! HTTP API handlers (health check and room observability).

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use crate::domain::RoomId;
use crate::infrastructure::dto::http::{RoomDetailDto, RoomSummaryDto};

use super::super::state::AppState;

/// Health check endpoint
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

/// Get list of active rooms
pub async fn get_rooms(State(state): State<Arc<AppState>>) -> Json<Vec<RoomSummaryDto>> {
    let rooms = state.query_rooms_usecase.rooms().await;
    Json(rooms.iter().map(Into::into).collect())
}

/// Get room detail by ID
pub async fn get_room_detail(
    State(state): State<Arc<AppState>>,
    Path(room_id): Path<String>,
) -> Result<Json<RoomDetailDto>, StatusCode> {
    let room_id = RoomId::new(room_id).map_err(|_| StatusCode::BAD_REQUEST)?;

    match state.query_rooms_usecase.room_detail(&room_id).await {
        Some(room) => Ok(Json((&room).into())),
        None => Err(StatusCode::NOT_FOUND),
    }
}
