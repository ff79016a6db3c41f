use axum::{
    extract::{Json, Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use uuid::Uuid;

use crate::{
    AppState,
    error::AppResult,
    models::{Event, EventPatch},
    routes::document::{apply_patch, create_validated, delete_or_404, find_or_404},
    utils::success_to_api_response,
};

const NOT_FOUND: &str = "Event not found";

// 活动接口不做认证

#[axum::debug_handler]
pub async fn list_events(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let events = state.store.events.list().await?;
    Ok((StatusCode::OK, success_to_api_response(events)))
}

#[axum::debug_handler]
pub async fn get_event(
    State(state): State<AppState>,
    Path(event_id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    let event = find_or_404(state.store.events.as_ref(), event_id, NOT_FOUND).await?;
    Ok((StatusCode::OK, success_to_api_response(event)))
}

#[axum::debug_handler]
pub async fn create_event(
    State(state): State<AppState>,
    Json(event): Json<Event>,
) -> AppResult<impl IntoResponse> {
    let event = create_validated(state.store.events.as_ref(), event).await?;
    Ok((StatusCode::CREATED, success_to_api_response(event)))
}

#[axum::debug_handler]
pub async fn update_event(
    State(state): State<AppState>,
    Path(event_id): Path<Uuid>,
    Json(patch): Json<EventPatch>,
) -> AppResult<impl IntoResponse> {
    let event = apply_patch(state.store.events.as_ref(), event_id, patch, NOT_FOUND).await?;
    Ok((StatusCode::OK, success_to_api_response(event)))
}

#[axum::debug_handler]
pub async fn delete_event(
    State(state): State<AppState>,
    Path(event_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    delete_or_404(state.store.events.as_ref(), event_id, NOT_FOUND).await?;
    Ok(StatusCode::NO_CONTENT)
}
