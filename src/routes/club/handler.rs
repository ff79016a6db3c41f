use axum::{
    extract::{Extension, Json, Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Serialize;
use uuid::Uuid;

use crate::{
    AppState,
    error::AppResult,
    middleware::{CurrentUser, require_admin},
    models::{Club, ClubPatch},
    routes::document::{apply_patch, create_validated, delete_or_404, find_or_404},
    utils::success_to_api_response,
};

const NOT_FOUND: &str = "Club not found";

#[derive(Debug, Serialize)]
pub struct DeleteClubResponse {
    pub message: String,
}

#[axum::debug_handler]
pub async fn list_clubs(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let clubs = state.store.clubs.list().await?;
    Ok((StatusCode::OK, success_to_api_response(clubs)))
}

#[axum::debug_handler]
pub async fn get_club(
    State(state): State<AppState>,
    Path(club_id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    let club = find_or_404(state.store.clubs.as_ref(), club_id, NOT_FOUND).await?;
    Ok((StatusCode::OK, success_to_api_response(club)))
}

#[axum::debug_handler]
pub async fn create_club(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Json(club): Json<Club>,
) -> AppResult<impl IntoResponse> {
    require_admin(&user)?;
    let club = create_validated(state.store.clubs.as_ref(), club).await?;
    Ok((StatusCode::CREATED, success_to_api_response(club)))
}

#[axum::debug_handler]
pub async fn update_club(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(club_id): Path<Uuid>,
    Json(patch): Json<ClubPatch>,
) -> AppResult<impl IntoResponse> {
    require_admin(&user)?;
    let club = apply_patch(state.store.clubs.as_ref(), club_id, patch, NOT_FOUND).await?;
    Ok((StatusCode::OK, success_to_api_response(club)))
}

#[axum::debug_handler]
pub async fn delete_club(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(club_id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    require_admin(&user)?;
    delete_or_404(state.store.clubs.as_ref(), club_id, NOT_FOUND).await?;
    Ok((
        StatusCode::OK,
        success_to_api_response(DeleteClubResponse {
            message: "Club deleted successfully".to_string(),
        }),
    ))
}
