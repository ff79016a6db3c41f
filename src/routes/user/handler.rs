use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use uuid::Uuid;

use crate::{
    AppState,
    error::{AppError, AppResult},
    middleware::CurrentUser,
    utils::success_to_api_response,
};

/// 校友目录：除自己以外的全部用户
#[axum::debug_handler]
pub async fn list_users(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> AppResult<impl IntoResponse> {
    let users = state.store.users.list_except(user.id).await?;
    Ok((StatusCode::OK, success_to_api_response(users)))
}

#[axum::debug_handler]
pub async fn get_user(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    let user = state
        .store
        .users
        .find_by_id(user_id)
        .await?
        .ok_or_else(|| AppError::not_found("User not found"))?;
    Ok((StatusCode::OK, success_to_api_response(user)))
}
