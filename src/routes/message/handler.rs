use axum::{
    extract::{Extension, Json, Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use uuid::Uuid;

use super::model::{MarkReadResponse, deliver_message};
use crate::{
    AppState,
    error::AppResult,
    middleware::CurrentUser,
    models::MessagePayload,
    utils::success_to_api_response,
};

#[axum::debug_handler]
pub async fn get_contacts(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> AppResult<impl IntoResponse> {
    let contacts = state.store.users.list_except(user.id).await?;
    Ok((StatusCode::OK, success_to_api_response(contacts)))
}

/// 有过消息往来的用户，最近的会话在前
#[axum::debug_handler]
pub async fn get_chat_partners(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> AppResult<impl IntoResponse> {
    let ids = state.store.messages.partner_ids(user.id).await?;
    let mut partners = state.store.users.find_many(&ids).await?;
    partners.sort_by_key(|p| ids.iter().position(|id| *id == p.id));
    Ok((StatusCode::OK, success_to_api_response(partners)))
}

#[axum::debug_handler]
pub async fn get_unread_counts(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> AppResult<impl IntoResponse> {
    let counts = state.store.messages.unread_counts(user.id).await?;
    Ok((StatusCode::OK, success_to_api_response(counts)))
}

#[axum::debug_handler]
pub async fn get_messages(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(peer_id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    let messages = state.store.messages.conversation(user.id, peer_id).await?;
    Ok((StatusCode::OK, success_to_api_response(messages)))
}

#[axum::debug_handler]
pub async fn send_message(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(receiver_id): Path<Uuid>,
    Json(payload): Json<MessagePayload>,
) -> AppResult<impl IntoResponse> {
    let (message, _) =
        deliver_message(&state.store, &state.presence, user.id, receiver_id, payload).await?;
    Ok((StatusCode::CREATED, success_to_api_response(message)))
}

#[axum::debug_handler]
pub async fn mark_messages_as_read(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(peer_id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    let updated = state.store.messages.mark_read(user.id, peer_id).await?;
    Ok((
        StatusCode::OK,
        success_to_api_response(MarkReadResponse { updated }),
    ))
}
