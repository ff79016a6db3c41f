use std::collections::HashMap;

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
    middleware::CurrentUser,
    models::{Opportunity, OpportunityPatch, OpportunityView},
    routes::document::{apply_patch, create_validated, delete_or_404, find_or_404},
    utils::success_to_api_response,
};

const NOT_FOUND: &str = "Opportunity not found";

#[derive(Debug, Serialize)]
pub struct DeleteOpportunityResponse {
    pub message: String,
}

/// 列表附带发布者的姓名、头像和届别
#[axum::debug_handler]
pub async fn list_opportunities(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let opportunities = state.store.opportunities.list().await?;

    let mut poster_ids: Vec<Uuid> = opportunities.iter().map(|o| o.body.posted_by).collect();
    poster_ids.sort();
    poster_ids.dedup();
    let posters: HashMap<Uuid, _> = state
        .store
        .users
        .find_many(&poster_ids)
        .await?
        .into_iter()
        .map(|user| (user.id, user.summary()))
        .collect();

    let views: Vec<OpportunityView> = opportunities
        .into_iter()
        .map(|opportunity| OpportunityView {
            posted_by_user: posters.get(&opportunity.body.posted_by).cloned(),
            opportunity,
        })
        .collect();

    Ok((StatusCode::OK, success_to_api_response(views)))
}

#[axum::debug_handler]
pub async fn get_opportunity(
    State(state): State<AppState>,
    Path(opportunity_id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    let opportunity =
        find_or_404(state.store.opportunities.as_ref(), opportunity_id, NOT_FOUND).await?;
    Ok((StatusCode::OK, success_to_api_response(opportunity)))
}

#[axum::debug_handler]
pub async fn create_opportunity(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Json(mut opportunity): Json<Opportunity>,
) -> AppResult<impl IntoResponse> {
    opportunity.posted_by = user.id;
    let opportunity = create_validated(state.store.opportunities.as_ref(), opportunity).await?;
    Ok((StatusCode::CREATED, success_to_api_response(opportunity)))
}

#[axum::debug_handler]
pub async fn update_opportunity(
    State(state): State<AppState>,
    Path(opportunity_id): Path<Uuid>,
    Json(patch): Json<OpportunityPatch>,
) -> AppResult<impl IntoResponse> {
    let opportunity = apply_patch(
        state.store.opportunities.as_ref(),
        opportunity_id,
        patch,
        NOT_FOUND,
    )
    .await?;
    Ok((StatusCode::OK, success_to_api_response(opportunity)))
}

#[axum::debug_handler]
pub async fn delete_opportunity(
    State(state): State<AppState>,
    Path(opportunity_id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    delete_or_404(state.store.opportunities.as_ref(), opportunity_id, NOT_FOUND).await?;
    Ok((
        StatusCode::OK,
        success_to_api_response(DeleteOpportunityResponse {
            message: "Opportunity deleted".to_string(),
        }),
    ))
}
