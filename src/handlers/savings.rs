use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use serde::Deserialize;
use serde_json::json;

use crate::auth::{authorize_owner, authorize_path_user, Principal};
use crate::error::{ApiError, ApiJson};
use crate::routes::AppState;
use crate::storage::models::*;

#[derive(Debug, Deserialize)]
pub struct LimitQuery {
    pub limit: Option<i64>,
}

impl LimitQuery {
    /// Negative limits are a client error, not a reason to hit the store.
    pub fn limit(&self) -> Result<Option<i64>, ApiError> {
        match self.limit {
            Some(n) if n < 0 => Err(ApiError::bad_request("Limit must not be negative")),
            other => Ok(other),
        }
    }
}

pub async fn create_transaction(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    ApiJson(new): ApiJson<NewTransaction>,
) -> Result<(StatusCode, Json<Transaction>), ApiError> {
    let transaction = state
        .storage
        .create_transaction(principal.user_id, new)
        .await?;
    Ok((StatusCode::CREATED, Json(transaction)))
}

pub async fn list_transactions(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(user_id): Path<i64>,
    Query(query): Query<LimitQuery>,
) -> Result<Json<Vec<Transaction>>, ApiError> {
    let user_id = authorize_path_user(&principal, user_id)?;
    let rows = state
        .storage
        .transactions_for_user(user_id, query.limit()?)
        .await?;
    Ok(Json(rows))
}

pub async fn create_challenge(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    ApiJson(new): ApiJson<NewChallenge>,
) -> Result<(StatusCode, Json<Challenge>), ApiError> {
    let challenge = state
        .storage
        .create_challenge(principal.user_id, new)
        .await?;
    Ok((StatusCode::CREATED, Json(challenge)))
}

pub async fn list_challenges(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(user_id): Path<i64>,
) -> Result<Json<Vec<Challenge>>, ApiError> {
    let user_id = authorize_path_user(&principal, user_id)?;
    Ok(Json(state.storage.challenges_for_user(user_id).await?))
}

pub async fn update_challenge(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(challenge_id): Path<i64>,
    ApiJson(update): ApiJson<ChallengeUpdate>,
) -> Result<Json<Challenge>, ApiError> {
    let existing = state
        .storage
        .get_challenge(challenge_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Challenge not found"))?;
    authorize_owner(&principal, existing.user_id)?;

    let challenge = state
        .storage
        .update_challenge(challenge_id, update)
        .await?;
    Ok(Json(challenge))
}

pub async fn create_activity(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    ApiJson(new): ApiJson<NewActivity>,
) -> Result<(StatusCode, Json<Activity>), ApiError> {
    let activity = state
        .storage
        .create_activity(principal.user_id, new)
        .await?;
    Ok((StatusCode::CREATED, Json(activity)))
}

pub async fn list_activities(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(user_id): Path<i64>,
    Query(query): Query<LimitQuery>,
) -> Result<Json<Vec<Activity>>, ApiError> {
    let user_id = authorize_path_user(&principal, user_id)?;
    let rows = state
        .storage
        .activities_for_user(user_id, query.limit()?)
        .await?;
    Ok(Json(rows))
}

pub async fn list_badges(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(user_id): Path<i64>,
) -> Result<Json<Vec<UserBadge>>, ApiError> {
    let user_id = authorize_path_user(&principal, user_id)?;
    Ok(Json(state.storage.badges_for_user(user_id).await?))
}

#[derive(Debug, Deserialize)]
pub struct BadgeBody {
    pub earned: bool,
}

pub async fn set_badge(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path((user_id, badge_id)): Path<(i64, String)>,
    ApiJson(body): ApiJson<BadgeBody>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let user_id = authorize_path_user(&principal, user_id)?;
    state
        .storage
        .set_badge_earned(user_id, &badge_id, body.earned)
        .await?;
    Ok(Json(json!({ "success": true })))
}
