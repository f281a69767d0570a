use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use serde::Deserialize;

use crate::auth::{authorize_path_user, Principal};
use crate::error::{ApiError, ApiJson};
use crate::routes::AppState;
use crate::storage::models::*;

pub async fn list_streaks(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(user_id): Path<i64>,
) -> Result<Json<Vec<Streak>>, ApiError> {
    let user_id = authorize_path_user(&principal, user_id)?;
    Ok(Json(state.storage.streaks_for_user(user_id).await?))
}

pub async fn put_streak(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path((user_id, streak_type)): Path<(i64, String)>,
    ApiJson(update): ApiJson<StreakUpdate>,
) -> Result<Json<Streak>, ApiError> {
    let user_id = authorize_path_user(&principal, user_id)?;
    let streak = state
        .storage
        .upsert_streak(user_id, &streak_type, update)
        .await?;
    Ok(Json(streak))
}

#[derive(Debug, Deserialize)]
pub struct ActiveQuery {
    pub active: Option<bool>,
}

pub async fn create_seasonal_challenge(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    ApiJson(new): ApiJson<NewSeasonalChallenge>,
) -> Result<(StatusCode, Json<SeasonalChallenge>), ApiError> {
    let challenge = state
        .storage
        .create_seasonal_challenge(principal.user_id, new)
        .await?;
    Ok((StatusCode::CREATED, Json(challenge)))
}

pub async fn list_seasonal_challenges(
    State(state): State<AppState>,
    Query(query): Query<ActiveQuery>,
) -> Result<Json<Vec<SeasonalChallenge>>, ApiError> {
    Ok(Json(state.storage.seasonal_challenges(query.active).await?))
}

pub async fn join_seasonal_challenge(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(challenge_id): Path<i64>,
) -> Result<(StatusCode, Json<ChallengeParticipant>), ApiError> {
    let participation = state
        .storage
        .join_seasonal_challenge(challenge_id, principal.user_id)
        .await?;
    Ok((StatusCode::CREATED, Json(participation)))
}

pub async fn list_user_seasonal_challenges(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(user_id): Path<i64>,
) -> Result<Json<Vec<ChallengeParticipant>>, ApiError> {
    let user_id = authorize_path_user(&principal, user_id)?;
    Ok(Json(
        state.storage.seasonal_challenges_for_user(user_id).await?,
    ))
}

#[derive(Debug, Deserialize)]
pub struct ProgressBody {
    pub progress: String,
}

pub async fn update_challenge_progress(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(challenge_id): Path<i64>,
    ApiJson(body): ApiJson<ProgressBody>,
) -> Result<Json<ChallengeParticipant>, ApiError> {
    let participation = state
        .storage
        .update_challenge_progress(challenge_id, principal.user_id, body.progress)
        .await?;
    Ok(Json(participation))
}

#[derive(Debug, Deserialize)]
pub struct CategoryQuery {
    pub category: Option<String>,
}

pub async fn list_achievements(
    State(state): State<AppState>,
    Query(query): Query<CategoryQuery>,
) -> Result<Json<Vec<Achievement>>, ApiError> {
    Ok(Json(
        state.storage.achievements(query.category.as_deref()).await?,
    ))
}

pub async fn list_user_achievements(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(user_id): Path<i64>,
) -> Result<Json<Vec<UserAchievement>>, ApiError> {
    let user_id = authorize_path_user(&principal, user_id)?;
    Ok(Json(state.storage.achievements_for_user(user_id).await?))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AwardBody {
    pub achievement_id: i64,
}

pub async fn award_achievement(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(user_id): Path<i64>,
    ApiJson(body): ApiJson<AwardBody>,
) -> Result<(StatusCode, Json<UserAchievement>), ApiError> {
    let user_id = authorize_path_user(&principal, user_id)?;
    let awarded = state
        .storage
        .award_achievement(user_id, body.achievement_id)
        .await?;
    Ok((StatusCode::CREATED, Json(awarded)))
}

pub async fn list_rewards(
    State(state): State<AppState>,
    Query(query): Query<CategoryQuery>,
) -> Result<Json<Vec<Reward>>, ApiError> {
    Ok(Json(
        state.storage.rewards(query.category.as_deref()).await?,
    ))
}

pub async fn list_user_rewards(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(user_id): Path<i64>,
) -> Result<Json<Vec<UserReward>>, ApiError> {
    let user_id = authorize_path_user(&principal, user_id)?;
    Ok(Json(state.storage.rewards_for_user(user_id).await?))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RedeemBody {
    pub reward_id: i64,
    pub points_spent: i32,
    pub coins_spent: Option<i32>,
}

pub async fn redeem_reward(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(user_id): Path<i64>,
    ApiJson(body): ApiJson<RedeemBody>,
) -> Result<(StatusCode, Json<UserReward>), ApiError> {
    let user_id = authorize_path_user(&principal, user_id)?;
    let redemption = state
        .storage
        .redeem_reward(
            user_id,
            body.reward_id,
            body.points_spent,
            body.coins_spent.unwrap_or(0),
        )
        .await?;
    Ok((StatusCode::CREATED, Json(redemption)))
}
