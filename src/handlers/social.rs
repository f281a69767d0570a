use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use serde::Deserialize;

use crate::auth::{authorize_path_user, Principal};
use crate::error::{ApiError, ApiJson};
use crate::routes::AppState;
use crate::storage::models::*;

#[derive(Debug, Deserialize)]
pub struct TeamQuery {
    pub r#type: Option<String>,
}

pub async fn create_team(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    ApiJson(new): ApiJson<NewTeam>,
) -> Result<(StatusCode, Json<Team>), ApiError> {
    let team = state.storage.create_team(principal.user_id, new).await?;
    Ok((StatusCode::CREATED, Json(team)))
}

pub async fn list_teams(
    State(state): State<AppState>,
    Query(query): Query<TeamQuery>,
) -> Result<Json<Vec<Team>>, ApiError> {
    Ok(Json(state.storage.teams(query.r#type.as_deref()).await?))
}

pub async fn join_team(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(team_id): Path<i64>,
) -> Result<(StatusCode, Json<TeamMember>), ApiError> {
    let membership = state.storage.join_team(team_id, principal.user_id).await?;
    Ok((StatusCode::CREATED, Json(membership)))
}

pub async fn list_user_teams(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(user_id): Path<i64>,
) -> Result<Json<Vec<Team>>, ApiError> {
    let user_id = authorize_path_user(&principal, user_id)?;
    Ok(Json(state.storage.teams_for_user(user_id).await?))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommunityQuery {
    pub category: Option<String>,
    pub is_public: Option<bool>,
}

pub async fn create_community(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    ApiJson(new): ApiJson<NewCommunity>,
) -> Result<(StatusCode, Json<Community>), ApiError> {
    let community = state
        .storage
        .create_community(principal.user_id, new)
        .await?;
    Ok((StatusCode::CREATED, Json(community)))
}

pub async fn list_communities(
    State(state): State<AppState>,
    Query(query): Query<CommunityQuery>,
) -> Result<Json<Vec<Community>>, ApiError> {
    Ok(Json(
        state
            .storage
            .communities(query.category.as_deref(), query.is_public)
            .await?,
    ))
}

pub async fn join_community(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(community_id): Path<i64>,
) -> Result<(StatusCode, Json<CommunityMember>), ApiError> {
    let membership = state
        .storage
        .join_community(community_id, principal.user_id)
        .await?;
    Ok((StatusCode::CREATED, Json(membership)))
}

pub async fn create_group_goal(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    ApiJson(new): ApiJson<NewGroupGoal>,
) -> Result<(StatusCode, Json<GroupGoal>), ApiError> {
    let goal = state
        .storage
        .create_group_goal(principal.user_id, new)
        .await?;
    Ok((StatusCode::CREATED, Json(goal)))
}

pub async fn list_group_goals(
    State(state): State<AppState>,
    Query(query): Query<CommunityQuery>,
) -> Result<Json<Vec<GroupGoal>>, ApiError> {
    Ok(Json(
        state
            .storage
            .group_goals(query.category.as_deref(), query.is_public)
            .await?,
    ))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinGoalBody {
    pub contributed_amount: Option<String>,
}

pub async fn join_group_goal(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(goal_id): Path<i64>,
    ApiJson(body): ApiJson<JoinGoalBody>,
) -> Result<(StatusCode, Json<GroupGoalMember>), ApiError> {
    let membership = state
        .storage
        .join_group_goal(goal_id, principal.user_id, body.contributed_amount)
        .await?;
    Ok((StatusCode::CREATED, Json(membership)))
}

pub async fn list_user_group_goals(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(user_id): Path<i64>,
) -> Result<Json<Vec<GroupGoal>>, ApiError> {
    let user_id = authorize_path_user(&principal, user_id)?;
    Ok(Json(state.storage.group_goals_for_user(user_id).await?))
}

#[derive(Debug, Deserialize)]
pub struct MentorshipQuery {
    pub status: Option<String>,
    pub role: Option<String>,
}

pub async fn create_mentorship(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    ApiJson(new): ApiJson<NewMentorship>,
) -> Result<(StatusCode, Json<Mentorship>), ApiError> {
    let mentorship = state
        .storage
        .create_mentorship(principal.user_id, new)
        .await?;
    Ok((StatusCode::CREATED, Json(mentorship)))
}

pub async fn list_mentorships(
    State(state): State<AppState>,
    Query(query): Query<MentorshipQuery>,
) -> Result<Json<Vec<Mentorship>>, ApiError> {
    Ok(Json(
        state.storage.mentorships(query.status.as_deref()).await?,
    ))
}

pub async fn list_user_mentorships(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(user_id): Path<i64>,
    Query(query): Query<MentorshipQuery>,
) -> Result<Json<Vec<Mentorship>>, ApiError> {
    let user_id = authorize_path_user(&principal, user_id)?;
    Ok(Json(
        state
            .storage
            .mentorships_for_user(user_id, query.role.as_deref())
            .await?,
    ))
}

pub async fn accept_mentorship(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(mentorship_id): Path<i64>,
) -> Result<Json<Mentorship>, ApiError> {
    let accepted = state
        .storage
        .accept_mentorship(mentorship_id, principal.user_id)
        .await?
        .ok_or_else(|| {
            ApiError::forbidden("Only the invited mentee can accept this mentorship")
        })?;
    Ok(Json(accepted))
}
