use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::auth::{self, authorize_path_user, Principal};
use crate::error::{ApiError, ApiJson};
use crate::routes::AppState;
use crate::storage::models::{NewUser, User, UserUpdate};

pub async fn register(
    State(state): State<AppState>,
    ApiJson(new): ApiJson<NewUser>,
) -> Result<(StatusCode, Json<User>), ApiError> {
    let user = state.storage.create_user(new).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub user: User,
    pub token: String,
}

pub async fn login(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let (Some(email), Some(password)) = (body.email, body.password) else {
        return Err(ApiError::bad_request("Email and password are required"));
    };

    let user = state
        .storage
        .verify_login(&email, &password)
        .await?
        .ok_or_else(|| ApiError::unauthorized("Invalid credentials"))?;

    let principal = Principal {
        user_id: user.id,
        email: user.email.clone(),
        username: user.username.clone(),
    };
    let token = auth::issue_token(&principal).map_err(|err| {
        error!(error = %err, "token generation failed");
        ApiError::internal()
    })?;

    Ok(Json(LoginResponse { user, token }))
}

pub async fn get_user(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(user_id): Path<i64>,
) -> Result<Json<User>, ApiError> {
    let user_id = authorize_path_user(&principal, user_id)?;
    let user = state
        .storage
        .get_user(user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;
    Ok(Json(user))
}

pub async fn update_user(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(user_id): Path<i64>,
    ApiJson(update): ApiJson<UserUpdate>,
) -> Result<Json<User>, ApiError> {
    let user_id = authorize_path_user(&principal, user_id)?;
    let user = state.storage.update_user(user_id, update).await?;
    Ok(Json(user))
}
