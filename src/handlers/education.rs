use axum::extract::{Path, Query, State};
use axum::{Extension, Json};
use serde::Deserialize;

use crate::auth::{authorize_path_user, Principal};
use crate::error::{ApiError, ApiJson};
use crate::routes::AppState;
use crate::storage::models::*;

use super::gamification::CategoryQuery;

pub async fn list_modules(
    State(state): State<AppState>,
    Query(query): Query<CategoryQuery>,
) -> Result<Json<Vec<EducationModule>>, ApiError> {
    Ok(Json(
        state
            .storage
            .education_modules(query.category.as_deref())
            .await?,
    ))
}

pub async fn list_progress(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(user_id): Path<i64>,
) -> Result<Json<Vec<EducationProgress>>, ApiError> {
    let user_id = authorize_path_user(&principal, user_id)?;
    Ok(Json(
        state.storage.education_progress_for_user(user_id).await?,
    ))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressBody {
    pub module_id: i64,
    pub progress: i32,
}

pub async fn put_progress(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(user_id): Path<i64>,
    ApiJson(body): ApiJson<ProgressBody>,
) -> Result<Json<EducationProgress>, ApiError> {
    let user_id = authorize_path_user(&principal, user_id)?;
    let progress = state
        .storage
        .update_education_progress(user_id, body.module_id, body.progress)
        .await?;
    Ok(Json(progress))
}
