use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::{Extension, Json};

use crate::auth::{authorize_owner, authorize_path_user, Principal};
use crate::error::{ApiError, ApiJson};
use crate::routes::AppState;
use crate::storage::models::*;

pub async fn create_budget(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    ApiJson(new): ApiJson<NewBudget>,
) -> Result<(StatusCode, Json<Budget>), ApiError> {
    let budget = state.storage.create_budget(principal.user_id, new).await?;
    Ok((StatusCode::CREATED, Json(budget)))
}

pub async fn list_budgets(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(user_id): Path<i64>,
) -> Result<Json<Vec<Budget>>, ApiError> {
    let user_id = authorize_path_user(&principal, user_id)?;
    Ok(Json(state.storage.budgets_for_user(user_id).await?))
}

pub async fn update_budget(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(budget_id): Path<i64>,
    ApiJson(update): ApiJson<BudgetUpdate>,
) -> Result<Json<Budget>, ApiError> {
    let existing = state
        .storage
        .get_budget(budget_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Budget not found"))?;
    authorize_owner(&principal, existing.user_id)?;

    let budget = state.storage.update_budget(budget_id, update).await?;
    Ok(Json(budget))
}

pub async fn get_financial_health(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(user_id): Path<i64>,
) -> Result<Json<FinancialHealth>, ApiError> {
    let user_id = authorize_path_user(&principal, user_id)?;
    let health = state
        .storage
        .financial_health_for_user(user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Financial health data not found"))?;
    Ok(Json(health))
}

pub async fn put_financial_health(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(user_id): Path<i64>,
    ApiJson(scores): ApiJson<HealthScores>,
) -> Result<Json<FinancialHealth>, ApiError> {
    let user_id = authorize_path_user(&principal, user_id)?;
    let health = state
        .storage
        .upsert_financial_health(user_id, scores)
        .await?;
    Ok(Json(health))
}
