use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::{Extension, Json};

use crate::auth::{authorize_owner, authorize_path_user, Principal};
use crate::error::{ApiError, ApiJson};
use crate::routes::AppState;
use crate::storage::models::*;

use super::savings::LimitQuery;

pub async fn create_portfolio(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    ApiJson(new): ApiJson<NewPortfolio>,
) -> Result<(StatusCode, Json<Portfolio>), ApiError> {
    let portfolio = state
        .storage
        .create_portfolio(principal.user_id, new)
        .await?;
    Ok((StatusCode::CREATED, Json(portfolio)))
}

pub async fn list_portfolios(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(user_id): Path<i64>,
) -> Result<Json<Vec<Portfolio>>, ApiError> {
    let user_id = authorize_path_user(&principal, user_id)?;
    Ok(Json(state.storage.portfolios_for_user(user_id).await?))
}

pub async fn get_portfolio(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(portfolio_id): Path<i64>,
) -> Result<Json<Portfolio>, ApiError> {
    let portfolio = state
        .storage
        .get_portfolio(portfolio_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Portfolio not found"))?;
    authorize_owner(&principal, portfolio.user_id)?;
    Ok(Json(portfolio))
}

pub async fn update_portfolio(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(portfolio_id): Path<i64>,
    ApiJson(update): ApiJson<PortfolioUpdate>,
) -> Result<Json<Portfolio>, ApiError> {
    let existing = state
        .storage
        .get_portfolio(portfolio_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Portfolio not found"))?;
    authorize_owner(&principal, existing.user_id)?;

    let portfolio = state
        .storage
        .update_portfolio(portfolio_id, update)
        .await?;
    Ok(Json(portfolio))
}

pub async fn create_sip_plan(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    ApiJson(new): ApiJson<NewSipPlan>,
) -> Result<(StatusCode, Json<SipPlan>), ApiError> {
    let plan = state.storage.create_sip_plan(principal.user_id, new).await?;
    Ok((StatusCode::CREATED, Json(plan)))
}

pub async fn list_sip_plans(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(user_id): Path<i64>,
) -> Result<Json<Vec<SipPlan>>, ApiError> {
    let user_id = authorize_path_user(&principal, user_id)?;
    Ok(Json(state.storage.sip_plans_for_user(user_id).await?))
}

pub async fn update_sip_plan(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(plan_id): Path<i64>,
    ApiJson(update): ApiJson<SipPlanUpdate>,
) -> Result<Json<SipPlan>, ApiError> {
    let existing = state
        .storage
        .get_sip_plan(plan_id)
        .await?
        .ok_or_else(|| ApiError::not_found("SIP plan not found"))?;
    authorize_owner(&principal, existing.user_id)?;

    let plan = state.storage.update_sip_plan(plan_id, update).await?;
    Ok(Json(plan))
}

pub async fn create_investment(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    ApiJson(new): ApiJson<NewInvestment>,
) -> Result<(StatusCode, Json<Investment>), ApiError> {
    let investment = state
        .storage
        .create_investment(principal.user_id, new)
        .await?;
    Ok((StatusCode::CREATED, Json(investment)))
}

pub async fn list_investments(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(user_id): Path<i64>,
    Query(query): Query<LimitQuery>,
) -> Result<Json<Vec<Investment>>, ApiError> {
    let user_id = authorize_path_user(&principal, user_id)?;
    let rows = state
        .storage
        .investments_for_user(user_id, query.limit()?)
        .await?;
    Ok(Json(rows))
}

pub async fn list_portfolio_investments(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(portfolio_id): Path<i64>,
) -> Result<Json<Vec<Investment>>, ApiError> {
    let portfolio = state
        .storage
        .get_portfolio(portfolio_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Portfolio not found"))?;
    authorize_owner(&principal, portfolio.user_id)?;

    Ok(Json(
        state.storage.investments_for_portfolio(portfolio_id).await?,
    ))
}

pub async fn create_investment_goal(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    ApiJson(new): ApiJson<NewInvestmentGoal>,
) -> Result<(StatusCode, Json<InvestmentGoal>), ApiError> {
    let goal = state
        .storage
        .create_investment_goal(principal.user_id, new)
        .await?;
    Ok((StatusCode::CREATED, Json(goal)))
}

pub async fn list_investment_goals(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(user_id): Path<i64>,
) -> Result<Json<Vec<InvestmentGoal>>, ApiError> {
    let user_id = authorize_path_user(&principal, user_id)?;
    Ok(Json(
        state.storage.investment_goals_for_user(user_id).await?,
    ))
}

pub async fn update_investment_goal(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(goal_id): Path<i64>,
    ApiJson(update): ApiJson<InvestmentGoalUpdate>,
) -> Result<Json<InvestmentGoal>, ApiError> {
    let existing = state
        .storage
        .get_investment_goal(goal_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Investment goal not found"))?;
    authorize_owner(&principal, existing.user_id)?;

    let goal = state
        .storage
        .update_investment_goal(goal_id, update)
        .await?;
    Ok(Json(goal))
}
