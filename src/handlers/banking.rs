use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use serde::Deserialize;

use crate::auth::{authorize_path_user, Principal};
use crate::error::{ApiError, ApiJson};
use crate::routes::AppState;
use crate::storage::models::*;

pub async fn create_bank_account(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    ApiJson(new): ApiJson<NewBankAccount>,
) -> Result<(StatusCode, Json<BankAccount>), ApiError> {
    let account = state
        .storage
        .create_bank_account(principal.user_id, new)
        .await?;
    Ok((StatusCode::CREATED, Json(account)))
}

pub async fn list_bank_accounts(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(user_id): Path<i64>,
) -> Result<Json<Vec<BankAccount>>, ApiError> {
    let user_id = authorize_path_user(&principal, user_id)?;
    Ok(Json(state.storage.bank_accounts_for_user(user_id).await?))
}

pub async fn create_bill_split(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    ApiJson(new): ApiJson<NewBillSplit>,
) -> Result<(StatusCode, Json<BillSplit>), ApiError> {
    let split = state
        .storage
        .create_bill_split(principal.user_id, new)
        .await?;
    Ok((StatusCode::CREATED, Json(split)))
}

pub async fn list_bill_splits(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(user_id): Path<i64>,
) -> Result<Json<Vec<BillSplit>>, ApiError> {
    let user_id = authorize_path_user(&principal, user_id)?;
    Ok(Json(state.storage.bill_splits_for_user(user_id).await?))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinBillBody {
    pub share_amount: String,
}

pub async fn join_bill_split(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(bill_id): Path<i64>,
    ApiJson(body): ApiJson<JoinBillBody>,
) -> Result<(StatusCode, Json<BillSplitMember>), ApiError> {
    let member = state
        .storage
        .join_bill_split(bill_id, principal.user_id, body.share_amount)
        .await?;
    Ok((StatusCode::CREATED, Json(member)))
}

pub async fn create_scheduled_payment(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    ApiJson(new): ApiJson<NewScheduledPayment>,
) -> Result<(StatusCode, Json<ScheduledPayment>), ApiError> {
    let payment = state
        .storage
        .create_scheduled_payment(principal.user_id, new)
        .await?;
    Ok((StatusCode::CREATED, Json(payment)))
}

pub async fn list_scheduled_payments(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(user_id): Path<i64>,
) -> Result<Json<Vec<ScheduledPayment>>, ApiError> {
    let user_id = authorize_path_user(&principal, user_id)?;
    Ok(Json(
        state.storage.scheduled_payments_for_user(user_id).await?,
    ))
}
