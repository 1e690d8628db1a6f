//! Account registry endpoints

use super::{ApiError, AppState};
use crate::core::AccountUpdate;
use crate::types::{AccountStatus, AccountSummary, AccountType};
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::BTreeMap;

/// Body of `POST /api/v1/accounts`
#[derive(Debug, Clone, Deserialize)]
pub struct CreateAccountRequest {
    pub username: String,
    /// Case-insensitive account type name
    pub account_type: String,
    pub initial_deposit: Decimal,
    pub currency: String,
}

/// Body of `PUT /api/v1/accounts/:user_name/:account_name`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateAccountRequest {
    pub account_type: Option<String>,
    pub status: Option<String>,
}

impl UpdateAccountRequest {
    fn parse(self) -> Result<AccountUpdate, ApiError> {
        let account_type = self
            .account_type
            .map(|value| value.parse::<AccountType>())
            .transpose()?;
        let status = self
            .status
            .map(|value| value.parse::<AccountStatus>())
            .transpose()?;
        Ok(AccountUpdate {
            account_type,
            status,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct AccountList {
    pub accounts: BTreeMap<String, Vec<AccountSummary>>,
    pub users_with_accounts_count: usize,
}

pub async fn list_accounts(State(state): State<AppState>) -> Json<AccountList> {
    let accounts = state.bank.list_accounts();
    Json(AccountList {
        users_with_accounts_count: accounts.len(),
        accounts,
    })
}

pub async fn accounts_for_user(
    State(state): State<AppState>,
    Path(user_name): Path<String>,
) -> Result<Json<Vec<AccountSummary>>, ApiError> {
    Ok(Json(state.bank.accounts_for(&user_name)?))
}

pub async fn create_account(
    State(state): State<AppState>,
    payload: Result<Json<CreateAccountRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let Json(request) = payload?;
    let account_type: AccountType = request.account_type.parse()?;
    let account = state.bank.open_account(
        &request.username,
        account_type,
        &request.currency,
        request.initial_deposit,
    )?;
    state.persist().await;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Account created successfully.",
            "account": account,
        })),
    ))
}

pub async fn update_account(
    State(state): State<AppState>,
    Path((user_name, account_name)): Path<(String, String)>,
    payload: Result<Json<UpdateAccountRequest>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(request) = payload?;
    let update = request.parse()?;
    if update == AccountUpdate::default() {
        return Err(ApiError::bad_request("No data provided for update"));
    }

    let account = state
        .bank
        .update_account(&user_name, &account_name, update)?;
    state.persist().await;

    Ok(Json(json!({
        "message": "Account updated successfully.",
        "account": account,
    })))
}

pub async fn delete_account(
    State(state): State<AppState>,
    Path((user_name, account_name)): Path<(String, String)>,
) -> Result<Json<Value>, ApiError> {
    state.bank.delete_account(&user_name, &account_name)?;
    state.persist().await;

    Ok(Json(json!({ "message": "Account deleted successfully." })))
}
