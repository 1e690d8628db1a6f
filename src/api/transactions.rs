//! Posting, transfer and history endpoints
//!
//! A rejected posting or transfer is still recorded and persisted; the
//! caller gets a 400 with the account's rejection message.

use super::{parse_boolean_query_param, ApiError, AppState};
use crate::core::{PostingKind, TransferLeg, TransferReceipt, TransferResolution};
use crate::types::{AccountSummary, Transaction};
use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    Json,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Body of the single-account posting endpoints
#[derive(Debug, Clone, Deserialize)]
pub struct PostingRequest {
    pub amount: Decimal,
    pub currency: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// Body of `POST /api/v1/accounts/transfer`
#[derive(Debug, Clone, Deserialize)]
pub struct TransferRequest {
    pub amount: Decimal,
    pub currency: String,
    pub source_account_name: String,
    pub destination_account_name: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct HistoryQuery {
    pub balance: Option<String>,
    pub transactions: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub account_name: String,
    pub username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub balance: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transactions: Option<Vec<Transaction>>,
}

#[derive(Debug, Serialize)]
pub struct TransactionList {
    pub count: usize,
    pub transactions: Vec<Transaction>,
}

#[derive(Debug, Serialize)]
pub struct PostingResponse {
    pub message: String,
    pub transaction: Transaction,
    pub account: AccountSummary,
}

#[derive(Debug, Serialize)]
pub struct TransferResponse {
    pub message: String,
    pub transfer_out_message: String,
    pub transfer_in_message: String,
    pub transfer_out_transaction: Transaction,
    pub transfer_in_transaction: Transaction,
    pub source_account: AccountSummary,
    pub destination_account: AccountSummary,
}

async fn post_transaction(
    state: AppState,
    kind: PostingKind,
    user_name: String,
    account_name: String,
    payload: Result<Json<PostingRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<PostingResponse>), ApiError> {
    let Json(request) = payload?;
    let posting = state.bank.post(
        &user_name,
        &account_name,
        kind,
        request.amount,
        &request.currency,
        request.description.as_deref(),
    )?;
    state.persist().await;

    if !posting.outcome.accepted {
        return Err(ApiError::bad_request(posting.outcome.message));
    }
    Ok((
        StatusCode::CREATED,
        Json(PostingResponse {
            message: format!("Transaction created successfully: {}", posting.outcome.message),
            transaction: posting.transaction,
            account: posting.account,
        }),
    ))
}

pub async fn deposit(
    State(state): State<AppState>,
    Path((user_name, account_name)): Path<(String, String)>,
    payload: Result<Json<PostingRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<PostingResponse>), ApiError> {
    post_transaction(state, PostingKind::Deposit, user_name, account_name, payload).await
}

pub async fn withdraw(
    State(state): State<AppState>,
    Path((user_name, account_name)): Path<(String, String)>,
    payload: Result<Json<PostingRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<PostingResponse>), ApiError> {
    post_transaction(state, PostingKind::Withdrawal, user_name, account_name, payload).await
}

pub async fn fee(
    State(state): State<AppState>,
    Path((user_name, account_name)): Path<(String, String)>,
    payload: Result<Json<PostingRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<PostingResponse>), ApiError> {
    post_transaction(state, PostingKind::Fee, user_name, account_name, payload).await
}

pub async fn interest(
    State(state): State<AppState>,
    Path((user_name, account_name)): Path<(String, String)>,
    payload: Result<Json<PostingRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<PostingResponse>), ApiError> {
    post_transaction(state, PostingKind::Interest, user_name, account_name, payload).await
}

pub async fn transfer(
    State(state): State<AppState>,
    payload: Result<Json<TransferRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<TransferResponse>), ApiError> {
    let Json(request) = payload?;
    let receipt = state.bank.transfer(
        &request.source_account_name,
        &request.destination_account_name,
        request.amount,
        &request.currency,
        request.description.as_deref(),
    )?;
    state.persist().await;

    transfer_response(receipt)
}

/// Map a recorded transfer onto the response status
///
/// A compensated or rejected transfer is the caller's problem (400); a
/// compensation that failed leaves the ledger inconsistent and is a 500.
fn transfer_response(
    receipt: TransferReceipt,
) -> Result<(StatusCode, Json<TransferResponse>), ApiError> {
    let outcome = receipt.outcome;
    match &outcome.resolution {
        TransferResolution::Completed => Ok((
            StatusCode::CREATED,
            Json(TransferResponse {
                message: "Transfer Transactions created successfully.".to_string(),
                transfer_out_message: outcome.out_outcome.message,
                transfer_in_message: outcome.in_outcome.message,
                transfer_out_transaction: outcome.transfer_out,
                transfer_in_transaction: outcome.transfer_in,
                source_account: receipt.source,
                destination_account: receipt.destination,
            }),
        )),
        TransferResolution::Rejected | TransferResolution::Compensated { .. } => {
            Err(ApiError::bad_request(transfer_failure(
                &outcome.out_outcome.message,
                &outcome.in_outcome.message,
                outcome.in_outcome.accepted,
            )))
        }
        TransferResolution::CompensationFailed {
            failed_leg, reason, ..
        } => {
            let leg = match failed_leg {
                TransferLeg::Out => "out of source",
                TransferLeg::In => "into destination",
            };
            Err(ApiError::internal(format!(
                "Transfer {leg} account failed and could not be reversed: {reason}"
            )))
        }
    }
}

/// Caller-facing message of a failed transfer; the IN leg is reported first
fn transfer_failure(out_message: &str, in_message: &str, in_accepted: bool) -> String {
    if in_accepted {
        format!("Failed to process transaction out of source account: {out_message}")
    } else {
        format!("Failed to process transaction into destination account: {in_message}")
    }
}

pub async fn history(
    State(state): State<AppState>,
    Path(account_name): Path<String>,
    query: Result<Query<HistoryQuery>, QueryRejection>,
) -> Result<Json<HistoryResponse>, ApiError> {
    let Query(query) = query?;
    let history = state.bank.history(&account_name)?;
    let show_balance = parse_boolean_query_param(query.balance.as_deref())?;
    let show_transactions = parse_boolean_query_param(query.transactions.as_deref())?;

    Ok(Json(HistoryResponse {
        account_name: history.account_name,
        username: history.username,
        balance: show_balance.then_some(history.balance),
        transactions: show_transactions.then_some(history.transactions),
    }))
}

pub async fn all_transactions(State(state): State<AppState>) -> Json<TransactionList> {
    let transactions = state.bank.all_transactions();
    Json(TransactionList {
        count: transactions.len(),
        transactions,
    })
}
