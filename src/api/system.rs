//! Service-level endpoints

use super::AppState;
use axum::{extract::State, http::StatusCode, Json};
use std::collections::BTreeMap;

pub async fn index() -> &'static str {
    "Welcome to the Simple Bank API!"
}

/// Liveness check; does not touch the bank
pub async fn health() -> (StatusCode, &'static str) {
    (StatusCode::OK, "ok")
}

/// Account name -> username cache
pub async fn check_cache(State(state): State<AppState>) -> Json<BTreeMap<String, String>> {
    Json(state.bank.account_cache())
}
