//! HTTP API
//!
//! JSON over HTTP on top of [`Bank`]. Handlers are grouped by resource:
//!
//! - `system` - welcome text, health and the account cache
//! - `users` - user CRUD
//! - `accounts` - account registry
//! - `transactions` - postings, transfers and history
//!
//! Mutating handlers save a snapshot through the configured
//! [`SnapshotStore`] before responding. A failed save is logged; the
//! in-memory state is kept and the request still succeeds.

use crate::core::{Bank, SnapshotStore};
use axum::{
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;
use tokio::sync::Mutex;
use tower_http::trace::TraceLayer;
use tracing::error;

pub mod accounts;
pub mod error;
pub mod params;
pub mod system;
pub mod transactions;
pub mod users;

pub use error::ApiError;
pub use params::parse_boolean_query_param;

/// State shared by all handlers
#[derive(Clone)]
pub struct AppState {
    pub bank: Arc<Bank>,
    store: Arc<dyn SnapshotStore>,
    /// Serializes snapshot writes so a newer snapshot is never overwritten
    /// by an older one
    save_lock: Arc<Mutex<()>>,
}

impl AppState {
    pub fn new(bank: Arc<Bank>, store: Arc<dyn SnapshotStore>) -> Self {
        Self {
            bank,
            store,
            save_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Write the current bank state to the snapshot store
    pub async fn persist(&self) {
        let _guard = self.save_lock.lock().await;
        let snapshot = self.bank.snapshot();
        let store = Arc::clone(&self.store);

        match tokio::task::spawn_blocking(move || store.save(&snapshot)).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                error!(store = %self.store.describe(), error = %e, "failed to save snapshot")
            }
            Err(e) => error!(error = %e, "snapshot task panicked"),
        }
    }
}

/// Build the router with every route of the service
///
/// # Routes
///
/// - `GET /`, `GET /health`, `GET /api/v1/check_cache`
/// - `GET|POST /api/v1/users`, `GET|PUT|DELETE /api/v1/users/:user_name`
/// - `GET|POST /api/v1/accounts`, `GET /api/v1/accounts/:user_name`
/// - `PUT|DELETE /api/v1/accounts/:user_name/:account_name`
/// - `POST /api/v1/accounts/{deposit,withdraw,fee,interest}/:user_name/:account_name`
/// - `POST /api/v1/accounts/transfer`
/// - `GET /api/v1/accounts/history/:account_name`
/// - `GET /api/v1/accounts/history/all_transactions`
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(system::index))
        .route("/health", get(system::health))
        .route("/api/v1/check_cache", get(system::check_cache))
        .route("/api/v1/users", get(users::list_users).post(users::create_user))
        .route(
            "/api/v1/users/:user_name",
            get(users::get_user)
                .put(users::update_user)
                .delete(users::delete_user),
        )
        .route(
            "/api/v1/accounts",
            get(accounts::list_accounts).post(accounts::create_account),
        )
        .route("/api/v1/accounts/transfer", post(transactions::transfer))
        .route(
            "/api/v1/accounts/history/all_transactions",
            get(transactions::all_transactions),
        )
        .route(
            "/api/v1/accounts/history/:account_name",
            get(transactions::history),
        )
        .route(
            "/api/v1/accounts/deposit/:user_name/:account_name",
            post(transactions::deposit),
        )
        .route(
            "/api/v1/accounts/withdraw/:user_name/:account_name",
            post(transactions::withdraw),
        )
        .route(
            "/api/v1/accounts/fee/:user_name/:account_name",
            post(transactions::fee),
        )
        .route(
            "/api/v1/accounts/interest/:user_name/:account_name",
            post(transactions::interest),
        )
        .route("/api/v1/accounts/:user_name", get(accounts::accounts_for_user))
        .route(
            "/api/v1/accounts/:user_name/:account_name",
            put(accounts::update_account).delete(accounts::delete_account),
        )
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}
