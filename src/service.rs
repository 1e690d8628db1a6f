//! Entry points behind the CLI subcommands
//!
//! - [`serve`] builds a multi-threaded tokio runtime, restores the bank from
//!   its snapshot store and serves the HTTP API until Ctrl+C / SIGTERM.
//! - [`export`] reads a snapshot and writes accounts or transactions as CSV.

use crate::api::{self, AppState};
use crate::cli::{ExportArgs, ServerConfig};
use crate::core::{Bank, SnapshotStore};
use crate::io::{write_accounts_csv, write_transactions_csv, JsonFileStore, MemorySnapshotStore};
use crate::types::{AccountSummary, LedgerError};
use std::io::Write;
use std::sync::Arc;
use tokio::signal;
use tracing::info;

/// Pick the snapshot store for a server configuration
pub fn snapshot_store(config: &ServerConfig) -> Arc<dyn SnapshotStore> {
    match &config.data_file {
        Some(path) => Arc::new(JsonFileStore::new(path.clone())),
        None => Arc::new(MemorySnapshotStore::new()),
    }
}

/// Run the HTTP server until a shutdown signal arrives
///
/// # Errors
///
/// Fails if the runtime cannot be built, the snapshot cannot be loaded or
/// the address cannot be bound.
pub fn serve(config: ServerConfig) -> Result<(), LedgerError> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(config.workers)
        .enable_all()
        .build()?;

    runtime.block_on(async {
        let store = snapshot_store(&config);
        let snapshot = store.load()?;
        let bank = Arc::new(Bank::from_snapshot(snapshot)?);
        let app = api::router(AppState::new(bank, Arc::clone(&store)));

        let listener = tokio::net::TcpListener::bind(config.bind).await?;
        info!(
            address = %config.bind,
            workers = config.workers,
            store = %store.describe(),
            "bank ledger listening"
        );

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        info!("server stopped");
        Ok::<(), LedgerError>(())
    })
}

/// Write the accounts (or the transaction history) of a snapshot file as CSV
pub fn export(args: &ExportArgs, output: &mut dyn Write) -> Result<(), LedgerError> {
    let snapshot = JsonFileStore::new(args.data_file.clone()).load()?;

    if args.transactions {
        write_transactions_csv(&snapshot.transactions, output)
    } else {
        let accounts: Vec<AccountSummary> = snapshot
            .accounts
            .values()
            .flatten()
            .map(|account| account.summary())
            .collect();
        write_accounts_csv(&accounts, output)
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("received Ctrl+C, shutting down"),
        () = terminate => info!("received SIGTERM, shutting down"),
    }
}
