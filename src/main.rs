//! Bank Ledger CLI
//!
//! Runs the bank ledger HTTP service or exports a saved snapshot.
//!
//! # Usage
//!
//! ```bash
//! cargo run -- serve
//! cargo run -- serve --bind 127.0.0.1:8080 --data-file /var/lib/bank/bank_data.json
//! cargo run -- serve --in-memory --workers 4
//! cargo run -- export --data-file bank_data.json > accounts.csv
//! cargo run -- export --transactions > transactions.csv
//! ```
//!
//! Logs go to stderr. The filter comes from `--log`, then `RUST_LOG`, then
//! defaults to `info`.
//!
//! # Exit Codes
//!
//! - 0: Success
//! - 1: Error (address in use, unreadable snapshot, write failure, etc.)

use rust_bank_ledger::cli::{self, Command};
use rust_bank_ledger::service;
use std::process;
use tracing_subscriber::EnvFilter;

fn main() {
    let args = cli::parse_args();

    let filter = match &args.log {
        Some(directive) => EnvFilter::new(directive),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let result = match args.command {
        Command::Serve(serve) => service::serve(serve.to_server_config()),
        Command::Export(export) => {
            let mut output = std::io::stdout();
            service::export(&export, &mut output)
        }
    };

    if let Err(e) = result {
        tracing::error!(error = %e, "bank ledger failed");
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
