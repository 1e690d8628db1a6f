use clap::{Args, Parser, Subcommand};
use std::net::SocketAddr;
use std::path::PathBuf;

/// Default address of the HTTP server
pub const DEFAULT_BIND: &str = "0.0.0.0:5001";

/// Default location of the JSON snapshot
pub const DEFAULT_DATA_FILE: &str = "bank_data.json";

/// Run and inspect the bank ledger service
#[derive(Parser, Debug)]
#[command(name = "bank-ledger")]
#[command(about = "Bank ledger service with accounts, transfers and history", long_about = None)]
pub struct CliArgs {
    /// Tracing filter directive (overrides RUST_LOG)
    #[arg(long = "log", value_name = "FILTER", global = true)]
    pub log: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Serve the HTTP API
    Serve(ServeArgs),
    /// Write accounts or transactions from a snapshot as CSV to stdout
    Export(ExportArgs),
}

#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Address to listen on
    #[arg(
        long = "bind",
        value_name = "ADDR",
        env = "BANK_LEDGER_BIND",
        default_value = DEFAULT_BIND
    )]
    pub bind: SocketAddr,

    /// JSON snapshot file loaded at start-up and saved after every change
    #[arg(
        long = "data-file",
        value_name = "PATH",
        env = "BANK_LEDGER_DATA",
        default_value = DEFAULT_DATA_FILE
    )]
    pub data_file: PathBuf,

    /// Keep all state in memory; nothing is read or written on disk.
    /// Takes precedence over `--data-file` and `BANK_LEDGER_DATA`.
    #[arg(long = "in-memory")]
    pub in_memory: bool,

    /// Runtime worker threads (default: CPU cores)
    #[arg(long = "workers", value_name = "COUNT")]
    pub workers: Option<usize>,
}

#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Snapshot file to read
    #[arg(
        long = "data-file",
        value_name = "PATH",
        env = "BANK_LEDGER_DATA",
        default_value = DEFAULT_DATA_FILE
    )]
    pub data_file: PathBuf,

    /// Export the global transaction history instead of accounts
    #[arg(long = "transactions")]
    pub transactions: bool,
}

/// Settings of the HTTP server
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServerConfig {
    pub bind: SocketAddr,
    /// `None` keeps state in memory only
    pub data_file: Option<PathBuf>,
    pub workers: usize,
}

impl ServerConfig {
    /// Create a ServerConfig, replacing a zero worker count with the default
    pub fn new(bind: SocketAddr, data_file: Option<PathBuf>, workers: Option<usize>) -> Self {
        let default_workers = num_cpus::get();
        let workers = match workers {
            Some(0) => {
                tracing::warn!(
                    requested = 0,
                    default = default_workers,
                    "invalid worker count, using default"
                );
                default_workers
            }
            Some(workers) => workers,
            None => default_workers,
        };

        Self {
            bind,
            data_file,
            workers,
        }
    }
}

impl ServeArgs {
    pub fn to_server_config(&self) -> ServerConfig {
        let data_file = (!self.in_memory).then(|| self.data_file.clone());
        ServerConfig::new(self.bind, data_file, self.workers)
    }
}
