//! I/O module
//!
//! Handles persistence and export of the bank state.
//!
//! # Components
//!
//! - `snapshot` - Whole-bank JSON snapshot and the stores that keep it
//! - `csv_format` - CSV export of accounts and transactions

pub mod csv_format;
pub mod snapshot;

pub use csv_format::{write_accounts_csv, write_transactions_csv};
pub use snapshot::{JsonFileStore, MemorySnapshotStore, Snapshot};
