//! Rust Bank Ledger Library
//! # Overview
//!
//! This library provides an in-memory bank ledger: users own accounts, accounts
//! accept transactions through a single state machine, and transfers between
//! accounts are compensated when one side refuses.
//!
//! # Architecture
//!
//! The system is organized into several key components:
//!
//! - [`types`] - Core data types (Account, Transaction, User, errors)
//! - [`cli`] - CLI arguments parsing
//! - [`core`] - Business logic components:
//!   - [`core::account`] - `Account::process_transaction`
//!   - [`core::transfer`] - Two-leg transfers with compensation
//!   - [`core::transaction_store`] - Global transaction history
//!   - [`core::bank`] - Thread-safe registry of users and accounts
//! - [`io`] - JSON snapshots and CSV export
//! - [`api`] - HTTP API (axum)
//! - [`service`] - `serve` and `export` entry points
//!
//! # Transaction Types
//!
//! - **Deposit**, **Interest**, **TransferIn**: credit the destination account
//! - **Withdrawal**, **TransferOut**: debit the source account (requires sufficient balance)
//! - **Fee**: debit the source account; an unpayable fee freezes the account
//!
//! # Account States
//!
//! Each account maintains:
//! - `balance`: equal to the signed sum of its COMPLETED transactions
//! - `status`: ACTIVE, FROZEN, CLOSED or PENDING; FROZEN and CLOSED accounts
//!   refuse every transaction
//! - `transaction_history`: every transaction presented to it, accepted or not

// Module declarations
pub mod api;
pub mod cli;
pub mod core;
pub mod io;
pub mod service;
pub mod types;

pub use core::{Bank, ProcessOutcome, SnapshotStore, TransactionStore, TransferOutcome};
pub use io::{write_accounts_csv, write_transactions_csv, Snapshot};
pub use types::{
    Account, AccountStatus, AccountType, LedgerError, Rejection, Transaction, TransactionStatus,
    TransactionType, User,
};
