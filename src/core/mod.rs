//! Core business logic module
//!
//! This module contains the ledger components:
//! - `account` - The per-account transaction state machine
//! - `transfer` - Two-leg transfers with compensation
//! - `transaction_store` - Global, append-only transaction history
//! - `bank` - Thread-safe registry of users and accounts
//! - `traits` - Persistence abstraction

pub mod account;
pub mod bank;
pub mod traits;
pub mod transaction_store;
pub mod transfer;

pub use account::ProcessOutcome;
pub use bank::{
    AccountHandle, AccountHistory, AccountUpdate, Bank, Posting, PostingKind, TransferReceipt,
};
pub use traits::SnapshotStore;
pub use transaction_store::TransactionStore;
pub use transfer::{transfer, TransferLeg, TransferOutcome, TransferResolution};
