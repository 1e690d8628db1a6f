//! Types module
//!
//! Contains core data structures used throughout the application.
//! This module organizes types into logical submodules:
//! - `account`: Account, its type and status
//! - `transaction`: Transaction and its type and status
//! - `user`: Bank customers and their contact details
//! - `error`: Error and rejection types for the ledger

pub mod account;
pub mod error;
pub mod transaction;
pub mod user;

pub use account::{Account, AccountStatus, AccountSummary, AccountType};
pub use error::{LedgerError, Rejection};
pub use transaction::{Transaction, TransactionStatus, TransactionType};
pub use user::{ContactInfo, ContactInfoUpdate, User, UserUpdate};

use chrono::Utc;

/// Current time as fractional epoch seconds
pub(crate) fn epoch_now() -> f64 {
    let now = Utc::now();
    now.timestamp() as f64 + f64::from(now.timestamp_subsec_micros()) / 1_000_000.0
}
