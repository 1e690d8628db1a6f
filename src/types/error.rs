//! Error types for the bank ledger
//!
//! Two families of failure are kept apart:
//!
//! - [`LedgerError`] - failures that abort an operation before any account is
//!   touched (malformed transactions, unknown users/accounts, persistence and
//!   parsing problems). These are returned through `Result`.
//! - [`Rejection`] - business outcomes of `process_transaction`. They are
//!   never returned as `Err`; the transaction is still recorded with status
//!   FAILED and the rejection travels inside the processing outcome.

use thiserror::Error;

/// Main error type for the bank ledger
///
/// Every variant carries enough context to be shown to an API caller as-is.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LedgerError {
    /// Transaction amount was zero or negative
    #[error("Transaction amount must be positive.")]
    InvalidAmount,

    /// WITHDRAWAL / TRANSFER_OUT built without a source account
    #[error("{tx_type} must have a source_account_name.")]
    MissingSourceAccount {
        /// Transaction type name
        tx_type: String,
    },

    /// DEPOSIT / TRANSFER_IN built without a destination account
    #[error("{tx_type} must have a destination_account_name.")]
    MissingDestinationAccount {
        /// Transaction type name
        tx_type: String,
    },

    /// Transfer legs need both ends of the transfer
    #[error("Transfers must have both source and destination account names.")]
    MissingTransferAccounts,

    /// Account opened with a negative initial deposit
    #[error("Initial deposit cannot be negative.")]
    NegativeInitialDeposit,

    /// Currency code was empty
    #[error("Currency code cannot be empty.")]
    InvalidCurrency,

    /// Unknown account type string
    #[error("Invalid account_type '{value}'")]
    InvalidAccountType {
        /// The rejected input
        value: String,
    },

    /// Unknown account status string
    #[error("Invalid status '{value}'")]
    InvalidAccountStatus {
        /// The rejected input
        value: String,
    },

    /// User failed its own validation
    #[error("{message}")]
    InvalidUser {
        /// Description of the failed check
        message: String,
    },

    /// A user with this username already exists
    #[error("Username already exists")]
    UsernameTaken {
        /// The duplicated username
        username: String,
    },

    /// Opening an account for a user that is not registered
    #[error("Username does not exist")]
    UnknownOwner {
        /// The username that was not found
        username: String,
    },

    /// User lookup failed
    #[error("User not found")]
    UserNotFound {
        /// The username that was not found
        username: String,
    },

    /// Account lookup failed
    #[error("Account not found")]
    AccountNotFound {
        /// The account name that was not found
        account_name: String,
    },

    /// User has no accounts
    #[error("Account not found")]
    NoAccounts {
        /// The username without accounts
        username: String,
    },

    /// Transfer source could not be resolved
    #[error("Source account not found")]
    SourceAccountNotFound {
        /// The account name that was not found
        account_name: String,
    },

    /// Transfer destination could not be resolved
    #[error("Destination account not found")]
    DestinationAccountNotFound {
        /// The account name that was not found
        account_name: String,
    },

    /// Source and destination of a transfer are the same account
    #[error("Cannot transfer to the same account")]
    SameAccountTransfer {
        /// The account on both ends
        account_name: String,
    },

    /// Every drawn account name was already taken
    #[error("Could not allocate a unique account name for {username}")]
    AccountNameExhausted {
        /// Owner of the account being opened
        username: String,
    },

    /// Snapshot content breaks a ledger invariant
    #[error("Invalid snapshot: {message}")]
    CorruptSnapshot {
        /// Which record is wrong and how
        message: String,
    },

    /// Query parameter could not be read as a boolean
    #[error("Invalid boolean value '{value}'. Expected one of true, 1, on, yes, false, 0, off, no.")]
    InvalidBoolean {
        /// The rejected input
        value: String,
    },

    /// I/O error while reading or writing snapshot or export files
    #[error("I/O error: {message}")]
    Io {
        /// Description of the I/O error
        message: String,
    },

    /// Snapshot (de)serialization failed
    #[error("Serialization error: {message}")]
    Serialization {
        /// Description of the serde error
        message: String,
    },

    /// CSV export failed
    #[error("CSV error{}: {message}", line.map(|l| format!(" at line {}", l)).unwrap_or_default())]
    Csv {
        /// Line number where the error occurred (if available)
        line: Option<u64>,
        /// Description of the CSV error
        message: String,
    },
}

impl From<std::io::Error> for LedgerError {
    fn from(error: std::io::Error) -> Self {
        LedgerError::Io {
            message: error.to_string(),
        }
    }
}

impl From<serde_json::Error> for LedgerError {
    fn from(error: serde_json::Error) -> Self {
        LedgerError::Serialization {
            message: error.to_string(),
        }
    }
}

impl From<csv::Error> for LedgerError {
    fn from(error: csv::Error) -> Self {
        let line = error.position().map(|pos| pos.line());

        LedgerError::Csv {
            line,
            message: error.to_string(),
        }
    }
}

// Helper functions for creating common errors

impl LedgerError {
    /// Create a MissingSourceAccount error
    pub fn missing_source(tx_type: &str) -> Self {
        LedgerError::MissingSourceAccount {
            tx_type: tx_type.to_string(),
        }
    }

    /// Create a MissingDestinationAccount error
    pub fn missing_destination(tx_type: &str) -> Self {
        LedgerError::MissingDestinationAccount {
            tx_type: tx_type.to_string(),
        }
    }

    /// Create an InvalidUser error
    pub fn invalid_user(message: &str) -> Self {
        LedgerError::InvalidUser {
            message: message.to_string(),
        }
    }

    /// Create a UserNotFound error
    pub fn user_not_found(username: &str) -> Self {
        LedgerError::UserNotFound {
            username: username.to_string(),
        }
    }

    /// Create an AccountNotFound error
    pub fn account_not_found(account_name: &str) -> Self {
        LedgerError::AccountNotFound {
            account_name: account_name.to_string(),
        }
    }

    /// Create a CorruptSnapshot error
    pub fn corrupt_snapshot(message: impl Into<String>) -> Self {
        LedgerError::CorruptSnapshot {
            message: message.into(),
        }
    }

    /// Create an InvalidBoolean error
    pub fn invalid_boolean(value: &str) -> Self {
        LedgerError::InvalidBoolean {
            value: value.to_string(),
        }
    }

    /// True for lookups that failed because a resource does not exist
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            LedgerError::UserNotFound { .. }
                | LedgerError::AccountNotFound { .. }
                | LedgerError::NoAccounts { .. }
                | LedgerError::SourceAccountNotFound { .. }
                | LedgerError::DestinationAccountNotFound { .. }
        )
    }

    /// True for failures of the process rather than of the request
    pub fn is_internal(&self) -> bool {
        matches!(
            self,
            LedgerError::Io { .. }
                | LedgerError::Serialization { .. }
                | LedgerError::Csv { .. }
                | LedgerError::AccountNameExhausted { .. }
                | LedgerError::CorruptSnapshot { .. }
        )
    }
}

/// Reason an account refused a transaction
///
/// The `Display` strings are the messages callers see in the processing
/// outcome and in HTTP error bodies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Rejection {
    /// Transaction currency differs from the account currency
    #[error("Currency mismatch")]
    CurrencyMismatch,

    /// Account is FROZEN
    #[error("Account is frozen")]
    AccountFrozen,

    /// Account is CLOSED
    #[error("Account is closed")]
    AccountClosed,

    /// Debit larger than the current balance
    #[error("Insufficient funds")]
    InsufficientFunds,

    /// Debit whose source is a different account
    #[error("Transaction source does not match account")]
    SourceMismatch,

    /// Credit whose destination is a different account
    #[error("Transaction destination does not match account")]
    DestinationMismatch,

    /// Transaction already carries a terminal status
    #[error("Transaction already processed")]
    AlreadyProcessed,

    /// Applying the amount would overflow the balance
    #[error("Balance overflow")]
    ArithmeticOverflow,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::invalid_amount(LedgerError::InvalidAmount, "Transaction amount must be positive.")]
    #[case::missing_source(
        LedgerError::missing_source("WITHDRAWAL"),
        "WITHDRAWAL must have a source_account_name."
    )]
    #[case::missing_destination(
        LedgerError::missing_destination("DEPOSIT"),
        "DEPOSIT must have a destination_account_name."
    )]
    #[case::unknown_owner(
        LedgerError::UnknownOwner { username: "ghost".to_string() },
        "Username does not exist"
    )]
    #[case::names_exhausted(
        LedgerError::AccountNameExhausted { username: "jane".to_string() },
        "Could not allocate a unique account name for jane"
    )]
    #[case::corrupt_snapshot(
        LedgerError::corrupt_snapshot("account checking_aaaaa: balance -100 does not match its history (0)"),
        "Invalid snapshot: account checking_aaaaa: balance -100 does not match its history (0)"
    )]
    #[case::csv_with_line(
        LedgerError::Csv { line: Some(3), message: "bad field".to_string() },
        "CSV error at line 3: bad field"
    )]
    #[case::csv_without_line(
        LedgerError::Csv { line: None, message: "bad field".to_string() },
        "CSV error: bad field"
    )]
    fn test_error_display(#[case] error: LedgerError, #[case] expected: &str) {
        assert_eq!(error.to_string(), expected);
    }

    #[rstest]
    #[case::currency(Rejection::CurrencyMismatch, "Currency mismatch")]
    #[case::frozen(Rejection::AccountFrozen, "Account is frozen")]
    #[case::closed(Rejection::AccountClosed, "Account is closed")]
    #[case::funds(Rejection::InsufficientFunds, "Insufficient funds")]
    fn test_rejection_messages(#[case] rejection: Rejection, #[case] expected: &str) {
        assert_eq!(rejection.to_string(), expected);
    }

    #[rstest]
    #[case::user(LedgerError::user_not_found("a"), true, false)]
    #[case::account(LedgerError::account_not_found("a"), true, false)]
    #[case::io(LedgerError::Io { message: "disk".to_string() }, false, true)]
    #[case::validation(LedgerError::InvalidAmount, false, false)]
    #[case::names_exhausted(
        LedgerError::AccountNameExhausted { username: "jane".to_string() },
        false,
        true
    )]
    #[case::corrupt_snapshot(LedgerError::corrupt_snapshot("bad"), false, true)]
    fn test_error_classification(
        #[case] error: LedgerError,
        #[case] not_found: bool,
        #[case] internal: bool,
    ) {
        assert_eq!(error.is_not_found(), not_found);
        assert_eq!(error.is_internal(), internal);
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error =
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "Permission denied");
        let error: LedgerError = io_error.into();
        assert!(matches!(error, LedgerError::Io { .. }));
        assert_eq!(error.to_string(), "I/O error: Permission denied");
    }
}
