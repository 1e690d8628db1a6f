//! Transaction-related types for the bank ledger
//!
//! A [`Transaction`] describes one monetary movement against an account.
//! Its shape is validated once, at construction; afterwards only its status
//! may change, and only through account processing.

use super::epoch_now;
use super::error::LedgerError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Types of monetary movement an account understands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionType {
    /// Money deposited into the account
    Deposit,
    /// Money withdrawn from the account
    Withdrawal,
    /// Incoming leg of a transfer
    TransferIn,
    /// Outgoing leg of a transfer
    TransferOut,
    /// Fee charged to the account
    Fee,
    /// Interest credited to the account
    Interest,
}

impl TransactionType {
    /// Wire name of the type (`"TRANSFER_IN"`, ...)
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Deposit => "DEPOSIT",
            TransactionType::Withdrawal => "WITHDRAWAL",
            TransactionType::TransferIn => "TRANSFER_IN",
            TransactionType::TransferOut => "TRANSFER_OUT",
            TransactionType::Fee => "FEE",
            TransactionType::Interest => "INTEREST",
        }
    }

    /// Whether a completed transaction of this type increases the balance
    pub fn is_credit(&self) -> bool {
        matches!(
            self,
            TransactionType::Deposit | TransactionType::TransferIn | TransactionType::Interest
        )
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle status of a transaction
///
/// Transactions are born PENDING; account processing moves them to
/// COMPLETED or FAILED exactly once. REVERSED and CANCELLED exist for
/// records produced elsewhere and are never assigned by an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionStatus {
    Pending,
    Completed,
    Failed,
    Reversed,
    Cancelled,
}

impl TransactionStatus {
    /// Wire name of the status
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionStatus::Pending => "PENDING",
            TransactionStatus::Completed => "COMPLETED",
            TransactionStatus::Failed => "FAILED",
            TransactionStatus::Reversed => "REVERSED",
            TransactionStatus::Cancelled => "CANCELLED",
        }
    }
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single monetary movement
///
/// Accounts are referenced by name only; a transaction never holds a
/// reference to an account object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    #[serde(rename = "type")]
    tx_type: TransactionType,
    amount: Decimal,
    currency: String,
    source_account_name: Option<String>,
    destination_account_name: Option<String>,
    description: Option<String>,
    transaction_id: String,
    transaction_timestamp: f64,
    status: TransactionStatus,
}

impl Transaction {
    /// Build a validated, PENDING transaction
    ///
    /// # Errors
    ///
    /// - `InvalidAmount` if `amount <= 0`
    /// - `MissingSourceAccount` for WITHDRAWAL / TRANSFER_OUT without a source
    /// - `MissingDestinationAccount` for DEPOSIT / TRANSFER_IN without a destination
    /// - `MissingTransferAccounts` for a transfer leg missing either end
    pub fn new(
        tx_type: TransactionType,
        amount: Decimal,
        currency: impl Into<String>,
        source_account_name: Option<String>,
        destination_account_name: Option<String>,
        description: Option<String>,
    ) -> Result<Self, LedgerError> {
        check_shape(
            tx_type,
            amount,
            source_account_name.is_some(),
            destination_account_name.is_some(),
        )?;

        Ok(Transaction {
            tx_type,
            amount,
            currency: currency.into(),
            source_account_name,
            destination_account_name,
            description,
            transaction_id: Uuid::new_v4().to_string(),
            transaction_timestamp: epoch_now(),
            status: TransactionStatus::Pending,
        })
    }

    pub fn tx_type(&self) -> TransactionType {
        self.tx_type
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }

    pub fn currency(&self) -> &str {
        &self.currency
    }

    pub fn source_account_name(&self) -> Option<&str> {
        self.source_account_name.as_deref()
    }

    pub fn destination_account_name(&self) -> Option<&str> {
        self.destination_account_name.as_deref()
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn transaction_id(&self) -> &str {
        &self.transaction_id
    }

    /// Creation time as epoch seconds
    pub fn transaction_timestamp(&self) -> f64 {
        self.transaction_timestamp
    }

    pub fn status(&self) -> TransactionStatus {
        self.status
    }

    /// Signed effect on the balance of the account that processed it
    ///
    /// Zero unless the transaction completed.
    pub fn balance_effect(&self) -> Decimal {
        match (self.status, self.tx_type.is_credit()) {
            (TransactionStatus::Completed, true) => self.amount,
            (TransactionStatus::Completed, false) => -self.amount,
            _ => Decimal::ZERO,
        }
    }

    pub(crate) fn set_status(&mut self, status: TransactionStatus) {
        self.status = status;
    }

    /// Re-check a transaction that was not built by [`Transaction::new`]
    ///
    /// Applies the construction rules and requires the terminal status every
    /// recorded transaction has.
    ///
    /// # Errors
    ///
    /// `CorruptSnapshot` naming the transaction and the broken rule.
    pub fn verify_recorded(&self) -> Result<(), LedgerError> {
        let invalid = |reason: String| {
            LedgerError::corrupt_snapshot(format!("transaction {}: {reason}", self.transaction_id))
        };
        check_shape(
            self.tx_type,
            self.amount,
            self.source_account_name.is_some(),
            self.destination_account_name.is_some(),
        )
        .map_err(|e| invalid(e.to_string()))?;
        if self.status == TransactionStatus::Pending {
            return Err(invalid("status is still PENDING".to_string()));
        }
        Ok(())
    }
}

fn check_shape(
    tx_type: TransactionType,
    amount: Decimal,
    has_source: bool,
    has_destination: bool,
) -> Result<(), LedgerError> {
    if amount <= Decimal::ZERO {
        return Err(LedgerError::InvalidAmount);
    }

    match tx_type {
        TransactionType::TransferOut | TransactionType::TransferIn
            if !(has_source && has_destination) =>
        {
            Err(LedgerError::MissingTransferAccounts)
        }
        TransactionType::Withdrawal if !has_source => {
            Err(LedgerError::missing_source(tx_type.as_str()))
        }
        TransactionType::Deposit if !has_destination => {
            Err(LedgerError::missing_destination(tx_type.as_str()))
        }
        _ => Ok(()),
    }
}
