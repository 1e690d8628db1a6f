//! Account transaction processing
//!
//! `Account::process_transaction` is the only entry point that mutates an
//! account's balance, status or history. It:
//!
//! 1. rejects transactions whose currency differs from the account's
//! 2. rejects everything while the account is FROZEN or CLOSED
//! 3. dispatches on the transaction type to a credit or debit handler
//!
//! Business rejections are never errors. Whatever the outcome, the
//! transaction leaves with a terminal status (COMPLETED or FAILED) and a copy
//! of it is appended to the account history.

use crate::types::{
    Account, AccountStatus, Rejection, Transaction, TransactionStatus, TransactionType,
};
use tracing::{info, warn};

/// Result of presenting a transaction to an account
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessOutcome {
    /// Whether the account applied the transaction
    pub accepted: bool,
    /// Human readable outcome; the rejection text when refused
    pub message: String,
    /// Final status given to the transaction
    pub status: TransactionStatus,
    /// Typed reason when refused
    pub rejection: Option<Rejection>,
}

impl ProcessOutcome {
    fn completed(message: String) -> Self {
        ProcessOutcome {
            accepted: true,
            message,
            status: TransactionStatus::Completed,
            rejection: None,
        }
    }

    fn rejected(rejection: Rejection, status: TransactionStatus) -> Self {
        ProcessOutcome {
            accepted: false,
            message: rejection.to_string(),
            status,
            rejection: Some(rejection),
        }
    }
}

impl Account {
    /// Process a transaction against this account
    ///
    /// The transaction's status is set to COMPLETED or FAILED and the
    /// transaction is appended to the history. A transaction that already
    /// carries a terminal status is refused with
    /// [`Rejection::AlreadyProcessed`] and is not recorded a second time.
    pub fn process_transaction(&mut self, transaction: &mut Transaction) -> ProcessOutcome {
        if transaction.status() != TransactionStatus::Pending {
            warn!(
                account = %self.account_name,
                tx = %transaction.transaction_id(),
                status = %transaction.status(),
                "transaction presented twice"
            );
            return ProcessOutcome::rejected(Rejection::AlreadyProcessed, transaction.status());
        }

        let outcome = match self.apply(transaction) {
            Ok(()) => ProcessOutcome::completed(format!(
                "{} of {} {} completed",
                transaction.tx_type(),
                transaction.amount(),
                transaction.currency()
            )),
            Err(rejection) => ProcessOutcome::rejected(rejection, TransactionStatus::Failed),
        };

        transaction.set_status(outcome.status);
        self.transaction_history.push(transaction.clone());

        if outcome.accepted {
            info!(
                account = %self.account_name,
                tx = %transaction.transaction_id(),
                tx_type = %transaction.tx_type(),
                amount = %transaction.amount(),
                balance = %self.balance,
                "transaction completed"
            );
        } else {
            warn!(
                account = %self.account_name,
                tx = %transaction.transaction_id(),
                tx_type = %transaction.tx_type(),
                amount = %transaction.amount(),
                reason = %outcome.message,
                "transaction rejected"
            );
        }

        outcome
    }

    /// Validate and apply a transaction, mutating balance/status on success
    fn apply(&mut self, transaction: &Transaction) -> Result<(), Rejection> {
        if transaction.currency() != self.currency {
            return Err(Rejection::CurrencyMismatch);
        }

        match self.status {
            AccountStatus::Frozen => return Err(Rejection::AccountFrozen),
            AccountStatus::Closed => return Err(Rejection::AccountClosed),
            AccountStatus::Active | AccountStatus::Pending => {}
        }

        match transaction.tx_type() {
            TransactionType::Deposit | TransactionType::Interest | TransactionType::TransferIn => {
                self.credit(transaction)
            }
            TransactionType::Withdrawal => self.debit(transaction),
            TransactionType::TransferOut => {
                if transaction.destination_account_name().is_none() {
                    return Err(Rejection::DestinationMismatch);
                }
                self.debit(transaction)
            }
            TransactionType::Fee => self.charge_fee(transaction),
        }
    }

    /// DEPOSIT / INTEREST / TRANSFER_IN
    fn credit(&mut self, transaction: &Transaction) -> Result<(), Rejection> {
        if transaction.destination_account_name() != Some(self.account_name.as_str()) {
            return Err(Rejection::DestinationMismatch);
        }

        self.balance = self
            .balance
            .checked_add(transaction.amount())
            .ok_or(Rejection::ArithmeticOverflow)?;

        Ok(())
    }

    /// WITHDRAWAL / TRANSFER_OUT
    fn debit(&mut self, transaction: &Transaction) -> Result<(), Rejection> {
        self.check_source(transaction)?;

        if self.balance < transaction.amount() {
            return Err(Rejection::InsufficientFunds);
        }

        self.balance = self
            .balance
            .checked_sub(transaction.amount())
            .ok_or(Rejection::ArithmeticOverflow)?;

        Ok(())
    }

    /// FEE: an unpaid fee freezes the account
    fn charge_fee(&mut self, transaction: &Transaction) -> Result<(), Rejection> {
        self.check_source(transaction)?;

        if self.balance < transaction.amount() {
            self.status = AccountStatus::Frozen;
            warn!(
                account = %self.account_name,
                fee = %transaction.amount(),
                balance = %self.balance,
                "account frozen after unpaid fee"
            );
            return Err(Rejection::InsufficientFunds);
        }

        self.debit(transaction)
    }

    fn check_source(&self, transaction: &Transaction) -> Result<(), Rejection> {
        if transaction.source_account_name() == Some(self.account_name.as_str()) {
            Ok(())
        } else {
            Err(Rejection::SourceMismatch)
        }
    }
}
