//! Account-related types for the bank ledger
//!
//! This module defines the Account structure, its type and status enums,
//! and account opening. The transaction state machine that mutates an
//! account lives in [`crate::core::account`].

use super::epoch_now;
use super::error::LedgerError;
use super::transaction::{Transaction, TransactionType};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Kind of bank account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccountType {
    /// A standard savings account
    Savings,
    /// A standard checking account
    Checking,
    /// A credit account
    Credit,
    /// A loan account
    Loan,
}

impl AccountType {
    /// Wire name of the type
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountType::Savings => "SAVINGS",
            AccountType::Checking => "CHECKING",
            AccountType::Credit => "CREDIT",
            AccountType::Loan => "LOAN",
        }
    }
}

impl fmt::Display for AccountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AccountType {
    type Err = LedgerError;

    /// Case-insensitive parse (`"checking"`, `"Checking"`, `"CHECKING"`)
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_uppercase().as_str() {
            "SAVINGS" => Ok(AccountType::Savings),
            "CHECKING" => Ok(AccountType::Checking),
            "CREDIT" => Ok(AccountType::Credit),
            "LOAN" => Ok(AccountType::Loan),
            _ => Err(LedgerError::InvalidAccountType {
                value: value.to_string(),
            }),
        }
    }
}

/// Lifecycle status of an account
///
/// FROZEN and CLOSED are the blocked statuses: a blocked account refuses
/// every transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccountStatus {
    /// Open for transactions
    Active,
    /// Closed, refuses transactions
    Closed,
    /// Frozen (e.g. after an unpaid fee), refuses transactions
    Frozen,
    /// Awaiting verification; still accepts transactions
    Pending,
}

impl AccountStatus {
    /// Wire name of the status
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountStatus::Active => "ACTIVE",
            AccountStatus::Closed => "CLOSED",
            AccountStatus::Frozen => "FROZEN",
            AccountStatus::Pending => "PENDING",
        }
    }

    /// FROZEN or CLOSED
    pub fn is_blocked(&self) -> bool {
        matches!(self, AccountStatus::Frozen | AccountStatus::Closed)
    }
}

impl fmt::Display for AccountStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AccountStatus {
    type Err = LedgerError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_uppercase().as_str() {
            "ACTIVE" => Ok(AccountStatus::Active),
            "CLOSED" => Ok(AccountStatus::Closed),
            "FROZEN" => Ok(AccountStatus::Frozen),
            "PENDING" => Ok(AccountStatus::Pending),
            _ => Err(LedgerError::InvalidAccountStatus {
                value: value.to_string(),
            }),
        }
    }
}

/// A balance-holding account belonging to one owner
///
/// Balance, status and history only change through
/// [`Account::process_transaction`](crate::core::account); the remaining
/// fields are fixed at opening, apart from the account type which the
/// registry may relabel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub(crate) account_id: String,
    pub(crate) account_name: String,
    pub(crate) account_type: AccountType,
    pub(crate) currency: String,
    pub(crate) owner: String,
    pub(crate) balance: Decimal,
    pub(crate) status: AccountStatus,
    pub(crate) created_at: f64,
    pub(crate) transaction_history: Vec<Transaction>,
}

/// Number of id characters used in the display name
const SHORT_ID_LEN: usize = 5;

impl Account {
    /// Open a new ACTIVE account
    ///
    /// A positive `initial_deposit` is applied as a DEPOSIT transaction, so
    /// the new account's history already explains its balance. The deposit
    /// transaction (if any) is returned alongside the account so callers can
    /// record it in the global history.
    ///
    /// # Errors
    ///
    /// - `NegativeInitialDeposit` if `initial_deposit < 0`
    /// - `InvalidCurrency` if `currency` is blank
    pub fn open(
        owner: impl Into<String>,
        account_type: AccountType,
        currency: impl Into<String>,
        initial_deposit: Decimal,
    ) -> Result<(Self, Option<Transaction>), LedgerError> {
        if initial_deposit < Decimal::ZERO {
            return Err(LedgerError::NegativeInitialDeposit);
        }
        let currency = currency.into();
        if currency.trim().is_empty() {
            return Err(LedgerError::InvalidCurrency);
        }

        let account_id = Uuid::new_v4().to_string();
        let account_name = format!(
            "{}_{}",
            account_type.as_str().to_lowercase(),
            &account_id[..SHORT_ID_LEN]
        );

        let mut account = Account {
            account_id,
            account_name,
            account_type,
            currency,
            owner: owner.into(),
            balance: Decimal::ZERO,
            status: AccountStatus::Active,
            created_at: epoch_now(),
            transaction_history: Vec::new(),
        };

        if initial_deposit == Decimal::ZERO {
            return Ok((account, None));
        }

        let mut deposit = Transaction::new(
            TransactionType::Deposit,
            initial_deposit,
            account.currency.clone(),
            None,
            Some(account.account_name.clone()),
            Some("Initial deposit".to_string()),
        )?;
        account.process_transaction(&mut deposit);

        Ok((account, Some(deposit)))
    }

    pub fn account_id(&self) -> &str {
        &self.account_id
    }

    /// Display name: lowercase type + first characters of the id
    pub fn account_name(&self) -> &str {
        &self.account_name
    }

    pub fn account_type(&self) -> AccountType {
        self.account_type
    }

    pub fn currency(&self) -> &str {
        &self.currency
    }

    /// Username of the owner
    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn balance(&self) -> Decimal {
        self.balance
    }

    pub fn status(&self) -> AccountStatus {
        self.status
    }

    pub fn created_at(&self) -> f64 {
        self.created_at
    }

    /// Every transaction presented to this account, in processing order
    pub fn transaction_history(&self) -> &[Transaction] {
        &self.transaction_history
    }

    /// Relabel the account type; balances and history are unaffected
    pub fn set_account_type(&mut self, account_type: AccountType) {
        self.account_type = account_type;
    }

    /// Administrative status change (review unfreeze, closing, ...)
    pub fn set_status(&mut self, status: AccountStatus) {
        self.status = status;
    }

    /// Check an account that was loaded rather than opened
    ///
    /// Every history entry must pass [`Transaction::verify_recorded`] and
    /// the balance must equal the signed sum of the COMPLETED entries.
    ///
    /// # Errors
    ///
    /// `CorruptSnapshot` naming the account (or history entry) and the
    /// broken rule.
    pub fn verify_restored(&self) -> Result<(), LedgerError> {
        let corrupt = |detail: String| {
            LedgerError::corrupt_snapshot(format!("account {}: {detail}", self.account_name))
        };
        if self.currency.trim().is_empty() {
            return Err(corrupt("currency is empty".to_string()));
        }

        let mut replayed = Decimal::ZERO;
        for transaction in &self.transaction_history {
            transaction.verify_recorded()?;
            replayed = replayed
                .checked_add(transaction.balance_effect())
                .ok_or_else(|| corrupt("history overflows".to_string()))?;
        }
        if replayed != self.balance {
            return Err(corrupt(format!(
                "balance {} does not match its history ({replayed})",
                self.balance
            )));
        }
        Ok(())
    }

    /// Serializable view without the history
    pub fn summary(&self) -> AccountSummary {
        AccountSummary {
            account_id: self.account_id.clone(),
            account_name: self.account_name.clone(),
            account_type: self.account_type,
            currency: self.currency.clone(),
            owner: self.owner.clone(),
            balance: self.balance,
            status: self.status,
            created_at: self.created_at,
        }
    }
}

/// Account state as returned by API responses and exports
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountSummary {
    pub account_id: String,
    pub account_name: String,
    pub account_type: AccountType,
    pub currency: String,
    pub owner: String,
    pub balance: Decimal,
    pub status: AccountStatus,
    pub created_at: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TransactionStatus;
    use rstest::rstest;

    #[test]
    fn test_open_without_deposit() {
        let (account, deposit) =
            Account::open("john.doe", AccountType::Checking, "USD", Decimal::ZERO).unwrap();

        assert!(deposit.is_none());
        assert_eq!(account.balance(), Decimal::ZERO);
        assert_eq!(account.status(), AccountStatus::Active);
        assert_eq!(account.owner(), "john.doe");
        assert!(account.transaction_history().is_empty());
    }

    #[test]
    fn test_open_records_initial_deposit() {
        let (account, deposit) =
            Account::open("john.doe", AccountType::Savings, "USD", Decimal::new(500, 0)).unwrap();

        let deposit = deposit.unwrap();
        assert_eq!(deposit.tx_type(), TransactionType::Deposit);
        assert_eq!(deposit.status(), TransactionStatus::Completed);
        assert_eq!(account.balance(), Decimal::new(500, 0));
        assert_eq!(account.transaction_history(), &[deposit]);
    }

    #[test]
    fn test_account_name_is_type_and_short_id() {
        let (account, _) =
            Account::open("john.doe", AccountType::Checking, "USD", Decimal::ZERO).unwrap();

        let expected = format!("checking_{}", &account.account_id()[..5]);
        assert_eq!(account.account_name(), expected);
    }

    #[rstest]
    #[case::negative_deposit("USD", Decimal::new(-1, 0), LedgerError::NegativeInitialDeposit)]
    #[case::blank_currency("  ", Decimal::ZERO, LedgerError::InvalidCurrency)]
    fn test_open_rejects_invalid_input(
        #[case] currency: &str,
        #[case] deposit: Decimal,
        #[case] expected: LedgerError,
    ) {
        let result = Account::open("john.doe", AccountType::Checking, currency, deposit);
        assert_eq!(result.unwrap_err(), expected);
    }

    #[rstest]
    #[case("savings", AccountType::Savings)]
    #[case("Checking", AccountType::Checking)]
    #[case("CREDIT", AccountType::Credit)]
    #[case(" loan ", AccountType::Loan)]
    fn test_account_type_parsing(#[case] input: &str, #[case] expected: AccountType) {
        assert_eq!(input.parse::<AccountType>().unwrap(), expected);
    }

    #[test]
    fn test_account_type_parsing_rejects_unknown() {
        assert!(matches!(
            "brokerage".parse::<AccountType>(),
            Err(LedgerError::InvalidAccountType { .. })
        ));
    }

    #[test]
    fn test_verify_restored_accepts_processed_account() {
        let (account, _) =
            Account::open("john.doe", AccountType::Checking, "USD", Decimal::new(500, 0)).unwrap();
        assert!(account.verify_restored().is_ok());
    }

    #[test]
    fn test_verify_restored_rejects_unexplained_balance() {
        let (mut account, _) =
            Account::open("john.doe", AccountType::Checking, "USD", Decimal::new(500, 0)).unwrap();
        account.balance = Decimal::new(-100, 0);

        let error = account.verify_restored().unwrap_err();
        assert_eq!(
            error.to_string(),
            format!(
                "Invalid snapshot: account {}: balance -100 does not match its history (500)",
                account.account_name()
            )
        );
    }

    #[rstest]
    #[case(AccountStatus::Active, false)]
    #[case(AccountStatus::Pending, false)]
    #[case(AccountStatus::Frozen, true)]
    #[case(AccountStatus::Closed, true)]
    fn test_blocked_statuses(#[case] status: AccountStatus, #[case] blocked: bool) {
        assert_eq!(status.is_blocked(), blocked);
    }
}
