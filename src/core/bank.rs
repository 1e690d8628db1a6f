//! Thread-safe bank service
//!
//! `Bank` owns every user, every account and the global transaction history,
//! and is shared between request handlers behind an `Arc`.
//!
//! # Locking
//!
//! - Each account sits behind its own `Mutex`. Handles are cloned out of the
//!   `DashMap` before locking, so no map shard is held while an account is.
//! - A transfer locks both accounts in ascending account-name order. Names
//!   are unique and never change, which gives every thread the same order.
//! - Structural changes (creating or deleting users and accounts) are
//!   serialized by the registry lock so the user, account and owner maps
//!   move together. Balance changes never take it.
//! - The transaction history is appended while the account locks are still
//!   held, so its order matches the order the accounts applied them.

use crate::core::account::ProcessOutcome;
use crate::core::transfer::{self, TransferOutcome};
use crate::io::Snapshot;
use crate::types::{
    Account, AccountStatus, AccountSummary, AccountType, ContactInfo, LedgerError, Transaction,
    TransactionType, User, UserUpdate,
};
use dashmap::DashMap;
use parking_lot::{Mutex, MutexGuard};
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info};

use super::TransactionStore;

/// Shared handle to a single account
pub type AccountHandle = Arc<Mutex<Account>>;

/// Attempts at drawing an unused account name before giving up
const MAX_NAME_ATTEMPTS: usize = 16;

/// Single-account operations exposed by the service
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostingKind {
    Deposit,
    Withdrawal,
    Fee,
    Interest,
}

impl PostingKind {
    pub fn transaction_type(self) -> TransactionType {
        match self {
            PostingKind::Deposit => TransactionType::Deposit,
            PostingKind::Withdrawal => TransactionType::Withdrawal,
            PostingKind::Fee => TransactionType::Fee,
            PostingKind::Interest => TransactionType::Interest,
        }
    }
}

/// Changes allowed on an existing account
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AccountUpdate {
    pub account_type: Option<AccountType>,
    pub status: Option<AccountStatus>,
}

/// Result of a single-account posting
#[derive(Debug, Clone, PartialEq)]
pub struct Posting {
    pub transaction: Transaction,
    pub outcome: ProcessOutcome,
    pub account: AccountSummary,
}

/// Result of a transfer together with both accounts after it
#[derive(Debug, Clone, PartialEq)]
pub struct TransferReceipt {
    pub outcome: TransferOutcome,
    pub source: AccountSummary,
    pub destination: AccountSummary,
}

/// Balance and history of one account
#[derive(Debug, Clone, PartialEq)]
pub struct AccountHistory {
    pub account_name: String,
    pub username: String,
    pub balance: Decimal,
    pub transactions: Vec<Transaction>,
}

/// Registry of users and accounts plus the global transaction history
#[derive(Debug)]
pub struct Bank {
    users: DashMap<String, User>,
    /// Account name -> account
    accounts: DashMap<String, AccountHandle>,
    /// Username -> names of the accounts it owns, in opening order
    user_accounts: DashMap<String, Vec<String>>,
    /// Account name -> owning username
    account_owners: DashMap<String, String>,
    transactions: TransactionStore,
    registry: Mutex<()>,
}

impl Default for Bank {
    fn default() -> Self {
        Self::new()
    }
}

impl Bank {
    pub fn new() -> Self {
        Self {
            users: DashMap::new(),
            accounts: DashMap::new(),
            user_accounts: DashMap::new(),
            account_owners: DashMap::new(),
            transactions: TransactionStore::new(),
            registry: Mutex::new(()),
        }
    }

    // ----- users -----

    /// Register a new user
    ///
    /// # Errors
    ///
    /// `InvalidUser` for blank fields, `UsernameTaken` for a duplicate.
    pub fn create_user(
        &self,
        username: &str,
        first_name: &str,
        last_name: &str,
        contact_info: ContactInfo,
    ) -> Result<User, LedgerError> {
        let user = User::new(username, first_name, last_name, contact_info)?;

        let _registry = self.registry.lock();
        if self.users.contains_key(username) {
            return Err(LedgerError::UsernameTaken {
                username: username.to_string(),
            });
        }
        self.users.insert(user.username.clone(), user.clone());
        info!(username, "user created");
        Ok(user)
    }

    /// All users, ordered by username
    pub fn list_users(&self) -> Vec<User> {
        let mut users: Vec<User> = self.users.iter().map(|entry| entry.value().clone()).collect();
        users.sort_by(|a, b| a.username.cmp(&b.username));
        users
    }

    pub fn get_user(&self, username: &str) -> Result<User, LedgerError> {
        self.users
            .get(username)
            .map(|user| user.value().clone())
            .ok_or_else(|| LedgerError::user_not_found(username))
    }

    /// Apply a partial update to a user; nothing changes if it is invalid
    pub fn update_user(&self, username: &str, update: UserUpdate) -> Result<User, LedgerError> {
        let mut user = self
            .users
            .get_mut(username)
            .ok_or_else(|| LedgerError::user_not_found(username))?;
        user.apply(update)?;
        debug!(username, "user updated");
        Ok(user.value().clone())
    }

    /// Remove a user and every account it owns
    ///
    /// Transactions of the removed accounts stay in the global history.
    pub fn delete_user(&self, username: &str) -> Result<(), LedgerError> {
        let _registry = self.registry.lock();
        if self.users.remove(username).is_none() {
            return Err(LedgerError::user_not_found(username));
        }

        let owned = self
            .user_accounts
            .remove(username)
            .map(|(_, names)| names)
            .unwrap_or_default();
        for account_name in &owned {
            self.accounts.remove(account_name);
            self.account_owners.remove(account_name);
        }
        info!(username, accounts_removed = owned.len(), "user deleted");
        Ok(())
    }

    // ----- accounts -----

    /// Open an account for an existing user
    ///
    /// A positive initial deposit is recorded in the global history.
    ///
    /// # Errors
    ///
    /// - `UnknownOwner` if `username` is not registered
    /// - `NegativeInitialDeposit` / `InvalidCurrency` from account opening
    pub fn open_account(
        &self,
        username: &str,
        account_type: AccountType,
        currency: &str,
        initial_deposit: Decimal,
    ) -> Result<AccountSummary, LedgerError> {
        let _registry = self.registry.lock();
        if !self.users.contains_key(username) {
            return Err(LedgerError::UnknownOwner {
                username: username.to_string(),
            });
        }

        let (account, deposit) = self.draw_account(username, account_type, currency, initial_deposit)?;
        let summary = account.summary();
        let account_name = summary.account_name.clone();

        if let Some(deposit) = deposit {
            self.transactions.record(deposit);
        }
        self.accounts
            .insert(account_name.clone(), Arc::new(Mutex::new(account)));
        self.user_accounts
            .entry(username.to_string())
            .or_default()
            .push(account_name.clone());
        self.account_owners
            .insert(account_name.clone(), username.to_string());

        info!(
            username,
            account = %account_name,
            account_type = %account_type,
            currency,
            balance = %summary.balance,
            "account opened"
        );
        Ok(summary)
    }

    /// Open accounts until one gets a name that is not in use
    fn draw_account(
        &self,
        username: &str,
        account_type: AccountType,
        currency: &str,
        initial_deposit: Decimal,
    ) -> Result<(Account, Option<Transaction>), LedgerError> {
        for _ in 0..MAX_NAME_ATTEMPTS {
            let opened = Account::open(username, account_type, currency, initial_deposit)?;
            if !self.accounts.contains_key(opened.0.account_name()) {
                return Ok(opened);
            }
            debug!(account = %opened.0.account_name(), "account name collision");
        }
        Err(LedgerError::AccountNameExhausted {
            username: username.to_string(),
        })
    }

    /// Summaries of every account, grouped by owner
    pub fn list_accounts(&self) -> BTreeMap<String, Vec<AccountSummary>> {
        let owners: Vec<(String, Vec<String>)> = self
            .user_accounts
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect();

        owners
            .into_iter()
            .filter(|(_, names)| !names.is_empty())
            .map(|(username, names)| {
                let summaries = names
                    .iter()
                    .filter_map(|name| self.account_handle(name))
                    .map(|handle| handle.lock().summary())
                    .collect();
                (username, summaries)
            })
            .collect()
    }

    /// Summaries of the accounts owned by `username`
    ///
    /// # Errors
    ///
    /// `NoAccounts` if the user is unknown or owns nothing.
    pub fn accounts_for(&self, username: &str) -> Result<Vec<AccountSummary>, LedgerError> {
        let names = self
            .user_accounts
            .get(username)
            .map(|names| names.value().clone())
            .unwrap_or_default();
        if names.is_empty() {
            return Err(LedgerError::NoAccounts {
                username: username.to_string(),
            });
        }
        Ok(names
            .iter()
            .filter_map(|name| self.account_handle(name))
            .map(|handle| handle.lock().summary())
            .collect())
    }

    /// Change the type and/or status of an account
    ///
    /// Balance, currency and owner cannot be edited.
    pub fn update_account(
        &self,
        username: &str,
        account_name: &str,
        update: AccountUpdate,
    ) -> Result<AccountSummary, LedgerError> {
        let handle = self.owned_account(username, account_name)?;
        let mut account = handle.lock();
        if let Some(account_type) = update.account_type {
            account.set_account_type(account_type);
        }
        if let Some(status) = update.status {
            account.set_status(status);
        }
        info!(
            account = %account_name,
            account_type = %account.account_type(),
            status = %account.status(),
            "account updated"
        );
        Ok(account.summary())
    }

    /// Remove an account from its owner and from the name cache
    pub fn delete_account(&self, username: &str, account_name: &str) -> Result<(), LedgerError> {
        let _registry = self.registry.lock();
        self.owned_account(username, account_name)?;

        if let Some(mut names) = self.user_accounts.get_mut(username) {
            names.retain(|name| name != account_name);
        }
        self.accounts.remove(account_name);
        self.account_owners.remove(account_name);
        info!(username, account = %account_name, "account deleted");
        Ok(())
    }

    // ----- transactions -----

    /// Apply a single-account transaction
    ///
    /// Credits name the account as destination, debits as source. The
    /// transaction is recorded in the global history whatever the outcome.
    ///
    /// # Errors
    ///
    /// Lookup failures and transaction validation errors. Business
    /// rejections are reported through [`Posting::outcome`].
    pub fn post(
        &self,
        username: &str,
        account_name: &str,
        kind: PostingKind,
        amount: Decimal,
        currency: &str,
        description: Option<&str>,
    ) -> Result<Posting, LedgerError> {
        let handle = self.owned_account(username, account_name)?;
        let tx_type = kind.transaction_type();
        let (source, destination) = if tx_type.is_credit() {
            (None, Some(account_name.to_string()))
        } else {
            (Some(account_name.to_string()), None)
        };
        let mut transaction = Transaction::new(
            tx_type,
            amount,
            currency,
            source,
            destination,
            description.map(String::from),
        )?;

        let mut account = handle.lock();
        let outcome = account.process_transaction(&mut transaction);
        self.transactions.record(transaction.clone());

        Ok(Posting {
            transaction,
            outcome,
            account: account.summary(),
        })
    }

    /// Move money between two accounts found by name
    ///
    /// # Errors
    ///
    /// - `SameAccountTransfer` if both names are equal
    /// - `SourceAccountNotFound` / `DestinationAccountNotFound`
    /// - `InvalidAmount` for a non-positive amount
    pub fn transfer(
        &self,
        source_name: &str,
        destination_name: &str,
        amount: Decimal,
        currency: &str,
        description: Option<&str>,
    ) -> Result<TransferReceipt, LedgerError> {
        if source_name == destination_name {
            return Err(LedgerError::SameAccountTransfer {
                account_name: source_name.to_string(),
            });
        }
        let source = self
            .account_handle(source_name)
            .ok_or_else(|| LedgerError::SourceAccountNotFound {
                account_name: source_name.to_string(),
            })?;
        let destination = self
            .account_handle(destination_name)
            .ok_or_else(|| LedgerError::DestinationAccountNotFound {
                account_name: destination_name.to_string(),
            })?;

        let (mut source_guard, mut destination_guard) = if source_name < destination_name {
            let s = source.lock();
            let d = destination.lock();
            (s, d)
        } else {
            let d = destination.lock();
            let s = source.lock();
            (s, d)
        };

        let outcome = transfer::transfer(
            &mut source_guard,
            &mut destination_guard,
            amount,
            currency,
            description,
        )?;
        self.transactions
            .record_all(outcome.transactions().into_iter().cloned());

        Ok(TransferReceipt {
            source: source_guard.summary(),
            destination: destination_guard.summary(),
            outcome,
        })
    }

    /// Balance and per-account history of one account
    pub fn history(&self, account_name: &str) -> Result<AccountHistory, LedgerError> {
        let username = self
            .account_owners
            .get(account_name)
            .map(|owner| owner.value().clone())
            .ok_or_else(|| LedgerError::account_not_found(account_name))?;
        let handle = self
            .account_handle(account_name)
            .ok_or_else(|| LedgerError::account_not_found(account_name))?;
        let account = handle.lock();

        Ok(AccountHistory {
            account_name: account_name.to_string(),
            username,
            balance: account.balance(),
            transactions: account.transaction_history().to_vec(),
        })
    }

    /// Every transaction ever recorded, in processing order
    pub fn all_transactions(&self) -> Vec<Transaction> {
        self.transactions.all()
    }

    /// Account name -> username lookup cache
    pub fn account_cache(&self) -> BTreeMap<String, String> {
        self.account_owners
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect()
    }

    // ----- persistence -----

    /// Consistent copy of the whole bank
    ///
    /// Holds the registry lock and every account lock, taken in the same
    /// name order transfers use, so no transfer is half-visible.
    pub fn snapshot(&self) -> Snapshot {
        let _registry = self.registry.lock();
        let mut handles: Vec<(String, AccountHandle)> = self
            .accounts
            .iter()
            .map(|entry| (entry.key().clone(), Arc::clone(entry.value())))
            .collect();
        handles.sort_by(|a, b| a.0.cmp(&b.0));
        let guards: BTreeMap<&str, MutexGuard<'_, Account>> = handles
            .iter()
            .map(|(name, handle)| (name.as_str(), handle.lock()))
            .collect();

        let accounts = self
            .user_accounts
            .iter()
            .map(|entry| {
                let owned = entry
                    .value()
                    .iter()
                    .filter_map(|name| guards.get(name.as_str()))
                    .map(|account| Account::clone(account))
                    .collect();
                (entry.key().clone(), owned)
            })
            .collect();
        let transactions = self.transactions.all();
        drop(guards);

        Snapshot {
            users: self.list_users(),
            account_owners: self.account_cache(),
            accounts,
            transactions,
        }
    }

    /// Rebuild a bank from a snapshot
    ///
    /// The snapshot is validated first, so a restored bank holds the same
    /// invariants as one built through its own operations. The owner cache
    /// is derived from the accounts themselves; stale entries in the
    /// snapshot's cache are dropped.
    ///
    /// # Errors
    ///
    /// `CorruptSnapshot` if any user, account or transaction is invalid.
    pub fn from_snapshot(snapshot: Snapshot) -> Result<Self, LedgerError> {
        snapshot.validate()?;

        let users = DashMap::new();
        for user in snapshot.users {
            users.insert(user.username.clone(), user);
        }
        let accounts = DashMap::new();
        let user_accounts = DashMap::new();
        let account_owners = DashMap::new();
        for (username, owned) in snapshot.accounts {
            let mut names = Vec::with_capacity(owned.len());
            for account in owned {
                let name = account.account_name().to_string();
                account_owners.insert(name.clone(), username.clone());
                accounts.insert(name.clone(), Arc::new(Mutex::new(account)));
                names.push(name);
            }
            user_accounts.insert(username, names);
        }
        let dropped = snapshot
            .account_owners
            .keys()
            .filter(|name| !account_owners.contains_key(*name))
            .count();
        if dropped > 0 {
            debug!(dropped, "ignored stale account cache entries");
        }

        let bank = Self {
            users,
            accounts,
            user_accounts,
            account_owners,
            transactions: TransactionStore::from_transactions(snapshot.transactions),
            registry: Mutex::new(()),
        };
        info!(
            users = bank.users.len(),
            accounts = bank.accounts.len(),
            transactions = bank.transactions.len(),
            "bank restored"
        );
        Ok(bank)
    }

    // ----- lookups -----

    fn account_handle(&self, account_name: &str) -> Option<AccountHandle> {
        self.accounts
            .get(account_name)
            .map(|handle| Arc::clone(handle.value()))
    }

    /// Resolve an account that must belong to `username`
    fn owned_account(&self, username: &str, account_name: &str) -> Result<AccountHandle, LedgerError> {
        let owns = self
            .user_accounts
            .get(username)
            .is_some_and(|names| names.iter().any(|name| name == account_name));
        if !owns {
            return Err(LedgerError::account_not_found(account_name));
        }
        self.account_handle(account_name)
            .ok_or_else(|| LedgerError::account_not_found(account_name))
    }
}
