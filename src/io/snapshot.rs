//! Snapshot persistence
//!
//! The whole bank is persisted as one JSON document:
//!
//! ```json
//! {
//!   "users": [...],
//!   "account_owners": {"checking_1a2b3": "jane"},
//!   "accounts": {"jane": [...]},
//!   "transactions": [...]
//! }
//! ```
//!
//! [`JsonFileStore`] writes to a temporary file in the target directory and
//! renames it over the old snapshot, so a crash mid-write never leaves a
//! truncated file behind.

use crate::core::traits::SnapshotStore;
use crate::types::{Account, LedgerError, Transaction, User};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::io::Write;
use std::path::PathBuf;
use tracing::{debug, info};

/// Serialized form of the whole bank
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub users: Vec<User>,
    /// Account name -> username
    #[serde(default)]
    pub account_owners: BTreeMap<String, String>,
    /// Username -> accounts, including their histories
    #[serde(default)]
    pub accounts: BTreeMap<String, Vec<Account>>,
    #[serde(default)]
    pub transactions: Vec<Transaction>,
}

impl Snapshot {
    /// Check the invariants a restored bank relies on
    ///
    /// - usernames and account names are unique
    /// - accounts are listed under a registered user that owns them
    /// - every account balance is explained by its history
    /// - every recorded transaction is well-formed and has a terminal status
    ///
    /// # Errors
    ///
    /// `CorruptSnapshot` for the first record that breaks a rule.
    pub fn validate(&self) -> Result<(), LedgerError> {
        let mut usernames = HashSet::new();
        for user in &self.users {
            if !usernames.insert(user.username.as_str()) {
                return Err(LedgerError::corrupt_snapshot(format!(
                    "user {} appears twice",
                    user.username
                )));
            }
        }

        let mut account_names = HashSet::new();
        for (username, accounts) in &self.accounts {
            if !usernames.contains(username.as_str()) {
                return Err(LedgerError::corrupt_snapshot(format!(
                    "accounts listed for unknown user {username}"
                )));
            }
            for account in accounts {
                if account.owner() != username {
                    return Err(LedgerError::corrupt_snapshot(format!(
                        "account {} is owned by {} but listed under {username}",
                        account.account_name(),
                        account.owner()
                    )));
                }
                if !account_names.insert(account.account_name()) {
                    return Err(LedgerError::corrupt_snapshot(format!(
                        "account {} appears twice",
                        account.account_name()
                    )));
                }
                account.verify_restored()?;
            }
        }

        for transaction in &self.transactions {
            transaction.verify_recorded()?;
        }
        Ok(())
    }
}

/// Snapshot kept in a JSON file
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|name| name.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl SnapshotStore for JsonFileStore {
    fn load(&self) -> Result<Snapshot, LedgerError> {
        if !self.path.exists() {
            info!(path = %self.path.display(), "no snapshot found, starting empty");
            return Ok(Snapshot::default());
        }
        let content = fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(Snapshot::default());
        }
        let snapshot: Snapshot = serde_json::from_str(&content)?;
        debug!(path = %self.path.display(), bytes = content.len(), "snapshot loaded");
        Ok(snapshot)
    }

    fn save(&self, snapshot: &Snapshot) -> Result<(), LedgerError> {
        let temp_path = self.temp_path();
        let body = serde_json::to_vec_pretty(snapshot)?;
        {
            let mut file = fs::File::create(&temp_path)?;
            file.write_all(&body)?;
            file.sync_all()?;
        }
        fs::rename(&temp_path, &self.path)?;
        debug!(path = %self.path.display(), bytes = body.len(), "snapshot saved");
        Ok(())
    }

    fn describe(&self) -> String {
        format!("json file {}", self.path.display())
    }
}

/// Snapshot kept in memory only
#[derive(Debug, Default)]
pub struct MemorySnapshotStore {
    snapshot: Mutex<Snapshot>,
}

impl MemorySnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SnapshotStore for MemorySnapshotStore {
    fn load(&self) -> Result<Snapshot, LedgerError> {
        Ok(self.snapshot.lock().clone())
    }

    fn save(&self, snapshot: &Snapshot) -> Result<(), LedgerError> {
        *self.snapshot.lock() = snapshot.clone();
        Ok(())
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{AccountType, ContactInfo};
    use rstest::rstest;
    use rust_decimal::Decimal;
    use serde_json::Value;
    use tempfile::TempDir;

    fn sample() -> Snapshot {
        let user = User::new(
            "jane",
            "Jane",
            "Doe",
            ContactInfo {
                email: "jane@example.com".to_string(),
                phone: Some("555-0100".to_string()),
            },
        )
        .unwrap();
        let (account, deposit) =
            Account::open("jane", AccountType::Savings, "USD", Decimal::new(1250, 1)).unwrap();

        let mut snapshot = Snapshot::default();
        snapshot
            .account_owners
            .insert(account.account_name().to_string(), "jane".to_string());
        snapshot.accounts.insert("jane".to_string(), vec![account]);
        snapshot.transactions.extend(deposit);
        snapshot.users.push(user);
        snapshot
    }

    #[test]
    fn test_missing_file_loads_empty() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStore::new(dir.path().join("bank_data.json"));

        assert_eq!(store.load().unwrap(), Snapshot::default());
    }

    #[test]
    fn test_save_then_load() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStore::new(dir.path().join("bank_data.json"));
        let snapshot = sample();

        store.save(&snapshot).unwrap();

        assert_eq!(store.load().unwrap(), snapshot);
        assert!(!store.temp_path().exists());
    }

    #[test]
    fn test_save_overwrites_previous_snapshot() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStore::new(dir.path().join("bank_data.json"));

        store.save(&sample()).unwrap();
        store.save(&Snapshot::default()).unwrap();

        assert_eq!(store.load().unwrap(), Snapshot::default());
    }

    #[test]
    fn test_snapshot_json_layout() {
        let json = serde_json::to_value(sample()).unwrap();

        assert!(json["users"].is_array());
        assert!(json["accounts"]["jane"].is_array());
        assert_eq!(json["transactions"][0]["type"], "DEPOSIT");
        assert_eq!(json["transactions"][0]["status"], "COMPLETED");
        assert_eq!(json["accounts"]["jane"][0]["account_type"], "SAVINGS");
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bank_data.json");
        fs::write(&path, "{not json").unwrap();

        let error = JsonFileStore::new(path).load().unwrap_err();
        assert!(matches!(error, LedgerError::Serialization { .. }));
    }

    #[test]
    fn test_partial_document_uses_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bank_data.json");
        fs::write(&path, r#"{"users": []}"#).unwrap();

        let snapshot = JsonFileStore::new(path).load().unwrap();
        assert!(snapshot.accounts.is_empty());
        assert!(snapshot.transactions.is_empty());
    }

    #[test]
    fn test_memory_store_round_trip() {
        let store = MemorySnapshotStore::new();
        let snapshot = sample();

        store.save(&snapshot).unwrap();

        assert_eq!(store.load().unwrap(), snapshot);
        assert_eq!(store.describe(), "memory");
    }

    #[test]
    fn test_sample_snapshot_is_valid() {
        assert!(sample().validate().is_ok());
    }

    #[rstest]
    #[case::negative_history_amount(
        &[("/accounts/jane/0/transaction_history/0/amount", "-5")],
        "Transaction amount must be positive."
    )]
    #[case::pending_history_entry(
        &[("/accounts/jane/0/transaction_history/0/status", "PENDING")],
        "status is still PENDING"
    )]
    #[case::unexplained_balance(&[("/accounts/jane/0/balance", "-100")], "does not match its history")]
    #[case::pending_with_negative_balance(
        &[
            ("/accounts/jane/0/balance", "-100"),
            ("/accounts/jane/0/transaction_history/0/amount", "-5"),
            ("/accounts/jane/0/transaction_history/0/status", "PENDING"),
        ],
        "Transaction amount must be positive."
    )]
    #[case::foreign_owner(&[("/accounts/jane/0/owner", "john")], "is owned by john but listed under jane")]
    #[case::pending_global_transaction(&[("/transactions/0/status", "PENDING")], "status is still PENDING")]
    fn test_validate_rejects_tampered_snapshot(
        #[case] edits: &[(&str, &str)],
        #[case] expected: &str,
    ) {
        let mut value = serde_json::to_value(sample()).unwrap();
        for (pointer, replacement) in edits {
            *value.pointer_mut(pointer).unwrap() = Value::String(replacement.to_string());
        }
        let snapshot: Snapshot = serde_json::from_value(value).unwrap();

        let error = snapshot.validate().unwrap_err();
        assert!(matches!(error, LedgerError::CorruptSnapshot { .. }));
        assert!(error.to_string().contains(expected), "{error}");
    }

    #[test]
    fn test_accounts_of_unknown_user_rejected() {
        let mut snapshot = sample();
        snapshot.users.clear();

        let error = snapshot.validate().unwrap_err();
        assert_eq!(
            error.to_string(),
            "Invalid snapshot: accounts listed for unknown user jane"
        );
    }
}
