//! Global transaction history
//!
//! This module provides the TransactionStore component that keeps every
//! transaction processed by any account, in processing order, for audit and
//! history queries. It is append-only: recorded transactions are never
//! modified or removed, even when the account they belong to is deleted.
//!
//! # Duplicate Handling
//!
//! If a transaction ID is recorded twice, only the first occurrence is kept.

use crate::types::Transaction;
use parking_lot::RwLock;
use std::collections::HashSet;

#[derive(Debug, Default)]
struct Inner {
    /// Transactions in the order they were recorded
    log: Vec<Transaction>,
    /// IDs already present in `log`
    seen: HashSet<String>,
}

/// Append-only, thread-safe store of all transactions
#[derive(Debug, Default)]
pub struct TransactionStore {
    inner: RwLock<Inner>,
}

impl TransactionStore {
    /// Create a new empty transaction store
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a store from a previously exported history
    pub fn from_transactions(transactions: Vec<Transaction>) -> Self {
        let store = Self::new();
        store.record_all(transactions);
        store
    }

    /// Append a transaction
    ///
    /// Returns `false` (and stores nothing) when a transaction with the same
    /// ID was already recorded.
    pub fn record(&self, transaction: Transaction) -> bool {
        let mut inner = self.inner.write();
        Self::insert(&mut inner, transaction)
    }

    /// Append several transactions under one lock, preserving their order
    pub fn record_all<I>(&self, transactions: I)
    where
        I: IntoIterator<Item = Transaction>,
    {
        let mut inner = self.inner.write();
        for transaction in transactions {
            Self::insert(&mut inner, transaction);
        }
    }

    fn insert(inner: &mut Inner, transaction: Transaction) -> bool {
        if !inner.seen.insert(transaction.transaction_id().to_string()) {
            return false;
        }
        inner.log.push(transaction);
        true
    }

    /// Snapshot of the whole history in recording order
    pub fn all(&self) -> Vec<Transaction> {
        self.inner.read().log.clone()
    }

    pub fn len(&self) -> usize {
        self.inner.read().log.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
