//! Benchmark suite for the ledger hot paths
//!
//! Uses the divan benchmarking framework.
//!
//! # Running Benchmarks
//!
//! ```bash
//! # Run all benchmarks
//! cargo bench
//! ```
//!
//! # Scenarios
//!
//! - Single-account postings (deposits and withdrawals)
//! - Transfers between two accounts, on one thread and contended
//! - Snapshotting a populated bank

use rust_bank_ledger::core::{Bank, PostingKind};
use rust_bank_ledger::types::{AccountType, ContactInfo};
use rust_decimal::Decimal;
use std::sync::Arc;
use std::thread;

fn main() {
    divan::main();
}

fn bank_with_accounts(accounts_per_user: usize) -> (Bank, Vec<String>) {
    let bank = Bank::new();
    let mut names = Vec::new();
    for username in ["jane", "john"] {
        bank.create_user(
            username,
            "First",
            "Last",
            ContactInfo {
                email: format!("{username}@example.com"),
                phone: None,
            },
        )
        .expect("user creation failed");
        for _ in 0..accounts_per_user {
            let summary = bank
                .open_account(username, AccountType::Checking, "USD", Decimal::new(1_000_000, 0))
                .expect("account opening failed");
            names.push(summary.account_name);
        }
    }
    (bank, names)
}

/// Alternating deposits and withdrawals on one account
#[divan::bench(args = [100, 1_000, 10_000])]
fn postings(n: usize) {
    let (bank, names) = bank_with_accounts(1);
    let account = &names[0];

    for i in 0..n {
        let kind = if i % 2 == 0 {
            PostingKind::Deposit
        } else {
            PostingKind::Withdrawal
        };
        bank.post("jane", account, kind, Decimal::new(25, 0), "USD", None)
            .expect("posting failed");
    }
}

/// Back-and-forth transfers between two accounts
#[divan::bench(args = [100, 1_000, 10_000])]
fn transfers(n: usize) {
    let (bank, names) = bank_with_accounts(1);

    for i in 0..n {
        let (from, to) = if i % 2 == 0 {
            (&names[0], &names[1])
        } else {
            (&names[1], &names[0])
        };
        bank.transfer(from, to, Decimal::new(10, 0), "USD", None)
            .expect("transfer failed");
    }
}

/// Transfers from several threads over a small set of accounts
#[divan::bench(args = [2, 4, 8])]
fn contended_transfers(threads: usize) {
    let (bank, names) = bank_with_accounts(2);
    let bank = Arc::new(bank);
    let names = Arc::new(names);

    let workers: Vec<_> = (0..threads)
        .map(|t| {
            let bank = Arc::clone(&bank);
            let names = Arc::clone(&names);
            thread::spawn(move || {
                for i in 0..500 {
                    let from = &names[(t + i) % names.len()];
                    let to = &names[(t + i + 1) % names.len()];
                    bank.transfer(from, to, Decimal::ONE, "USD", None)
                        .expect("transfer failed");
                }
            })
        })
        .collect();
    for worker in workers {
        worker.join().expect("worker panicked");
    }
}

/// Snapshot of a bank with many accounts and transactions
#[divan::bench(args = [10, 100])]
fn snapshot(bencher: divan::Bencher, accounts_per_user: usize) {
    let (bank, names) = bank_with_accounts(accounts_per_user);
    for pair in names.windows(2) {
        bank.transfer(&pair[0], &pair[1], Decimal::ONE, "USD", None)
            .expect("transfer failed");
    }

    bencher.bench_local(|| bank.snapshot());
}
