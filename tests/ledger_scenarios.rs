//! Bank-level scenario tests
//!
//! These drive `Bank` directly, including from several threads at once, and
//! check the ledger invariants after each scenario:
//! - an account balance equals the signed sum of its COMPLETED history
//! - money is only created by deposits/interest and removed by
//!   withdrawals/fees; transfers conserve the total

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use rust_bank_ledger::core::{Bank, PostingKind};
    use rust_bank_ledger::types::{AccountType, ContactInfo, TransactionStatus};
    use rust_bank_ledger::{Transaction, TransactionType};
    use rust_decimal::Decimal;
    use std::sync::Arc;
    use std::thread;

    fn bank_with_users(usernames: &[&str]) -> Bank {
        let bank = Bank::new();
        for username in usernames {
            bank.create_user(
                username,
                "First",
                "Last",
                ContactInfo {
                    email: format!("{username}@example.com"),
                    phone: None,
                },
            )
            .unwrap();
        }
        bank
    }

    fn open(bank: &Bank, username: &str, deposit: i64) -> String {
        bank.open_account(username, AccountType::Checking, "USD", Decimal::new(deposit, 0))
            .unwrap()
            .account_name
    }

    /// Signed effect of a completed transaction on `account_name`
    fn effect_on(transaction: &Transaction, account_name: &str) -> Decimal {
        if transaction.status() != TransactionStatus::Completed {
            return Decimal::ZERO;
        }
        let credit = transaction.tx_type().is_credit()
            && transaction.destination_account_name() == Some(account_name);
        let debit = !transaction.tx_type().is_credit()
            && transaction.source_account_name() == Some(account_name);
        match (credit, debit) {
            (true, _) => transaction.amount(),
            (_, true) => -transaction.amount(),
            _ => Decimal::ZERO,
        }
    }

    fn assert_balance_matches_history(bank: &Bank, account_name: &str) {
        let history = bank.history(account_name).unwrap();
        let replayed: Decimal = history
            .transactions
            .iter()
            .map(|tx| effect_on(tx, account_name))
            .sum();
        assert_eq!(history.balance, replayed, "account {account_name}");
    }

    #[rstest]
    #[case::deposits_only(&[(PostingKind::Deposit, 50), (PostingKind::Deposit, 25)], 175)]
    #[case::withdraw_within_balance(&[(PostingKind::Withdrawal, 100)], 0)]
    #[case::overdraft_rejected(&[(PostingKind::Withdrawal, 101), (PostingKind::Withdrawal, 40)], 60)]
    #[case::fee_and_interest(&[(PostingKind::Fee, 10), (PostingKind::Interest, 3)], 93)]
    fn test_posting_sequences(#[case] postings: &[(PostingKind, i64)], #[case] expected: i64) {
        let bank = bank_with_users(&["jane"]);
        let account = open(&bank, "jane", 100);

        for (kind, amount) in postings {
            bank.post("jane", &account, *kind, Decimal::new(*amount, 0), "USD", None)
                .unwrap();
        }

        assert_eq!(bank.history(&account).unwrap().balance, Decimal::new(expected, 0));
        assert_balance_matches_history(&bank, &account);
    }

    #[test]
    fn test_unpaid_fee_freezes_account_for_good() {
        let bank = bank_with_users(&["jane"]);
        let account = open(&bank, "jane", 5);

        let fee = bank
            .post("jane", &account, PostingKind::Fee, Decimal::new(10, 0), "USD", None)
            .unwrap();
        assert!(!fee.outcome.accepted);

        let deposit = bank
            .post("jane", &account, PostingKind::Deposit, Decimal::new(10, 0), "USD", None)
            .unwrap();
        assert!(!deposit.outcome.accepted);
        assert_eq!(deposit.outcome.message, "Account is frozen");
        assert_balance_matches_history(&bank, &account);
    }

    #[test]
    fn test_transfer_into_frozen_account_is_compensated() {
        let bank = bank_with_users(&["jane", "john"]);
        let source = open(&bank, "jane", 300);
        let destination = open(&bank, "john", 1);
        bank.post("john", &destination, PostingKind::Fee, Decimal::new(2, 0), "USD", None)
            .unwrap();

        let receipt = bank
            .transfer(&source, &destination, Decimal::new(120, 0), "USD", None)
            .unwrap();

        assert!(!receipt.outcome.is_completed());
        assert_eq!(receipt.source.balance, Decimal::new(300, 0));
        assert_eq!(receipt.destination.balance, Decimal::ONE);
        assert_balance_matches_history(&bank, &source);
        assert_balance_matches_history(&bank, &destination);

        let compensations = bank
            .history(&source)
            .unwrap()
            .transactions
            .into_iter()
            .filter(|tx| tx.tx_type() == TransactionType::TransferIn)
            .count();
        assert_eq!(compensations, 1);
    }

    #[test]
    fn test_concurrent_opposite_transfers_conserve_money() {
        let bank = Arc::new(bank_with_users(&["jane", "john"]));
        let a = open(&bank, "jane", 10_000);
        let b = open(&bank, "john", 10_000);

        let workers: Vec<_> = (0..8)
            .map(|i| {
                let bank = Arc::clone(&bank);
                let (from, to) = if i % 2 == 0 {
                    (a.clone(), b.clone())
                } else {
                    (b.clone(), a.clone())
                };
                thread::spawn(move || {
                    for _ in 0..200 {
                        bank.transfer(&from, &to, Decimal::new(7, 0), "USD", None)
                            .unwrap();
                    }
                })
            })
            .collect();
        for worker in workers {
            worker.join().unwrap();
        }

        let total = bank.history(&a).unwrap().balance + bank.history(&b).unwrap().balance;
        assert_eq!(total, Decimal::new(20_000, 0));
        assert_balance_matches_history(&bank, &a);
        assert_balance_matches_history(&bank, &b);
        // 2 deposits + 2 legs for each of the 1600 transfers
        assert_eq!(bank.all_transactions().len(), 2 + 2 * 1_600);
    }

    #[test]
    fn test_concurrent_postings_and_account_churn() {
        let bank = Arc::new(bank_with_users(&["jane", "john"]));
        let account = open(&bank, "jane", 0);

        let depositors: Vec<_> = (0..4)
            .map(|_| {
                let bank = Arc::clone(&bank);
                let account = account.clone();
                thread::spawn(move || {
                    for _ in 0..250 {
                        bank.post("jane", &account, PostingKind::Deposit, Decimal::ONE, "USD", None)
                            .unwrap();
                    }
                })
            })
            .collect();
        let churn = {
            let bank = Arc::clone(&bank);
            thread::spawn(move || {
                for _ in 0..50 {
                    let name = open(&bank, "john", 0);
                    bank.delete_account("john", &name).unwrap();
                }
            })
        };

        for worker in depositors {
            worker.join().unwrap();
        }
        churn.join().unwrap();

        assert_eq!(bank.history(&account).unwrap().balance, Decimal::new(1_000, 0));
        assert!(bank.accounts_for("john").is_err());
        assert_eq!(bank.account_cache().len(), 1);
        assert_balance_matches_history(&bank, &account);
    }

    #[test]
    fn test_snapshot_taken_mid_traffic_restores_consistently() {
        let bank = Arc::new(bank_with_users(&["jane", "john"]));
        let a = open(&bank, "jane", 500);
        let b = open(&bank, "john", 500);

        let traffic = {
            let bank = Arc::clone(&bank);
            let (a, b) = (a.clone(), b.clone());
            thread::spawn(move || {
                for _ in 0..100 {
                    bank.transfer(&a, &b, Decimal::ONE, "USD", None).unwrap();
                }
            })
        };
        let snapshot = bank.snapshot();
        traffic.join().unwrap();

        let restored = Bank::from_snapshot(snapshot).unwrap();
        let total = restored.history(&a).unwrap().balance + restored.history(&b).unwrap().balance;
        assert_eq!(total, Decimal::new(1_000, 0));
        assert_balance_matches_history(&restored, &a);
        assert_balance_matches_history(&restored, &b);
    }
}
