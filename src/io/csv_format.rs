//! CSV export of accounts and transactions
//!
//! This module centralizes the CSV format of the `export` command:
//! - one row per account, ordered by owner then account name
//! - one row per transaction, in the order they were recorded
//!
//! Both writers take any `Write`, so tests render into a `Vec<u8>`.

use crate::types::{AccountSummary, LedgerError, Transaction};
use csv::Writer;
use std::io::Write;

const ACCOUNT_HEADER: [&str; 7] = [
    "owner",
    "account_name",
    "account_type",
    "currency",
    "balance",
    "status",
    "account_id",
];

const TRANSACTION_HEADER: [&str; 9] = [
    "transaction_id",
    "type",
    "status",
    "amount",
    "currency",
    "source",
    "destination",
    "timestamp",
    "description",
];

/// Write account states to CSV format
///
/// Accounts are sorted by owner, then account name, for deterministic
/// output. Balances keep their full decimal precision.
///
/// # Errors
///
/// `LedgerError::Csv` / `LedgerError::Io` if the writer fails.
pub fn write_accounts_csv(
    accounts: &[AccountSummary],
    output: &mut dyn Write,
) -> Result<(), LedgerError> {
    let mut writer = Writer::from_writer(output);
    writer.write_record(ACCOUNT_HEADER)?;

    let mut sorted: Vec<&AccountSummary> = accounts.iter().collect();
    sorted.sort_by(|a, b| {
        a.owner
            .cmp(&b.owner)
            .then_with(|| a.account_name.cmp(&b.account_name))
    });

    for account in sorted {
        writer.write_record([
            account.owner.as_str(),
            account.account_name.as_str(),
            account.account_type.as_str(),
            account.currency.as_str(),
            account.balance.to_string().as_str(),
            account.status.as_str(),
            account.account_id.as_str(),
        ])?;
    }

    writer.flush()?;
    Ok(())
}

/// Write the transaction history to CSV format
///
/// Missing source/destination/description fields are written empty.
pub fn write_transactions_csv(
    transactions: &[Transaction],
    output: &mut dyn Write,
) -> Result<(), LedgerError> {
    let mut writer = Writer::from_writer(output);
    writer.write_record(TRANSACTION_HEADER)?;

    for tx in transactions {
        writer.write_record([
            tx.transaction_id(),
            tx.tx_type().as_str(),
            tx.status().as_str(),
            tx.amount().to_string().as_str(),
            tx.currency(),
            tx.source_account_name().unwrap_or_default(),
            tx.destination_account_name().unwrap_or_default(),
            format!("{:.6}", tx.transaction_timestamp()).as_str(),
            tx.description().unwrap_or_default(),
        ])?;
    }

    writer.flush()?;
    Ok(())
}
