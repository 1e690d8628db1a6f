//! Transfer orchestration between two accounts
//!
//! A transfer is two independent account transactions: a TRANSFER_OUT on the
//! source and a TRANSFER_IN on the destination. Both legs are always
//! presented. When exactly one leg fails, a compensating transaction undoes
//! the leg that succeeded:
//!
//! - IN failed, OUT succeeded: TRANSFER_IN back into the source
//! - OUT failed, IN succeeded: TRANSFER_OUT back out of the destination
//!
//! Compensation appends a new transaction; the original leg keeps its
//! COMPLETED status. Callers that share accounts between threads must hold
//! both accounts exclusively for the whole call (see [`crate::core::Bank`]).

use crate::core::account::ProcessOutcome;
use crate::types::{Account, LedgerError, Transaction, TransactionType};
use rust_decimal::Decimal;
use tracing::{error, info, warn};

/// Which side of a transfer failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferLeg {
    /// TRANSFER_OUT against the source
    Out,
    /// TRANSFER_IN against the destination
    In,
}

/// How a transfer ended
#[derive(Debug, Clone, PartialEq)]
pub enum TransferResolution {
    /// Both legs completed
    Completed,
    /// Both legs failed; no balance moved
    Rejected,
    /// One leg failed and the other was undone by `compensation`
    Compensated {
        failed_leg: TransferLeg,
        compensation: Transaction,
    },
    /// One leg failed and undoing the other failed too.
    /// The two accounts no longer agree on the transfer.
    CompensationFailed {
        failed_leg: TransferLeg,
        compensation: Transaction,
        reason: String,
    },
}

/// Full record of a transfer attempt
#[derive(Debug, Clone, PartialEq)]
pub struct TransferOutcome {
    pub transfer_out: Transaction,
    pub transfer_in: Transaction,
    pub out_outcome: ProcessOutcome,
    pub in_outcome: ProcessOutcome,
    pub resolution: TransferResolution,
}

impl TransferOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self.resolution, TransferResolution::Completed)
    }

    /// Every transaction the transfer produced, in processing order
    pub fn transactions(&self) -> Vec<&Transaction> {
        let mut all = vec![&self.transfer_out, &self.transfer_in];
        match &self.resolution {
            TransferResolution::Compensated { compensation, .. }
            | TransferResolution::CompensationFailed { compensation, .. } => all.push(compensation),
            TransferResolution::Completed | TransferResolution::Rejected => {}
        }
        all
    }

    /// Message of the leg that failed first (OUT before IN)
    pub fn failure_message(&self) -> Option<&str> {
        if !self.out_outcome.accepted {
            Some(&self.out_outcome.message)
        } else if !self.in_outcome.accepted {
            Some(&self.in_outcome.message)
        } else {
            None
        }
    }
}

/// Move `amount` from `source` to `destination`
///
/// # Errors
///
/// Only transaction validation errors (non-positive amount) are returned as
/// `Err`; nothing has been applied to either account in that case. Every
/// business failure is described by the returned [`TransferOutcome`].
pub fn transfer(
    source: &mut Account,
    destination: &mut Account,
    amount: Decimal,
    currency: &str,
    description: Option<&str>,
) -> Result<TransferOutcome, LedgerError> {
    let source_name = source.account_name().to_string();
    let destination_name = destination.account_name().to_string();

    let mut transfer_out = Transaction::new(
        TransactionType::TransferOut,
        amount,
        currency,
        Some(source_name.clone()),
        Some(destination_name.clone()),
        description.map(String::from),
    )?;
    let mut transfer_in = Transaction::new(
        TransactionType::TransferIn,
        amount,
        currency,
        Some(source_name.clone()),
        Some(destination_name.clone()),
        description.map(String::from),
    )?;

    let out_outcome = source.process_transaction(&mut transfer_out);
    let in_outcome = destination.process_transaction(&mut transfer_in);

    let resolution = match (out_outcome.accepted, in_outcome.accepted) {
        (true, true) => {
            info!(
                source = %source_name,
                destination = %destination_name,
                amount = %amount,
                currency,
                "transfer completed"
            );
            TransferResolution::Completed
        }
        (false, false) => {
            warn!(
                source = %source_name,
                destination = %destination_name,
                out_reason = %out_outcome.message,
                in_reason = %in_outcome.message,
                "transfer rejected"
            );
            TransferResolution::Rejected
        }
        (true, false) => compensate(
            source,
            TransferLeg::In,
            TransactionType::TransferIn,
            &destination_name,
            amount,
            currency,
            description,
            &in_outcome.message,
        )?,
        (false, true) => compensate(
            destination,
            TransferLeg::Out,
            TransactionType::TransferOut,
            &source_name,
            amount,
            currency,
            description,
            &out_outcome.message,
        )?,
    };

    Ok(TransferOutcome {
        transfer_out,
        transfer_in,
        out_outcome,
        in_outcome,
        resolution,
    })
}

/// Undo the successful leg on `account`
///
/// The compensation is written as a movement from the transfer destination
/// back to the transfer source, so both account names appear on it.
#[allow(clippy::too_many_arguments)]
fn compensate(
    account: &mut Account,
    failed_leg: TransferLeg,
    tx_type: TransactionType,
    counterparty: &str,
    amount: Decimal,
    currency: &str,
    description: Option<&str>,
    failure: &str,
) -> Result<TransferResolution, LedgerError> {
    let own_name = account.account_name().to_string();
    let (source, destination) = match tx_type {
        TransactionType::TransferIn => (counterparty.to_string(), own_name.clone()),
        _ => (own_name.clone(), counterparty.to_string()),
    };
    let note = match failed_leg {
        TransferLeg::In => "Reversal: transfer into destination account failed",
        TransferLeg::Out => "Reversal: transfer out of source account failed",
    };
    let note = match description {
        Some(original) => format!("{note} ({failure}). Original description: {original}"),
        None => format!("{note} ({failure})"),
    };

    let mut compensation = Transaction::new(
        tx_type,
        amount,
        currency,
        Some(source),
        Some(destination),
        Some(note),
    )?;
    let outcome = account.process_transaction(&mut compensation);

    if outcome.accepted {
        warn!(
            account = %own_name,
            failed_leg = ?failed_leg,
            reason = failure,
            compensation = %compensation.transaction_id(),
            "transfer leg failed, compensated"
        );
        Ok(TransferResolution::Compensated {
            failed_leg,
            compensation,
        })
    } else {
        error!(
            account = %own_name,
            failed_leg = ?failed_leg,
            reason = failure,
            compensation = %compensation.transaction_id(),
            compensation_reason = %outcome.message,
            "transfer compensation failed, ledger inconsistent"
        );
        Ok(TransferResolution::CompensationFailed {
            failed_leg,
            compensation,
            reason: outcome.message,
        })
    }
}
