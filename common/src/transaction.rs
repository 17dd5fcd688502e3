//! Transaction types and status state machine for PaySettle.

use crate::{AccountId, Currency, TransactionId};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Transaction status representing the settlement lifecycle.
///
/// `Created` is the only initial state; `Success` and `Error` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    /// Recorded but not yet applied; the amount is frozen.
    Created,
    /// Settled and applied to the account balance.
    Success,
    /// Settlement rejected; the balance was not touched.
    Error,
}

impl TransactionStatus {
    /// Check if this is a final state.
    pub fn is_final(&self) -> bool {
        matches!(self, TransactionStatus::Success | TransactionStatus::Error)
    }

    /// Get valid next states from current state.
    pub fn valid_transitions(&self) -> &[TransactionStatus] {
        match self {
            TransactionStatus::Created => &[TransactionStatus::Success, TransactionStatus::Error],
            TransactionStatus::Success => &[],
            TransactionStatus::Error => &[],
        }
    }

    /// Check if transition to given state is valid.
    pub fn can_transition_to(&self, next: TransactionStatus) -> bool {
        self.valid_transitions().contains(&next)
    }

    /// Wire and storage representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionStatus::Created => "created",
            TransactionStatus::Success => "success",
            TransactionStatus::Error => "error",
        }
    }
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status string that does not name a known status.
#[derive(Debug, Clone, Error)]
#[error("Unknown transaction status: {0}")]
pub struct UnknownStatus(pub String);

impl FromStr for TransactionStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "created" => Ok(TransactionStatus::Created),
            "success" => Ok(TransactionStatus::Success),
            "error" => Ok(TransactionStatus::Error),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}

/// How a transaction affects its source account, derived from the
/// destination field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionKind {
    /// No destination (or zero): credit the source account.
    Deposit,
    /// Positive destination: debit the source account.
    Withdraw { to: AccountId },
    /// Destination outside both recognized shapes.
    Malformed(i64),
}

/// A deposit or withdraw request recorded against one source account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Caller-supplied identifier.
    pub id: TransactionId,
    /// Current status.
    pub status: TransactionStatus,
    /// Source account.
    pub account_id: AccountId,
    /// Amount in the transaction's own currency.
    pub amount: Decimal,
    /// Currency of `amount`.
    pub currency: Currency,
    /// Destination account as recorded; absent or zero for deposits.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to_account: Option<i64>,
    /// When the transaction was recorded.
    pub created_at: DateTime<Utc>,
    /// When the transaction reached a final status.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settled_at: Option<DateTime<Utc>>,
}

impl Transaction {
    /// Create a pending deposit into `account_id`.
    pub fn deposit(
        id: TransactionId,
        account_id: AccountId,
        amount: Decimal,
        currency: Currency,
    ) -> Self {
        Self {
            id,
            status: TransactionStatus::Created,
            account_id,
            amount,
            currency,
            to_account: None,
            created_at: Utc::now(),
            settled_at: None,
        }
    }

    /// Create a pending withdraw from `account_id`. The destination is kept
    /// as given; [`Transaction::kind`] decides whether it is usable.
    pub fn withdraw(
        id: TransactionId,
        account_id: AccountId,
        amount: Decimal,
        currency: Currency,
        to_account: i64,
    ) -> Self {
        Self {
            to_account: Some(to_account),
            ..Self::deposit(id, account_id, amount, currency)
        }
    }

    /// Classify the transaction by its destination field.
    pub fn kind(&self) -> TransactionKind {
        match self.to_account {
            None | Some(0) => TransactionKind::Deposit,
            Some(to) if to > 0 => TransactionKind::Withdraw {
                to: AccountId::new(to.unsigned_abs()),
            },
            Some(to) => TransactionKind::Malformed(to),
        }
    }

    /// Check if the transaction is still pending (frozen).
    pub fn is_pending(&self) -> bool {
        self.status == TransactionStatus::Created
    }

    /// Transition to a new status.
    pub fn transition_to(&mut self, new_status: TransactionStatus) -> Result<(), InvalidTransition> {
        if !self.status.can_transition_to(new_status) {
            return Err(InvalidTransition {
                from: self.status,
                to: new_status,
            });
        }

        self.status = new_status;
        if new_status.is_final() {
            self.settled_at = Some(Utc::now());
        }

        Ok(())
    }
}

/// Error when attempting invalid state transition.
#[derive(Debug, Clone, Error)]
#[error("Invalid state transition from {from} to {to}")]
pub struct InvalidTransition {
    pub from: TransactionStatus,
    pub to: TransactionStatus,
}
