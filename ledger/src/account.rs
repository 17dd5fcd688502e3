//! Account definitions for ledger.

use paysettle_common::{AccountId, Currency};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A monetary account.
///
/// The balance is only written by settlement or by an explicit
/// administrative update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    /// Caller-supplied identifier, immutable once created.
    pub id: AccountId,
    /// Account currency.
    pub currency: Currency,
    /// Current balance in `currency`.
    pub balance: Decimal,
    /// Credential, opaque to settlement. Never serialized.
    #[serde(skip_serializing, default)]
    pub password: String,
    /// Contact address, opaque to settlement.
    pub email: String,
}

impl Account {
    /// Create a new account.
    pub fn new(
        id: AccountId,
        currency: Currency,
        balance: Decimal,
        password: impl Into<String>,
        email: impl Into<String>,
    ) -> Self {
        Self {
            id,
            currency,
            balance,
            password: password.into(),
            email: email.into(),
        }
    }

    /// Check if the balance covers `amount`.
    pub fn has_sufficient_funds(&self, amount: Decimal) -> bool {
        self.balance >= amount
    }
}
