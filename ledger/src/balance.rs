//! Frozen balance projection.

use paysettle_common::{AccountId, Currency, Result, SettleError};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Net amount of all pending transactions of an account, in the account's
/// currency. Computed on demand, never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrozenBalance {
    /// Account identifier.
    pub account_id: AccountId,
    /// Currency of `amount`.
    pub currency: Currency,
    /// Deposits minus withdrawals not yet applied to the stored balance.
    pub amount: Decimal,
}

impl FrozenBalance {
    /// Start an empty projection for an account.
    pub fn zero(account_id: AccountId, currency: Currency) -> Self {
        Self {
            account_id,
            currency,
            amount: Decimal::ZERO,
        }
    }

    /// Add a pending deposit.
    pub fn credit(&mut self, amount: Decimal) -> Result<()> {
        self.amount = self
            .amount
            .checked_add(amount)
            .ok_or_else(|| overflow(self.amount, "+", amount))?;
        Ok(())
    }

    /// Subtract a pending withdraw.
    pub fn debit(&mut self, amount: Decimal) -> Result<()> {
        self.amount = self
            .amount
            .checked_sub(amount)
            .ok_or_else(|| overflow(self.amount, "-", amount))?;
        Ok(())
    }
}

fn overflow(total: Decimal, op: &str, amount: Decimal) -> SettleError {
    SettleError::InvalidAmount(format!("frozen balance {total} {op} {amount} overflows"))
}
