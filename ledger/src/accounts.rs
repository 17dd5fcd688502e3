//! Account lifecycle operations.

use std::sync::Arc;

use paysettle_common::{AccountId, Currency, OperationContext, Result, SettleError};
use paysettle_fx::RateTable;
use rust_decimal::Decimal;
use tracing::{info, instrument};

use crate::account::Account;
use crate::store::AccountStore;

/// Registers, fetches, corrects and removes accounts.
pub struct AccountService {
    accounts: Arc<dyn AccountStore>,
    rates: Arc<RateTable>,
}

impl AccountService {
    pub fn new(accounts: Arc<dyn AccountStore>, rates: Arc<RateTable>) -> Self {
        Self { accounts, rates }
    }

    /// Register a new account.
    #[instrument(skip(self, account), fields(account = %account.id, currency = %account.currency))]
    pub async fn register(&self, account: Account) -> Result<Account> {
        const OP: &str = "ledger.AccountService.register";

        self.rates
            .ensure_supported(&account.currency)
            .map_err(|e| SettleError::from(e).in_op(OP))?;

        if self.accounts.get(account.id).await.op(OP)?.is_some() {
            return Err(SettleError::AccountExists(account.id).in_op(OP));
        }
        self.accounts.save(&account).await.op(OP)?;

        info!(balance = %account.balance, "Account registered");
        Ok(account)
    }

    /// Get an account.
    pub async fn get(&self, id: AccountId) -> Result<Account> {
        self.accounts
            .get(id)
            .await
            .and_then(|found| found.ok_or(SettleError::AccountNotFound(id)))
            .op("ledger.AccountService.get")
    }

    /// Delete an existing account.
    #[instrument(skip(self), fields(account = %id))]
    pub async fn delete(&self, id: AccountId) -> Result<()> {
        const OP: &str = "ledger.AccountService.delete";

        if self.accounts.get(id).await.op(OP)?.is_none() {
            return Err(SettleError::AccountNotFound(id).in_op(OP));
        }
        if !self.accounts.delete(id).await.op(OP)? {
            return Err(SettleError::AccountNotFound(id).in_op(OP));
        }

        info!("Account deleted");
        Ok(())
    }

    /// Overwrite balance and currency of an account.
    ///
    /// The balance is taken as given; no conversion from the old currency
    /// is applied.
    #[instrument(skip(self), fields(account = %id))]
    pub async fn update_balance(&self, id: AccountId, balance: Decimal, currency: Currency) -> Result<Account> {
        const OP: &str = "ledger.AccountService.update_balance";

        self.rates
            .ensure_supported(&currency)
            .map_err(|e| SettleError::from(e).in_op(OP))?;

        if !self.accounts.update(id, balance, &currency).await.op(OP)? {
            return Err(SettleError::AccountNotFound(id).in_op(OP));
        }

        info!(%balance, %currency, "Account balance overwritten");
        self.get(id).await.op(OP)
    }
}
