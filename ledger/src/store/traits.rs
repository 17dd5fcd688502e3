//! Store traits.
//!
//! Lookups return `Ok(None)` for absent records; updates and deletes return
//! whether a record was affected. Translating absence into domain errors is
//! left to the services.

use async_trait::async_trait;
use paysettle_common::{AccountId, Currency, Result, Transaction, TransactionId, TransactionStatus};
use rust_decimal::Decimal;

use crate::account::Account;

/// Account persistence.
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Insert a new account. Fails with `AccountExists` on a duplicate id.
    async fn save(&self, account: &Account) -> Result<()>;

    /// Get an account by id.
    async fn get(&self, id: AccountId) -> Result<Option<Account>>;

    /// Overwrite balance and currency.
    async fn update(&self, id: AccountId, balance: Decimal, currency: &Currency) -> Result<bool>;

    /// Remove an account.
    async fn delete(&self, id: AccountId) -> Result<bool>;
}

/// Transaction persistence.
#[async_trait]
pub trait TransactionStore: Send + Sync {
    /// Insert a deposit. The destination is stored empty.
    async fn create_deposit(&self, transaction: &Transaction) -> Result<()>;

    /// Insert a withdraw with its destination.
    async fn create_withdraw(&self, transaction: &Transaction) -> Result<()>;

    /// Get a transaction by id.
    async fn get(&self, id: TransactionId) -> Result<Option<Transaction>>;

    /// Set the status; a final status also stamps the settlement time.
    async fn update_status(&self, id: TransactionId, status: TransactionStatus) -> Result<bool>;

    /// Remove a transaction.
    async fn delete(&self, id: TransactionId) -> Result<bool>;

    /// All transactions whose source is `account_id`, oldest first.
    async fn list_by_account(&self, account_id: AccountId) -> Result<Vec<Transaction>>;
}
