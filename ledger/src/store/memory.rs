//! In-memory stores.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use paysettle_common::{
    AccountId, Currency, Result, SettleError, Transaction, TransactionId, TransactionStatus,
};
use rust_decimal::Decimal;

use super::traits::{AccountStore, TransactionStore};
use crate::account::Account;

/// Account store backed by a hash map.
#[derive(Debug, Default)]
pub struct InMemoryAccountStore {
    accounts: RwLock<HashMap<AccountId, Account>>,
}

impl InMemoryAccountStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored accounts.
    pub fn len(&self) -> usize {
        self.accounts.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.read().is_empty()
    }
}

#[async_trait]
impl AccountStore for InMemoryAccountStore {
    async fn save(&self, account: &Account) -> Result<()> {
        let mut accounts = self.accounts.write();
        if accounts.contains_key(&account.id) {
            return Err(SettleError::AccountExists(account.id));
        }
        accounts.insert(account.id, account.clone());
        Ok(())
    }

    async fn get(&self, id: AccountId) -> Result<Option<Account>> {
        Ok(self.accounts.read().get(&id).cloned())
    }

    async fn update(&self, id: AccountId, balance: Decimal, currency: &Currency) -> Result<bool> {
        let mut accounts = self.accounts.write();
        match accounts.get_mut(&id) {
            Some(account) => {
                account.balance = balance;
                account.currency = currency.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, id: AccountId) -> Result<bool> {
        Ok(self.accounts.write().remove(&id).is_some())
    }
}

/// Transaction store backed by a hash map.
#[derive(Debug, Default)]
pub struct InMemoryTransactionStore {
    transactions: RwLock<HashMap<TransactionId, Transaction>>,
}

impl InMemoryTransactionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored transactions.
    pub fn len(&self) -> usize {
        self.transactions.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.read().is_empty()
    }

    fn insert(&self, transaction: Transaction) -> Result<()> {
        let mut transactions = self.transactions.write();
        if transactions.contains_key(&transaction.id) {
            return Err(SettleError::TransactionExists(transaction.id));
        }
        transactions.insert(transaction.id, transaction);
        Ok(())
    }
}

#[async_trait]
impl TransactionStore for InMemoryTransactionStore {
    async fn create_deposit(&self, transaction: &Transaction) -> Result<()> {
        self.insert(Transaction {
            to_account: None,
            ..transaction.clone()
        })
    }

    async fn create_withdraw(&self, transaction: &Transaction) -> Result<()> {
        self.insert(transaction.clone())
    }

    async fn get(&self, id: TransactionId) -> Result<Option<Transaction>> {
        Ok(self.transactions.read().get(&id).cloned())
    }

    async fn update_status(&self, id: TransactionId, status: TransactionStatus) -> Result<bool> {
        let mut transactions = self.transactions.write();
        match transactions.get_mut(&id) {
            Some(transaction) => {
                transaction.status = status;
                transaction.settled_at = status.is_final().then(Utc::now);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, id: TransactionId) -> Result<bool> {
        Ok(self.transactions.write().remove(&id).is_some())
    }

    async fn list_by_account(&self, account_id: AccountId) -> Result<Vec<Transaction>> {
        let mut found: Vec<Transaction> = self
            .transactions
            .read()
            .values()
            .filter(|tx| tx.account_id == account_id)
            .cloned()
            .collect();
        found.sort_by_key(|tx| (tx.created_at, tx.id));
        Ok(found)
    }
}
