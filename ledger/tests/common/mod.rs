#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use paysettle_common::{
    AccountId, Currency, Result, SettleError, Transaction, TransactionId, TransactionStatus,
};
use paysettle_fx::RateTable;
use paysettle_ledger::{
    Account, AccountService, AccountStore, InMemoryAccountStore, InMemoryTransactionStore,
    SettlementConfig, SettlementService, TransactionStore,
};
use rust_decimal::Decimal;

/// Account store whose reads stall after fetching, widening the window
/// between a settlement's read and its write.
pub struct SlowAccountStore {
    inner: Arc<InMemoryAccountStore>,
    delay: Duration,
}

impl SlowAccountStore {
    pub fn new(inner: Arc<InMemoryAccountStore>, delay: Duration) -> Self {
        Self { inner, delay }
    }
}

#[async_trait]
impl AccountStore for SlowAccountStore {
    async fn save(&self, account: &Account) -> Result<()> {
        self.inner.save(account).await
    }

    async fn get(&self, id: AccountId) -> Result<Option<Account>> {
        let found = self.inner.get(id).await?;
        tokio::time::sleep(self.delay).await;
        Ok(found)
    }

    async fn update(&self, id: AccountId, balance: Decimal, currency: &Currency) -> Result<bool> {
        self.inner.update(id, balance, currency).await
    }

    async fn delete(&self, id: AccountId) -> Result<bool> {
        self.inner.delete(id).await
    }
}

/// Transaction store that loses its connection on every status write.
pub struct FailingStatusStore {
    inner: Arc<InMemoryTransactionStore>,
}

impl FailingStatusStore {
    pub fn new(inner: Arc<InMemoryTransactionStore>) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl TransactionStore for FailingStatusStore {
    async fn create_deposit(&self, transaction: &Transaction) -> Result<()> {
        self.inner.create_deposit(transaction).await
    }

    async fn create_withdraw(&self, transaction: &Transaction) -> Result<()> {
        self.inner.create_withdraw(transaction).await
    }

    async fn get(&self, id: TransactionId) -> Result<Option<Transaction>> {
        self.inner.get(id).await
    }

    async fn update_status(&self, id: TransactionId, _status: TransactionStatus) -> Result<bool> {
        Err(SettleError::Database(format!("connection reset while updating {id}")))
    }

    async fn delete(&self, id: TransactionId) -> Result<bool> {
        self.inner.delete(id).await
    }

    async fn list_by_account(&self, account_id: AccountId) -> Result<Vec<Transaction>> {
        self.inner.list_by_account(account_id).await
    }
}

pub struct Harness {
    pub accounts: Arc<InMemoryAccountStore>,
    pub transactions: Arc<InMemoryTransactionStore>,
    pub account_service: AccountService,
    pub settlement: SettlementService,
}

impl Harness {
    pub fn new(config: SettlementConfig) -> Self {
        Self::build(config, None, false)
    }

    /// Settlement reads accounts through a [`SlowAccountStore`].
    pub fn with_read_delay(config: SettlementConfig, delay: Duration) -> Self {
        Self::build(config, Some(delay), false)
    }

    /// Settlement writes statuses through a [`FailingStatusStore`].
    pub fn with_failing_status_writes(config: SettlementConfig) -> Self {
        Self::build(config, None, true)
    }

    fn build(config: SettlementConfig, delay: Option<Duration>, fail_status_writes: bool) -> Self {
        let accounts = Arc::new(InMemoryAccountStore::new());
        let transactions = Arc::new(InMemoryTransactionStore::new());
        let rates = Arc::new(RateTable::standard());

        let settlement_accounts: Arc<dyn AccountStore> = match delay {
            Some(delay) => Arc::new(SlowAccountStore::new(accounts.clone(), delay)) as Arc<dyn AccountStore>,
            None => accounts.clone() as Arc<dyn AccountStore>,
        };
        let settlement_transactions: Arc<dyn TransactionStore> = if fail_status_writes {
            Arc::new(FailingStatusStore::new(transactions.clone()))
        } else {
            transactions.clone()
        };

        Self {
            account_service: AccountService::new(accounts.clone(), rates.clone()),
            settlement: SettlementService::new(settlement_transactions, settlement_accounts, rates, config),
            accounts,
            transactions,
        }
    }

    pub async fn open_account(&self, id: u64, currency: Currency, balance: Decimal) -> Account {
        self.account_service
            .register(Account::new(AccountId::new(id), currency, balance, "secret", "owner@example.com"))
            .await
            .unwrap()
    }

    pub async fn balance(&self, id: u64) -> Decimal {
        self.account_service.get(AccountId::new(id)).await.unwrap().balance
    }

    pub async fn deposit(&self, id: u64, account: u64, amount: Decimal, currency: Currency) -> Transaction {
        self.settlement
            .create_deposit(Transaction::deposit(
                TransactionId::new(id),
                AccountId::new(account),
                amount,
                currency,
            ))
            .await
            .unwrap()
    }

    pub async fn withdraw(&self, id: u64, account: u64, amount: Decimal, currency: Currency, to: i64) -> Transaction {
        self.settlement
            .create_withdraw(Transaction::withdraw(
                TransactionId::new(id),
                AccountId::new(account),
                amount,
                currency,
                to,
            ))
            .await
            .unwrap()
    }
}
