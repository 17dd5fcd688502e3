//! PostgreSQL stores.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use paysettle_common::{
    AccountId, Currency, Result, SettleError, Transaction, TransactionId, TransactionStatus,
};
use rust_decimal::Decimal;
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::Row;
use tracing::{error, info};

use super::traits::{AccountStore, TransactionStore};
use crate::account::Account;

/// Open a connection pool and bring the schema up to date.
pub async fn connect(database_url: &str, max_connections: u32, acquire_timeout: Duration) -> Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(acquire_timeout)
        .connect(database_url)
        .await
        .map_err(|e| storage_error("connect", e))?;

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .map_err(|e| SettleError::Database(format!("migrate: {e}")))?;

    info!(max_connections, "Connected to PostgreSQL");
    Ok(pool)
}

fn storage_error(action: &str, err: sqlx::Error) -> SettleError {
    error!(action, error = %err, "Storage failure");
    match err {
        sqlx::Error::PoolTimedOut => SettleError::Timeout(action.to_string()),
        other => SettleError::Database(format!("{action}: {other}")),
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .map(|db| db.is_unique_violation())
        .unwrap_or(false)
}

fn to_db_id(id: u64) -> Result<i64> {
    i64::try_from(id).map_err(|_| SettleError::InvalidId(id))
}

fn from_db_id(id: i64) -> Result<u64> {
    u64::try_from(id).map_err(|_| SettleError::Database(format!("stored identifier {id} is negative")))
}

fn column<'r, T>(row: &'r PgRow, name: &str) -> Result<T>
where
    T: sqlx::Decode<'r, sqlx::Postgres> + sqlx::Type<sqlx::Postgres>,
{
    row.try_get(name)
        .map_err(|e| SettleError::Database(format!("column {name}: {e}")))
}

/// Account store over the `accounts` table.
#[derive(Debug, Clone)]
pub struct PostgresAccountStore {
    pool: PgPool,
}

impl PostgresAccountStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn row_to_account(row: &PgRow) -> Result<Account> {
        Ok(Account {
            id: AccountId::new(from_db_id(column(row, "id")?)?),
            currency: Currency::new(column::<String>(row, "currency")?),
            balance: column(row, "balance")?,
            password: column(row, "password")?,
            email: column(row, "email")?,
        })
    }
}

#[async_trait]
impl AccountStore for PostgresAccountStore {
    async fn save(&self, account: &Account) -> Result<()> {
        sqlx::query(
            "INSERT INTO accounts (id, currency, balance, password, email) VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(to_db_id(account.id.value())?)
        .bind(account.currency.code())
        .bind(account.balance)
        .bind(&account.password)
        .bind(&account.email)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                SettleError::AccountExists(account.id)
            } else {
                storage_error("insert account", e)
            }
        })?;
        Ok(())
    }

    async fn get(&self, id: AccountId) -> Result<Option<Account>> {
        let row = sqlx::query("SELECT id, currency, balance, password, email FROM accounts WHERE id = $1")
            .bind(to_db_id(id.value())?)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| storage_error("select account", e))?;

        row.as_ref().map(Self::row_to_account).transpose()
    }

    async fn update(&self, id: AccountId, balance: Decimal, currency: &Currency) -> Result<bool> {
        let result = sqlx::query("UPDATE accounts SET balance = $1, currency = $2 WHERE id = $3")
            .bind(balance)
            .bind(currency.code())
            .bind(to_db_id(id.value())?)
            .execute(&self.pool)
            .await
            .map_err(|e| storage_error("update account", e))?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, id: AccountId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM accounts WHERE id = $1")
            .bind(to_db_id(id.value())?)
            .execute(&self.pool)
            .await
            .map_err(|e| storage_error("delete account", e))?;
        Ok(result.rows_affected() > 0)
    }
}

/// Transaction store over the `transactions` table.
#[derive(Debug, Clone)]
pub struct PostgresTransactionStore {
    pool: PgPool,
}

const TRANSACTION_COLUMNS: &str =
    "id, status, account_id, amount, currency, to_account, created_at, settled_at";

impl PostgresTransactionStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn row_to_transaction(row: &PgRow) -> Result<Transaction> {
        let status: String = column(row, "status")?;
        Ok(Transaction {
            id: TransactionId::new(from_db_id(column(row, "id")?)?),
            status: status
                .parse::<TransactionStatus>()
                .map_err(|e| SettleError::Database(e.to_string()))?,
            account_id: AccountId::new(from_db_id(column(row, "account_id")?)?),
            amount: column(row, "amount")?,
            currency: Currency::new(column::<String>(row, "currency")?),
            to_account: column(row, "to_account")?,
            created_at: column::<DateTime<Utc>>(row, "created_at")?,
            settled_at: column(row, "settled_at")?,
        })
    }

    async fn insert(&self, transaction: &Transaction, to_account: Option<i64>) -> Result<()> {
        sqlx::query(
            "INSERT INTO transactions (id, status, account_id, amount, currency, to_account, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(to_db_id(transaction.id.value())?)
        .bind(TransactionStatus::Created.as_str())
        .bind(to_db_id(transaction.account_id.value())?)
        .bind(transaction.amount)
        .bind(transaction.currency.code())
        .bind(to_account)
        .bind(transaction.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                SettleError::TransactionExists(transaction.id)
            } else {
                storage_error("insert transaction", e)
            }
        })?;
        Ok(())
    }
}

#[async_trait]
impl TransactionStore for PostgresTransactionStore {
    async fn create_deposit(&self, transaction: &Transaction) -> Result<()> {
        self.insert(transaction, None).await
    }

    async fn create_withdraw(&self, transaction: &Transaction) -> Result<()> {
        self.insert(transaction, transaction.to_account).await
    }

    async fn get(&self, id: TransactionId) -> Result<Option<Transaction>> {
        let row = sqlx::query(&format!(
            "SELECT {TRANSACTION_COLUMNS} FROM transactions WHERE id = $1"
        ))
        .bind(to_db_id(id.value())?)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| storage_error("select transaction", e))?;

        row.as_ref().map(Self::row_to_transaction).transpose()
    }

    async fn update_status(&self, id: TransactionId, status: TransactionStatus) -> Result<bool> {
        let settled_at = status.is_final().then(Utc::now);
        let result = sqlx::query("UPDATE transactions SET status = $1, settled_at = $2 WHERE id = $3")
            .bind(status.as_str())
            .bind(settled_at)
            .bind(to_db_id(id.value())?)
            .execute(&self.pool)
            .await
            .map_err(|e| storage_error("update transaction status", e))?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, id: TransactionId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM transactions WHERE id = $1")
            .bind(to_db_id(id.value())?)
            .execute(&self.pool)
            .await
            .map_err(|e| storage_error("delete transaction", e))?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_by_account(&self, account_id: AccountId) -> Result<Vec<Transaction>> {
        let rows = sqlx::query(&format!(
            "SELECT {TRANSACTION_COLUMNS} FROM transactions WHERE account_id = $1 ORDER BY created_at, id"
        ))
        .bind(to_db_id(account_id.value())?)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| storage_error("list transactions", e))?;

        rows.iter().map(Self::row_to_transaction).collect()
    }
}
