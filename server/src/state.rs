//! Shared application state.

use std::fmt;
use std::sync::Arc;

use paysettle_common::Result;
use paysettle_fx::RateTable;
use paysettle_ledger::store::connect;
use paysettle_ledger::{
    AccountService, AccountStore, InMemoryAccountStore, InMemoryTransactionStore,
    PostgresAccountStore, PostgresTransactionStore, SettlementConfig, SettlementMetrics,
    SettlementService, TransactionStore,
};
use tracing::info;

use crate::config::ServerConfig;

/// Storage backend behind the services.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Memory,
    Postgres,
}

impl StorageBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            StorageBackend::Memory => "memory",
            StorageBackend::Postgres => "postgres",
        }
    }
}

impl fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Handles shared by every request handler.
#[derive(Clone)]
pub struct AppState {
    pub accounts: Arc<AccountService>,
    pub settlement: Arc<SettlementService>,
    pub metrics: Arc<SettlementMetrics>,
    pub storage: StorageBackend,
}

impl AppState {
    /// Wire services over the given stores.
    pub fn new(
        accounts: Arc<dyn AccountStore>,
        transactions: Arc<dyn TransactionStore>,
        rates: Arc<RateTable>,
        settlement: SettlementConfig,
        storage: StorageBackend,
    ) -> Self {
        let metrics = Arc::new(SettlementMetrics::new());
        let settlement = SettlementService::new(transactions, accounts.clone(), rates.clone(), settlement)
            .with_metrics(metrics.clone());

        Self {
            accounts: Arc::new(AccountService::new(accounts, rates)),
            settlement: Arc::new(settlement),
            metrics,
            storage,
        }
    }

    /// State over fresh in-memory stores.
    pub fn in_memory(rates: RateTable, settlement: SettlementConfig) -> Self {
        Self::new(
            Arc::new(InMemoryAccountStore::new()),
            Arc::new(InMemoryTransactionStore::new()),
            Arc::new(rates),
            settlement,
            StorageBackend::Memory,
        )
    }

    /// Build state from configuration, connecting to PostgreSQL when a
    /// database URL is configured.
    pub async fn from_config(config: &ServerConfig) -> Result<Self> {
        let rates = config.fx.rate_table()?;

        let Some(url) = config.database_url.as_deref() else {
            info!("No database configured, using in-memory stores");
            return Ok(Self::in_memory(rates, config.settlement.clone()));
        };

        let pool = connect(url, config.max_connections, config.request_timeout()).await?;
        Ok(Self::new(
            Arc::new(PostgresAccountStore::new(pool.clone())),
            Arc::new(PostgresTransactionStore::new(pool)),
            Arc::new(rates),
            config.settlement.clone(),
            StorageBackend::Postgres,
        ))
    }
}
