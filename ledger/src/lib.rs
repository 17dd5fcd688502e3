//! PaySettle Ledger
//!
//! Account and transaction services on top of pluggable stores.

pub mod account;
pub mod accounts;
pub mod balance;
pub mod config;
pub mod lock_manager;
pub mod metrics;
pub mod settlement;
pub mod store;

pub use account::Account;
pub use accounts::AccountService;
pub use balance::FrozenBalance;
pub use config::{ResettlePolicy, SettlementConfig};
pub use lock_manager::{AccountLockGuard, AccountLocks};
pub use metrics::{MetricsSnapshot, SettlementInFlight, SettlementMetrics};
pub use settlement::SettlementService;
pub use store::{
    AccountStore, InMemoryAccountStore, InMemoryTransactionStore, PostgresAccountStore,
    PostgresTransactionStore, TransactionStore,
};
