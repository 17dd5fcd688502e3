//! Persistence for accounts and transactions.

mod memory;
mod postgres;
mod traits;

pub use memory::{InMemoryAccountStore, InMemoryTransactionStore};
pub use postgres::{connect, PostgresAccountStore, PostgresTransactionStore};
pub use traits::{AccountStore, TransactionStore};
