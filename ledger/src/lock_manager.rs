//! Per-account settlement locks.

use std::sync::Arc;

use dashmap::DashMap;
use paysettle_common::AccountId;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::trace;

/// Hands out one async mutex per account.
///
/// Entries are created on first use and dropped once the last holder or
/// waiter releases them.
#[derive(Debug, Default)]
pub struct AccountLocks {
    locks: DashMap<AccountId, Arc<Mutex<()>>>,
}

impl AccountLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to an account.
    pub async fn acquire(&self, account_id: AccountId) -> AccountLockGuard<'_> {
        let mutex = self.locks.entry(account_id).or_default().clone();
        let guard = mutex.lock_owned().await;
        trace!(account = %account_id, "Account lock acquired");

        AccountLockGuard {
            locks: &self.locks,
            account_id,
            guard: Some(guard),
        }
    }

    /// Accounts currently held or waited on.
    pub fn tracked_accounts(&self) -> usize {
        self.locks.len()
    }
}

/// Exclusive access to one account until dropped.
pub struct AccountLockGuard<'a> {
    locks: &'a DashMap<AccountId, Arc<Mutex<()>>>,
    account_id: AccountId,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for AccountLockGuard<'_> {
    fn drop(&mut self) {
        // Release before checking, so our own reference is not counted.
        self.guard.take();
        self.locks
            .remove_if(&self.account_id, |_, mutex| Arc::strong_count(mutex) == 1);
        trace!(account = %self.account_id, "Account lock released");
    }
}
