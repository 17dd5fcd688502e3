//! Settlement counters.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Counters for settlement activity.
#[derive(Debug, Default)]
pub struct SettlementMetrics {
    /// Transactions recorded.
    pub transactions_created: AtomicU64,
    /// Transactions deleted.
    pub transactions_deleted: AtomicU64,
    /// Settlement requests received.
    pub settlements_total: AtomicU64,
    /// Settlements applied to a balance.
    pub settlements_success: AtomicU64,
    /// Settlements that marked the transaction as error.
    pub settlements_rejected: AtomicU64,
    /// Settlements that failed without changing state.
    pub settlements_aborted: AtomicU64,
    /// Repeated requests answered without changes.
    pub settlements_ignored: AtomicU64,
    /// Settlements in progress.
    pub settlements_active: AtomicU64,
}

impl SettlementMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn transaction_created(&self) {
        self.transactions_created.fetch_add(1, Ordering::Relaxed);
    }

    pub fn transaction_deleted(&self) {
        self.transactions_deleted.fetch_add(1, Ordering::Relaxed);
    }

    /// Count a settlement request and mark it active until the returned
    /// guard is dropped.
    #[must_use = "the settlement stops counting as active once the guard drops"]
    pub fn settlement_initiated(&self) -> SettlementInFlight<'_> {
        self.settlements_total.fetch_add(1, Ordering::Relaxed);
        self.settlements_active.fetch_add(1, Ordering::Relaxed);
        SettlementInFlight { metrics: self }
    }

    /// Get current metrics snapshot.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            transactions_created: self.transactions_created.load(Ordering::Relaxed),
            transactions_deleted: self.transactions_deleted.load(Ordering::Relaxed),
            settlements_total: self.settlements_total.load(Ordering::Relaxed),
            settlements_success: self.settlements_success.load(Ordering::Relaxed),
            settlements_rejected: self.settlements_rejected.load(Ordering::Relaxed),
            settlements_aborted: self.settlements_aborted.load(Ordering::Relaxed),
            settlements_ignored: self.settlements_ignored.load(Ordering::Relaxed),
            settlements_active: self.settlements_active.load(Ordering::Relaxed),
        }
    }
}

/// One settlement counted in `settlements_active`.
///
/// Dropping the guard decrements the gauge, so a cancelled settlement future
/// is accounted for even though it never reports an outcome.
#[derive(Debug)]
pub struct SettlementInFlight<'a> {
    metrics: &'a SettlementMetrics,
}

impl SettlementInFlight<'_> {
    pub fn success(self) {
        self.record(&self.metrics.settlements_success);
    }

    pub fn rejected(self) {
        self.record(&self.metrics.settlements_rejected);
    }

    pub fn aborted(self) {
        self.record(&self.metrics.settlements_aborted);
    }

    pub fn ignored(self) {
        self.record(&self.metrics.settlements_ignored);
    }

    fn record(&self, outcome: &AtomicU64) {
        outcome.fetch_add(1, Ordering::Relaxed);
    }
}

impl Drop for SettlementInFlight<'_> {
    fn drop(&mut self) {
        self.metrics.settlements_active.fetch_sub(1, Ordering::Relaxed);
    }
}

/// Point-in-time copy of [`SettlementMetrics`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub transactions_created: u64,
    pub transactions_deleted: u64,
    pub settlements_total: u64,
    pub settlements_success: u64,
    pub settlements_rejected: u64,
    pub settlements_aborted: u64,
    pub settlements_ignored: u64,
    pub settlements_active: u64,
}
