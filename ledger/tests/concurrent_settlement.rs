mod common;

use std::time::Duration;

use common::Harness;
use paysettle_common::{Currency, SettleError, TransactionId, TransactionStatus};
use paysettle_ledger::{ResettlePolicy, SettlementConfig};
use rust_decimal_macros::dec;

const READ_DELAY: Duration = Duration::from_millis(20);

fn config(serialize_per_account: bool) -> SettlementConfig {
    SettlementConfig {
        serialize_per_account,
        ..SettlementConfig::default()
    }
}

#[tokio::test]
async fn unserialized_settlements_lose_an_update() {
    let h = Harness::with_read_delay(config(false), READ_DELAY);
    h.open_account(1, Currency::usd(), dec!(0)).await;
    h.deposit(1, 1, dec!(100), Currency::usd()).await;
    h.deposit(2, 1, dec!(50), Currency::usd()).await;

    let (first, second) = tokio::join!(
        h.settlement.settle(TransactionId::new(1)),
        h.settlement.settle(TransactionId::new(2)),
    );
    assert!(first.is_ok());
    assert!(second.is_ok());

    // Both settlements read a zero balance, so only one deposit survives.
    let balance = h.balance(1).await;
    assert!(balance == dec!(100) || balance == dec!(50), "balance {balance}");
}

#[tokio::test]
async fn serialized_settlements_apply_every_update() {
    let h = Harness::with_read_delay(config(true), READ_DELAY);
    h.open_account(1, Currency::usd(), dec!(30)).await;
    h.deposit(1, 1, dec!(100), Currency::usd()).await;
    h.deposit(2, 1, dec!(50), Currency::usd()).await;
    h.withdraw(3, 1, dec!(30), Currency::usd(), 2).await;

    let (first, second, third) = tokio::join!(
        h.settlement.settle(TransactionId::new(1)),
        h.settlement.settle(TransactionId::new(2)),
        h.settlement.settle(TransactionId::new(3)),
    );
    assert!(first.is_ok());
    assert!(second.is_ok());
    assert!(third.is_ok());

    assert_eq!(h.balance(1).await, dec!(150));
}

#[tokio::test]
async fn same_transaction_settles_once_when_serialized() {
    let h = Harness::with_read_delay(config(true), READ_DELAY);
    h.open_account(1, Currency::usd(), dec!(0)).await;
    h.deposit(1, 1, dec!(100), Currency::usd()).await;

    let (first, second) = tokio::join!(
        h.settlement.settle(TransactionId::new(1)),
        h.settlement.settle(TransactionId::new(1)),
    );

    let results = [first, second];
    let settled = results.iter().filter(|r| r.is_ok()).count();
    let rejected = results
        .iter()
        .filter(|r| matches!(r, Err(e) if matches!(e.root(), SettleError::AlreadySettled { .. })))
        .count();
    assert_eq!((settled, rejected), (1, 1));
    assert_eq!(h.balance(1).await, dec!(100));
}

#[tokio::test]
async fn concurrent_duplicate_is_ignored_under_ignore_policy() {
    let config = SettlementConfig {
        serialize_per_account: true,
        resettle_policy: ResettlePolicy::Ignore,
    };
    let h = Harness::with_read_delay(config, READ_DELAY);
    h.open_account(1, Currency::eur(), dec!(0)).await;
    h.deposit(1, 1, dec!(10), Currency::usd()).await;

    let (first, second) = tokio::join!(
        h.settlement.settle(TransactionId::new(1)),
        h.settlement.settle(TransactionId::new(1)),
    );

    assert_eq!(first.unwrap().status, TransactionStatus::Success);
    assert_eq!(second.unwrap().status, TransactionStatus::Success);
    assert_eq!(h.balance(1).await, dec!(9));

    let snapshot = h.settlement.metrics().snapshot();
    assert_eq!(snapshot.settlements_success, 1);
    assert_eq!(snapshot.settlements_ignored, 1);
    assert_eq!(snapshot.settlements_active, 0);
}

#[tokio::test]
async fn cancelled_settlement_is_not_left_active() {
    let h = Harness::with_read_delay(config(true), Duration::from_millis(200));
    h.open_account(1, Currency::usd(), dec!(0)).await;
    h.deposit(1, 1, dec!(10), Currency::usd()).await;

    let result = tokio::time::timeout(
        Duration::from_millis(10),
        h.settlement.settle(TransactionId::new(1)),
    )
    .await;
    assert!(result.is_err(), "settlement should still be reading the account");

    let snapshot = h.settlement.metrics().snapshot();
    assert_eq!(snapshot.settlements_total, 1);
    assert_eq!(snapshot.settlements_active, 0);
    assert_eq!(h.balance(1).await, dec!(0));
    assert!(h.settlement.get(TransactionId::new(1)).await.unwrap().is_pending());
}
