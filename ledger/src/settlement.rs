//! Transaction settlement.
//!
//! A transaction is recorded with status `created` and stays frozen until it
//! is settled. Settlement converts the amount into the source account's
//! currency, applies it to the balance and then records the final status.
//! The balance write always precedes the status write, so an interrupted
//! settlement can leave an applied balance behind a transaction that still
//! reads `created`, but never the reverse.

use std::sync::Arc;

use paysettle_common::{
    AccountId, OperationContext, Result, SettleError, Transaction, TransactionId, TransactionKind,
    TransactionStatus,
};
use paysettle_fx::RateTable;
use rust_decimal::Decimal;
use tracing::{debug, info, instrument, warn};

use crate::account::Account;
use crate::balance::FrozenBalance;
use crate::config::{ResettlePolicy, SettlementConfig};
use crate::lock_manager::AccountLocks;
use crate::metrics::SettlementMetrics;
use crate::store::{AccountStore, TransactionStore};

enum Outcome {
    Applied(Transaction),
    Unchanged(Transaction),
}

/// Creates, settles and removes transactions.
pub struct SettlementService {
    transactions: Arc<dyn TransactionStore>,
    accounts: Arc<dyn AccountStore>,
    rates: Arc<RateTable>,
    locks: AccountLocks,
    metrics: Arc<SettlementMetrics>,
    config: SettlementConfig,
}

impl SettlementService {
    pub fn new(
        transactions: Arc<dyn TransactionStore>,
        accounts: Arc<dyn AccountStore>,
        rates: Arc<RateTable>,
        config: SettlementConfig,
    ) -> Self {
        Self {
            transactions,
            accounts,
            rates,
            locks: AccountLocks::new(),
            metrics: Arc::new(SettlementMetrics::new()),
            config,
        }
    }

    /// Report into an existing metrics instance.
    pub fn with_metrics(mut self, metrics: Arc<SettlementMetrics>) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn metrics(&self) -> &Arc<SettlementMetrics> {
        &self.metrics
    }

    /// Record a pending deposit. Any destination on the input is dropped.
    #[instrument(skip(self, transaction), fields(transaction = %transaction.id, account = %transaction.account_id))]
    pub async fn create_deposit(&self, mut transaction: Transaction) -> Result<Transaction> {
        const OP: &str = "ledger.SettlementService.create_deposit";

        validate_amount(&transaction).op(OP)?;
        transaction.to_account = None;
        reset_pending(&mut transaction);

        self.ensure_new(transaction.id).await.op(OP)?;
        self.transactions.create_deposit(&transaction).await.op(OP)?;
        self.metrics.transaction_created();

        info!(amount = %transaction.amount, currency = %transaction.currency, "Deposit created");
        Ok(transaction)
    }

    /// Record a pending withdraw. The destination must be a positive id.
    #[instrument(skip(self, transaction), fields(transaction = %transaction.id, account = %transaction.account_id))]
    pub async fn create_withdraw(&self, mut transaction: Transaction) -> Result<Transaction> {
        const OP: &str = "ledger.SettlementService.create_withdraw";

        validate_amount(&transaction).op(OP)?;
        let to = match transaction.kind() {
            TransactionKind::Withdraw { to } => to,
            TransactionKind::Deposit => {
                return Err(SettleError::IncorrectId(transaction.to_account.unwrap_or(0)).in_op(OP))
            }
            TransactionKind::Malformed(raw) => return Err(SettleError::IncorrectId(raw).in_op(OP)),
        };
        reset_pending(&mut transaction);

        self.ensure_new(transaction.id).await.op(OP)?;
        self.transactions.create_withdraw(&transaction).await.op(OP)?;
        self.metrics.transaction_created();

        info!(
            amount = %transaction.amount,
            currency = %transaction.currency,
            to = %to,
            "Withdraw created"
        );
        Ok(transaction)
    }

    /// Get a transaction.
    pub async fn get(&self, id: TransactionId) -> Result<Transaction> {
        self.load_transaction(id)
            .await
            .op("ledger.SettlementService.get")
    }

    /// Settle a pending transaction against its source account.
    ///
    /// Rejections (`NegativeBalance`, `IncorrectId`) record status `error`
    /// before failing. Every other failure, including an amount that
    /// overflows on conversion or on the new balance, leaves both records
    /// untouched.
    #[instrument(skip(self), fields(transaction = %id))]
    pub async fn settle(&self, id: TransactionId) -> Result<Transaction> {
        const OP: &str = "ledger.SettlementService.settle";

        let in_flight = self.metrics.settlement_initiated();
        match self.settle_once(id).await {
            Ok(Outcome::Applied(transaction)) => {
                in_flight.success();
                info!(account = %transaction.account_id, "Transaction settled");
                Ok(transaction)
            }
            Ok(Outcome::Unchanged(transaction)) => {
                in_flight.ignored();
                debug!(status = %transaction.status, "Transaction already final, nothing to do");
                Ok(transaction)
            }
            Err(err) => {
                match err.root() {
                    SettleError::NegativeBalance { .. } | SettleError::IncorrectId(_) => {
                        in_flight.rejected();
                        warn!(error = %err, "Settlement rejected");
                    }
                    _ => {
                        in_flight.aborted();
                        warn!(error = %err, "Settlement aborted");
                    }
                }
                Err(err.in_op(OP))
            }
        }
    }

    async fn settle_once(&self, id: TransactionId) -> Result<Outcome> {
        let mut transaction = self.load_transaction(id).await?;
        if transaction.status.is_final() {
            return self.resettle(transaction);
        }

        let _guard = if self.config.serialize_per_account {
            let guard = self.locks.acquire(transaction.account_id).await;
            // Another settlement may have finished while we waited.
            transaction = self.load_transaction(id).await?;
            if transaction.status.is_final() {
                return self.resettle(transaction);
            }
            Some(guard)
        } else {
            None
        };

        let account = self.load_account(transaction.account_id).await?;
        let amount = self
            .rates
            .convert(transaction.amount, &transaction.currency, &account.currency)?;

        match transaction.kind() {
            TransactionKind::Deposit => {
                let balance = account
                    .balance
                    .checked_add(amount)
                    .ok_or_else(|| balance_overflow(&account, "+", amount))?;
                self.write_balance(&account, balance).await?;
            }
            TransactionKind::Withdraw { to } => {
                if !account.has_sufficient_funds(amount) {
                    self.write_status(&mut transaction, TransactionStatus::Error)
                        .await?;
                    return Err(SettleError::NegativeBalance {
                        required: amount,
                        available: account.balance,
                    });
                }
                let balance = account
                    .balance
                    .checked_sub(amount)
                    .ok_or_else(|| balance_overflow(&account, "-", amount))?;
                self.write_balance(&account, balance).await?;
                debug!(%to, %amount, "Withdraw debited");
            }
            TransactionKind::Malformed(raw) => {
                self.write_status(&mut transaction, TransactionStatus::Error)
                    .await?;
                return Err(SettleError::IncorrectId(raw));
            }
        }

        self.write_status(&mut transaction, TransactionStatus::Success)
            .await?;
        Ok(Outcome::Applied(transaction))
    }

    fn resettle(&self, transaction: Transaction) -> Result<Outcome> {
        match self.config.resettle_policy {
            ResettlePolicy::Reject => Err(SettleError::AlreadySettled {
                id: transaction.id,
                status: transaction.status,
            }),
            ResettlePolicy::Ignore => Ok(Outcome::Unchanged(transaction)),
        }
    }

    /// Net amount of all pending transactions of an account, in the
    /// account's currency.
    #[instrument(skip(self), fields(account = %account_id))]
    pub async fn frozen_balance(&self, account_id: AccountId) -> Result<FrozenBalance> {
        const OP: &str = "ledger.SettlementService.frozen_balance";

        let transactions = self.transactions.list_by_account(account_id).await.op(OP)?;
        if transactions.is_empty() {
            return Err(SettleError::NoTransactions(account_id).in_op(OP));
        }

        let account = self.load_account(account_id).await.op(OP)?;
        let mut frozen = FrozenBalance::zero(account_id, account.currency.clone());

        for transaction in transactions.iter().filter(|tx| tx.is_pending()) {
            let amount = self
                .rates
                .convert(transaction.amount, &transaction.currency, &account.currency)
                .map_err(|e| SettleError::from(e).in_op(OP))?;

            match transaction.kind() {
                TransactionKind::Deposit => frozen.credit(amount).op(OP)?,
                TransactionKind::Withdraw { .. } => frozen.debit(amount).op(OP)?,
                TransactionKind::Malformed(raw) => {
                    return Err(SettleError::IncorrectId(raw).in_op(OP));
                }
            }
        }

        debug!(amount = %frozen.amount, currency = %frozen.currency, "Frozen balance computed");
        Ok(frozen)
    }

    /// Delete an existing transaction.
    #[instrument(skip(self), fields(transaction = %id))]
    pub async fn delete(&self, id: TransactionId) -> Result<()> {
        const OP: &str = "ledger.SettlementService.delete";

        self.load_transaction(id).await.op(OP)?;
        if !self.transactions.delete(id).await.op(OP)? {
            return Err(SettleError::TransactionNotFound(id).in_op(OP));
        }
        self.metrics.transaction_deleted();

        info!("Transaction deleted");
        Ok(())
    }

    async fn ensure_new(&self, id: TransactionId) -> Result<()> {
        match self.transactions.get(id).await? {
            Some(_) => Err(SettleError::TransactionExists(id)),
            None => Ok(()),
        }
    }

    async fn load_transaction(&self, id: TransactionId) -> Result<Transaction> {
        self.transactions
            .get(id)
            .await?
            .ok_or(SettleError::TransactionNotFound(id))
    }

    async fn load_account(&self, id: AccountId) -> Result<Account> {
        self.accounts
            .get(id)
            .await?
            .ok_or(SettleError::AccountNotFound(id))
    }

    async fn write_balance(&self, account: &Account, balance: Decimal) -> Result<()> {
        if !self
            .accounts
            .update(account.id, balance, &account.currency)
            .await?
        {
            return Err(SettleError::AccountNotFound(account.id));
        }
        debug!(account = %account.id, from = %account.balance, to = %balance, "Balance written");
        Ok(())
    }

    async fn write_status(&self, transaction: &mut Transaction, status: TransactionStatus) -> Result<()> {
        let current = transaction.status;
        transaction
            .transition_to(status)
            .map_err(|_| SettleError::AlreadySettled {
                id: transaction.id,
                status: current,
            })?;

        if !self.transactions.update_status(transaction.id, status).await? {
            return Err(SettleError::TransactionNotFound(transaction.id));
        }
        Ok(())
    }
}

fn validate_amount(transaction: &Transaction) -> Result<()> {
    if transaction.amount <= Decimal::ZERO {
        return Err(SettleError::InvalidAmount(format!(
            "{} must be greater than zero",
            transaction.amount
        )));
    }
    Ok(())
}

fn balance_overflow(account: &Account, op: &str, amount: Decimal) -> SettleError {
    SettleError::InvalidAmount(format!(
        "balance {} {op} {amount} {} overflows for account {}",
        account.balance, account.currency, account.id
    ))
}

fn reset_pending(transaction: &mut Transaction) {
    transaction.status = TransactionStatus::Created;
    transaction.settled_at = None;
}
