//! Error types for PaySettle operations.

use crate::{AccountId, TransactionId, TransactionStatus};
use rust_decimal::Decimal;
use thiserror::Error;

/// Main error type for PaySettle operations.
#[derive(Error, Debug)]
pub enum SettleError {
    /// Account not found.
    #[error("Account not found: {0}")]
    AccountNotFound(AccountId),

    /// Account identifier already taken.
    #[error("Account already exists: {0}")]
    AccountExists(AccountId),

    /// Transaction not found.
    #[error("Transaction not found: {0}")]
    TransactionNotFound(TransactionId),

    /// The account has no transactions at all.
    #[error("Transaction not found for account {0}")]
    NoTransactions(AccountId),

    /// Transaction identifier already taken.
    #[error("Transaction already exists: {0}")]
    TransactionExists(TransactionId),

    /// Unsupported currency code or conversion pair.
    #[error("Invalid currency: {0}")]
    InvalidCurrency(String),

    /// Withdraw exceeds the current balance.
    #[error("Negative balance: required {required}, available {available}")]
    NegativeBalance { required: Decimal, available: Decimal },

    /// Destination account field is malformed.
    #[error("Incorrect id: destination account {0}")]
    IncorrectId(i64),

    /// Identifier outside the storable range.
    #[error("Invalid id: {0} is out of range")]
    InvalidId(u64),

    /// Amount is not usable for a transaction.
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    /// Settlement requested for a transaction that is already final.
    #[error("Transaction {id} already settled with status {status}")]
    AlreadySettled {
        id: TransactionId,
        status: TransactionStatus,
    },

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),

    /// Timeout.
    #[error("Operation timed out: {0}")]
    Timeout(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Failure annotated with the operation that produced it.
    #[error("{op}: {source}")]
    Operation {
        op: &'static str,
        #[source]
        source: Box<SettleError>,
    },
}

impl SettleError {
    /// Annotate this error with an operation name.
    pub fn in_op(self, op: &'static str) -> Self {
        SettleError::Operation {
            op,
            source: Box::new(self),
        }
    }

    /// Get the underlying error, skipping operation annotations.
    pub fn root(&self) -> &SettleError {
        match self {
            SettleError::Operation { source, .. } => source.root(),
            other => other,
        }
    }

    /// Operation names from outermost to innermost.
    pub fn operations(&self) -> Vec<&'static str> {
        let mut ops = Vec::new();
        let mut current = self;
        while let SettleError::Operation { op, source } = current {
            ops.push(*op);
            current = source;
        }
        ops
    }

    /// Check if the requested entity was absent.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self.root(),
            SettleError::AccountNotFound(_)
                | SettleError::TransactionNotFound(_)
                | SettleError::NoTransactions(_)
        )
    }

    /// Check if this error is retryable.
    ///
    /// Only transport failures qualify; every domain rejection is final.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self.root(),
            SettleError::Database(_) | SettleError::Timeout(_)
        )
    }

    /// Get error code for API responses.
    pub fn error_code(&self) -> &'static str {
        match self {
            SettleError::AccountNotFound(_) => "ACCOUNT_NOT_FOUND",
            SettleError::AccountExists(_) => "ACCOUNT_EXISTS",
            SettleError::TransactionNotFound(_) => "TRANSACTION_NOT_FOUND",
            SettleError::NoTransactions(_) => "TRANSACTION_NOT_FOUND",
            SettleError::TransactionExists(_) => "TRANSACTION_EXISTS",
            SettleError::InvalidCurrency(_) => "INVALID_CURRENCY",
            SettleError::NegativeBalance { .. } => "NEGATIVE_BALANCE",
            SettleError::IncorrectId(_) => "INCORRECT_ID",
            SettleError::InvalidId(_) => "INVALID_ID",
            SettleError::InvalidAmount(_) => "INVALID_AMOUNT",
            SettleError::AlreadySettled { .. } => "ALREADY_SETTLED",
            SettleError::Database(_) => "DATABASE_ERROR",
            SettleError::Timeout(_) => "TIMEOUT",
            SettleError::Configuration(_) => "CONFIGURATION_ERROR",
            SettleError::Operation { source, .. } => source.error_code(),
        }
    }
}

/// Result type alias for PaySettle operations.
pub type Result<T> = std::result::Result<T, SettleError>;

/// Attach operation names to failures.
pub trait OperationContext<T> {
    /// Wrap any error with the given operation name.
    fn op(self, op: &'static str) -> Result<T>;
}

impl<T> OperationContext<T> for Result<T> {
    fn op(self, op: &'static str) -> Result<T> {
        self.map_err(|e| e.in_op(op))
    }
}
