//! Identifier types for PaySettle entities.
//!
//! Identifiers are supplied by callers, never generated here. They are
//! limited to [`MAX_IDENTIFIER`] so every store can hold them in a signed
//! 64-bit column.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;
use thiserror::Error;

/// Largest accepted identifier.
pub const MAX_IDENTIFIER: u64 = i64::MAX as u64;

/// Identifier that cannot be accepted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdentifierError {
    #[error("Invalid identifier: {0}")]
    Parse(#[from] ParseIntError),

    #[error("Identifier {0} exceeds the maximum of {max}", max = MAX_IDENTIFIER)]
    OutOfRange(u64),
}

fn check_range(id: u64) -> Result<u64, IdentifierError> {
    if id > MAX_IDENTIFIER {
        Err(IdentifierError::OutOfRange(id))
    } else {
        Ok(id)
    }
}

/// Caller-supplied identifier of an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u64", into = "u64")]
pub struct AccountId(u64);

impl AccountId {
    /// Create an account ID from its numeric value.
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Get the numeric value.
    pub const fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<u64> for AccountId {
    type Error = IdentifierError;

    fn try_from(id: u64) -> Result<Self, Self::Error> {
        check_range(id).map(Self)
    }
}

impl From<AccountId> for u64 {
    fn from(id: AccountId) -> Self {
        id.0
    }
}

impl FromStr for AccountId {
    type Err = IdentifierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::try_from(s.parse::<u64>()?)
    }
}

/// Caller-supplied identifier of a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u64", into = "u64")]
pub struct TransactionId(u64);

impl TransactionId {
    /// Create a transaction ID from its numeric value.
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Get the numeric value.
    pub const fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<u64> for TransactionId {
    type Error = IdentifierError;

    fn try_from(id: u64) -> Result<Self, Self::Error> {
        check_range(id).map(Self)
    }
}

impl From<TransactionId> for u64 {
    fn from(id: TransactionId) -> Self {
        id.0
    }
}

impl FromStr for TransactionId {
    type Err = IdentifierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::try_from(s.parse::<u64>()?)
    }
}
