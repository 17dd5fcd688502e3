//! FX error types.

use paysettle_common::{Currency, CurrencyPair, SettleError};
use rust_decimal::Decimal;
use thiserror::Error;

/// Errors that can occur during currency conversion.
#[derive(Debug, Error)]
pub enum FxError {
    /// Currency is not part of the rate table.
    #[error("Unsupported currency: {0}")]
    UnsupportedCurrency(Currency),

    /// Both currencies are supported but no rate links them.
    #[error("Rate not available for {0}")]
    RateNotAvailable(CurrencyPair),

    /// A configured rate is zero or negative.
    #[error("Invalid rate {rate} for {pair}")]
    InvalidRate { pair: CurrencyPair, rate: Decimal },

    /// Converted amount does not fit in a decimal.
    #[error("Converting {amount} at {pair} overflows")]
    AmountOverflow { amount: Decimal, pair: CurrencyPair },
}

/// Result type for FX operations.
pub type FxResult<T> = Result<T, FxError>;

impl From<FxError> for SettleError {
    fn from(err: FxError) -> Self {
        match err {
            FxError::InvalidRate { .. } => SettleError::Configuration(err.to_string()),
            FxError::AmountOverflow { .. } => SettleError::InvalidAmount(err.to_string()),
            _ => SettleError::InvalidCurrency(err.to_string()),
        }
    }
}
