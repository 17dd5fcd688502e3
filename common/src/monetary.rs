//! Currency types for PaySettle.
//!
//! Amounts are plain [`rust_decimal::Decimal`] values; the currency travels
//! alongside them on the owning record.

use serde::{Deserialize, Serialize};
use std::fmt;

/// ISO 4217 currency code.
///
/// Any code can be represented. Whether a code is usable for settlement is
/// decided by the FX rate table, so unsupported codes survive round trips
/// through storage and are rejected where conversion happens.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String")]
pub struct Currency(String);

impl Currency {
    /// Create a new currency from code.
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into().trim().to_uppercase())
    }

    /// Get the currency code.
    pub fn code(&self) -> &str {
        &self.0
    }

    pub fn usd() -> Self {
        Self::new("USD")
    }

    pub fn eur() -> Self {
        Self::new("EUR")
    }

    pub fn rub() -> Self {
        Self::new("RUB")
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Currency {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for Currency {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

/// An ordered currency pair: amounts in `base` are converted into `quote`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CurrencyPair {
    /// Currency being converted from.
    pub base: Currency,
    /// Currency being converted into.
    pub quote: Currency,
}

impl CurrencyPair {
    /// Create a new currency pair.
    pub fn new(base: Currency, quote: Currency) -> Self {
        Self { base, quote }
    }

    /// Check whether both sides are the same currency.
    pub fn is_identity(&self) -> bool {
        self.base == self.quote
    }
}

impl fmt::Display for CurrencyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.base, self.quote)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_currency_normalizes_code() {
        assert_eq!(Currency::new(" usd "), Currency::usd());
        assert_eq!(Currency::from("Eur").code(), "EUR");
    }

    #[test]
    fn test_currency_deserialize_normalizes() {
        let currency: Currency = serde_json::from_str("\"rub\"").unwrap();
        assert_eq!(currency, Currency::rub());
        assert_eq!(serde_json::to_string(&currency).unwrap(), "\"RUB\"");
    }

    #[test]
    fn test_pair_identity_and_display() {
        let pair = CurrencyPair::new(Currency::usd(), Currency::eur());
        assert!(!pair.is_identity());
        assert!(CurrencyPair::new(Currency::rub(), Currency::rub()).is_identity());
        assert_eq!(pair.to_string(), "USD/EUR");
    }
}
