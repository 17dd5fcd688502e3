//! Static FX rate table.

use std::collections::{BTreeSet, HashMap};

use paysettle_common::{Currency, CurrencyPair};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{FxError, FxResult};

/// One directed rate: `1 from = rate to`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateEntry {
    pub from: Currency,
    pub to: Currency,
    pub rate: Decimal,
}

impl RateEntry {
    pub fn new(from: Currency, to: Currency, rate: Decimal) -> Self {
        Self { from, to, rate }
    }
}

/// Immutable table of directed conversion rates.
///
/// Same-currency conversions never consult the table and always return
/// the amount unchanged. Rates are not inverted automatically: every
/// ordered pair has to be listed.
#[derive(Debug, Clone)]
pub struct RateTable {
    currencies: BTreeSet<Currency>,
    rates: HashMap<CurrencyPair, Decimal>,
}

impl RateTable {
    /// Build a table from explicit entries.
    pub fn from_entries(entries: impl IntoIterator<Item = RateEntry>) -> FxResult<Self> {
        let mut currencies = BTreeSet::new();
        let mut rates = HashMap::new();

        for entry in entries {
            let pair = CurrencyPair::new(entry.from, entry.to);
            if entry.rate <= Decimal::ZERO {
                return Err(FxError::InvalidRate {
                    pair,
                    rate: entry.rate,
                });
            }
            currencies.insert(pair.base.clone());
            currencies.insert(pair.quote.clone());
            if !pair.is_identity() {
                rates.insert(pair, entry.rate);
            }
        }

        Ok(Self { currencies, rates })
    }

    /// The USD/EUR/RUB table used unless configuration overrides it.
    pub fn standard() -> Self {
        let (usd, eur, rub) = (Currency::usd(), Currency::eur(), Currency::rub());
        let entries = [
            RateEntry::new(usd.clone(), eur.clone(), dec!(0.9)),
            RateEntry::new(usd.clone(), rub.clone(), dec!(70)),
            RateEntry::new(eur.clone(), usd.clone(), dec!(1.1)),
            RateEntry::new(eur.clone(), rub.clone(), dec!(80)),
            RateEntry::new(rub.clone(), usd, dec!(0.014)),
            RateEntry::new(rub, eur, dec!(0.013)),
        ];

        let mut currencies = BTreeSet::new();
        let mut rates = HashMap::new();
        for entry in entries {
            currencies.insert(entry.from.clone());
            currencies.insert(entry.to.clone());
            rates.insert(CurrencyPair::new(entry.from, entry.to), entry.rate);
        }

        Self { currencies, rates }
    }

    /// Check if a currency can take part in conversions.
    pub fn is_supported(&self, currency: &Currency) -> bool {
        self.currencies.contains(currency)
    }

    /// Ensure a currency is supported.
    pub fn ensure_supported(&self, currency: &Currency) -> FxResult<()> {
        if self.is_supported(currency) {
            Ok(())
        } else {
            Err(FxError::UnsupportedCurrency(currency.clone()))
        }
    }

    /// Get the rate converting `from` into `to`.
    pub fn rate(&self, from: &Currency, to: &Currency) -> FxResult<Decimal> {
        self.ensure_supported(from)?;
        self.ensure_supported(to)?;

        if from == to {
            return Ok(Decimal::ONE);
        }

        let pair = CurrencyPair::new(from.clone(), to.clone());
        self.rates
            .get(&pair)
            .copied()
            .ok_or(FxError::RateNotAvailable(pair))
    }

    /// Convert `amount` from one currency into another.
    ///
    /// Fails with [`FxError::AmountOverflow`] when the product does not fit
    /// in a [`Decimal`].
    pub fn convert(&self, amount: Decimal, from: &Currency, to: &Currency) -> FxResult<Decimal> {
        let rate = self.rate(from, to)?;
        if from == to {
            return Ok(amount);
        }

        let converted = amount
            .checked_mul(rate)
            .ok_or_else(|| FxError::AmountOverflow {
                amount,
                pair: CurrencyPair::new(from.clone(), to.clone()),
            })?;
        debug!(%from, %to, %amount, %rate, %converted, "Converted amount");
        Ok(converted)
    }
}

impl Default for RateTable {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn supported() -> Vec<Currency> {
        vec![Currency::usd(), Currency::eur(), Currency::rub()]
    }

    #[test]
    fn test_standard_rates() {
        let table = RateTable::standard();

        assert_eq!(
            table.convert(dec!(100), &Currency::usd(), &Currency::eur()).unwrap(),
            dec!(90)
        );
        assert_eq!(
            table.convert(dec!(100), &Currency::usd(), &Currency::rub()).unwrap(),
            dec!(7000)
        );
        assert_eq!(
            table.convert(dec!(100), &Currency::eur(), &Currency::usd()).unwrap(),
            dec!(110)
        );
        assert_eq!(
            table.convert(dec!(100), &Currency::eur(), &Currency::rub()).unwrap(),
            dec!(8000)
        );
        assert_eq!(
            table.convert(dec!(1000), &Currency::rub(), &Currency::usd()).unwrap(),
            dec!(14)
        );
        assert_eq!(
            table.convert(dec!(1000), &Currency::rub(), &Currency::eur()).unwrap(),
            dec!(13)
        );
    }

    #[test]
    fn test_every_pair_defined() {
        let table = RateTable::standard();
        for from in supported() {
            for to in supported() {
                assert!(table.rate(&from, &to).is_ok(), "missing {from}/{to}");
            }
        }
    }

    #[test]
    fn test_unsupported_currency() {
        let table = RateTable::standard();

        let result = table.convert(dec!(100), &Currency::new("RUR"), &Currency::usd());
        assert!(matches!(result, Err(FxError::UnsupportedCurrency(c)) if c.code() == "RUR"));

        let result = table.convert(dec!(100), &Currency::usd(), &Currency::new("GBP"));
        assert!(matches!(result, Err(FxError::UnsupportedCurrency(_))));

        // Identity does not bypass the supported set.
        let result = table.convert(dec!(1), &Currency::new("GBP"), &Currency::new("GBP"));
        assert!(result.is_err());
    }

    #[test]
    fn test_missing_pair() {
        let table = RateTable::from_entries([RateEntry::new(
            Currency::usd(),
            Currency::eur(),
            dec!(0.9),
        )])
        .unwrap();

        assert!(table.is_supported(&Currency::eur()));
        let result = table.convert(dec!(10), &Currency::eur(), &Currency::usd());
        assert!(matches!(result, Err(FxError::RateNotAvailable(_))));
    }

    #[test]
    fn test_rejects_non_positive_rate() {
        let result = RateTable::from_entries([RateEntry::new(
            Currency::usd(),
            Currency::eur(),
            Decimal::ZERO,
        )]);
        assert!(matches!(result, Err(FxError::InvalidRate { .. })));
    }

    #[test]
    fn test_conversion_overflow() {
        let table = RateTable::standard();

        let result = table.convert(Decimal::MAX, &Currency::usd(), &Currency::rub());
        assert!(matches!(
            result,
            Err(FxError::AmountOverflow { amount, ref pair }) if amount == Decimal::MAX && pair.to_string() == "USD/RUB"
        ));

        // A rate below one shrinks the amount and cannot overflow.
        assert!(table.convert(Decimal::MAX, &Currency::usd(), &Currency::eur()).is_ok());
        assert_eq!(
            table.convert(Decimal::MAX, &Currency::rub(), &Currency::rub()).unwrap(),
            Decimal::MAX
        );
    }

    fn amount_strategy() -> impl Strategy<Value = Decimal> {
        (0i64..1_000_000_000, 0u32..6).prop_map(|(mantissa, scale)| Decimal::new(mantissa, scale))
    }

    #[test]
    fn same_currency_is_identity() {
        let table = RateTable::standard();
        proptest!(|(amount in amount_strategy(), idx in 0usize..3)| {
            let currency = &supported()[idx];
            let converted = table.convert(amount, currency, currency).unwrap();
            prop_assert_eq!(converted, amount);
        });
    }

    #[test]
    fn conversion_is_deterministic() {
        let table = RateTable::standard();
        proptest!(|(amount in amount_strategy(), from in 0usize..3, to in 0usize..3)| {
            let currencies = supported();
            let first = table.convert(amount, &currencies[from], &currencies[to]).unwrap();
            let second = table.convert(amount, &currencies[from], &currencies[to]).unwrap();
            prop_assert_eq!(first, second);
            prop_assert!(first >= Decimal::ZERO);
        });
    }
}
