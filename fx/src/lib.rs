//! PaySettle FX
//!
//! Currency conversion against a static rate table.
//!
//! # Example
//!
//! ```rust
//! use paysettle_common::Currency;
//! use paysettle_fx::RateTable;
//! use rust_decimal_macros::dec;
//!
//! let table = RateTable::standard();
//! let eur = table.convert(dec!(100), &Currency::usd(), &Currency::eur()).unwrap();
//! assert_eq!(eur, dec!(90.0));
//! ```

pub mod error;
pub mod rates;

pub use error::{FxError, FxResult};
pub use rates::{RateEntry, RateTable};
