//! PaySettle Common Types
//!
//! This crate contains shared types used across PaySettle, including
//! identifiers, currency types, the transaction state machine and the
//! error taxonomy.

pub mod identifiers;
pub mod monetary;
pub mod transaction;
pub mod error;

pub use identifiers::*;
pub use monetary::*;
pub use transaction::*;
pub use error::*;
