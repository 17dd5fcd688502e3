//! PaySettle Server
//!
//! HTTP front end for account registration and transaction settlement.

pub mod api;
pub mod config;
pub mod state;
pub mod telemetry;

pub use api::create_router;
pub use config::{ConfigError, LogFormat, ServerConfig};
pub use state::{AppState, StorageBackend};
