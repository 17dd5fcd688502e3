//! HTTP API.

pub mod error;
pub mod extract;
pub mod handlers;
pub mod models;
pub mod routes;

pub use error::ApiError;
pub use routes::create_router;
