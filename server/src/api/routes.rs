//! API routes.

use std::time::Duration;

use axum::routing::{get, post};
use axum::Router;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use super::handlers::*;
use crate::state::AppState;

/// Create the application router.
pub fn create_router(state: AppState, request_timeout: Duration) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/metrics", get(metrics))
        .route("/accounts/register", post(register_account))
        .route(
            "/accounts/:id",
            get(get_account).patch(update_account).delete(delete_account),
        )
        .route("/accounts/:id/frozen-balance", get(frozen_balance))
        .route("/transactions/deposit", post(create_deposit))
        .route("/transactions/withdraw", post(create_withdraw))
        .route(
            "/transactions/:id",
            get(get_transaction).delete(delete_transaction),
        )
        .route("/transactions/:id/settle", post(settle_transaction))
        .layer(TimeoutLayer::new(request_timeout))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
