//! Mapping of settlement errors onto HTTP responses.

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use paysettle_common::SettleError;
use tracing::{error, warn};

use super::models::ErrorResponse;

/// Handler error.
#[derive(Debug)]
pub enum ApiError {
    /// Failure reported by a service.
    Settle(SettleError),
    /// Request refused before reaching a handler.
    Rejected {
        status: StatusCode,
        code: &'static str,
        message: String,
    },
}

impl From<SettleError> for ApiError {
    fn from(err: SettleError) -> Self {
        Self::Settle(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::Rejected {
            status: rejection.status(),
            code: "INVALID_BODY",
            message: rejection.body_text(),
        }
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self::Rejected {
            status: rejection.status(),
            code: "INVALID_PATH",
            message: rejection.body_text(),
        }
    }
}

/// HTTP status for an error kind.
pub fn status_for(err: &SettleError) -> StatusCode {
    match err.root() {
        SettleError::AccountNotFound(_)
        | SettleError::TransactionNotFound(_)
        | SettleError::NoTransactions(_) => StatusCode::NOT_FOUND,
        SettleError::AccountExists(_)
        | SettleError::TransactionExists(_)
        | SettleError::AlreadySettled { .. } => StatusCode::CONFLICT,
        SettleError::InvalidCurrency(_)
        | SettleError::IncorrectId(_)
        | SettleError::InvalidId(_)
        | SettleError::InvalidAmount(_) => StatusCode::BAD_REQUEST,
        SettleError::NegativeBalance { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        SettleError::Database(_) | SettleError::Timeout(_) => StatusCode::SERVICE_UNAVAILABLE,
        SettleError::Configuration(_) | SettleError::Operation { .. } => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            Self::Settle(err) => {
                let status = status_for(&err);
                if status.is_server_error() {
                    error!(error = %err, code = err.error_code(), "Request failed");
                } else {
                    warn!(error = %err, code = err.error_code(), "Request rejected");
                }
                (status, ErrorResponse::new(err.error_code(), err.root().to_string()))
            }
            Self::Rejected {
                status,
                code,
                message,
            } => {
                warn!(%status, code, error = %message, "Request refused");
                (status, ErrorResponse::new(code, message))
            }
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use paysettle_common::{AccountId, TransactionId};
    use rust_decimal::Decimal;

    #[test]
    fn test_status_mapping_looks_through_operations() {
        let err = SettleError::TransactionNotFound(TransactionId::new(1)).in_op("settle");
        assert_eq!(status_for(&err), StatusCode::NOT_FOUND);

        let err = SettleError::NegativeBalance {
            required: Decimal::TEN,
            available: Decimal::ONE,
        };
        assert_eq!(status_for(&err), StatusCode::UNPROCESSABLE_ENTITY);

        assert_eq!(
            status_for(&SettleError::AccountExists(AccountId::new(1))),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_for(&SettleError::Timeout("pool".into())),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            status_for(&SettleError::InvalidId(u64::MAX).in_op("get")),
            StatusCode::BAD_REQUEST
        );
    }

    #[tokio::test]
    async fn test_rejection_renders_error_envelope() {
        let err = ApiError::Rejected {
            status: StatusCode::UNPROCESSABLE_ENTITY,
            code: "INVALID_BODY",
            message: "missing field `amount`".into(),
        };

        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["status"], "error");
        assert_eq!(body["error"]["code"], "INVALID_BODY");
        assert_eq!(body["error"]["message"], "missing field `amount`");
    }
}
