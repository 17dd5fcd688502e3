//! API request and response models.

use paysettle_common::{AccountId, Currency, Transaction, TransactionId};
use paysettle_ledger::{Account, FrozenBalance, MetricsSnapshot};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Outcome marker present on every response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseStatus {
    Success,
    Error,
}

/// Successful response: the status marker plus a payload.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub status: ResponseStatus,
    #[serde(flatten)]
    pub data: T,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            status: ResponseStatus::Success,
            data,
        }
    }
}

/// Payload-less response body.
#[derive(Debug, Serialize)]
pub struct Empty {}

/// Error response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub status: ResponseStatus,
    pub error: ErrorDetail,
}

impl ErrorResponse {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            status: ResponseStatus::Error,
            error: ErrorDetail {
                code: code.into(),
                message: message.into(),
            },
        }
    }
}

/// Error details.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
}

/// Request to register an account.
#[derive(Debug, Deserialize)]
pub struct RegisterAccountRequest {
    pub id: AccountId,
    pub currency: Currency,
    #[serde(default)]
    pub balance: Decimal,
    pub password: String,
    pub email: String,
}

impl From<RegisterAccountRequest> for Account {
    fn from(req: RegisterAccountRequest) -> Self {
        Account::new(req.id, req.currency, req.balance, req.password, req.email)
    }
}

/// Administrative balance correction.
#[derive(Debug, Deserialize)]
pub struct UpdateBalanceRequest {
    pub balance: Decimal,
    pub currency: Currency,
}

/// Account as returned by the API. Carries no credential.
#[derive(Debug, Serialize)]
pub struct AccountResponse {
    pub id: AccountId,
    pub currency: Currency,
    pub balance: Decimal,
    pub email: String,
}

impl From<Account> for AccountResponse {
    fn from(account: Account) -> Self {
        Self {
            id: account.id,
            currency: account.currency,
            balance: account.balance,
            email: account.email,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AccountPayload {
    pub account: AccountResponse,
}

/// Request to record a deposit.
#[derive(Debug, Deserialize)]
pub struct DepositRequest {
    pub id: TransactionId,
    pub account_id: AccountId,
    pub amount: Decimal,
    pub currency: Currency,
}

impl From<DepositRequest> for Transaction {
    fn from(req: DepositRequest) -> Self {
        Transaction::deposit(req.id, req.account_id, req.amount, req.currency)
    }
}

/// Request to record a withdraw. The destination is kept as sent so that
/// malformed values can be reported.
#[derive(Debug, Deserialize)]
pub struct WithdrawRequest {
    pub id: TransactionId,
    pub account_id: AccountId,
    pub amount: Decimal,
    pub currency: Currency,
    #[serde(default)]
    pub to_account: i64,
}

impl From<WithdrawRequest> for Transaction {
    fn from(req: WithdrawRequest) -> Self {
        Transaction {
            to_account: Some(req.to_account),
            ..Transaction::deposit(req.id, req.account_id, req.amount, req.currency)
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TransactionPayload {
    pub transaction: Transaction,
}

#[derive(Debug, Serialize)]
pub struct FrozenBalancePayload {
    pub frozen_balance: FrozenBalance,
}

#[derive(Debug, Serialize)]
pub struct HealthPayload {
    pub service: &'static str,
    pub storage: &'static str,
}

#[derive(Debug, Serialize)]
pub struct MetricsPayload {
    pub metrics: MetricsSnapshot,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_account_response_hides_password() {
        let account = Account::new(AccountId::new(1), Currency::usd(), dec!(5), "hunter2", "a@b.c");
        let json = serde_json::to_value(ApiResponse::success(AccountPayload {
            account: account.into(),
        }))
        .unwrap();

        assert_eq!(json["status"], "success");
        assert_eq!(json["account"]["id"], 1);
        assert!(json["account"].get("password").is_none());
        assert!(!json.to_string().contains("hunter2"));
    }

    #[test]
    fn test_withdraw_request_keeps_raw_destination() {
        let req: WithdrawRequest = serde_json::from_str(
            r#"{"id": 3, "account_id": 1, "amount": "2.5", "currency": "eur", "to_account": -7}"#,
        )
        .unwrap();
        let tx = Transaction::from(req);

        assert_eq!(tx.to_account, Some(-7));
        assert_eq!(tx.amount, dec!(2.5));
        assert_eq!(tx.currency, Currency::eur());
    }

    #[test]
    fn test_error_shape() {
        let json = serde_json::to_value(ErrorResponse::new("NEGATIVE_BALANCE", "too much")).unwrap();
        assert_eq!(json["status"], "error");
        assert_eq!(json["error"]["code"], "NEGATIVE_BALANCE");
    }
}
