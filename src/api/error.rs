//! HTTP error responses
//!
//! Every failure leaves the API as `{"error": "<message>"}`. The status
//! code follows the kind of failure: missing resources are 404, failures of
//! the process itself are 500, everything else is the caller's fault (400).

use crate::types::LedgerError;
use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::fmt;

/// Error returned by every handler
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    /// 400 Bad Request
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    /// 404 Not Found
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    /// 500 Internal Server Error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.status.as_u16(), self.message)
    }
}

impl std::error::Error for ApiError {}

impl From<LedgerError> for ApiError {
    fn from(error: LedgerError) -> Self {
        if error.is_not_found() {
            Self::not_found(error.to_string())
        } else if error.is_internal() {
            Self::internal(format!("An unexpected error occurred: {error}"))
        } else {
            Self::bad_request(error.to_string())
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::bad_request(format!("Invalid request body: {}", rejection.body_text()))
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::bad_request(format!("Invalid query string: {}", rejection.body_text()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!(status = %self.status, message = %self.message, "request failed");
        } else {
            tracing::debug!(status = %self.status, message = %self.message, "request rejected");
        }
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::not_found(LedgerError::user_not_found("jane"), StatusCode::NOT_FOUND, "User not found")]
    #[case::no_accounts(
        LedgerError::NoAccounts { username: "jane".to_string() },
        StatusCode::NOT_FOUND,
        "Account not found"
    )]
    #[case::validation(
        LedgerError::InvalidAmount,
        StatusCode::BAD_REQUEST,
        "Transaction amount must be positive."
    )]
    #[case::duplicate(
        LedgerError::UsernameTaken { username: "jane".to_string() },
        StatusCode::BAD_REQUEST,
        "Username already exists"
    )]
    #[case::io(
        LedgerError::Io { message: "disk full".to_string() },
        StatusCode::INTERNAL_SERVER_ERROR,
        "An unexpected error occurred: I/O error: disk full"
    )]
    fn test_ledger_error_mapping(
        #[case] error: LedgerError,
        #[case] status: StatusCode,
        #[case] message: &str,
    ) {
        let api_error = ApiError::from(error);
        assert_eq!(api_error.status(), status);
        assert_eq!(api_error.message(), message);
    }

    #[test]
    fn test_error_display() {
        let error = ApiError::bad_request("Insufficient funds");
        assert_eq!(error.to_string(), "[400] Insufficient funds");
    }

    #[test]
    fn test_into_response_status() {
        let response = ApiError::not_found("Account not found").into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
