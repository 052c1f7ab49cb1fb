//! Error types and HTTP error response handling.
//!
//! This module defines all application errors and how they are converted
//! into HTTP responses with appropriate status codes and JSON bodies.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

/// Postgres error code raised when `lock_timeout` expires while waiting on a
/// row lock.
const PG_LOCK_NOT_AVAILABLE: &str = "55P03";

/// Application-wide error type.
///
/// Business-rule failures (insufficient balance/coins, PIN mismatch, daily
/// limit) are expected outcomes: they roll back the enclosing database
/// transaction cleanly and carry enough context (e.g. the available balance)
/// for the caller to render a precise message. Everything else maps to a
/// generic retryable or internal failure.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Database operation failed (e.g., connection error, query error).
    #[error("Database error: {0}")]
    Database(sqlx::Error),

    /// A row-lock wait exceeded the configured `lock_timeout`.
    ///
    /// Returns HTTP 503; the caller may retry.
    #[error("Operation timed out waiting for a lock")]
    LockTimeout,

    /// API key is missing, invalid, or inactive.
    #[error("Invalid API key")]
    InvalidApiKey,

    /// Requested account does not exist.
    #[error("Account not found")]
    AccountNotFound,

    /// Requested user does not exist.
    #[error("User not found")]
    UserNotFound,

    /// A UPI address could not be resolved in the VPA directory.
    #[error("UPI id not found")]
    VpaNotFound,

    /// Referenced collect request does not exist.
    #[error("Collect request not found")]
    RequestNotFound,

    /// Referenced gift card product does not exist.
    #[error("Gift card product not found")]
    ProductNotFound,

    /// Gift card product exists but has been retired from the catalog.
    #[error("Product is not active")]
    InactiveProduct,

    /// A bounded unique-id retry loop (payment ref ids, gift card codes)
    /// exhausted its attempts.
    #[error("Failed to generate a unique identifier")]
    IdGeneration,

    /// The resource exists but does not belong to the caller.
    #[error("Resource does not belong to caller")]
    Forbidden,

    /// UPI PIN did not match (neither the VPA's own PIN nor the account-wide
    /// fallback).
    #[error("Invalid UPI PIN")]
    InvalidPin,

    /// The rolling daily outgoing cap would be exceeded.
    #[error("Daily transfer limit exceeded")]
    DailyLimitExceeded,

    /// Account balance is too low; carries the available balance in paise.
    #[error("Insufficient balance: {available_paise} paise available")]
    InsufficientBalance { available_paise: i64 },

    /// Reward wallet is too low; carries the available coin count.
    #[error("Insufficient coins: {available} available")]
    InsufficientCoins { available: i64 },

    /// Operation on a request that already reached a terminal state.
    #[error("{0}")]
    InvalidState(String),

    /// Request body or parameters are invalid.
    #[error("Invalid request")]
    InvalidRequest(String),
}

/// Detect lock-timeout errors so they surface as retryable instead of as a
/// generic 500.
impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        if let Some(db_err) = err.as_database_error() {
            if db_err.code().as_deref() == Some(PG_LOCK_NOT_AVAILABLE) {
                return AppError::LockTimeout;
            }
        }
        AppError::Database(err)
    }
}

/// Convert AppError into an HTTP response.
///
/// All errors return JSON in this format:
/// ```json
/// {
///   "error": {
///     "code": "error_type",
///     "message": "Human-readable error message"
///   }
/// }
/// ```
///
/// Balance/coin failures additionally carry the available amount so clients
/// can render "you have ₹x" without a second round trip.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Map each error variant to (HTTP status, error code, message)
        let (status, code, message) = match self {
            AppError::InvalidApiKey => (
                StatusCode::UNAUTHORIZED,
                "invalid_api_key",
                self.to_string(),
            ),
            AppError::InvalidPin => (StatusCode::UNAUTHORIZED, "invalid_pin", self.to_string()),
            AppError::Forbidden => (StatusCode::FORBIDDEN, "forbidden", self.to_string()),
            AppError::DailyLimitExceeded => (
                StatusCode::FORBIDDEN,
                "daily_limit_exceeded",
                self.to_string(),
            ),
            AppError::AccountNotFound => {
                (StatusCode::NOT_FOUND, "account_not_found", self.to_string())
            }
            AppError::UserNotFound => (StatusCode::NOT_FOUND, "user_not_found", self.to_string()),
            AppError::VpaNotFound => (StatusCode::NOT_FOUND, "vpa_not_found", self.to_string()),
            AppError::RequestNotFound => {
                (StatusCode::NOT_FOUND, "request_not_found", self.to_string())
            }
            AppError::ProductNotFound => {
                (StatusCode::NOT_FOUND, "product_not_found", self.to_string())
            }
            AppError::InactiveProduct => {
                (StatusCode::BAD_REQUEST, "inactive_product", self.to_string())
            }
            AppError::IdGeneration => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                "An internal error occurred".to_string(),
            ),
            AppError::InvalidState(ref msg) => (StatusCode::CONFLICT, "invalid_state", msg.clone()),
            AppError::InsufficientBalance { available_paise } => {
                let body = Json(json!({
                    "error": {
                        "code": "insufficient_balance",
                        "message": self.to_string(),
                        "available_paise": available_paise
                    }
                }));
                return (StatusCode::UNPROCESSABLE_ENTITY, body).into_response();
            }
            AppError::InsufficientCoins { available } => {
                let body = Json(json!({
                    "error": {
                        "code": "insufficient_coins",
                        "message": self.to_string(),
                        "available": available
                    }
                }));
                return (StatusCode::UNPROCESSABLE_ENTITY, body).into_response();
            }
            AppError::InvalidRequest(ref msg) => {
                (StatusCode::BAD_REQUEST, "invalid_request", msg.clone())
            }
            AppError::LockTimeout => (
                StatusCode::SERVICE_UNAVAILABLE,
                "lock_timeout",
                self.to_string(),
            ),
            AppError::Database(ref err) => {
                // Hide internals from the client but keep them in the logs.
                tracing::error!("database error: {err}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".to_string(),
                )
            }
        };

        // Build JSON response body
        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        // Return the response with status code and JSON body
        (status, body).into_response()
    }
}
