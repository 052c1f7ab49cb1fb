//! Payment record models and UPI payment request/response types.
//!
//! A `Payment` tracks one payment attempt through its lifecycle:
//! created `Pending`, then driven exactly once to `Success` or `Failed`.
//! The unique `ref_id` is the caller-facing handle for tracing and duplicate
//! detection.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Payment instrument used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "payment_method", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMethod {
    Upi,
    Card,
}

/// Lifecycle state of a payment.
///
/// `Pending` is the only non-terminal state; a payment transitions out of it
/// exactly once and never back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "payment_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    Pending,
    Success,
    Failed,
}

/// Represents a payment record from the database.
#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct Payment {
    /// Unique identifier for this payment
    pub id: Uuid,

    /// Paying user
    pub user_id: Uuid,

    /// Debited account
    pub account_id: Uuid,

    /// Spend category code, e.g. `FOOD`
    pub category: String,

    /// Payment instrument
    pub method: PaymentMethod,

    /// Amount in paise
    pub amount_paise: i64,

    /// Lifecycle state
    pub status: PaymentStatus,

    /// Unique caller-facing reference id
    pub ref_id: String,

    /// Free-form metadata (recipient VPA, note, category)
    pub meta: Option<serde_json::Value>,

    /// When the payment was created
    pub created_at: DateTime<Utc>,
}

/// Known spend category codes with display labels.
///
/// A static lookup table; category is presentation data, not behavior.
pub const CATEGORIES: &[(&str, &str)] = &[
    ("FOOD", "Food & Dining"),
    ("SHOPPING", "Shopping"),
    ("BILLS", "Bills & Utilities"),
    ("ENTERTAINMENT", "Entertainment"),
    ("TRAVEL", "Travel"),
    ("GROCERY", "Grocery"),
    ("OTHER", "Other"),
];

/// Whether `code` is a known spend category.
pub fn is_valid_category(code: &str) -> bool {
    CATEGORIES.iter().any(|(c, _)| *c == code)
}

/// Request to make a UPI payment from an account to a recipient VPA.
///
/// # JSON Example
///
/// ```json
/// {
///   "account_id": "550e8400-e29b-41d4-a716-446655440000",
///   "vpa": "shop@okbank",
///   "amount_paise": 34900,
///   "category": "FOOD",
///   "note": "Lunch"
/// }
/// ```
#[derive(Debug, Deserialize)]
pub struct UpiPaymentRequest {
    /// Account to debit; must belong to the authenticated user
    pub account_id: Uuid,

    /// Recipient virtual payment address
    pub vpa: String,

    /// Amount in paise (must be positive)
    pub amount_paise: i64,

    /// Spend category code (see [`CATEGORIES`])
    pub category: String,

    pub note: Option<String>,
}

/// Response returned for a successful UPI payment.
#[derive(Debug, Serialize)]
pub struct UpiPaymentResponse {
    /// Payment record id
    pub id: Uuid,

    /// Terminal status (always `SUCCESS` on the happy path)
    pub status: PaymentStatus,

    /// Caller-facing reference id, e.g. `UPI20250810-142501-7KQ2MX`
    pub ref_id: String,

    /// Account balance in paise after the debit
    pub balance_after_paise: i64,

    /// Reward coins accrued by this payment
    pub coins_earned: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_categories_validate() {
        assert!(is_valid_category("FOOD"));
        assert!(is_valid_category("OTHER"));
    }

    #[test]
    fn unknown_and_lowercase_categories_are_rejected() {
        assert!(!is_valid_category("food"));
        assert!(!is_valid_category("CRYPTO"));
        assert!(!is_valid_category(""));
    }
}
