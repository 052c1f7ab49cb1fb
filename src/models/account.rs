//! Account data models and API request/response types.
//!
//! This module defines:
//! - `Account`: Database entity representing a bank account
//! - `CreateAccountRequest`: Request body for opening accounts
//! - `AccountResponse`: Response body returned to clients
//!
//! # Balance Storage
//!
//! Balances are stored as `i64` paise (100 paise = ₹1) to avoid
//! floating-point precision issues. ₹10.50 is stored as 1050 paise.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Represents an account record from the database.
///
/// Only the last four digits of the linked card are persisted. The full PAN
/// is never stored; masking happens at account-creation time.
#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct Account {
    /// Unique identifier for this account
    pub id: Uuid,

    /// Owning user
    pub user_id: Uuid,

    /// Last four digits of the linked card (display only)
    pub card_last4: String,

    /// Current balance in paise
    ///
    /// Must be >= 0 (enforced by database CHECK constraint and validated by
    /// the application before every debit).
    pub balance_paise: i64,

    /// Timestamp when account was created
    pub created_at: DateTime<Utc>,

    /// Timestamp of last balance update
    pub updated_at: DateTime<Utc>,
}

/// Request body for opening a new account.
///
/// # JSON Example
///
/// ```json
/// {
///   "card_number": "4111111111111234",
///   "initial_balance_paise": 100000
/// }
/// ```
#[derive(Debug, Deserialize)]
pub struct CreateAccountRequest {
    /// Card number; only its last four digits are kept
    pub card_number: String,

    /// Opening balance in paise (defaults to 0 if not provided)
    #[serde(default)]
    pub initial_balance_paise: i64,
}

/// Response body for account endpoints.
#[derive(Debug, Serialize)]
pub struct AccountResponse {
    /// Account unique identifier
    pub id: Uuid,

    /// Masked card reference, e.g. `****-****-****-1234`
    pub card: String,

    /// Current balance in paise
    pub balance_paise: i64,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

/// Convert database Account to API AccountResponse.
///
/// This removes the internal `user_id` field and renders the masked card.
impl From<Account> for AccountResponse {
    fn from(account: Account) -> Self {
        Self {
            id: account.id,
            card: format!("****-****-****-{}", account.card_last4),
            balance_paise: account.balance_paise,
            created_at: account.created_at,
            updated_at: account.updated_at,
        }
    }
}
