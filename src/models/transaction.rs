//! Transaction ledger models and API request/response types.
//!
//! Every balance-affecting event produces exactly one row in the
//! `transactions` table, inside the same database transaction as the balance
//! update itself. Rows are append-only: no code path updates or deletes them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Kind of ledger event.
///
/// Maps to the Postgres `transaction_kind` enum. `TransferOut` and `Payment`
/// together form the "outgoing" set the daily transfer cap sums over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "transaction_kind", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionKind {
    Deposit,
    Withdraw,
    TransferIn,
    TransferOut,
    Payment,
    Fee,
    Interest,
    Refund,
}

/// Represents a transaction record from the database.
///
/// `balance_after_paise` snapshots the owning account's balance immediately
/// after the event, so histories can be rendered without replaying the
/// ledger.
#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct Transaction {
    /// Unique identifier for this transaction
    pub id: Uuid,

    /// Owning account
    pub account_id: Uuid,

    /// Kind of ledger event
    pub kind: TransactionKind,

    /// Amount moved in paise (always positive; the kind carries direction)
    pub amount_paise: i64,

    /// Account balance in paise right after this event
    pub balance_after_paise: i64,

    /// Free-text note
    pub note: Option<String>,

    /// When the event happened
    pub created_at: DateTime<Utc>,
}

/// Request to deposit money into an account.
///
/// # JSON Example
///
/// ```json
/// {
///   "account_id": "550e8400-e29b-41d4-a716-446655440000",
///   "amount_paise": 100000,
///   "note": "Salary"
/// }
/// ```
#[derive(Debug, Deserialize)]
pub struct DepositRequest {
    pub account_id: Uuid,

    /// Amount to add in paise (must be positive)
    pub amount_paise: i64,

    pub note: Option<String>,
}

/// Request to withdraw money from an account.
///
/// # Validation
///
/// - Account must have sufficient balance
/// - Amount must be positive
/// - Account must belong to the authenticated user
#[derive(Debug, Deserialize)]
pub struct WithdrawRequest {
    pub account_id: Uuid,

    /// Amount to remove in paise (must be positive)
    pub amount_paise: i64,

    pub note: Option<String>,
}

/// Response returned for deposit/withdraw operations.
///
/// # JSON Example
///
/// ```json
/// {
///   "transaction_id": "770e8400-e29b-41d4-a716-446655440002",
///   "balance_paise": 651000
/// }
/// ```
#[derive(Debug, Serialize)]
pub struct TransactionReceipt {
    /// Ledger row created for this operation
    pub transaction_id: Uuid,

    /// Account balance in paise after the operation
    pub balance_paise: i64,
}
