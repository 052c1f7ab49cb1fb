//! UPI virtual payment address and collect request models.
//!
//! A VPA (virtual payment address) is a human-readable alias such as
//! `ravi@mybank` routing to exactly one account. A collect request is a
//! deferred transfer: the payee asks, the payer approves or rejects.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Represents a VPA record from the database.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UpiVpa {
    /// Unique identifier for this VPA
    pub id: Uuid,

    /// The address itself, e.g. `ravi@mybank` (unique)
    pub vpa: String,

    /// Owning user
    pub user_id: Uuid,

    /// Linked account money moves in and out of
    pub account_id: Uuid,

    /// At most one VPA per user carries this flag (partial unique index)
    pub is_default: bool,

    /// Per-address PIN hash; `None` falls back to the user's account-wide PIN
    pub pin_hash: Option<String>,

    /// When the address was created
    pub created_at: DateTime<Utc>,
}

/// Lifecycle state of a collect request.
///
/// `Pending` is the only non-terminal state; `Approved` and `Rejected` are
/// final.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "upi_request_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UpiRequestStatus {
    Pending,
    Approved,
    Rejected,
}

/// Represents a collect request record from the database.
#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct UpiRequest {
    /// Unique identifier for this request
    pub id: Uuid,

    /// Address expected to pay
    pub payer_vpa: String,

    /// Address asking for the money
    pub payee_vpa: String,

    /// Requested amount in paise
    pub amount_paise: i64,

    /// Lifecycle state
    pub status: UpiRequestStatus,

    /// When the request was created
    pub created_at: DateTime<Utc>,
}

/// Validate the shape of a virtual payment address.
///
/// Accepted form: at least three characters of `[a-zA-Z0-9._-]`, an `@`,
/// then at least two ASCII letters. `ravi.k@mybank` passes; `a@b` does not.
pub fn is_valid_vpa(vpa: &str) -> bool {
    let Some((handle, provider)) = vpa.split_once('@') else {
        return false;
    };

    handle.len() >= 3
        && handle
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_'))
        && provider.len() >= 2
        && provider.chars().all(|c| c.is_ascii_alphabetic())
}

/// Request to register a new VPA.
///
/// # JSON Example
///
/// ```json
/// {
///   "vpa": "ravi@mybank",
///   "account_id": "550e8400-e29b-41d4-a716-446655440000",
///   "pin": "4321"
/// }
/// ```
#[derive(Debug, Deserialize)]
pub struct CreateVpaRequest {
    /// Desired address; must be unused and well-formed
    pub vpa: String,

    /// Account the address routes to; must belong to the caller
    pub account_id: Uuid,

    /// Optional per-address PIN (min 4 characters)
    pub pin: Option<String>,
}

/// Response body for VPA endpoints.
#[derive(Debug, Serialize)]
pub struct VpaResponse {
    pub id: Uuid,
    pub vpa: String,
    pub account_id: Uuid,
    pub is_default: bool,
    pub created_at: DateTime<Utc>,
}

/// Convert database UpiVpa to API VpaResponse (drops the PIN hash).
impl From<UpiVpa> for VpaResponse {
    fn from(v: UpiVpa) -> Self {
        Self {
            id: v.id,
            vpa: v.vpa,
            account_id: v.account_id,
            is_default: v.is_default,
            created_at: v.created_at,
        }
    }
}

/// Request to move money between two VPAs.
#[derive(Debug, Deserialize)]
pub struct TransferRequest {
    pub from_vpa: String,
    pub to_vpa: String,

    /// Amount in paise (must be positive)
    pub amount_paise: i64,

    pub note: Option<String>,

    /// UPI PIN of the sending address (or the sender's account-wide PIN)
    pub pin: String,
}

/// Response returned for a completed transfer.
#[derive(Debug, Serialize)]
pub struct TransferResponse {
    /// The TRANSFER_OUT ledger row on the sender's account
    pub transaction_id: Uuid,
}

/// Request to create a collect request.
#[derive(Debug, Deserialize)]
pub struct CreateCollectRequest {
    pub payer_vpa: String,
    pub payee_vpa: String,

    /// Amount in paise (must be positive)
    pub amount_paise: i64,
}

/// Request to approve a pending collect request.
#[derive(Debug, Deserialize)]
pub struct ApproveRequest {
    /// UPI PIN of the payer address
    pub pin: String,
}

/// Request to set the caller's account-wide UPI PIN.
#[derive(Debug, Deserialize)]
pub struct SetPinRequest {
    /// New PIN (min 4 characters)
    pub pin: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn well_formed_vpas_validate() {
        assert!(is_valid_vpa("ravi@mybank"));
        assert!(is_valid_vpa("ravi.k-99_x@ok"));
        assert!(is_valid_vpa("abc@xy"));
    }

    #[test]
    fn malformed_vpas_are_rejected() {
        assert!(!is_valid_vpa("ab@mybank")); // handle too short
        assert!(!is_valid_vpa("ravi@m")); // provider too short
        assert!(!is_valid_vpa("ravi@my bank")); // space in provider
        assert!(!is_valid_vpa("ravi@bank9")); // digit in provider
        assert!(!is_valid_vpa("ravimybank")); // no separator
        assert!(!is_valid_vpa("ra vi@mybank")); // space in handle
        assert!(!is_valid_vpa("")); // empty
    }

    #[test]
    fn extra_at_signs_do_not_validate() {
        assert!(!is_valid_vpa("ravi@my@bank"));
    }
}
