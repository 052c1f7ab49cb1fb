//! User model for authentication and ownership checks.
//!
//! Users authenticate with an API key whose SHA-256 hash is stored on the
//! row. The optional `upi_pin_hash` is the account-wide UPI PIN that VPAs
//! without their own PIN fall back to.

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Represents a user record from the database.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    /// Unique identifier for this user
    pub id: Uuid,

    /// Display name
    pub name: String,

    /// Unique email address
    pub email: String,

    /// SHA-256 hash of the caller's API key (64 hex characters)
    pub api_key_hash: String,

    /// Account-wide UPI PIN hash; `None` until the user sets a PIN
    pub upi_pin_hash: Option<String>,

    /// Inactive users are rejected during authentication
    pub is_active: bool,

    /// Timestamp when this user was created
    pub created_at: DateTime<Utc>,
}
