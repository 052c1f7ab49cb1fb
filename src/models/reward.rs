//! Reward wallet, ledger, and daily summary models.
//!
//! The wallet holds one integer coin balance per user; the ledger is the
//! append-only record of every coin movement. Invariant: a user's wallet
//! balance always equals the sum of their ledger deltas. The daily summary
//! counts qualifying payments per calendar day and gates the one-time bonus.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Kind of reward ledger entry.
///
/// `Earn` and `Bonus` carry positive deltas, `Redeem` negative ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "reward_entry_kind", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RewardEntryKind {
    Earn,
    Bonus,
    Redeem,
}

/// One wallet row per user, created lazily on first earn.
#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct RewardWallet {
    pub user_id: Uuid,

    /// Coin balance; never negative
    pub coins: i64,

    pub updated_at: DateTime<Utc>,
}

/// Append-only record of one coin movement.
#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct RewardLedgerEntry {
    pub id: Uuid,

    pub user_id: Uuid,

    /// Originating payment for EARN entries; weak reference, never cascades
    pub payment_id: Option<Uuid>,

    pub entry: RewardEntryKind,

    /// Signed coin delta
    pub coins: i64,

    pub note: Option<String>,

    pub created_at: DateTime<Utc>,
}

/// Per-user-per-day payment counter gating the once-a-day bonus.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct RewardDailySummary {
    pub id: Uuid,

    pub user_id: Uuid,

    pub day: NaiveDate,

    /// Qualifying payments counted so far today
    pub tx_count: i32,

    /// Set the moment the daily bonus is credited; never cleared that day
    pub bonus_given: bool,
}

/// Response body for the wallet balance endpoint.
#[derive(Debug, Serialize)]
pub struct WalletResponse {
    pub coins: i64,
}
