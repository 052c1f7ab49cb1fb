//! Gift card catalog and redemption models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle state of an issued gift card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "gift_card_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GiftCardStatus {
    Issued,
    Revoked,
}

/// A redeemable catalog entry.
#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct GiftCardProduct {
    pub id: Uuid,

    pub brand: String,

    /// Face value of the card
    pub value_rupees: i32,

    /// Price in reward coins
    pub cost_coins: i64,

    /// Inactive products stay in the table for old redemptions but cannot be
    /// redeemed anymore
    pub active: bool,
}

/// An issued gift card.
#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct GiftCardRedemption {
    pub id: Uuid,

    pub user_id: Uuid,

    pub product_id: Uuid,

    /// Globally unique code, e.g. `FL-2025-9K2QWE7T`
    pub code: String,

    pub status: GiftCardStatus,

    pub created_at: DateTime<Utc>,
}

/// Request to redeem coins for a gift card.
#[derive(Debug, Deserialize)]
pub struct RedeemRequest {
    pub product_id: Uuid,
}

/// Response returned for a successful redemption.
#[derive(Debug, Serialize)]
pub struct RedemptionResponse {
    pub id: Uuid,
    pub code: String,
    pub status: GiftCardStatus,
    pub created_at: DateTime<Utc>,
}

impl From<GiftCardRedemption> for RedemptionResponse {
    fn from(r: GiftCardRedemption) -> Self {
        Self {
            id: r.id,
            code: r.code,
            status: r.status,
            created_at: r.created_at,
        }
    }
}
