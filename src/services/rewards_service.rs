//! Reward wallet and ledger - coin accrual, daily bonus, balance queries.
//!
//! Coins live in one wallet row per user; every movement also appends a row
//! to the append-only reward ledger. Invariant maintained here: a user's
//! wallet balance equals the sum of their ledger deltas at every commit.
//!
//! # Lock ordering
//!
//! Wallet row first, then the (user, day) summary row. Both this module and
//! the redemption engine follow that order, so two contended accruals cannot
//! deadlock.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
    db::{DbPool, DbTx},
    error::AppError,
    models::reward::{RewardDailySummary, RewardEntryKind},
};

/// Payments on one calendar day needed to trigger the bonus.
pub const DAILY_BONUS_THRESHOLD: i32 = 5;

/// Flat bonus credited once per day when the threshold is reached.
pub const DAILY_BONUS_COINS: i64 = 20;

/// Coins accrued by a qualifying payment: 1 coin per ₹100 spent, rounded
/// down, floor of 1.
pub fn coins_earned(amount_paise: i64) -> i64 {
    (amount_paise / 10_000).max(1)
}

/// Upsert the caller's wallet row and take its exclusive lock, returning the
/// current coin balance.
///
/// Wallets are created lazily; the `ON CONFLICT DO NOTHING` insert makes the
/// first earn and a concurrent one converge on the same row before locking.
pub(crate) async fn lock_wallet(tx: &mut DbTx, user_id: Uuid) -> Result<i64, AppError> {
    sqlx::query("INSERT INTO reward_wallets (user_id, coins) VALUES ($1, 0) ON CONFLICT (user_id) DO NOTHING")
        .bind(user_id)
        .execute(&mut **tx)
        .await?;

    let coins: i64 =
        sqlx::query_scalar("SELECT coins FROM reward_wallets WHERE user_id = $1 FOR UPDATE")
            .bind(user_id)
            .fetch_one(&mut **tx)
            .await?;

    Ok(coins)
}

/// Write a locked wallet's new balance.
pub(crate) async fn update_wallet(
    tx: &mut DbTx,
    user_id: Uuid,
    new_coins: i64,
    now: DateTime<Utc>,
) -> Result<(), AppError> {
    sqlx::query("UPDATE reward_wallets SET coins = $1, updated_at = $2 WHERE user_id = $3")
        .bind(new_coins)
        .bind(now)
        .bind(user_id)
        .execute(&mut **tx)
        .await?;

    Ok(())
}

/// Append one row to the reward ledger.
pub(crate) async fn record_ledger_entry(
    tx: &mut DbTx,
    user_id: Uuid,
    payment_id: Option<Uuid>,
    entry: RewardEntryKind,
    coins: i64,
    note: &str,
    now: DateTime<Utc>,
) -> Result<(), AppError> {
    sqlx::query(
        r#"
        INSERT INTO reward_ledger (user_id, payment_id, entry, coins, note, created_at)
        VALUES ($1, $2, $3, $4, $5, $6)
        "#,
    )
    .bind(user_id)
    .bind(payment_id)
    .bind(entry)
    .bind(coins)
    .bind(note)
    .bind(now)
    .execute(&mut **tx)
    .await?;

    Ok(())
}

/// Credit earned coins and evaluate the daily bonus, all inside the caller's
/// open transaction.
///
/// # Process
///
/// 1. Lock the wallet (created lazily), credit `coins`, append an EARN row
/// 2. Lock the (user, day) summary row, increment its payment counter
/// 3. If the counter reached the threshold and no bonus was given today:
///    credit the flat bonus, append a BONUS row, mark the day
///
/// The summary row is keyed by calendar day of `now`, which the caller pins,
/// so the "today" window cannot drift between the steps.
pub async fn record_earn_and_daily_bonus(
    tx: &mut DbTx,
    user_id: Uuid,
    payment_id: Option<Uuid>,
    coins: i64,
    now: DateTime<Utc>,
) -> Result<(), AppError> {
    // Wallet first (lock order), then summary.
    let wallet_coins = lock_wallet(tx, user_id).await?;
    let coins_after_earn = wallet_coins + coins;
    update_wallet(tx, user_id, coins_after_earn, now).await?;

    record_ledger_entry(
        tx,
        user_id,
        payment_id,
        RewardEntryKind::Earn,
        coins,
        "Payment reward",
        now,
    )
    .await?;

    let day = now.date_naive();
    sqlx::query(
        "INSERT INTO reward_daily_summaries (user_id, day) VALUES ($1, $2) ON CONFLICT (user_id, day) DO NOTHING",
    )
    .bind(user_id)
    .bind(day)
    .execute(&mut **tx)
    .await?;

    let summary = sqlx::query_as::<_, RewardDailySummary>(
        "SELECT * FROM reward_daily_summaries WHERE user_id = $1 AND day = $2 FOR UPDATE",
    )
    .bind(user_id)
    .bind(day)
    .fetch_one(&mut **tx)
    .await?;

    let tx_count = summary.tx_count + 1;
    let mut bonus_given = summary.bonus_given;

    if !bonus_given && tx_count >= DAILY_BONUS_THRESHOLD {
        update_wallet(tx, user_id, coins_after_earn + DAILY_BONUS_COINS, now).await?;

        record_ledger_entry(
            tx,
            user_id,
            None,
            RewardEntryKind::Bonus,
            DAILY_BONUS_COINS,
            "Daily 5 payments bonus",
            now,
        )
        .await?;

        bonus_given = true;
        tracing::info!(%user_id, %day, "daily bonus credited");
    }

    sqlx::query("UPDATE reward_daily_summaries SET tx_count = $1, bonus_given = $2 WHERE id = $3")
        .bind(tx_count)
        .bind(bonus_given)
        .bind(summary.id)
        .execute(&mut **tx)
        .await?;

    Ok(())
}

/// Current coin balance for a user; 0 when no wallet exists yet.
pub async fn wallet_coins(pool: &DbPool, user_id: Uuid) -> Result<i64, AppError> {
    let coins: Option<i64> =
        sqlx::query_scalar("SELECT coins FROM reward_wallets WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(pool)
            .await?;

    Ok(coins.unwrap_or(0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accrual_is_one_coin_per_hundred_rupees_rounded_down() {
        assert_eq!(coins_earned(34_900), 3); // ₹349
        assert_eq!(coins_earned(100_000), 10); // ₹1000
        assert_eq!(coins_earned(19_999), 1); // ₹199.99
    }

    #[test]
    fn small_payments_still_earn_one_coin() {
        assert_eq!(coins_earned(1), 1);
        assert_eq!(coins_earned(9_999), 1); // ₹99.99
    }
}
