//! Redemption engine - convert reward coins into gift cards.
//!
//! A redemption debits the wallet, appends a negative REDEEM ledger row, and
//! issues a uniquely-coded gift card, all in one database transaction.

use chrono::Utc;
use uuid::Uuid;

use crate::{
    config::Config,
    db::{DbPool, DbTx},
    error::AppError,
    models::{
        gift_card::{GiftCardProduct, GiftCardRedemption},
        reward::RewardEntryKind,
    },
    security,
    services::rewards_service,
};

/// Bounded retry for code generation; exhausting it means the RNG is broken,
/// not that we should spin forever.
const CODE_ATTEMPTS: u32 = 5;

/// Active catalog, cheapest first.
pub async fn list_products(pool: &DbPool) -> Result<Vec<GiftCardProduct>, AppError> {
    let products = sqlx::query_as::<_, GiftCardProduct>(
        "SELECT * FROM gift_card_products WHERE active = TRUE ORDER BY cost_coins, brand",
    )
    .fetch_all(pool)
    .await?;

    Ok(products)
}

/// Redeem coins for a gift card.
///
/// # Process
///
/// 1. Product must exist and be active
/// 2. Lock the wallet; fail with `InsufficientCoins` if balance < cost
/// 3. Debit coins, append a REDEEM ledger row (negative delta)
/// 4. Issue the redemption with a fresh unique code
///
/// All inside one transaction: a failed redemption leaves wallet and ledger
/// untouched.
pub async fn redeem(
    pool: &DbPool,
    config: &Config,
    user_id: Uuid,
    product_id: Uuid,
) -> Result<GiftCardRedemption, AppError> {
    let now = Utc::now();
    let mut tx = crate::db::begin(pool, config.lock_timeout_ms).await?;

    let product =
        sqlx::query_as::<_, GiftCardProduct>("SELECT * FROM gift_card_products WHERE id = $1")
            .bind(product_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(AppError::ProductNotFound)?;
    if !product.active {
        return Err(AppError::InactiveProduct);
    }

    let coins = rewards_service::lock_wallet(&mut tx, user_id).await?;
    if coins < product.cost_coins {
        tx.rollback().await?;
        return Err(AppError::InsufficientCoins { available: coins });
    }

    rewards_service::update_wallet(&mut tx, user_id, coins - product.cost_coins, now).await?;

    let note = format!("Redeem {} ₹{}", product.brand, product.value_rupees);
    rewards_service::record_ledger_entry(
        &mut tx,
        user_id,
        None,
        RewardEntryKind::Redeem,
        -product.cost_coins,
        &note,
        now,
    )
    .await?;

    let code = generate_code(&mut tx, &product.brand).await?;
    let redemption = sqlx::query_as::<_, GiftCardRedemption>(
        r#"
        INSERT INTO gift_card_redemptions (user_id, product_id, code, status, created_at)
        VALUES ($1, $2, $3, 'ISSUED', $4)
        RETURNING *
        "#,
    )
    .bind(user_id)
    .bind(product_id)
    .bind(&code)
    .bind(now)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;

    tracing::info!(%user_id, brand = %product.brand, cost_coins = product.cost_coins, "gift card redeemed");
    Ok(redemption)
}

/// Generate a globally-unique redemption code: `<BRAND2>-<year>-<rand8>`,
/// e.g. `FL-2025-9K2QWE7T`. Collision-checked against issued redemptions
/// with a bounded retry loop.
async fn generate_code(tx: &mut DbTx, brand: &str) -> Result<String, AppError> {
    let prefix = brand_prefix(brand);
    let year = Utc::now().format("%Y");

    for _ in 0..CODE_ATTEMPTS {
        let candidate = format!("{}-{}-{}", prefix, year, security::random_alphanum(8));

        let taken: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM gift_card_redemptions WHERE code = $1)")
                .bind(&candidate)
                .fetch_one(&mut **tx)
                .await?;

        if !taken {
            return Ok(candidate);
        }
    }

    Err(AppError::IdGeneration)
}

/// First two alphanumeric characters of the brand, uppercased; `XX` for
/// degenerate brand names.
fn brand_prefix(brand: &str) -> String {
    let prefix: String = brand
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .take(2)
        .collect::<String>()
        .to_uppercase();

    if prefix.is_empty() {
        "XX".to_string()
    } else {
        prefix
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn brand_prefix_takes_first_two_letters() {
        assert_eq!(brand_prefix("Flipkart"), "FL");
        assert_eq!(brand_prefix("Amazon"), "AM");
        assert_eq!(brand_prefix("a1 store"), "A1");
    }

    #[test]
    fn degenerate_brands_fall_back() {
        assert_eq!(brand_prefix("!!"), "XX");
        assert_eq!(brand_prefix(""), "XX");
    }
}
