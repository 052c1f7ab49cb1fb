#![allow(dead_code)] // each test crate uses its own subset of the fixtures

//! Shared fixtures for integration tests.
//!
//! Every test runs against a fresh database provisioned by `#[sqlx::test]`,
//! with migrations already applied, so fixtures only need to seed rows.

use bank_ledger_service::{config::Config, security};
use sqlx::PgPool;
use uuid::Uuid;

/// Config for tests; the pool comes from the test harness so the database
/// URL is never read.
pub fn test_config() -> Config {
    Config {
        database_url: String::new(),
        server_port: 0,
        daily_transfer_limit_paise: 5_000_000,
        lock_timeout_ms: 5_000,
    }
}

pub async fn create_user(pool: &PgPool, name: &str) -> Uuid {
    sqlx::query_scalar(
        r#"
        INSERT INTO users (name, email, api_key_hash)
        VALUES ($1, $2, $3)
        RETURNING id
        "#,
    )
    .bind(name)
    .bind(format!("{name}@example.in"))
    .bind(security::sha256_hex(name))
    .fetch_one(pool)
    .await
    .expect("insert user")
}

pub async fn create_account(pool: &PgPool, user_id: Uuid, balance_paise: i64) -> Uuid {
    sqlx::query_scalar(
        r#"
        INSERT INTO accounts (user_id, card_last4, balance_paise)
        VALUES ($1, '1234', $2)
        RETURNING id
        "#,
    )
    .bind(user_id)
    .bind(balance_paise)
    .fetch_one(pool)
    .await
    .expect("insert account")
}

pub async fn create_vpa(
    pool: &PgPool,
    user_id: Uuid,
    account_id: Uuid,
    vpa: &str,
    pin: Option<&str>,
) {
    sqlx::query(
        r#"
        INSERT INTO upi_vpas (vpa, user_id, account_id, is_default, pin_hash)
        VALUES ($1, $2, $3, FALSE, $4)
        "#,
    )
    .bind(vpa)
    .bind(user_id)
    .bind(account_id)
    .bind(pin.map(security::hash_pin))
    .execute(pool)
    .await
    .expect("insert vpa");
}

pub async fn set_user_pin(pool: &PgPool, user_id: Uuid, pin: &str) {
    sqlx::query("UPDATE users SET upi_pin_hash = $1 WHERE id = $2")
        .bind(security::hash_pin(pin))
        .bind(user_id)
        .execute(pool)
        .await
        .expect("set user pin");
}

pub async fn account_balance(pool: &PgPool, account_id: Uuid) -> i64 {
    sqlx::query_scalar("SELECT balance_paise FROM accounts WHERE id = $1")
        .bind(account_id)
        .fetch_one(pool)
        .await
        .expect("read balance")
}

/// Ledger rows of an account, oldest first: (kind, amount, balance_after).
pub async fn transaction_rows(pool: &PgPool, account_id: Uuid) -> Vec<(String, i64, i64)> {
    sqlx::query_as(
        r#"
        SELECT kind::TEXT, amount_paise, balance_after_paise
        FROM transactions
        WHERE account_id = $1
        ORDER BY created_at, id
        "#,
    )
    .bind(account_id)
    .fetch_all(pool)
    .await
    .expect("read transactions")
}

/// Sum of a user's reward ledger deltas; must always equal their wallet.
pub async fn reward_ledger_sum(pool: &PgPool, user_id: Uuid) -> i64 {
    sqlx::query_scalar("SELECT COALESCE(SUM(coins), 0)::BIGINT FROM reward_ledger WHERE user_id = $1")
        .bind(user_id)
        .fetch_one(pool)
        .await
        .expect("sum ledger")
}

/// Reward ledger rows of a user, oldest first: (entry, coins).
pub async fn reward_ledger_rows(pool: &PgPool, user_id: Uuid) -> Vec<(String, i64)> {
    sqlx::query_as(
        "SELECT entry::TEXT, coins FROM reward_ledger WHERE user_id = $1 ORDER BY created_at, id",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await
    .expect("read reward ledger")
}

pub async fn wallet_coins(pool: &PgPool, user_id: Uuid) -> i64 {
    sqlx::query_scalar("SELECT COALESCE((SELECT coins FROM reward_wallets WHERE user_id = $1), 0)")
        .bind(user_id)
        .fetch_one(pool)
        .await
        .expect("read wallet")
}

pub async fn payment_status(pool: &PgPool, payment_id: Uuid) -> String {
    sqlx::query_scalar("SELECT status::TEXT FROM payments WHERE id = $1")
        .bind(payment_id)
        .fetch_one(pool)
        .await
        .expect("read payment status")
}

/// All payments touching an account: (id, status), oldest first.
pub async fn payments_for_account(pool: &PgPool, account_id: Uuid) -> Vec<(Uuid, String)> {
    sqlx::query_as(
        "SELECT id, status::TEXT FROM payments WHERE account_id = $1 ORDER BY created_at, id",
    )
    .bind(account_id)
    .fetch_all(pool)
    .await
    .expect("read payments")
}

/// A seeded gift card product id by brand and cost.
pub async fn product_id(pool: &PgPool, brand: &str, cost_coins: i64) -> Uuid {
    sqlx::query_scalar("SELECT id FROM gift_card_products WHERE brand = $1 AND cost_coins = $2")
        .bind(brand)
        .bind(cost_coins)
        .fetch_one(pool)
        .await
        .expect("seeded product")
}
