//! Database connection pool and migration management.
//!
//! This module provides utilities for:
//! - Creating and managing a PostgreSQL connection pool
//! - Running database migrations automatically
//! - Opening database transactions with a bounded lock wait

use sqlx::{Pool, Postgres, Transaction};

use crate::error::AppError;

/// Type alias for PostgreSQL connection pool.
///
/// Instead of writing `Pool<Postgres>` everywhere, we can use `DbPool`.
pub type DbPool = Pool<Postgres>;

/// Type alias for an open database transaction.
pub type DbTx = Transaction<'static, Postgres>;

/// Create a new PostgreSQL connection pool.
///
/// A connection pool maintains multiple database connections that can be
/// reused across HTTP requests which is much more efficient than opening a
/// new connection for each request.
///
/// # Errors
///
/// Returns an error if:
/// - Database connection string is invalid
/// - Cannot connect to PostgreSQL server
/// - Database authentication fails
pub async fn create_pool(database_url: &str) -> Result<DbPool, sqlx::Error> {
    sqlx::postgres::PgPoolOptions::new()
        // Limit concurrent connections
        .max_connections(5)
        .connect(database_url)
        .await
}

/// Run database migrations from the `migrations/` directory.
///
/// This function executes all SQL migration files in order. Migrations are
/// tracked in a special `_sqlx_migrations` table, so each migration runs only
/// once.
pub async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::migrate::MigrateError> {
    // The macro reads migrations at compile time from ./migrations directory
    sqlx::migrate!("./migrations").run(pool).await
}

/// Begin a database transaction with a bounded lock wait.
///
/// Every balance- or coin-mutating operation goes through here. `SET LOCAL
/// lock_timeout` makes a contended `FOR UPDATE` fail with Postgres error
/// 55P03 instead of blocking forever; that error surfaces to callers as
/// [`AppError::LockTimeout`], which is retryable.
pub async fn begin(pool: &DbPool, lock_timeout_ms: u64) -> Result<DbTx, AppError> {
    let mut tx = pool.begin().await?;

    // SET LOCAL scopes the timeout to this transaction only.
    sqlx::query(&format!("SET LOCAL lock_timeout = '{}ms'", lock_timeout_ms))
        .execute(&mut *tx)
        .await?;

    Ok(tx)
}
