//! Account store and transaction log - core ledger primitives.
//!
//! This service owns the only paths that mutate an account balance:
//! - `deposit` / `withdraw` for direct cash movement
//! - the `lock_account` / `update_balance` / `record_transaction` building
//!   blocks the payment and transfer engines compose
//!
//! # Atomicity Guarantees
//!
//! A balance update and its ledger row are written inside the same
//! PostgreSQL transaction, always. There is no code path that does one
//! without the other, so a balance change without a matching log entry
//! cannot commit.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
    config::Config,
    db::{DbPool, DbTx},
    error::AppError,
    models::{
        account::Account,
        transaction::{TransactionKind, TransactionReceipt},
    },
};

/// Load an account under an exclusive row lock.
///
/// `FOR UPDATE` serializes concurrent operations against the same account:
/// the second locker waits (bounded by `lock_timeout`) and then re-reads the
/// committed balance, so two debits can never race on a stale value.
pub(crate) async fn lock_account(tx: &mut DbTx, account_id: Uuid) -> Result<Account, AppError> {
    sqlx::query_as::<_, Account>("SELECT * FROM accounts WHERE id = $1 FOR UPDATE")
        .bind(account_id)
        .fetch_optional(&mut **tx)
        .await?
        .ok_or(AppError::AccountNotFound)
}

/// Write a locked account's new balance.
pub(crate) async fn update_balance(
    tx: &mut DbTx,
    account_id: Uuid,
    new_balance_paise: i64,
    now: DateTime<Utc>,
) -> Result<(), AppError> {
    sqlx::query("UPDATE accounts SET balance_paise = $1, updated_at = $2 WHERE id = $3")
        .bind(new_balance_paise)
        .bind(now)
        .bind(account_id)
        .execute(&mut **tx)
        .await?;

    Ok(())
}

/// Append one row to the transaction log.
///
/// This is the only INSERT path into `transactions`. It takes the open
/// transaction of the enclosing balance mutation, which is what makes
/// "balance change without log entry" structurally impossible.
pub(crate) async fn record_transaction(
    tx: &mut DbTx,
    account_id: Uuid,
    kind: TransactionKind,
    amount_paise: i64,
    balance_after_paise: i64,
    note: Option<&str>,
    now: DateTime<Utc>,
) -> Result<Uuid, AppError> {
    let id: Uuid = sqlx::query_scalar(
        r#"
        INSERT INTO transactions (account_id, kind, amount_paise, balance_after_paise, note, created_at)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING id
        "#,
    )
    .bind(account_id)
    .bind(kind)
    .bind(amount_paise)
    .bind(balance_after_paise)
    .bind(note)
    .bind(now)
    .fetch_one(&mut **tx)
    .await?;

    Ok(id)
}

/// Sum of outgoing money (TRANSFER_OUT + PAYMENT) for an account in the
/// half-open window `[from, to)`. Feeds the daily transfer cap.
pub(crate) async fn sum_outgoing_between(
    tx: &mut DbTx,
    account_id: Uuid,
    from: DateTime<Utc>,
    to: DateTime<Utc>,
) -> Result<i64, AppError> {
    let total: i64 = sqlx::query_scalar(
        r#"
        SELECT COALESCE(SUM(amount_paise), 0)::BIGINT
        FROM transactions
        WHERE account_id = $1
          AND kind IN ('TRANSFER_OUT', 'PAYMENT')
          AND created_at >= $2
          AND created_at < $3
        "#,
    )
    .bind(account_id)
    .bind(from)
    .bind(to)
    .fetch_one(&mut **tx)
    .await?;

    Ok(total)
}

/// Deposit money into an account.
///
/// # Process
///
/// 1. Validate amount
/// 2. Start database transaction, lock the account
/// 3. Verify the account belongs to the caller
/// 4. Credit the balance and append a DEPOSIT ledger row
/// 5. Commit (or rollback on error)
///
/// # Errors
///
/// - `AccountNotFound`: account doesn't exist
/// - `Forbidden`: account belongs to another user
/// - `InvalidRequest`: amount is zero or negative
pub async fn deposit(
    pool: &DbPool,
    config: &Config,
    caller_user_id: Uuid,
    account_id: Uuid,
    amount_paise: i64,
    note: Option<String>,
) -> Result<TransactionReceipt, AppError> {
    // Validate amount
    if amount_paise <= 0 {
        return Err(AppError::InvalidRequest(
            "Amount must be positive".to_string(),
        ));
    }

    let now = Utc::now();
    let mut tx = crate::db::begin(pool, config.lock_timeout_ms).await?;

    let account = lock_account(&mut tx, account_id).await?;
    if account.user_id != caller_user_id {
        tx.rollback().await?;
        return Err(AppError::Forbidden);
    }

    let new_balance = account.balance_paise + amount_paise;
    update_balance(&mut tx, account_id, new_balance, now).await?;

    let transaction_id = record_transaction(
        &mut tx,
        account_id,
        TransactionKind::Deposit,
        amount_paise,
        new_balance,
        note.as_deref(),
        now,
    )
    .await?;

    // Commit all changes atomically
    tx.commit().await?;

    tracing::info!(%account_id, amount_paise, "deposit completed");

    Ok(TransactionReceipt {
        transaction_id,
        balance_paise: new_balance,
    })
}

/// Withdraw money from an account.
///
/// Same shape as [`deposit`], plus the balance check: the debit fails with
/// `InsufficientBalance` (carrying the available amount) before the balance
/// could go negative, and the transaction rolls back leaving no trace.
pub async fn withdraw(
    pool: &DbPool,
    config: &Config,
    caller_user_id: Uuid,
    account_id: Uuid,
    amount_paise: i64,
    note: Option<String>,
) -> Result<TransactionReceipt, AppError> {
    // Validate amount
    if amount_paise <= 0 {
        return Err(AppError::InvalidRequest(
            "Amount must be positive".to_string(),
        ));
    }

    let now = Utc::now();
    let mut tx = crate::db::begin(pool, config.lock_timeout_ms).await?;

    let account = lock_account(&mut tx, account_id).await?;
    if account.user_id != caller_user_id {
        tx.rollback().await?;
        return Err(AppError::Forbidden);
    }

    // Validate sufficient balance
    if account.balance_paise < amount_paise {
        tx.rollback().await?;
        return Err(AppError::InsufficientBalance {
            available_paise: account.balance_paise,
        });
    }

    let new_balance = account.balance_paise - amount_paise;
    update_balance(&mut tx, account_id, new_balance, now).await?;

    let transaction_id = record_transaction(
        &mut tx,
        account_id,
        TransactionKind::Withdraw,
        amount_paise,
        new_balance,
        note.as_deref(),
        now,
    )
    .await?;

    // Commit atomically
    tx.commit().await?;

    tracing::info!(%account_id, amount_paise, "withdrawal completed");

    Ok(TransactionReceipt {
        transaction_id,
        balance_paise: new_balance,
    })
}
