//! Payment engine - UPI payment orchestration.
//!
//! One payment is: a PENDING record, then an atomic unit of
//! debit + transaction-log append + reward accrual, then a terminal status.
//! If anything fails after the PENDING row exists, the row is driven to
//! FAILED before the error propagates; a payment never stays PENDING.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
    config::Config,
    db::{DbPool, DbTx},
    error::AppError,
    models::{
        payment::{PaymentStatus, UpiPaymentRequest, UpiPaymentResponse, is_valid_category},
        transaction::TransactionKind,
        upi::is_valid_vpa,
    },
    security,
    services::{rewards_service, transaction_service},
};

/// How many times ref-id generation retries before giving up. Collisions are
/// already unlikely; hitting the bound means the RNG is broken.
const REF_ID_ATTEMPTS: u32 = 5;

/// Execute a UPI payment.
///
/// # Process
///
/// 1. Validate amount, VPA format, and category
/// 2. Check the account belongs to the caller and the recipient VPA exists
/// 3. Insert the payment record PENDING with a fresh unique ref id
/// 4. In one database transaction: lock the account, debit, append a
///    PAYMENT ledger row, accrue reward coins (including the daily bonus),
///    and flip the payment to SUCCESS
/// 5. On insufficient balance or any later failure: roll back the money
///    movement and drive the payment to FAILED
///
/// # Errors
///
/// - `InvalidRequest`: bad amount, VPA format, or category
/// - `AccountNotFound` / `Forbidden`: account missing or not the caller's
/// - `VpaNotFound`: recipient address not in the directory
/// - `InsufficientBalance`: carries the available balance; payment is FAILED
pub async fn upi_pay(
    pool: &DbPool,
    config: &Config,
    caller_user_id: Uuid,
    request: UpiPaymentRequest,
) -> Result<UpiPaymentResponse, AppError> {
    if request.amount_paise <= 0 {
        return Err(AppError::InvalidRequest(
            "Amount must be positive".to_string(),
        ));
    }
    if !is_valid_vpa(&request.vpa) {
        return Err(AppError::InvalidRequest(
            "Invalid UPI id format".to_string(),
        ));
    }
    if !is_valid_category(&request.category) {
        return Err(AppError::InvalidRequest("Unknown category".to_string()));
    }

    let now = Utc::now();

    // Ownership check up front; the balance check happens again under lock.
    let account_user_id: Option<Uuid> =
        sqlx::query_scalar("SELECT user_id FROM accounts WHERE id = $1")
            .bind(request.account_id)
            .fetch_optional(pool)
            .await?;
    match account_user_id {
        None => return Err(AppError::AccountNotFound),
        Some(owner) if owner != caller_user_id => return Err(AppError::Forbidden),
        Some(_) => {}
    }

    // Recipient must exist in the VPA directory.
    let recipient_exists: bool =
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM upi_vpas WHERE vpa = $1)")
            .bind(&request.vpa)
            .fetch_one(pool)
            .await?;
    if !recipient_exists {
        return Err(AppError::VpaNotFound);
    }

    let ref_id = generate_ref_id(pool, now).await?;
    let meta = serde_json::json!({
        "vpa": &request.vpa,
        "note": &request.note,
        "category": &request.category,
    });

    // The PENDING row commits before any money moves, so a crash mid-flight
    // leaves an inspectable record rather than a half-applied payment.
    let payment_id: Uuid = sqlx::query_scalar(
        r#"
        INSERT INTO payments (user_id, account_id, category, method, amount_paise, status, ref_id, meta, created_at)
        VALUES ($1, $2, $3, 'UPI', $4, 'PENDING', $5, $6, $7)
        RETURNING id
        "#,
    )
    .bind(caller_user_id)
    .bind(request.account_id)
    .bind(&request.category)
    .bind(request.amount_paise)
    .bind(&ref_id)
    .bind(&meta)
    .bind(now)
    .fetch_one(pool)
    .await?;

    match settle(pool, config, caller_user_id, payment_id, &request, now).await {
        Ok((balance_after_paise, coins)) => {
            tracing::info!(%payment_id, %ref_id, amount_paise = request.amount_paise, "UPI payment succeeded");
            Ok(UpiPaymentResponse {
                id: payment_id,
                status: PaymentStatus::Success,
                ref_id,
                balance_after_paise,
                coins_earned: coins,
            })
        }
        Err(err) => {
            tracing::warn!(%payment_id, %ref_id, error = %err, "UPI payment failed");
            mark_failed(pool, payment_id).await;
            Err(err)
        }
    }
}

/// The atomic part of a payment: debit, ledger row, reward accrual, SUCCESS.
///
/// Returns (balance after, coins earned). Any error here rolls the whole
/// unit back; the caller then drives the payment record to FAILED.
async fn settle(
    pool: &DbPool,
    config: &Config,
    user_id: Uuid,
    payment_id: Uuid,
    request: &UpiPaymentRequest,
    now: DateTime<Utc>,
) -> Result<(i64, i64), AppError> {
    let mut tx = crate::db::begin(pool, config.lock_timeout_ms).await?;

    let account = transaction_service::lock_account(&mut tx, request.account_id).await?;
    if account.balance_paise < request.amount_paise {
        tx.rollback().await?;
        return Err(AppError::InsufficientBalance {
            available_paise: account.balance_paise,
        });
    }

    let new_balance = account.balance_paise - request.amount_paise;
    transaction_service::update_balance(&mut tx, account.id, new_balance, now).await?;

    let note = request
        .note
        .clone()
        .unwrap_or_else(|| format!("UPI {}", request.vpa));
    transaction_service::record_transaction(
        &mut tx,
        account.id,
        TransactionKind::Payment,
        request.amount_paise,
        new_balance,
        Some(&note),
        now,
    )
    .await?;

    // Rewards accrue in the same transaction as the debit.
    let coins = rewards_service::coins_earned(request.amount_paise);
    rewards_service::record_earn_and_daily_bonus(&mut tx, user_id, Some(payment_id), coins, now)
        .await?;

    mark_status(&mut tx, payment_id, PaymentStatus::Success).await?;

    tx.commit().await?;

    Ok((new_balance, coins))
}

/// Flip a payment's status inside an open transaction.
async fn mark_status(
    tx: &mut DbTx,
    payment_id: Uuid,
    status: PaymentStatus,
) -> Result<(), AppError> {
    sqlx::query("UPDATE payments SET status = $1 WHERE id = $2")
        .bind(status)
        .bind(payment_id)
        .execute(&mut **tx)
        .await?;

    Ok(())
}

/// Drive a payment to FAILED after its atomic unit rolled back.
///
/// Best effort: if even this write fails the original error still
/// propagates, and the stuck PENDING row is logged for the operator.
async fn mark_failed(pool: &DbPool, payment_id: Uuid) {
    let result = sqlx::query("UPDATE payments SET status = 'FAILED' WHERE id = $1")
        .bind(payment_id)
        .execute(pool)
        .await;

    if let Err(err) = result {
        tracing::error!(%payment_id, error = %err, "could not mark payment FAILED");
    }
}

/// Generate a collision-checked reference id: `UPI<yyyymmdd-HHMMSS>-<rand6>`.
///
/// The timestamp part makes ids sort roughly by creation time; the random
/// suffix disambiguates within a second. Uniqueness is verified against the
/// payments table, bounded to [`REF_ID_ATTEMPTS`] tries.
async fn generate_ref_id(pool: &DbPool, now: DateTime<Utc>) -> Result<String, AppError> {
    for _ in 0..REF_ID_ATTEMPTS {
        let candidate = format!(
            "UPI{}-{}",
            now.format("%Y%m%d-%H%M%S"),
            security::random_alphanum(6)
        );

        let taken: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM payments WHERE ref_id = $1)")
            .bind(&candidate)
            .fetch_one(pool)
            .await?;

        if !taken {
            return Ok(candidate);
        }
    }

    Err(AppError::IdGeneration)
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn ref_id_embeds_the_timestamp() {
        let now = Utc.with_ymd_and_hms(2025, 8, 10, 14, 25, 1).unwrap();
        let prefix = format!("UPI{}-", now.format("%Y%m%d-%H%M%S"));
        assert_eq!(prefix, "UPI20250810-142501-");
    }
}
