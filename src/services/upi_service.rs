//! Transfer engine - VPA directory, peer transfers, collect requests.
//!
//! Money moves between two VPAs inside one database transaction: resolve
//! addresses, verify the PIN, enforce the daily cap, lock both accounts in
//! ascending-id order, then debit/credit with one TRANSFER_OUT and one
//! TRANSFER_IN ledger row.

use chrono::{DateTime, Duration, NaiveTime, Utc};
use uuid::Uuid;

use crate::{
    config::Config,
    db::{DbPool, DbTx},
    error::AppError,
    models::{
        transaction::TransactionKind,
        upi::{UpiRequest, UpiRequestStatus, UpiVpa, is_valid_vpa},
    },
    security,
    services::transaction_service,
};

/// Minimum UPI PIN length, per-address and account-wide alike.
const MIN_PIN_LEN: usize = 4;

/// How many VPAs a directory search returns at most.
const SEARCH_LIMIT: i64 = 10;

/// Resolve a VPA inside an open transaction.
async fn resolve_vpa(tx: &mut DbTx, vpa: &str) -> Result<UpiVpa, AppError> {
    sqlx::query_as::<_, UpiVpa>("SELECT * FROM upi_vpas WHERE vpa = $1")
        .bind(vpa)
        .fetch_optional(&mut **tx)
        .await?
        .ok_or(AppError::VpaNotFound)
}

/// Two-tier PIN lookup: the VPA's own PIN hash wins; a VPA without one falls
/// back to its owner's account-wide PIN. Explicit so the precedence rule is
/// testable on its own.
async fn effective_pin_hash(tx: &mut DbTx, sender: &UpiVpa) -> Result<Option<String>, AppError> {
    if sender.pin_hash.is_some() {
        return Ok(sender.pin_hash.clone());
    }

    let user_hash: Option<String> =
        sqlx::query_scalar("SELECT upi_pin_hash FROM users WHERE id = $1")
            .bind(sender.user_id)
            .fetch_one(&mut **tx)
            .await?;

    Ok(user_hash)
}

/// Register a new VPA for the caller.
///
/// The first address a user registers becomes their default (enforced by a
/// partial unique index, so two concurrent first registrations cannot both
/// win the flag).
pub async fn create_vpa(
    pool: &DbPool,
    caller_user_id: Uuid,
    vpa: String,
    account_id: Uuid,
    pin: Option<String>,
) -> Result<UpiVpa, AppError> {
    if !is_valid_vpa(&vpa) {
        return Err(AppError::InvalidRequest(
            "Invalid UPI id format".to_string(),
        ));
    }
    if let Some(ref pin) = pin {
        if pin.len() < MIN_PIN_LEN {
            return Err(AppError::InvalidRequest("PIN too short".to_string()));
        }
    }

    let account_user_id: Option<Uuid> =
        sqlx::query_scalar("SELECT user_id FROM accounts WHERE id = $1")
            .bind(account_id)
            .fetch_optional(pool)
            .await?;
    match account_user_id {
        None => return Err(AppError::AccountNotFound),
        Some(owner) if owner != caller_user_id => return Err(AppError::Forbidden),
        Some(_) => {}
    }

    let taken: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM upi_vpas WHERE vpa = $1)")
        .bind(&vpa)
        .fetch_one(pool)
        .await?;
    if taken {
        return Err(AppError::InvalidRequest(
            "UPI id already exists".to_string(),
        ));
    }

    let has_existing: bool =
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM upi_vpas WHERE user_id = $1)")
            .bind(caller_user_id)
            .fetch_one(pool)
            .await?;

    let created = sqlx::query_as::<_, UpiVpa>(
        r#"
        INSERT INTO upi_vpas (vpa, user_id, account_id, is_default, pin_hash)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING *
        "#,
    )
    .bind(&vpa)
    .bind(caller_user_id)
    .bind(account_id)
    .bind(!has_existing)
    .bind(pin.map(|p| security::hash_pin(&p)))
    .fetch_one(pool)
    .await?;

    tracing::info!(%vpa, %account_id, "VPA registered");
    Ok(created)
}

/// Set or change the caller's account-wide UPI PIN.
pub async fn set_upi_pin(pool: &DbPool, caller_user_id: Uuid, pin: &str) -> Result<(), AppError> {
    if pin.len() < MIN_PIN_LEN {
        return Err(AppError::InvalidRequest("PIN too short".to_string()));
    }

    sqlx::query("UPDATE users SET upi_pin_hash = $1 WHERE id = $2")
        .bind(security::hash_pin(pin))
        .bind(caller_user_id)
        .execute(pool)
        .await?;

    Ok(())
}

/// Case-insensitive substring search over the VPA directory, capped at
/// [`SEARCH_LIMIT`]. An empty query returns nothing.
pub async fn search_vpas(pool: &DbPool, query: &str) -> Result<Vec<UpiVpa>, AppError> {
    let query = query.trim();
    if query.is_empty() {
        return Ok(Vec::new());
    }

    let vpas = sqlx::query_as::<_, UpiVpa>(
        "SELECT * FROM upi_vpas WHERE vpa ILIKE '%' || $1 || '%' ORDER BY vpa LIMIT $2",
    )
    .bind(query)
    .bind(SEARCH_LIMIT)
    .fetch_all(pool)
    .await?;

    Ok(vpas)
}

/// Move money between two VPAs.
///
/// Wrapper that opens the transaction; the work lives in
/// [`transfer_in_tx`] so collect-request approval can run the same path
/// inside its own transaction.
pub async fn transfer(
    pool: &DbPool,
    config: &Config,
    from_vpa: &str,
    to_vpa: &str,
    amount_paise: i64,
    note: Option<String>,
    pin: &str,
) -> Result<Uuid, AppError> {
    let now = Utc::now();
    let mut tx = crate::db::begin(pool, config.lock_timeout_ms).await?;

    let transaction_id =
        transfer_in_tx(&mut tx, config, from_vpa, to_vpa, amount_paise, note, pin, now).await?;

    tx.commit().await?;

    tracing::info!(from_vpa, to_vpa, amount_paise, %transaction_id, "UPI transfer completed");
    Ok(transaction_id)
}

/// The transfer itself, inside the caller's open transaction.
///
/// # Process
///
/// 1. Resolve both VPAs
/// 2. Verify the PIN (two-tier: VPA PIN, else account-wide)
/// 3. Enforce the daily outgoing cap for the sending account
/// 4. Lock both accounts in ascending-id order, check the sender's balance
/// 5. Debit sender / credit receiver, append TRANSFER_OUT and TRANSFER_IN
///    rows with independent balance-after snapshots
///
/// Returns the TRANSFER_OUT transaction id.
#[allow(clippy::too_many_arguments)]
pub(crate) async fn transfer_in_tx(
    tx: &mut DbTx,
    config: &Config,
    from_vpa: &str,
    to_vpa: &str,
    amount_paise: i64,
    note: Option<String>,
    pin: &str,
    now: DateTime<Utc>,
) -> Result<Uuid, AppError> {
    if amount_paise <= 0 {
        return Err(AppError::InvalidRequest(
            "Amount must be positive".to_string(),
        ));
    }

    let from = resolve_vpa(tx, from_vpa).await?;
    let to = resolve_vpa(tx, to_vpa).await?;

    if from.account_id == to.account_id {
        return Err(AppError::InvalidRequest(
            "Cannot transfer to the same account".to_string(),
        ));
    }

    let pin_hash = effective_pin_hash(tx, &from).await?;
    let pin_ok = pin_hash
        .as_deref()
        .is_some_and(|hash| security::verify_pin(pin, hash));
    if !pin_ok {
        tracing::warn!(from_vpa, "UPI PIN rejected");
        return Err(AppError::InvalidPin);
    }

    // Daily cap over [midnight, midnight) of the pinned `now`.
    let day_start = now.date_naive().and_time(NaiveTime::MIN).and_utc();
    let day_end = day_start + Duration::days(1);
    let spent_today =
        transaction_service::sum_outgoing_between(tx, from.account_id, day_start, day_end).await?;
    if spent_today + amount_paise > config.daily_transfer_limit_paise {
        tracing::warn!(
            from_vpa,
            spent_today,
            amount_paise,
            "daily transfer limit exceeded"
        );
        return Err(AppError::DailyLimitExceeded);
    }

    // Always lock the lower account id first so two opposite-direction
    // transfers between the same pair cannot deadlock.
    let (sender, receiver) = if from.account_id < to.account_id {
        let sender = transaction_service::lock_account(tx, from.account_id).await?;
        let receiver = transaction_service::lock_account(tx, to.account_id).await?;
        (sender, receiver)
    } else {
        let receiver = transaction_service::lock_account(tx, to.account_id).await?;
        let sender = transaction_service::lock_account(tx, from.account_id).await?;
        (sender, receiver)
    };

    if sender.balance_paise < amount_paise {
        return Err(AppError::InsufficientBalance {
            available_paise: sender.balance_paise,
        });
    }

    let sender_after = sender.balance_paise - amount_paise;
    let receiver_after = receiver.balance_paise + amount_paise;
    transaction_service::update_balance(tx, sender.id, sender_after, now).await?;
    transaction_service::update_balance(tx, receiver.id, receiver_after, now).await?;

    let debit_note = note.unwrap_or_else(|| format!("To {to_vpa}"));
    let transaction_id = transaction_service::record_transaction(
        tx,
        sender.id,
        TransactionKind::TransferOut,
        amount_paise,
        sender_after,
        Some(&debit_note),
        now,
    )
    .await?;

    let credit_note = format!("From {from_vpa}");
    transaction_service::record_transaction(
        tx,
        receiver.id,
        TransactionKind::TransferIn,
        amount_paise,
        receiver_after,
        Some(&credit_note),
        now,
    )
    .await?;

    Ok(transaction_id)
}

/// Create a collect request: the payee asks `payer_vpa` for money.
///
/// Only validates both addresses and records PENDING; no money moves until
/// the payer approves.
pub async fn create_collect_request(
    pool: &DbPool,
    config: &Config,
    payer_vpa: &str,
    payee_vpa: &str,
    amount_paise: i64,
) -> Result<UpiRequest, AppError> {
    if amount_paise <= 0 {
        return Err(AppError::InvalidRequest(
            "Amount must be positive".to_string(),
        ));
    }

    let mut tx = crate::db::begin(pool, config.lock_timeout_ms).await?;

    resolve_vpa(&mut tx, payer_vpa).await?;
    resolve_vpa(&mut tx, payee_vpa).await?;

    let request = sqlx::query_as::<_, UpiRequest>(
        r#"
        INSERT INTO upi_requests (payer_vpa, payee_vpa, amount_paise, status)
        VALUES ($1, $2, $3, 'PENDING')
        RETURNING *
        "#,
    )
    .bind(payer_vpa)
    .bind(payee_vpa)
    .bind(amount_paise)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;

    tracing::info!(payer_vpa, payee_vpa, amount_paise, request_id = %request.id, "collect request created");
    Ok(request)
}

/// Approve a pending collect request: runs the transfer from payer to payee
/// and marks the request APPROVED, atomically.
///
/// The request row is locked `FOR UPDATE`, so a concurrent approve/reject of
/// the same request serializes and the loser sees a terminal status.
pub async fn approve_request(
    pool: &DbPool,
    config: &Config,
    request_id: Uuid,
    pin: &str,
) -> Result<Uuid, AppError> {
    let now = Utc::now();
    let mut tx = crate::db::begin(pool, config.lock_timeout_ms).await?;

    let request = lock_request(&mut tx, request_id).await?;
    require_pending(&request)?;

    let transaction_id = transfer_in_tx(
        &mut tx,
        config,
        &request.payer_vpa,
        &request.payee_vpa,
        request.amount_paise,
        Some("UPI Collect".to_string()),
        pin,
        now,
    )
    .await?;

    mark_request(&mut tx, request_id, UpiRequestStatus::Approved).await?;

    tx.commit().await?;

    tracing::info!(%request_id, %transaction_id, "collect request approved");
    Ok(transaction_id)
}

/// Reject a pending collect request. Terminal; a rejected request cannot be
/// approved later.
pub async fn reject_request(
    pool: &DbPool,
    config: &Config,
    request_id: Uuid,
) -> Result<(), AppError> {
    let mut tx = crate::db::begin(pool, config.lock_timeout_ms).await?;

    let request = lock_request(&mut tx, request_id).await?;
    require_pending(&request)?;

    mark_request(&mut tx, request_id, UpiRequestStatus::Rejected).await?;

    tx.commit().await?;

    tracing::info!(%request_id, "collect request rejected");
    Ok(())
}

async fn mark_request(
    tx: &mut DbTx,
    request_id: Uuid,
    status: UpiRequestStatus,
) -> Result<(), AppError> {
    sqlx::query("UPDATE upi_requests SET status = $1 WHERE id = $2")
        .bind(status)
        .bind(request_id)
        .execute(&mut **tx)
        .await?;

    Ok(())
}

async fn lock_request(tx: &mut DbTx, request_id: Uuid) -> Result<UpiRequest, AppError> {
    sqlx::query_as::<_, UpiRequest>("SELECT * FROM upi_requests WHERE id = $1 FOR UPDATE")
        .bind(request_id)
        .fetch_optional(&mut **tx)
        .await?
        .ok_or(AppError::RequestNotFound)
}

fn require_pending(request: &UpiRequest) -> Result<(), AppError> {
    if request.status != UpiRequestStatus::Pending {
        return Err(AppError::InvalidState(format!(
            "Request is already {:?}",
            request.status
        )));
    }
    Ok(())
}
