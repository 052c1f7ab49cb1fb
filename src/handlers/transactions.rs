//! Deposit and withdrawal HTTP handlers.
//!
//! - POST /api/v1/transactions/deposit - Add money to an account
//! - POST /api/v1/transactions/withdraw - Remove money from an account

use axum::{Extension, Json, extract::State};

use crate::{
    AppState,
    error::AppError,
    middleware::auth::AuthContext,
    models::transaction::{DepositRequest, TransactionReceipt, WithdrawRequest},
    services::transaction_service,
};

/// Deposit money into the caller's account.
///
/// # Response (200)
///
/// ```json
/// {
///   "transaction_id": "770e8400-...",
///   "balance_paise": 100000
/// }
/// ```
pub async fn deposit(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(request): Json<DepositRequest>,
) -> Result<Json<TransactionReceipt>, AppError> {
    let receipt = transaction_service::deposit(
        &state.pool,
        &state.config,
        auth.user_id,
        request.account_id,
        request.amount_paise,
        request.note,
    )
    .await?;

    Ok(Json(receipt))
}

/// Withdraw money from the caller's account.
///
/// # Validation
///
/// - Account must have sufficient balance
/// - Account must belong to the authenticated user
pub async fn withdraw(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(request): Json<WithdrawRequest>,
) -> Result<Json<TransactionReceipt>, AppError> {
    let receipt = transaction_service::withdraw(
        &state.pool,
        &state.config,
        auth.user_id,
        request.account_id,
        request.amount_paise,
        request.note,
    )
    .await?;

    Ok(Json(receipt))
}
