//! Account management HTTP handlers.
//!
//! This module implements the account-related API endpoints:
//! - POST /api/v1/accounts - Open a new account
//! - GET /api/v1/accounts/:id - Get account by ID
//! - GET /api/v1/accounts - List the caller's accounts

use axum::{
    Extension, Json,
    extract::{Path, State},
};
use uuid::Uuid;

use crate::{
    AppState,
    error::AppError,
    middleware::auth::AuthContext,
    models::account::{Account, AccountResponse, CreateAccountRequest},
};

/// Open a new account for the authenticated user.
///
/// The card number is masked on the spot: only its last four digits reach
/// the database.
///
/// # Request Body
///
/// ```json
/// {
///   "card_number": "4111111111111234",
///   "initial_balance_paise": 100000
/// }
/// ```
pub async fn create_account(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(request): Json<CreateAccountRequest>,
) -> Result<Json<AccountResponse>, AppError> {
    let digits: String = request
        .card_number
        .chars()
        .filter(|c| c.is_ascii_digit())
        .collect();
    if digits.len() < 12 {
        return Err(AppError::InvalidRequest(
            "Card number must have at least 12 digits".to_string(),
        ));
    }
    if request.initial_balance_paise < 0 {
        return Err(AppError::InvalidRequest(
            "Initial balance cannot be negative".to_string(),
        ));
    }

    let card_last4 = &digits[digits.len() - 4..];

    let account = sqlx::query_as::<_, Account>(
        r#"
        INSERT INTO accounts (user_id, card_last4, balance_paise)
        VALUES ($1, $2, $3)
        RETURNING *
        "#,
    )
    .bind(auth.user_id)
    .bind(card_last4)
    .bind(request.initial_balance_paise)
    .fetch_one(&state.pool)
    .await?;

    Ok(Json(account.into()))
}

/// Get a specific account by ID.
///
/// Returns 404 if the account doesn't exist OR belongs to a different user
/// (prevents leaking existence of other accounts).
pub async fn get_account(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(account_id): Path<Uuid>,
) -> Result<Json<AccountResponse>, AppError> {
    // Query account by ID AND user_id (security filter)
    let account =
        sqlx::query_as::<_, Account>("SELECT * FROM accounts WHERE id = $1 AND user_id = $2")
            .bind(account_id)
            .bind(auth.user_id)
            .fetch_optional(&state.pool)
            .await?
            .ok_or(AppError::AccountNotFound)?;

    Ok(Json(account.into()))
}

/// List all accounts of the authenticated user, newest first.
pub async fn list_accounts(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> Result<Json<Vec<AccountResponse>>, AppError> {
    let accounts = sqlx::query_as::<_, Account>(
        "SELECT * FROM accounts WHERE user_id = $1 ORDER BY created_at DESC",
    )
    .bind(auth.user_id)
    .fetch_all(&state.pool)
    .await?;

    let responses: Vec<AccountResponse> = accounts.into_iter().map(Into::into).collect();

    Ok(Json(responses))
}
