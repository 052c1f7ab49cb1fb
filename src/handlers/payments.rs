//! UPI payment HTTP handler.
//!
//! - POST /api/v1/payments/upi - Pay a recipient VPA from the caller's account

use axum::{Extension, Json, extract::State};

use crate::{
    AppState,
    error::AppError,
    middleware::auth::AuthContext,
    models::payment::{UpiPaymentRequest, UpiPaymentResponse},
    services::payment_service,
};

/// Execute a UPI payment.
///
/// # Request Body
///
/// ```json
/// {
///   "account_id": "550e8400-...",
///   "vpa": "shop@okbank",
///   "amount_paise": 34900,
///   "category": "FOOD",
///   "note": "Lunch"
/// }
/// ```
///
/// # Response (200)
///
/// ```json
/// {
///   "id": "880e8400-...",
///   "status": "SUCCESS",
///   "ref_id": "UPI20250810-142501-7KQ2MX",
///   "balance_after_paise": 65100,
///   "coins_earned": 3
/// }
/// ```
pub async fn upi_pay(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(request): Json<UpiPaymentRequest>,
) -> Result<Json<UpiPaymentResponse>, AppError> {
    let response =
        payment_service::upi_pay(&state.pool, &state.config, auth.user_id, request).await?;

    Ok(Json(response))
}
