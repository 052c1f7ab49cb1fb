//! Reward wallet and gift card HTTP handlers.
//!
//! - GET /api/v1/rewards/wallet - Coin balance
//! - GET /api/v1/rewards/products - Active gift card catalog
//! - POST /api/v1/rewards/redeem - Redeem coins for a gift card

use axum::{Extension, Json, extract::State};

use crate::{
    AppState,
    error::AppError,
    middleware::auth::AuthContext,
    models::{
        gift_card::{GiftCardProduct, RedeemRequest, RedemptionResponse},
        reward::WalletResponse,
    },
    services::{redeem_service, rewards_service},
};

/// Current coin balance of the caller (0 before the first earn).
pub async fn wallet_balance(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> Result<Json<WalletResponse>, AppError> {
    let coins = rewards_service::wallet_coins(&state.pool, auth.user_id).await?;

    Ok(Json(WalletResponse { coins }))
}

/// Active gift card catalog.
pub async fn list_products(
    State(state): State<AppState>,
) -> Result<Json<Vec<GiftCardProduct>>, AppError> {
    let products = redeem_service::list_products(&state.pool).await?;

    Ok(Json(products))
}

/// Redeem coins for a gift card.
///
/// # Response (200)
///
/// ```json
/// {
///   "id": "990e8400-...",
///   "code": "FL-2025-9K2QWE7T",
///   "status": "ISSUED",
///   "created_at": "2025-08-10T14:25:01Z"
/// }
/// ```
pub async fn redeem(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(request): Json<RedeemRequest>,
) -> Result<Json<RedemptionResponse>, AppError> {
    let redemption = redeem_service::redeem(
        &state.pool,
        &state.config,
        auth.user_id,
        request.product_id,
    )
    .await?;

    Ok(Json(redemption.into()))
}
