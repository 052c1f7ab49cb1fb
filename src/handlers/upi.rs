//! UPI HTTP handlers: VPA directory, transfers, and collect requests.
//!
//! - POST /api/v1/upi/vpas - Register a VPA
//! - GET /api/v1/upi/vpas/search?q=... - Search the directory
//! - POST /api/v1/upi/pin - Set the account-wide UPI PIN
//! - POST /api/v1/upi/transfer - Move money between two VPAs
//! - POST /api/v1/upi/requests - Create a collect request
//! - POST /api/v1/upi/requests/:id/approve - Approve (runs the transfer)
//! - POST /api/v1/upi/requests/:id/reject - Reject

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    AppState,
    error::AppError,
    middleware::auth::AuthContext,
    models::upi::{
        ApproveRequest, CreateCollectRequest, CreateVpaRequest, SetPinRequest, TransferRequest,
        TransferResponse, UpiRequest, VpaResponse,
    },
    services::upi_service,
};

/// Register a new VPA routing to one of the caller's accounts.
pub async fn create_vpa(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(request): Json<CreateVpaRequest>,
) -> Result<Json<VpaResponse>, AppError> {
    let vpa = upi_service::create_vpa(
        &state.pool,
        auth.user_id,
        request.vpa,
        request.account_id,
        request.pin,
    )
    .await?;

    Ok(Json(vpa.into()))
}

/// Query string for VPA search.
#[derive(Debug, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: String,
}

/// Search the VPA directory (case-insensitive substring, max 10 results).
pub async fn search_vpas(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<VpaResponse>>, AppError> {
    let vpas = upi_service::search_vpas(&state.pool, &params.q).await?;

    Ok(Json(vpas.into_iter().map(Into::into).collect()))
}

/// Set or change the caller's account-wide UPI PIN.
pub async fn set_pin(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(request): Json<SetPinRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    upi_service::set_upi_pin(&state.pool, auth.user_id, &request.pin).await?;

    Ok(Json(serde_json::json!({ "status": "ok" })))
}

/// Move money between two VPAs.
///
/// # Atomicity
///
/// Both accounts are updated and both ledger rows written in a single
/// database transaction. Either everything commits or nothing does.
pub async fn transfer(
    State(state): State<AppState>,
    Json(request): Json<TransferRequest>,
) -> Result<Json<TransferResponse>, AppError> {
    let transaction_id = upi_service::transfer(
        &state.pool,
        &state.config,
        &request.from_vpa,
        &request.to_vpa,
        request.amount_paise,
        request.note,
        &request.pin,
    )
    .await?;

    Ok(Json(TransferResponse { transaction_id }))
}

/// Create a collect request asking `payer_vpa` for money.
pub async fn create_collect_request(
    State(state): State<AppState>,
    Json(request): Json<CreateCollectRequest>,
) -> Result<Json<UpiRequest>, AppError> {
    let created = upi_service::create_collect_request(
        &state.pool,
        &state.config,
        &request.payer_vpa,
        &request.payee_vpa,
        request.amount_paise,
    )
    .await?;

    Ok(Json(created))
}

/// Approve a pending collect request; runs the underlying transfer.
pub async fn approve_request(
    State(state): State<AppState>,
    Path(request_id): Path<Uuid>,
    Json(request): Json<ApproveRequest>,
) -> Result<Json<TransferResponse>, AppError> {
    let transaction_id =
        upi_service::approve_request(&state.pool, &state.config, request_id, &request.pin).await?;

    Ok(Json(TransferResponse { transaction_id }))
}

/// Reject a pending collect request.
pub async fn reject_request(
    State(state): State<AppState>,
    Path(request_id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    upi_service::reject_request(&state.pool, &state.config, request_id).await?;

    Ok(Json(serde_json::json!({ "status": "rejected" })))
}
