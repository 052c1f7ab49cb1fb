//! Bank ledger service - money-and-coins ledger engine.
//!
//! A REST API for accounts, deposits/withdrawals, UPI peer transfers,
//! payment processing with coin rewards, and gift-card redemption. Balances
//! and coin wallets live in PostgreSQL; every mutation runs inside a single
//! database transaction with the affected rows locked `FOR UPDATE`, so
//! concurrent requests against the same account or wallet serialize instead
//! of racing.
//!
//! # Architecture
//!
//! - **Web Framework**: Axum (async HTTP server)
//! - **Database**: PostgreSQL with sqlx (async queries)
//! - **Authentication**: API key with SHA-256 hashing
//! - **Format**: JSON requests/responses

pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod security;
pub mod services;

use axum::{
    Router, middleware as axum_middleware,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use crate::{config::Config, db::DbPool};

/// Shared application state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub config: Config,
}

/// Build the HTTP router.
///
/// Everything except `/health` sits behind the API-key middleware.
pub fn router(state: AppState) -> Router {
    // Create authenticated routes (API endpoints)
    let authenticated_routes = Router::new()
        // Account management routes
        .route("/api/v1/accounts", post(handlers::accounts::create_account))
        .route("/api/v1/accounts", get(handlers::accounts::list_accounts))
        .route(
            "/api/v1/accounts/{id}",
            get(handlers::accounts::get_account),
        )
        // Cash movement routes
        .route(
            "/api/v1/transactions/deposit",
            post(handlers::transactions::deposit),
        )
        .route(
            "/api/v1/transactions/withdraw",
            post(handlers::transactions::withdraw),
        )
        // Payment route
        .route("/api/v1/payments/upi", post(handlers::payments::upi_pay))
        // UPI directory, transfer, and collect request routes
        .route("/api/v1/upi/vpas", post(handlers::upi::create_vpa))
        .route("/api/v1/upi/vpas/search", get(handlers::upi::search_vpas))
        .route("/api/v1/upi/pin", post(handlers::upi::set_pin))
        .route("/api/v1/upi/transfer", post(handlers::upi::transfer))
        .route(
            "/api/v1/upi/requests",
            post(handlers::upi::create_collect_request),
        )
        .route(
            "/api/v1/upi/requests/{id}/approve",
            post(handlers::upi::approve_request),
        )
        .route(
            "/api/v1/upi/requests/{id}/reject",
            post(handlers::upi::reject_request),
        )
        // Rewards routes
        .route(
            "/api/v1/rewards/wallet",
            get(handlers::rewards::wallet_balance),
        )
        .route(
            "/api/v1/rewards/products",
            get(handlers::rewards::list_products),
        )
        .route("/api/v1/rewards/redeem", post(handlers::rewards::redeem))
        // Apply authentication middleware to all routes in this group
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::auth::auth_middleware,
        ));

    // Combine authenticated routes with public routes
    Router::new()
        // Public routes (no authentication required)
        .route("/health", get(handlers::health::health_check))
        // Merge authenticated routes
        .merge(authenticated_routes)
        // Add request tracing middleware for observability
        .layer(TraceLayer::new_for_http())
        // Share state with all handlers via State extraction
        .with_state(state)
}
