//! HTTP request handlers (route handlers).
//!
//! Each handler is an async function that:
//! 1. Receives HTTP request data (JSON body, URL params, etc.)
//! 2. Delegates to the relevant service
//! 3. Returns HTTP response (JSON, status code)

/// Account management endpoints
pub mod accounts;
/// Health check endpoint
pub mod health;
/// UPI payment endpoint
pub mod payments;
/// Reward wallet and gift card endpoints
pub mod rewards;
/// Deposit/withdraw endpoints
pub mod transactions;
/// VPA directory, transfer, and collect request endpoints
pub mod upi;
