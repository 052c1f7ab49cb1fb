//! Data models representing database entities.
//!
//! This module contains all data structures that map to database tables,
//! plus the request/response types the HTTP layer exchanges with clients.

/// Bank account model
pub mod account;
/// Gift card catalog and redemption models
pub mod gift_card;
/// Payment record and UPI payment request/response models
pub mod payment;
/// Reward wallet, ledger, and daily summary models
pub mod reward;
/// Transaction ledger model
pub mod transaction;
/// UPI virtual payment address and collect request models
pub mod upi;
/// User (caller) model
pub mod user;
