//! Business logic services.
//!
//! Services contain core business logic separated from HTTP handlers. Every
//! balance or coin mutation in the system happens here, inside a single
//! database transaction with the affected rows locked `FOR UPDATE`.

pub mod payment_service;
pub mod redeem_service;
pub mod rewards_service;
pub mod transaction_service;
pub mod upi_service;
