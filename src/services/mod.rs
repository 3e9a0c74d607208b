//! Business logic services.
//!
//! Services contain core business logic separated from HTTP handlers.
//! They handle storage access, validation, and the metering pipeline.

pub mod billing_service;
pub mod key_service;
pub mod plan_service;
pub mod rate_limiter;
pub mod usage_recorder;
pub mod usage_stats;
