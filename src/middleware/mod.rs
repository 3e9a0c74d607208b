//! HTTP middleware components.
//!
//! Middleware are functions that run before route handlers.
//! They can:
//! - Authenticate requests
//! - Throttle requests per project
//! - Modify request/response
//! - Short-circuit requests (reject unauthorized or throttled)

/// API key authentication middleware
pub mod auth;
/// Fixed-window rate limiting middleware
pub mod rate_limit;
