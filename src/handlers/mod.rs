//! HTTP request handlers (route handlers).
//!
//! Each handler is an async function that:
//! 1. Receives HTTP request data (JSON body, URL params, etc.)
//! 2. Performs business logic (database queries, validation)
//! 3. Returns HTTP response (JSON, status code)

/// Billing/quota read API and plan management
pub mod billing;
/// Service health endpoint
pub mod health;
/// API key lifecycle endpoints
pub mod keys;
/// The metered analysis endpoint
pub mod metered;
/// Project management endpoints
pub mod projects;
/// Usage aggregation read API
pub mod usage;
