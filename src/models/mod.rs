//! Data models representing database entities.
//!
//! This module contains all data structures that map to database tables.

/// API key authentication model
pub mod api_key;
/// Plan catalog model
pub mod plan;
/// Project (tenant) model
pub mod project;
/// Append-only usage event model
pub mod usage_event;
