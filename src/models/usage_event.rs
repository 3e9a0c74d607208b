//! Usage event model - the append-only metering log.
//!
//! One row per metered call. Rows are immutable: nothing in the
//! application updates or deletes them, and all billing/usage reads are
//! aggregations over this table.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// A stored usage event.
#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct UsageEvent {
    pub id: i64,
    pub project_id: i64,
    pub api_key_id: Option<i64>,
    pub success: bool,
    pub error_message: Option<String>,
    pub response_time_ms: i32,

    /// Always 1 under the current pricing rule; kept per-row so the
    /// rule can change without rewriting history
    pub credits_used: i32,

    /// UTC calendar month label ("YYYY-MM"), derived from `created_at`
    /// at write time and never recomputed on read
    pub billing_month: String,

    pub endpoint: Option<String>,
    pub method: Option<String>,
    pub status_code: Option<i32>,
    pub tokens_used: Option<i32>,
    pub cost: Option<f64>,
    pub created_at: DateTime<Utc>,
}

/// Input for the usage recorder: everything the caller knows about a
/// metered call. `credits_used` and `billing_month` are derived by the
/// recorder, not supplied here.
#[derive(Debug, Clone)]
pub struct NewUsageEvent {
    pub project_id: i64,
    pub api_key_id: Option<i64>,
    pub success: bool,
    pub error_message: Option<String>,
    pub response_time_ms: i32,
    pub endpoint: Option<String>,
    pub method: Option<String>,
    pub status_code: Option<i32>,
    pub tokens_used: Option<i32>,
    pub cost: Option<f64>,

    /// Event timestamp; `None` means "now". Carried explicitly so the
    /// billing month is derived from the event's own time, not from
    /// whenever the insert happens to run.
    pub timestamp: Option<DateTime<Utc>>,
}

impl NewUsageEvent {
    /// Convenience constructor for the common case: a metered call with
    /// a latency measurement and an outcome.
    pub fn call(project_id: i64, api_key_id: Option<i64>, success: bool, latency_ms: i32) -> Self {
        Self {
            project_id,
            api_key_id,
            success,
            error_message: None,
            response_time_ms: latency_ms,
            endpoint: None,
            method: None,
            status_code: None,
            tokens_used: None,
            cost: None,
            timestamp: None,
        }
    }
}
