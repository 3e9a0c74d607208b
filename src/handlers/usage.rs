//! Usage aggregation read API.
//!
//! Read-only rollup views over the usage event log, consumed by the
//! dashboard. Ownership checks happen in the external authorization
//! layer before these are called; handlers scope every query by the
//! project id in the path.

use crate::{
    AppState,
    error::AppError,
    models::usage_event::UsageEvent,
    services::usage_stats::{self, DailyBucket, HourlyBucket, MonthlyBucket, UsageStats},
};
use axum::{
    Json,
    extract::{Path, Query, State},
};
use chrono::NaiveDate;
use serde::Deserialize;

/// Query parameters for window-bounded views.
#[derive(Debug, Deserialize)]
pub struct WindowQuery {
    /// Look-back window in hours, default 24
    #[serde(default = "default_window_hours")]
    pub window_hours: i64,
}

fn default_window_hours() -> i64 {
    24
}

/// Query parameters for the billing-month history view.
#[derive(Debug, Deserialize)]
pub struct MonthsQuery {
    /// How many recent months to return, default 6
    #[serde(default = "default_month_limit")]
    pub limit: i64,
}

fn default_month_limit() -> i64 {
    6
}

/// Query parameters for the raw event view.
#[derive(Debug, Deserialize)]
pub struct EventsQuery {
    /// How many recent events to return, default 50
    #[serde(default = "default_event_limit")]
    pub limit: i64,
}

fn default_event_limit() -> i64 {
    50
}

/// Query parameter for the per-day view: a billing month label.
#[derive(Debug, Deserialize)]
pub struct MonthQuery {
    /// "YYYY-MM"
    pub month: String,
}

/// Query parameter for the per-hour view: a UTC calendar date.
#[derive(Debug, Deserialize)]
pub struct DateQuery {
    /// "YYYY-MM-DD"
    pub date: NaiveDate,
}

fn validate_window(window_hours: i64) -> Result<(), AppError> {
    // A year of hours is the widest window the dashboard ever asks for
    if !(1..=8760).contains(&window_hours) {
        return Err(AppError::InvalidRequest(
            "window_hours must be between 1 and 8760".to_string(),
        ));
    }
    Ok(())
}

/// Validate a "YYYY-MM" billing month label without touching storage.
fn validate_month_label(month: &str) -> Result<(), AppError> {
    let valid = month.len() == 7
        && month.as_bytes()[4] == b'-'
        && month[..4].chars().all(|c| c.is_ascii_digit())
        && month[5..].chars().all(|c| c.is_ascii_digit())
        && matches!(month[5..].parse::<u8>(), Ok(1..=12));

    if valid {
        Ok(())
    } else {
        Err(AppError::InvalidRequest(
            "month must be formatted as YYYY-MM".to_string(),
        ))
    }
}

/// `GET /api/v1/projects/{id}/usage/stats?window_hours=24`
///
/// Aggregate request count, success rate, average latency, and total
/// cost over the window.
pub async fn stats(
    State(state): State<AppState>,
    Path(project_id): Path<i64>,
    Query(query): Query<WindowQuery>,
) -> Result<Json<UsageStats>, AppError> {
    validate_window(query.window_hours)?;

    let stats = usage_stats::stats_since(&state.pool, project_id, query.window_hours).await?;
    Ok(Json(stats))
}

/// `GET /api/v1/projects/{id}/usage/by-hour?window_hours=24`
///
/// Per-hour buckets over the window, ascending; silent hours omitted.
pub async fn by_hour(
    State(state): State<AppState>,
    Path(project_id): Path<i64>,
    Query(query): Query<WindowQuery>,
) -> Result<Json<Vec<HourlyBucket>>, AppError> {
    validate_window(query.window_hours)?;

    let buckets = usage_stats::by_hour(&state.pool, project_id, query.window_hours).await?;
    Ok(Json(buckets))
}

/// `GET /api/v1/projects/{id}/usage/daily?month=2025-08`
///
/// Per-day buckets within one billing month (admin/ops view).
pub async fn daily(
    State(state): State<AppState>,
    Path(project_id): Path<i64>,
    Query(query): Query<MonthQuery>,
) -> Result<Json<Vec<DailyBucket>>, AppError> {
    validate_month_label(&query.month)?;

    let buckets = usage_stats::daily_usage(&state.pool, project_id, &query.month).await?;
    Ok(Json(buckets))
}

/// `GET /api/v1/projects/{id}/usage/hourly?date=2025-08-30`
///
/// Per-hour buckets for one UTC calendar date (admin/ops view).
pub async fn hourly(
    State(state): State<AppState>,
    Path(project_id): Path<i64>,
    Query(query): Query<DateQuery>,
) -> Result<Json<Vec<HourlyBucket>>, AppError> {
    let buckets = usage_stats::hourly_usage(&state.pool, project_id, query.date).await?;
    Ok(Json(buckets))
}

/// `GET /api/v1/projects/{id}/usage/months?limit=6`
///
/// Most recent billing months with request and cost rollups, newest
/// first.
pub async fn months(
    State(state): State<AppState>,
    Path(project_id): Path<i64>,
    Query(query): Query<MonthsQuery>,
) -> Result<Json<Vec<MonthlyBucket>>, AppError> {
    if !(1..=36).contains(&query.limit) {
        return Err(AppError::InvalidRequest(
            "limit must be between 1 and 36".to_string(),
        ));
    }

    let buckets = usage_stats::by_billing_month(&state.pool, project_id, query.limit).await?;
    Ok(Json(buckets))
}

/// `GET /api/v1/projects/{id}/usage/events?limit=50`
///
/// Raw recent events, newest first (ops/debugging view).
pub async fn events(
    State(state): State<AppState>,
    Path(project_id): Path<i64>,
    Query(query): Query<EventsQuery>,
) -> Result<Json<Vec<UsageEvent>>, AppError> {
    if !(1..=500).contains(&query.limit) {
        return Err(AppError::InvalidRequest(
            "limit must be between 1 and 500".to_string(),
        ));
    }

    let events = usage_stats::recent_events(&state.pool, project_id, query.limit).await?;
    Ok(Json(events))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn month_label_validation() {
        assert!(validate_month_label("2025-08").is_ok());
        assert!(validate_month_label("2024-12").is_ok());
        assert!(validate_month_label("2024-13").is_err());
        assert!(validate_month_label("2024-00").is_err());
        assert!(validate_month_label("202408").is_err());
        assert!(validate_month_label("2024-8").is_err());
        assert!(validate_month_label("abcd-ef").is_err());
    }

    #[test]
    fn window_bounds() {
        assert!(validate_window(1).is_ok());
        assert!(validate_window(8760).is_ok());
        assert!(validate_window(0).is_err());
        assert!(validate_window(-5).is_err());
        assert!(validate_window(9000).is_err());
    }
}
