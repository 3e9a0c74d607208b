//! Usage aggregator - read-side rollups over the usage event log.
//!
//! Every function here is a pure read: one grouped aggregation query
//! per call, no mutable state, no N+1 loops. The write side lives in
//! `usage_recorder`.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::Serialize;

use crate::{db::DbPool, error::AppError, models::usage_event::UsageEvent};

/// Aggregate stats over a recent time window.
#[derive(Debug, Serialize)]
pub struct UsageStats {
    pub total_requests: i64,
    /// Percentage, 0.0 when there were no requests
    pub success_rate: f64,
    pub avg_response_time_ms: f64,
    pub total_cost: f64,
}

/// One hour's worth of activity. Used by both the recent by-hour view
/// and the per-date hourly breakdown.
#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct HourlyBucket {
    /// Hour boundary (UTC, truncated)
    pub hour: DateTime<Utc>,
    pub request_count: i64,
    pub cost: f64,
}

/// One UTC calendar day's worth of activity within a billing month.
#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct DailyBucket {
    pub day: NaiveDate,
    pub request_count: i64,
    pub cost: f64,
}

/// Rollup for one billing month.
#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct MonthlyBucket {
    pub billing_month: String,
    pub request_count: i64,
    pub credits_used: i64,
    pub cost: f64,
}

#[derive(sqlx::FromRow)]
struct StatsRow {
    total_requests: i64,
    successful_requests: i64,
    avg_response_time_ms: f64,
    total_cost: f64,
}

/// Success percentage, guarding the zero-request case.
fn success_rate(successful: i64, total: i64) -> f64 {
    if total == 0 {
        0.0
    } else {
        successful as f64 * 100.0 / total as f64
    }
}

/// Aggregate stats for events newer than `now - window_hours`.
pub async fn stats_since(
    pool: &DbPool,
    project_id: i64,
    window_hours: i64,
) -> Result<UsageStats, AppError> {
    let since = Utc::now() - Duration::hours(window_hours);

    let row = sqlx::query_as::<_, StatsRow>(
        r#"
        SELECT
            COUNT(*) AS total_requests,
            COUNT(*) FILTER (WHERE success) AS successful_requests,
            COALESCE(AVG(response_time_ms), 0)::double precision AS avg_response_time_ms,
            COALESCE(SUM(cost), 0)::double precision AS total_cost
        FROM usage_events
        WHERE project_id = $1 AND created_at >= $2
        "#,
    )
    .bind(project_id)
    .bind(since)
    .fetch_one(pool)
    .await?;

    Ok(UsageStats {
        total_requests: row.total_requests,
        success_rate: success_rate(row.successful_requests, row.total_requests),
        avg_response_time_ms: row.avg_response_time_ms,
        total_cost: row.total_cost,
    })
}

/// Per-hour activity for the last `window_hours`, ascending by hour.
/// Hours with zero events are simply absent.
pub async fn by_hour(
    pool: &DbPool,
    project_id: i64,
    window_hours: i64,
) -> Result<Vec<HourlyBucket>, AppError> {
    let since = Utc::now() - Duration::hours(window_hours);

    let buckets = sqlx::query_as::<_, HourlyBucket>(
        r#"
        SELECT
            date_trunc('hour', created_at) AS hour,
            COUNT(*) AS request_count,
            COALESCE(SUM(cost), 0)::double precision AS cost
        FROM usage_events
        WHERE project_id = $1 AND created_at >= $2
        GROUP BY hour
        ORDER BY hour ASC
        "#,
    )
    .bind(project_id)
    .bind(since)
    .fetch_all(pool)
    .await?;

    Ok(buckets)
}

/// Per-day activity within one billing month ("YYYY-MM"), ascending by
/// UTC calendar date. Filters on the stored `billing_month` label, so
/// no timezone arithmetic happens at read time.
pub async fn daily_usage(
    pool: &DbPool,
    project_id: i64,
    billing_month: &str,
) -> Result<Vec<DailyBucket>, AppError> {
    let buckets = sqlx::query_as::<_, DailyBucket>(
        r#"
        SELECT
            (created_at AT TIME ZONE 'UTC')::date AS day,
            COUNT(*) AS request_count,
            COALESCE(SUM(cost), 0)::double precision AS cost
        FROM usage_events
        WHERE project_id = $1 AND billing_month = $2
        GROUP BY day
        ORDER BY day ASC
        "#,
    )
    .bind(project_id)
    .bind(billing_month)
    .fetch_all(pool)
    .await?;

    Ok(buckets)
}

/// Per-hour activity for one UTC calendar date, ascending by hour.
pub async fn hourly_usage(
    pool: &DbPool,
    project_id: i64,
    date: NaiveDate,
) -> Result<Vec<HourlyBucket>, AppError> {
    let buckets = sqlx::query_as::<_, HourlyBucket>(
        r#"
        SELECT
            date_trunc('hour', created_at) AS hour,
            COUNT(*) AS request_count,
            COALESCE(SUM(cost), 0)::double precision AS cost
        FROM usage_events
        WHERE project_id = $1 AND (created_at AT TIME ZONE 'UTC')::date = $2
        GROUP BY hour
        ORDER BY hour ASC
        "#,
    )
    .bind(project_id)
    .bind(date)
    .fetch_all(pool)
    .await?;

    Ok(buckets)
}

/// The most recent `limit` billing months with request and cost
/// rollups, newest month first.
pub async fn by_billing_month(
    pool: &DbPool,
    project_id: i64,
    limit: i64,
) -> Result<Vec<MonthlyBucket>, AppError> {
    let buckets = sqlx::query_as::<_, MonthlyBucket>(
        r#"
        SELECT
            billing_month,
            COUNT(*) AS request_count,
            COALESCE(SUM(credits_used), 0)::bigint AS credits_used,
            COALESCE(SUM(cost), 0)::double precision AS cost
        FROM usage_events
        WHERE project_id = $1
        GROUP BY billing_month
        ORDER BY billing_month DESC
        LIMIT $2
        "#,
    )
    .bind(project_id)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(buckets)
}

/// The most recent raw events for a project, newest first. Ops view
/// for debugging a tenant's traffic; everything else reads rollups.
pub async fn recent_events(
    pool: &DbPool,
    project_id: i64,
    limit: i64,
) -> Result<Vec<UsageEvent>, AppError> {
    let events = sqlx::query_as::<_, UsageEvent>(
        r#"
        SELECT *
        FROM usage_events
        WHERE project_id = $1
        ORDER BY created_at DESC
        LIMIT $2
        "#,
    )
    .bind(project_id)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(events)
}

/// Total credits consumed by a project in one billing month. This is
/// the number the quota engine compares against the plan's quota.
pub async fn credits_used_in_month(
    pool: &DbPool,
    project_id: i64,
    billing_month: &str,
) -> Result<i64, AppError> {
    let used: i64 = sqlx::query_scalar(
        r#"
        SELECT COALESCE(SUM(credits_used), 0)::bigint
        FROM usage_events
        WHERE project_id = $1 AND billing_month = $2
        "#,
    )
    .bind(project_id)
    .bind(billing_month)
    .fetch_one(pool)
    .await?;

    Ok(used)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_rate_is_zero_for_no_requests() {
        assert_eq!(success_rate(0, 0), 0.0);
    }

    #[test]
    fn success_rate_is_a_percentage() {
        assert_eq!(success_rate(3, 4), 75.0);
        assert_eq!(success_rate(10, 10), 100.0);
        assert_eq!(success_rate(0, 5), 0.0);
    }
}
