//! Quota/billing engine - combines a project's plan with the current
//! billing month's usage rollup.
//!
//! This engine is advisory by design: it classifies quota status for
//! dashboards and warnings but never rejects a metered call. Exceeding
//! quota changes what the UI shows, not admission control. That is a
//! deliberate product decision - do not bolt hard enforcement onto
//! these functions.

use chrono::{DateTime, Datelike, Duration, TimeZone, Utc};
use serde::Serialize;

use crate::{
    db::DbPool,
    error::AppError,
    models::project::Project,
    services::{plan_service, usage_recorder::billing_month_of, usage_stats},
};

/// Fraction of quota at which a project is flagged as nearing its limit.
const NEARING_LIMIT_NUMERATOR: i64 = 4;
const NEARING_LIMIT_DENOMINATOR: i64 = 5;

/// Quota status classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QuotaClassification {
    Normal,
    NearingLimit,
    OverQuota,
}

/// Current billing month's usage against the project's plan.
#[derive(Debug, Serialize)]
pub struct UsageSummary {
    pub project_id: i64,
    pub plan_id: String,
    pub billing_month: String,
    pub credits_used: i64,
    /// 0 means unlimited/custom
    pub credit_quota: i64,
    pub percent_used: f64,
    pub period_start: DateTime<Utc>,
    pub period_end: DateTime<Utc>,
}

/// [`UsageSummary`] plus its classification.
#[derive(Debug, Serialize)]
pub struct QuotaStatusReport {
    #[serde(flatten)]
    pub summary: UsageSummary,
    pub status: QuotaClassification,
}

/// [`QuotaStatusReport`] plus the remaining-credit preview.
#[derive(Debug, Serialize)]
pub struct BillingPreview {
    #[serde(flatten)]
    pub report: QuotaStatusReport,
    pub credits_remaining: i64,
}

/// Classify usage against a quota.
///
/// Pure function of its inputs:
/// - `over_quota` when `used > quota`
/// - `nearing_limit` when `used >= quota * 0.8`
/// - `normal` otherwise
///
/// A quota of 0 means unlimited, which is always `normal`. The 0.8
/// threshold is compared in integer arithmetic (`used * 5 >= quota * 4`)
/// so fractional quotas can't produce float boundary surprises.
pub fn classify(used: i64, quota: i64) -> QuotaClassification {
    if quota <= 0 {
        return QuotaClassification::Normal;
    }
    if used > quota {
        QuotaClassification::OverQuota
    } else if used * NEARING_LIMIT_DENOMINATOR >= quota * NEARING_LIMIT_NUMERATOR {
        QuotaClassification::NearingLimit
    } else {
        QuotaClassification::Normal
    }
}

/// Remaining credits, floored at zero.
pub fn credits_remaining(used: i64, quota: i64) -> i64 {
    (quota - used).max(0)
}

/// Billing period bounds for the calendar month containing `at`.
///
/// Start is the first instant of the UTC month; end is its last
/// millisecond (23:59:59.999 on the month's final day). Uses real
/// calendar month lengths - February 2024 ends on the 29th, not after
/// a fixed 30 days.
pub fn billing_period(at: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = month_start(at.year(), at.month());

    let (next_year, next_month) = if at.month() == 12 {
        (at.year() + 1, 1)
    } else {
        (at.year(), at.month() + 1)
    };
    let next_start = month_start(next_year, next_month);

    (start, next_start - Duration::milliseconds(1))
}

/// Midnight UTC on day 1 of the given month.
fn month_start(year: i32, month: u32) -> DateTime<Utc> {
    match Utc.with_ymd_and_hms(year, month, 1, 0, 0, 0) {
        chrono::LocalResult::Single(start) => start,
        _ => unreachable!("day 1 at midnight UTC is a single valid instant"),
    }
}

/// Resolve a project's current-month usage against its plan quota.
///
/// Returns `Ok(None)` when the project or its plan cannot be resolved -
/// callers surface that as `Unavailable` rather than crashing, since a
/// project pointing at a missing plan is partial state, not a normal
/// not-found.
pub async fn usage_summary(
    pool: &DbPool,
    project_id: i64,
) -> Result<Option<UsageSummary>, AppError> {
    let Some(project) = sqlx::query_as::<_, Project>("SELECT * FROM projects WHERE id = $1")
        .bind(project_id)
        .fetch_optional(pool)
        .await?
    else {
        return Ok(None);
    };

    // Quota comes from the plan catalog, never a local copy
    let Some(plan) = plan_service::get_by_id(pool, &project.plan_id).await? else {
        return Ok(None);
    };

    let now = Utc::now();
    let billing_month = billing_month_of(now);
    let credits_used = usage_stats::credits_used_in_month(pool, project_id, &billing_month).await?;
    let (period_start, period_end) = billing_period(now);

    let percent_used = if plan.monthly_credits > 0 {
        credits_used as f64 * 100.0 / plan.monthly_credits as f64
    } else {
        0.0
    };

    Ok(Some(UsageSummary {
        project_id,
        plan_id: plan.id,
        billing_month,
        credits_used,
        credit_quota: plan.monthly_credits,
        percent_used,
        period_start,
        period_end,
    }))
}

/// [`usage_summary`] plus the status classification.
pub async fn quota_status(
    pool: &DbPool,
    project_id: i64,
) -> Result<Option<QuotaStatusReport>, AppError> {
    let Some(summary) = usage_summary(pool, project_id).await? else {
        return Ok(None);
    };

    let status = classify(summary.credits_used, summary.credit_quota);
    Ok(Some(QuotaStatusReport { summary, status }))
}

/// [`quota_status`] plus the remaining-credit preview.
pub async fn billing_preview(
    pool: &DbPool,
    project_id: i64,
) -> Result<Option<BillingPreview>, AppError> {
    let Some(report) = quota_status(pool, project_id).await? else {
        return Ok(None);
    };

    let remaining = credits_remaining(report.summary.credits_used, report.summary.credit_quota);
    Ok(Some(BillingPreview {
        report,
        credits_remaining: remaining,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classification_is_pure() {
        assert_eq!(classify(500, 1000), classify(500, 1000));
        assert_eq!(classify(1001, 1000), classify(1001, 1000));
    }

    #[test]
    fn status_transitions_at_documented_boundaries() {
        // Quota 1000: normal below 800, nearing from 800 through 1000,
        // over from 1001
        assert_eq!(classify(0, 1000), QuotaClassification::Normal);
        assert_eq!(classify(799, 1000), QuotaClassification::Normal);
        assert_eq!(classify(800, 1000), QuotaClassification::NearingLimit);
        assert_eq!(classify(1000, 1000), QuotaClassification::NearingLimit);
        assert_eq!(classify(1001, 1000), QuotaClassification::OverQuota);
    }

    #[test]
    fn odd_quotas_use_exact_fraction() {
        // 0.8 * 5 = 4, so 4/5 is nearing but 3/5 is not
        assert_eq!(classify(3, 5), QuotaClassification::Normal);
        assert_eq!(classify(4, 5), QuotaClassification::NearingLimit);
    }

    #[test]
    fn unlimited_quota_never_warns() {
        assert_eq!(classify(1_000_000, 0), QuotaClassification::Normal);
    }

    #[test]
    fn credits_remaining_never_negative() {
        assert_eq!(credits_remaining(1001, 1000), 0);
        assert_eq!(credits_remaining(5000, 1000), 0);
        assert_eq!(credits_remaining(200, 1000), 800);
        assert_eq!(credits_remaining(1000, 1000), 0);
    }

    #[test]
    fn billing_period_uses_calendar_month_length() {
        // February 2024 is a leap month: 29 days
        let at = Utc.with_ymd_and_hms(2024, 2, 10, 8, 0, 0).unwrap();
        let (start, end) = billing_period(at);
        assert_eq!(start, Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap());
        assert_eq!(end.day(), 29);
        assert_eq!(
            end,
            Utc.with_ymd_and_hms(2024, 2, 29, 23, 59, 59).unwrap() + Duration::milliseconds(999)
        );
    }

    #[test]
    fn billing_period_handles_december_rollover() {
        let at = Utc.with_ymd_and_hms(2025, 12, 31, 23, 0, 0).unwrap();
        let (start, end) = billing_period(at);
        assert_eq!(start, Utc.with_ymd_and_hms(2025, 12, 1, 0, 0, 0).unwrap());
        assert_eq!(end.year(), 2025);
        assert_eq!(end.month(), 12);
        assert_eq!(end.day(), 31);
    }

    #[test]
    fn thirty_day_months_end_on_the_thirtieth() {
        let at = Utc.with_ymd_and_hms(2024, 4, 15, 0, 0, 0).unwrap();
        let (_, end) = billing_period(at);
        assert_eq!(end.day(), 30);
    }
}
