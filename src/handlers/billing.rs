//! Billing/quota read API and plan management.
//!
//! - GET /api/v1/projects/{id}/billing/summary - current month usage vs quota
//! - GET /api/v1/projects/{id}/billing/status - summary + classification
//! - GET /api/v1/projects/{id}/billing/preview - status + credits remaining
//! - GET /api/v1/plans - active plan tiers
//! - PUT /api/v1/projects/{id}/plan - reassign the project's plan
//!
//! All billing views are advisory: an over-quota project still gets
//! HTTP 200 on its metered calls. The engine returning `None` (project
//! or plan unresolvable) surfaces as 503, distinct from a plain 404.

use crate::{
    AppState,
    error::AppError,
    models::{plan::Plan, project::ChangePlanRequest},
    services::{
        billing_service::{self, BillingPreview, QuotaStatusReport, UsageSummary},
        plan_service,
    },
};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

/// `GET /api/v1/projects/{id}/billing/summary`
pub async fn summary(
    State(state): State<AppState>,
    Path(project_id): Path<i64>,
) -> Result<Json<UsageSummary>, AppError> {
    let summary = billing_service::usage_summary(&state.pool, project_id)
        .await?
        .ok_or(AppError::Unavailable)?;

    Ok(Json(summary))
}

/// `GET /api/v1/projects/{id}/billing/status`
pub async fn status(
    State(state): State<AppState>,
    Path(project_id): Path<i64>,
) -> Result<Json<QuotaStatusReport>, AppError> {
    let report = billing_service::quota_status(&state.pool, project_id)
        .await?
        .ok_or(AppError::Unavailable)?;

    Ok(Json(report))
}

/// `GET /api/v1/projects/{id}/billing/preview`
pub async fn preview(
    State(state): State<AppState>,
    Path(project_id): Path<i64>,
) -> Result<Json<BillingPreview>, AppError> {
    let preview = billing_service::billing_preview(&state.pool, project_id)
        .await?
        .ok_or(AppError::Unavailable)?;

    Ok(Json(preview))
}

/// `GET /api/v1/plans`
///
/// Active tiers only, ascending by quota.
pub async fn list_plans(State(state): State<AppState>) -> Result<Json<Vec<Plan>>, AppError> {
    let plans = plan_service::list(&state.pool).await?;
    Ok(Json(plans))
}

/// `PUT /api/v1/projects/{id}/plan`
///
/// Reassign which tier the project is measured against. The caller's
/// user id must match the project owner. No proration, no charge -
/// only future quota lookups change.
pub async fn change_plan(
    State(state): State<AppState>,
    Path(project_id): Path<i64>,
    Json(request): Json<ChangePlanRequest>,
) -> Result<StatusCode, AppError> {
    plan_service::change_plan(&state.pool, project_id, &request.plan_id, request.user_id).await?;

    Ok(StatusCode::NO_CONTENT)
}
