//! Per-project rate limiting middleware.
//!
//! Runs after authentication, keyed by the resolved project id. A
//! rejection is a throttling signal (HTTP 429) only: no usage event is
//! recorded and no credits are consumed - the rate limiter is an
//! operational guard, fully independent from billing quota.

use crate::{AppState, error::AppError, middleware::auth::AuthContext};
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

/// Fixed-window throttle check for the authenticated project.
pub async fn rate_limit_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    // Auth middleware runs first and always inserts the context;
    // a missing one means the route was wired without auth
    let auth = request
        .extensions()
        .get::<AuthContext>()
        .copied()
        .ok_or(AppError::InvalidApiKey)?;

    if !state.rate_limiter.allow(auth.project_id) {
        tracing::debug!(project_id = auth.project_id, "request rate limited");
        return Err(AppError::RateLimited);
    }

    Ok(next.run(request).await)
}
