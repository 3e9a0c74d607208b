//! The metered operation: the endpoint API keys exist to call.
//!
//! `POST /api/v1/analyze` proxies the request body to the configured
//! upstream analysis service (or echoes locally when no upstream is
//! configured), and records exactly one usage event per call - success
//! or failure, including timeouts. Recording happens after the
//! operation so the measured latency covers the real work, and it can
//! never fail the response: the recorder swallows storage errors.

use crate::{
    AppState,
    error::AppError,
    middleware::auth::AuthContext,
    models::usage_event::NewUsageEvent,
    services::usage_recorder,
};
use axum::{Extension, Json, extract::State};
use serde_json::{Value, json};
use std::time::Instant;

/// Handle a metered analysis call.
///
/// # Endpoint
///
/// `POST /api/v1/analyze`
///
/// # Authentication
///
/// Requires a valid API key; runs behind the rate limiter. Rate-limited
/// requests are rejected before this handler and consume no credits.
///
/// # Metering
///
/// Every request that reaches this handler produces one usage event
/// carrying the project id, key id, outcome, and measured latency.
/// Upstream failures (including the 30s timeout) are recorded as
/// failure events and surfaced to the caller as 503.
pub async fn analyze(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, AppError> {
    let started = Instant::now();

    let outcome = run_analysis(&state, &body).await;
    let latency_ms = started.elapsed().as_millis() as i32;

    // Build the event for either path; the recorder cannot fail us
    let mut event = NewUsageEvent::call(
        auth.project_id,
        Some(auth.api_key_id),
        outcome.is_ok(),
        latency_ms,
    );
    event.endpoint = Some("/api/v1/analyze".to_string());
    event.method = Some("POST".to_string());

    match outcome {
        Ok(response) => {
            event.status_code = Some(200);
            usage_recorder::record(&state.pool, event).await;
            Ok(Json(response))
        }
        Err(message) => {
            event.status_code = Some(503);
            event.error_message = Some(message.clone());
            usage_recorder::record(&state.pool, event).await;
            tracing::warn!(project_id = auth.project_id, error = %message, "analysis failed");
            Err(AppError::Unavailable)
        }
    }
}

/// Run the analysis: proxy to the upstream when configured, otherwise
/// echo locally (development mode).
async fn run_analysis(state: &AppState, body: &Value) -> Result<Value, String> {
    let Some(ref upstream_url) = state.config.upstream_url else {
        // Local echo mode: no upstream configured
        return Ok(json!({
            "analyzed": true,
            "mode": "local",
            "input": body,
        }));
    };

    // The client carries the configured timeout (default 30s); a
    // timeout surfaces here as an Err and becomes a failure event
    let response = state
        .http
        .post(upstream_url)
        .json(body)
        .send()
        .await
        .map_err(|e| format!("upstream request failed: {e}"))?;

    if !response.status().is_success() {
        return Err(format!("upstream returned {}", response.status()));
    }

    response
        .json::<Value>()
        .await
        .map_err(|e| format!("upstream returned invalid JSON: {e}"))
}
