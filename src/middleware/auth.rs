//! API key authentication middleware.
//!
//! This middleware intercepts every metered request to:
//! 1. Extract the API key from the Authorization header
//! 2. Resolve it through the key store (digest lookup, active keys only)
//! 3. Inject authentication context into the request
//! 4. Reject unauthorized requests with HTTP 401

use crate::{AppState, error::AppError, services::key_service};
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

/// Authentication context attached to authenticated requests.
///
/// This struct is inserted into the request's extension map and can be
/// extracted by route handlers to know which project and key made the
/// request - the recorder stamps both onto the usage event.
#[derive(Debug, Clone, Copy)]
pub struct AuthContext {
    /// Project the resolved key belongs to
    pub project_id: i64,

    /// ID of the authenticated API key
    pub api_key_id: i64,
}

/// API key authentication middleware function.
///
/// # Flow
///
/// 1. Extract `Authorization: Bearer <secret>` header from request
/// 2. Resolve the secret via the key store (SHA-256 digest lookup)
/// 3. If resolved: inject `AuthContext` into request, call next handler
/// 4. If not: return 401 Unauthorized
///
/// # No oracle
///
/// A malformed header, an unknown secret, and a revoked key's old
/// secret all produce the identical `InvalidApiKey` response. Nothing
/// in the status code or body reveals which case occurred.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    // Step 1: Extract Authorization header
    let auth_header = request
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .ok_or(AppError::InvalidApiKey)?;

    // Step 2: Extract Bearer token
    // Expected format: "Bearer sk_<hex>"
    let secret = auth_header
        .strip_prefix("Bearer ")
        .ok_or(AppError::InvalidApiKey)?;

    // Step 3: Resolve through the key store
    let resolved = key_service::resolve(&state.pool, secret)
        .await?
        .ok_or(AppError::InvalidApiKey)?;

    // Step 4: Inject context into request extensions
    // Route handlers can now extract this using Extension<AuthContext>
    request.extensions_mut().insert(AuthContext {
        project_id: resolved.project_id,
        api_key_id: resolved.id,
    });

    // Step 5: Call the next middleware/handler
    Ok(next.run(request).await)
}
