//! API key management HTTP handlers.
//!
//! This module implements the key lifecycle endpoints:
//! - POST /api/v1/projects/{project_id}/keys - Issue a new key
//! - GET /api/v1/projects/{project_id}/keys - List active keys
//! - DELETE /api/v1/projects/{project_id}/keys/{key_id} - Revoke a key
//!
//! Ownership of the project is verified by the external authorization
//! layer before these handlers run; every query here is still scoped by
//! project id so a stale or forged path cannot cross tenants.

use crate::{
    AppState,
    error::AppError,
    models::api_key::{ApiKeyResponse, CreateApiKeyRequest, IssuedApiKeyResponse},
    services::key_service,
};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

/// Issue a new API key for a project.
///
/// # Endpoint
///
/// `POST /api/v1/projects/{project_id}/keys`
///
/// # Request Body
///
/// ```json
/// { "name": "production backend" }
/// ```
///
/// # Response
///
/// - **Success (201 Created)**: the key record plus the plaintext
///   secret. The secret appears here and nowhere else - it is not
///   stored and cannot be fetched again.
/// - **Error (400)**: empty key name
/// - **Error (404)**: project does not exist
pub async fn issue_key(
    State(state): State<AppState>,
    Path(project_id): Path<i64>,
    Json(request): Json<CreateApiKeyRequest>,
) -> Result<(StatusCode, Json<IssuedApiKeyResponse>), AppError> {
    // A missing project should be a clean 404, not a foreign-key error
    let project_exists: bool =
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM projects WHERE id = $1)")
            .bind(project_id)
            .fetch_one(&state.pool)
            .await?;
    if !project_exists {
        return Err(AppError::ProjectNotFound);
    }

    let (key, secret) = key_service::issue(&state.pool, project_id, &request.name).await?;

    Ok((
        StatusCode::CREATED,
        Json(IssuedApiKeyResponse::new(key, secret)),
    ))
}

/// List a project's active keys, newest first.
///
/// # Endpoint
///
/// `GET /api/v1/projects/{project_id}/keys`
///
/// Responses never include the key hash, only the display prefix.
pub async fn list_keys(
    State(state): State<AppState>,
    Path(project_id): Path<i64>,
) -> Result<Json<Vec<ApiKeyResponse>>, AppError> {
    let keys = key_service::list(&state.pool, project_id).await?;

    Ok(Json(keys.into_iter().map(Into::into).collect()))
}

/// Revoke an API key.
///
/// # Endpoint
///
/// `DELETE /api/v1/projects/{project_id}/keys/{key_id}`
///
/// # Response
///
/// - **Success (204 No Content)**: key was active and is now revoked
/// - **Error (404)**: key doesn't exist, is already revoked, or belongs
///   to another project - all indistinguishable by design
pub async fn revoke_key(
    State(state): State<AppState>,
    Path((project_id, key_id)): Path<(i64, i64)>,
) -> Result<StatusCode, AppError> {
    let revoked = key_service::revoke(&state.pool, key_id, project_id).await?;

    if !revoked {
        return Err(AppError::KeyNotFound);
    }

    Ok(StatusCode::NO_CONTENT)
}
