//! Error types and HTTP error response handling.
//!
//! This module defines all application errors and how they are converted
//! into HTTP responses with appropriate status codes and JSON bodies.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

/// Application-wide error type.
///
/// This enum represents all possible errors that can occur in the application.
/// Each variant maps to a specific HTTP status code and error message.
///
/// # Error Categories
///
/// - **Database Errors**: Any sqlx::Error from database operations
/// - **Authentication Errors**: Missing, unknown, or revoked API keys
/// - **Throttling**: Rate limiter rejections
/// - **Resource Errors**: Projects, keys, or plans that don't exist (or
///   aren't owned by the caller - same response, no existence leak)
/// - **Validation Errors**: Invalid request data, rejected before any storage I/O
/// - **Availability**: Billing lookups over partial/inconsistent state
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Database operation failed (e.g., connection error, query error).
    ///
    /// This wraps any sqlx::Error using the `#[from]` attribute, which
    /// automatically implements `From<sqlx::Error> for AppError`.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// API key is missing, unknown, or revoked.
    ///
    /// All three cases return the same 401 response so callers cannot
    /// distinguish a revoked key from a never-issued secret.
    #[error("Invalid API key")]
    InvalidApiKey,

    /// Too many requests from this identity in the current rate window.
    ///
    /// Returns HTTP 429 Too Many Requests. Distinct from quota status,
    /// which is advisory and never rejects a call.
    #[error("Rate limit exceeded")]
    RateLimited,

    /// Requested project does not exist or doesn't belong to the caller.
    #[error("Project not found")]
    ProjectNotFound,

    /// Requested API key does not exist, is already revoked, or belongs
    /// to a different project.
    #[error("API key not found")]
    KeyNotFound,

    /// Referenced plan does not exist in the catalog.
    #[error("Plan not found")]
    PlanNotFound,

    /// Request body or parameters are invalid.
    ///
    /// Returns HTTP 400 Bad Request.
    /// The String contains details about what was invalid.
    #[error("Invalid request")]
    InvalidRequest(String),

    /// A billing lookup could not resolve its dependent records
    /// (project or plan), implying partial state rather than a simple
    /// missing row. Returns HTTP 503.
    #[error("Service temporarily unavailable")]
    Unavailable,
}

/// Convert AppError into an HTTP response.
///
/// This implementation allows Axum handlers to return `Result<T, AppError>`
/// and have errors automatically converted to proper HTTP responses.
///
/// # Response Format
///
/// All errors return JSON in this format:
/// ```json
/// {
///   "error": {
///     "code": "error_type",
///     "message": "Human-readable error message"
///   }
/// }
/// ```
///
/// # Status Code Mapping
///
/// - `InvalidApiKey` → 401 Unauthorized
/// - `RateLimited` → 429 Too Many Requests
/// - `ProjectNotFound` / `KeyNotFound` / `PlanNotFound` → 404 Not Found
/// - `InvalidRequest` → 400 Bad Request
/// - `Unavailable` → 503 Service Unavailable
/// - `Database` → 500 Internal Server Error (hides details from client)
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Map each error variant to (HTTP status, error code, message)
        let (status, code, message) = match self {
            AppError::InvalidApiKey => (
                StatusCode::UNAUTHORIZED,
                "invalid_api_key",
                self.to_string(),
            ),
            AppError::RateLimited => (
                StatusCode::TOO_MANY_REQUESTS,
                "rate_limited",
                self.to_string(),
            ),
            AppError::ProjectNotFound => {
                (StatusCode::NOT_FOUND, "project_not_found", self.to_string())
            }
            AppError::KeyNotFound => (StatusCode::NOT_FOUND, "key_not_found", self.to_string()),
            AppError::PlanNotFound => (StatusCode::NOT_FOUND, "plan_not_found", self.to_string()),
            AppError::InvalidRequest(ref msg) => {
                (StatusCode::BAD_REQUEST, "invalid_request", msg.clone())
            }
            AppError::Unavailable => (
                StatusCode::SERVICE_UNAVAILABLE,
                "unavailable",
                self.to_string(),
            ),
            AppError::Database(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                "An internal error occurred".to_string(),
            ),
        };

        // Build JSON response body
        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        // Return the response with status code and JSON body
        (status, body).into_response()
    }
}
