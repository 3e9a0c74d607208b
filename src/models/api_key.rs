//! API Key model and request/response types.
//!
//! API keys authenticate projects making metered requests. Only the
//! SHA-256 digest of the secret is stored; the plaintext exists exactly
//! once, in the issuance response.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Represents an API key record from the database.
///
/// # Database Table
///
/// Maps to the `api_keys` table with columns:
/// - `id`: Unique identifier
/// - `project_id`: Project this key belongs to
/// - `name`: Human-readable label for the key
/// - `key_hash`: SHA-256 hash of the actual secret (64 hex characters)
/// - `key_prefix`: First few characters of the plaintext, safe to display
/// - `status`: `active` or `revoked`
/// - `created_at` / `revoked_at`: lifecycle timestamps
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ApiKey {
    pub id: i64,

    /// Foreign key to the project that owns this key
    pub project_id: i64,

    pub name: String,

    /// SHA-256 hash of the secret (64 hex characters)
    ///
    /// When a request comes in with "Bearer sk_abc...", we:
    /// 1. Hash the token with SHA-256
    /// 2. Look up this hash in the database
    /// 3. If found and active, authenticate the request
    pub key_hash: String,

    /// Display prefix of the plaintext secret (e.g., "sk_3fa9c2d")
    pub key_prefix: String,

    /// `active` or `revoked`; revoked keys are rejected during
    /// authentication, which revokes access without deleting the record
    pub status: String,

    pub created_at: DateTime<Utc>,

    /// Set when the key is revoked, NULL while active
    pub revoked_at: Option<DateTime<Utc>>,
}

/// Request body for issuing a new API key.
///
/// ```json
/// { "name": "production backend" }
/// ```
#[derive(Debug, Deserialize)]
pub struct CreateApiKeyRequest {
    /// Display name for the new key (must be non-empty after trimming)
    pub name: String,
}

/// Response body for key listing endpoints.
///
/// Never contains the hash or the plaintext - only the display prefix.
#[derive(Debug, Serialize)]
pub struct ApiKeyResponse {
    pub id: i64,
    pub name: String,
    pub key_prefix: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

/// Response body for the issuance endpoint.
///
/// This is the only place the plaintext secret ever appears. It is not
/// persisted and cannot be retrieved again.
#[derive(Debug, Serialize)]
pub struct IssuedApiKeyResponse {
    pub id: i64,
    pub name: String,
    pub key_prefix: String,
    pub status: String,
    pub created_at: DateTime<Utc>,

    /// Full plaintext secret - shown once, store it now
    pub secret: String,
}

impl From<ApiKey> for ApiKeyResponse {
    fn from(key: ApiKey) -> Self {
        Self {
            id: key.id,
            name: key.name,
            key_prefix: key.key_prefix,
            status: key.status,
            created_at: key.created_at,
        }
    }
}

impl IssuedApiKeyResponse {
    /// Build the one-time issuance response from a stored record plus
    /// the transient plaintext.
    pub fn new(key: ApiKey, secret: String) -> Self {
        Self {
            id: key.id,
            name: key.name,
            key_prefix: key.key_prefix,
            status: key.status,
            created_at: key.created_at,
            secret,
        }
    }
}
