//! Key store - API key lifecycle (issue, resolve, revoke, list).
//!
//! Secrets are generated once and returned once; only their SHA-256
//! digest and a short display prefix are persisted. Lookups go through
//! the digest, so there is no way to recover a plaintext from storage.
//!
//! # Concurrency
//!
//! Digest uniqueness is enforced by the UNIQUE constraint on
//! `api_keys.key_hash`, not by a check-then-insert in the application.
//! Two concurrent issuances of a colliding secret (astronomically
//! unlikely at 32 bytes of entropy) fail the later writer with a
//! uniqueness violation, surfaced as an internal error.

use crate::{db::DbPool, error::AppError, models::api_key::ApiKey};
use sha2::{Digest, Sha256};

/// Scheme tag prepended to every generated secret.
const SECRET_SCHEME_TAG: &str = "sk_";

/// How many characters of the plaintext are kept as the display prefix.
const PREFIX_LEN: usize = 10;

/// Identity a resolved secret maps to.
///
/// This is what the auth middleware attaches to the request context.
#[derive(Debug, Clone, Copy, sqlx::FromRow)]
pub struct ResolvedKey {
    pub id: i64,
    pub project_id: i64,
}

/// Issue a new API key for a project.
///
/// # Process
///
/// 1. Validate the display name (non-empty after trimming)
/// 2. Generate a secret: `sk_` + 64 hex chars (32 random bytes)
/// 3. Compute the SHA-256 digest and display prefix
/// 4. Insert the record (digest, prefix, name - never the plaintext)
/// 5. Return the record together with the plaintext, shown exactly once
///
/// # Errors
///
/// - `InvalidRequest`: name is empty after trimming
/// - `Database`: insert failed (including a digest uniqueness violation)
pub async fn issue(
    pool: &DbPool,
    project_id: i64,
    name: &str,
) -> Result<(ApiKey, String), AppError> {
    // Validate before any storage I/O
    let name = name.trim();
    if name.is_empty() {
        return Err(AppError::InvalidRequest(
            "Key name must not be empty".to_string(),
        ));
    }

    let secret = generate_secret();
    let key_hash = digest(&secret);
    let key_prefix = display_prefix(&secret);

    let key = sqlx::query_as::<_, ApiKey>(
        r#"
        INSERT INTO api_keys (project_id, name, key_hash, key_prefix)
        VALUES ($1, $2, $3, $4)
        RETURNING *
        "#,
    )
    .bind(project_id)
    .bind(name)
    .bind(&key_hash)
    .bind(&key_prefix)
    .fetch_one(pool)
    .await?;

    // Audit line: id/name/project only. Never the plaintext or digest.
    tracing::info!(
        key_id = key.id,
        project_id,
        name = %key.name,
        "api key issued"
    );

    Ok((key, secret))
}

/// Resolve a plaintext secret to its owning project and key.
///
/// Returns `None` for unknown secrets AND for revoked keys - the two
/// cases are deliberately indistinguishable so a caller probing with
/// old secrets learns nothing about key status.
pub async fn resolve(pool: &DbPool, secret: &str) -> Result<Option<ResolvedKey>, AppError> {
    let key_hash = digest(secret);

    let resolved = sqlx::query_as::<_, ResolvedKey>(
        "SELECT id, project_id FROM api_keys WHERE key_hash = $1 AND status = 'active'",
    )
    .bind(&key_hash)
    .fetch_optional(pool)
    .await?;

    Ok(resolved)
}

/// Revoke an API key (soft state change, record is never deleted).
///
/// Returns `true` if a matching active key existed. Revoking a
/// non-existent or already-revoked key returns `false`, not an error -
/// the end state is the same either way.
pub async fn revoke(pool: &DbPool, key_id: i64, project_id: i64) -> Result<bool, AppError> {
    let result = sqlx::query(
        r#"
        UPDATE api_keys
        SET status = 'revoked',
            revoked_at = NOW()
        WHERE id = $1 AND project_id = $2 AND status = 'active'
        "#,
    )
    .bind(key_id)
    .bind(project_id)
    .execute(pool)
    .await?;

    let revoked = result.rows_affected() > 0;
    if revoked {
        tracing::info!(key_id, project_id, "api key revoked");
    }

    Ok(revoked)
}

/// List a project's active keys, newest first.
pub async fn list(pool: &DbPool, project_id: i64) -> Result<Vec<ApiKey>, AppError> {
    let keys = sqlx::query_as::<_, ApiKey>(
        r#"
        SELECT *
        FROM api_keys
        WHERE project_id = $1 AND status = 'active'
        ORDER BY created_at DESC
        "#,
    )
    .bind(project_id)
    .fetch_all(pool)
    .await?;

    Ok(keys)
}

/// Generate a cryptographically secure secret.
///
/// # Output
///
/// `sk_` followed by 64 hex characters (32 random bytes).
fn generate_secret() -> String {
    let bytes: [u8; 32] = rand::random();
    format!("{}{}", SECRET_SCHEME_TAG, hex::encode(bytes))
}

/// SHA-256 digest of a secret, hex encoded (64 characters).
fn digest(secret: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(secret.as_bytes());
    hex::encode(hasher.finalize())
}

/// Display prefix of a secret - safe to show in dashboards.
fn display_prefix(secret: &str) -> String {
    secret.chars().take(PREFIX_LEN).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn secret_has_scheme_tag_and_full_entropy() {
        let secret = generate_secret();
        assert!(secret.starts_with("sk_"));
        // 3 tag chars + 64 hex chars
        assert_eq!(secret.len(), 67);
        assert!(secret[3..].chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn secrets_are_unique_across_calls() {
        assert_ne!(generate_secret(), generate_secret());
    }

    #[test]
    fn digest_is_deterministic_and_fixed_length() {
        let a = digest("sk_example");
        let b = digest("sk_example");
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
    }

    #[test]
    fn digest_differs_on_single_character_change() {
        assert_ne!(digest("sk_example_a"), digest("sk_example_b"));
    }

    #[test]
    fn display_prefix_truncates() {
        let secret = generate_secret();
        let prefix = display_prefix(&secret);
        assert_eq!(prefix.len(), PREFIX_LEN);
        assert!(secret.starts_with(&prefix));
    }
}
