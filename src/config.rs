//! Application configuration management.
//!
//! This module handles loading configuration from environment variables.
//! It uses the `envy` crate to automatically deserialize environment variables into a type-safe struct.

use serde::Deserialize;

/// Application configuration loaded from environment variables.
///
/// # Environment Variables
///
/// - `DATABASE_URL` (required): PostgreSQL connection string
/// - `SERVER_PORT` (optional): HTTP server port, defaults to 3000
/// - `UPSTREAM_URL` (optional): analysis service the metered endpoint proxies to;
///   when unset the endpoint runs in local echo mode
/// - `UPSTREAM_TIMEOUT_SECS` (optional): upstream call timeout, defaults to 30
/// - `RATE_LIMIT_MAX_REQUESTS` (optional): requests allowed per window, defaults to 60
/// - `RATE_LIMIT_WINDOW_SECS` (optional): rate window length in seconds, defaults to 60
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub database_url: String,

    #[serde(default = "default_port")]
    pub server_port: u16,

    #[serde(default)]
    pub upstream_url: Option<String>,

    #[serde(default = "default_upstream_timeout")]
    pub upstream_timeout_secs: u64,

    #[serde(default = "default_rate_limit_max")]
    pub rate_limit_max_requests: u32,

    #[serde(default = "default_rate_limit_window")]
    pub rate_limit_window_secs: u64,
}

/// Default port if SERVER_PORT environment variable is not set.
fn default_port() -> u16 {
    3000
}

fn default_upstream_timeout() -> u64 {
    30
}

fn default_rate_limit_max() -> u32 {
    60
}

fn default_rate_limit_window() -> u64 {
    60
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// This method first attempts to load a `.env` file (which is optional),
    /// then reads environment variables and deserializes them into a Config struct.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Required environment variables are missing (e.g., DATABASE_URL)
    /// - Environment variable values cannot be parsed into expected types
    /// - `UPSTREAM_URL` is set but is not a valid http(s) URL
    pub fn from_env() -> anyhow::Result<Self> {
        // Try to load .env file if it exists (does nothing if not found)
        dotenvy::dotenv().ok();

        // Parse environment variables into Config struct
        // Field names are automatically converted: database_url -> DATABASE_URL
        let config = envy::from_env::<Config>()?;

        // Validate the upstream URL at startup, not on the first metered request
        if let Some(ref raw) = config.upstream_url {
            let parsed = url::Url::parse(raw)
                .map_err(|e| anyhow::anyhow!("UPSTREAM_URL is not a valid URL: {e}"))?;
            if parsed.scheme() != "http" && parsed.scheme() != "https" {
                anyhow::bail!("UPSTREAM_URL must use http or https");
            }
        }

        Ok(config)
    }
}
