//! Metering Service - Main Application Entry Point
//!
//! This is the usage metering and quota/billing backend for the
//! developer platform. It issues API keys per project, throttles and
//! meters every key-authenticated call into an append-only usage event
//! log, and serves billing/usage rollups derived from that log.
//!
//! # Architecture
//!
//! - **Web Framework**: Axum (async HTTP server)
//! - **Database**: PostgreSQL with sqlx (async queries)
//! - **Authentication**: API key with SHA-256 hashing
//! - **Throttling**: in-process fixed-window rate limiter per project
//! - **Format**: JSON requests/responses
//!
//! # Startup Flow
//!
//! 1. Load configuration from environment variables
//! 2. Create database connection pool
//! 3. Run database migrations
//! 4. Seed the plan catalog (idempotent)
//! 5. Build HTTP router with routes and middleware
//! 6. Start server on configured port

mod config;
mod db;
mod error;
mod handlers;
mod middleware;
mod models;
mod services;

use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::EnvFilter;

use axum::{
    Router, middleware as axum_middleware,
    routing::{delete, get, patch, post, put},
};
use tower_http::trace::TraceLayer;

use crate::services::rate_limiter::RateLimiter;

/// Shared application state, cloned into every handler.
///
/// The rate limiter is constructed once here and injected rather than
/// living as process-global state, so tests can build their own with a
/// manual clock.
#[derive(Clone)]
pub struct AppState {
    pub pool: db::DbPool,
    pub config: Arc<config::Config>,
    pub rate_limiter: Arc<RateLimiter>,
    pub http: reqwest::Client,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging with tracing subscriber. Reads RUST_LOG environment variable (defaults to "info" level)
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    // Load configuration
    let config = config::Config::from_env()?;
    tracing::info!("Configuration loaded");

    // Create database pool
    let pool = db::create_pool(&config.database_url).await?;
    tracing::info!("Database pool created");

    // Run migrations
    db::run_migrations(&pool).await?;
    tracing::info!("Database migrations complete");

    // Seed the plan catalog; a no-op on every start after the first
    services::plan_service::ensure_seeded(&pool).await?;
    tracing::info!("Plan catalog seeded");

    let state = AppState {
        pool,
        rate_limiter: Arc::new(RateLimiter::new(
            config.rate_limit_max_requests,
            Duration::from_secs(config.rate_limit_window_secs),
        )),
        http: reqwest::Client::builder()
            .timeout(Duration::from_secs(config.upstream_timeout_secs))
            .build()?,
        config: Arc::new(config),
    };

    // Metered routes: API-key authenticated, then rate limited.
    // Layers run outermost-last-added, so auth is added after the rate
    // limiter to execute first.
    let metered_routes = Router::new()
        .route("/api/v1/analyze", post(handlers::metered::analyze))
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::rate_limit::rate_limit_middleware,
        ))
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::auth::auth_middleware,
        ));

    // Management and read API: ownership is enforced by the external
    // authorization layer in front of this service
    let management_routes = Router::new()
        // Project management
        .route("/api/v1/projects", post(handlers::projects::create_project))
        .route(
            "/api/v1/projects/{id}",
            get(handlers::projects::get_project),
        )
        .route(
            "/api/v1/projects/{id}",
            patch(handlers::projects::update_project),
        )
        .route(
            "/api/v1/projects/{id}",
            delete(handlers::projects::delete_project),
        )
        // Key lifecycle
        .route(
            "/api/v1/projects/{project_id}/keys",
            post(handlers::keys::issue_key),
        )
        .route(
            "/api/v1/projects/{project_id}/keys",
            get(handlers::keys::list_keys),
        )
        .route(
            "/api/v1/projects/{project_id}/keys/{key_id}",
            delete(handlers::keys::revoke_key),
        )
        // Usage rollups
        .route(
            "/api/v1/projects/{id}/usage/stats",
            get(handlers::usage::stats),
        )
        .route(
            "/api/v1/projects/{id}/usage/by-hour",
            get(handlers::usage::by_hour),
        )
        .route(
            "/api/v1/projects/{id}/usage/daily",
            get(handlers::usage::daily),
        )
        .route(
            "/api/v1/projects/{id}/usage/hourly",
            get(handlers::usage::hourly),
        )
        .route(
            "/api/v1/projects/{id}/usage/months",
            get(handlers::usage::months),
        )
        .route(
            "/api/v1/projects/{id}/usage/events",
            get(handlers::usage::events),
        )
        // Billing views and plans
        .route(
            "/api/v1/projects/{id}/billing/summary",
            get(handlers::billing::summary),
        )
        .route(
            "/api/v1/projects/{id}/billing/status",
            get(handlers::billing::status),
        )
        .route(
            "/api/v1/projects/{id}/billing/preview",
            get(handlers::billing::preview),
        )
        .route("/api/v1/plans", get(handlers::billing::list_plans))
        .route(
            "/api/v1/projects/{id}/plan",
            put(handlers::billing::change_plan),
        );

    // Combine route groups with public routes
    let app = Router::new()
        // Public routes (no authentication required)
        .route("/health", get(handlers::health::health_check))
        .merge(metered_routes)
        .merge(management_routes)
        // Add distributed tracing middleware for observability
        .layer(TraceLayer::new_for_http())
        // Share application state with all handlers via State extraction
        .with_state(state.clone());

    // Bind to network address and start server
    let addr = format!("0.0.0.0:{}", state.config.server_port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    // Start serving HTTP requests
    // This blocks forever, handling requests concurrently with tokio
    axum::serve(listener, app).await?;

    Ok(())
}
