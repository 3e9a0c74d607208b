//! Project data models and API request/response types.
//!
//! A project is the tenant unit: it owns API keys, accumulates usage
//! events, and references a plan from the catalog.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Represents a project record from the database.
///
/// New projects start on the `free` plan (database default) and in the
/// `development` environment.
#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct Project {
    pub id: i64,

    /// Owning user; ownership checks compare against this
    pub user_id: i64,

    pub name: String,
    pub description: Option<String>,

    /// `development`, `staging`, or `production`
    pub environment: String,

    pub status: String,

    /// References `plans.id`; decides which quota the billing engine uses
    pub plan_id: String,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request body for creating a new project.
///
/// ```json
/// {
///   "user_id": 42,
///   "name": "my-service",
///   "description": "staging sandbox",
///   "environment": "staging"
/// }
/// ```
#[derive(Debug, Deserialize)]
pub struct CreateProjectRequest {
    pub user_id: i64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default = "default_environment")]
    pub environment: String,
}

fn default_environment() -> String {
    "development".to_string()
}

/// Request body for updating a project. All fields optional; absent
/// fields are left unchanged.
#[derive(Debug, Deserialize)]
pub struct UpdateProjectRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub environment: Option<String>,
    pub status: Option<String>,
}

/// Request body for reassigning a project's plan.
#[derive(Debug, Deserialize)]
pub struct ChangePlanRequest {
    /// Caller's user id; must match the project owner
    pub user_id: i64,
    pub plan_id: String,
}

/// Allowed environment values, shared by create and update validation.
pub const ENVIRONMENTS: [&str; 3] = ["development", "staging", "production"];
