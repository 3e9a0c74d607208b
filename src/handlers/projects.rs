//! Project management HTTP handlers.
//!
//! - POST /api/v1/projects - Create a project (starts on the free plan)
//! - GET /api/v1/projects/{id} - Fetch a project
//! - PATCH /api/v1/projects/{id} - Update name/description/environment/status
//! - DELETE /api/v1/projects/{id} - Delete the project row
//!
//! Deleting a project removes the row (and cascades its API keys) but
//! leaves historical usage events in place - billing history survives.

use crate::{
    AppState,
    error::AppError,
    models::project::{CreateProjectRequest, ENVIRONMENTS, Project, UpdateProjectRequest},
};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

fn validate_environment(environment: &str) -> Result<(), AppError> {
    if ENVIRONMENTS.contains(&environment) {
        Ok(())
    } else {
        Err(AppError::InvalidRequest(format!(
            "Environment must be one of: {}",
            ENVIRONMENTS.join(", ")
        )))
    }
}

/// Create a new project.
///
/// # Endpoint
///
/// `POST /api/v1/projects`
///
/// New projects default to the `free` plan (database default) and
/// `active` status.
///
/// # Response
///
/// - **Success (201 Created)**: the created project
/// - **Error (400)**: empty name or unknown environment
pub async fn create_project(
    State(state): State<AppState>,
    Json(request): Json<CreateProjectRequest>,
) -> Result<(StatusCode, Json<Project>), AppError> {
    // Validation happens before any storage I/O
    let name = request.name.trim();
    if name.is_empty() {
        return Err(AppError::InvalidRequest(
            "Project name must not be empty".to_string(),
        ));
    }
    validate_environment(&request.environment)?;

    let project = sqlx::query_as::<_, Project>(
        r#"
        INSERT INTO projects (user_id, name, description, environment)
        VALUES ($1, $2, $3, $4)
        RETURNING *
        "#,
    )
    .bind(request.user_id)
    .bind(name)
    .bind(&request.description)
    .bind(&request.environment)
    .fetch_one(&state.pool)
    .await?;

    tracing::info!(project_id = project.id, user_id = project.user_id, "project created");

    Ok((StatusCode::CREATED, Json(project)))
}

/// Fetch a project by id.
pub async fn get_project(
    State(state): State<AppState>,
    Path(project_id): Path<i64>,
) -> Result<Json<Project>, AppError> {
    let project = sqlx::query_as::<_, Project>("SELECT * FROM projects WHERE id = $1")
        .bind(project_id)
        .fetch_optional(&state.pool)
        .await?
        .ok_or(AppError::ProjectNotFound)?;

    Ok(Json(project))
}

/// Update a project. Absent fields are left unchanged.
///
/// # Endpoint
///
/// `PATCH /api/v1/projects/{id}`
pub async fn update_project(
    State(state): State<AppState>,
    Path(project_id): Path<i64>,
    Json(request): Json<UpdateProjectRequest>,
) -> Result<Json<Project>, AppError> {
    if let Some(ref name) = request.name {
        if name.trim().is_empty() {
            return Err(AppError::InvalidRequest(
                "Project name must not be empty".to_string(),
            ));
        }
    }
    if let Some(ref environment) = request.environment {
        validate_environment(environment)?;
    }

    let project = sqlx::query_as::<_, Project>(
        r#"
        UPDATE projects
        SET name = COALESCE($2, name),
            description = COALESCE($3, description),
            environment = COALESCE($4, environment),
            status = COALESCE($5, status),
            updated_at = NOW()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(project_id)
    .bind(request.name.as_ref().map(|n| n.trim().to_string()))
    .bind(&request.description)
    .bind(&request.environment)
    .bind(&request.status)
    .fetch_optional(&state.pool)
    .await?
    .ok_or(AppError::ProjectNotFound)?;

    Ok(Json(project))
}

/// Delete a project.
///
/// # Endpoint
///
/// `DELETE /api/v1/projects/{id}`
///
/// API keys cascade; usage events are intentionally retained (no FK),
/// so historical billing months remain queryable.
pub async fn delete_project(
    State(state): State<AppState>,
    Path(project_id): Path<i64>,
) -> Result<StatusCode, AppError> {
    let result = sqlx::query("DELETE FROM projects WHERE id = $1")
        .bind(project_id)
        .execute(&state.pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::ProjectNotFound);
    }

    tracing::info!(project_id, "project deleted");

    Ok(StatusCode::NO_CONTENT)
}
