//! HTTP API for the project registry.
//!
//! Routes:
//! - `GET    /api/projects`               list projects
//! - `POST   /api/projects`               create `{"project_id": ...}`
//! - `DELETE /api/projects?project_id=`   delete
//! - `GET    /api/health`                 liveness
//!
//! Errors are returned as `{"error": "..."}`.

use crate::error::WorkflowError;
use crate::registry::{Project, ProjectRegistry};
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Shared handler state.
#[derive(Clone)]
pub struct ApiState {
    pub registry: Arc<dyn ProjectRegistry>,
}

impl ApiState {
    pub fn new(registry: Arc<dyn ProjectRegistry>) -> Self {
        Self { registry }
    }
}

/// Build the router with CORS and request tracing.
pub fn router(state: ApiState) -> Router {
    Router::new()
        .route(
            "/api/projects",
            get(list_projects).post(create_project).delete(delete_project),
        )
        .route("/api/health", get(health))
        .fallback(not_found)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Registry error mapped to an HTTP status.
#[derive(Debug)]
pub struct ApiError(pub WorkflowError);

impl From<WorkflowError> for ApiError {
    fn from(e: WorkflowError) -> Self {
        ApiError(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self.0 {
            WorkflowError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            WorkflowError::Conflict(_) => (StatusCode::CONFLICT, "Project already exists".to_string()),
            WorkflowError::NotFound(_) => (StatusCode::NOT_FOUND, "Project not found".to_string()),
            other => {
                tracing::error!(error = %other, "Unhandled API error");
                (StatusCode::INTERNAL_SERVER_ERROR, "Something went wrong!".to_string())
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct CreateProject {
    #[serde(default)]
    pub project_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ProjectQuery {
    #[serde(default)]
    pub project_id: Option<String>,
}

fn required(project_id: Option<String>) -> Result<String, ApiError> {
    project_id
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| WorkflowError::Validation("project_id is required".to_string()).into())
}

/// GET /api/projects
pub async fn list_projects(
    State(state): State<ApiState>,
) -> Result<Json<Vec<Project>>, ApiError> {
    let projects = state.registry.list_projects().await?;
    tracing::debug!(count = projects.len(), "Listing projects");
    Ok(Json(projects))
}

/// POST /api/projects
pub async fn create_project(
    State(state): State<ApiState>,
    Json(body): Json<CreateProject>,
) -> Result<(StatusCode, Json<Project>), ApiError> {
    let project_id = required(body.project_id)?;
    let project = state.registry.create(&project_id).await?;
    Ok((StatusCode::CREATED, Json(project)))
}

/// DELETE /api/projects?project_id=
pub async fn delete_project(
    State(state): State<ApiState>,
    Query(query): Query<ProjectQuery>,
) -> Result<Json<Value>, ApiError> {
    let project_id = required(query.project_id)?;
    let project = state.registry.delete(&project_id).await?;
    Ok(Json(json!({
        "message": "Project deleted successfully",
        "project": project,
    })))
}

/// GET /api/health
pub async fn health() -> Json<Value> {
    Json(json!({
        "status": "OK",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

async fn not_found() -> (StatusCode, Json<Value>) {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "error": "Endpoint not found" })),
    )
}
