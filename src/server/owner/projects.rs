use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::IntoResponse};

use crate::auth::RequireOwner;
use crate::server::AppState;
use crate::server::dto::{CreateProjectResponse, NameRequest};
use crate::server::extract::{Json, Path};
use crate::server::response::{ApiError, StatusResponse, StoreResultExt};
use crate::server::validation::validate_project_name;

pub async fn list_projects(
    auth: RequireOwner,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let projects = state
        .store
        .list_projects(auth.id())
        .api_err("Failed to list projects")?;

    Ok::<_, ApiError>(Json(projects))
}

pub async fn create_project(
    auth: RequireOwner,
    State(state): State<Arc<AppState>>,
    Json(req): Json<NameRequest>,
) -> impl IntoResponse {
    validate_project_name(&req.name)?;

    let project = state
        .store
        .create_project(auth.id(), &req.name)
        .api_err("Failed to create project")?;

    tracing::info!(
        owner_id = auth.id(),
        project_id = project.id,
        "Created project {}",
        project.name
    );

    Ok::<_, ApiError>((
        StatusCode::CREATED,
        Json(CreateProjectResponse {
            project_id: project.id,
            access_token: project.access_token,
        }),
    ))
}

/// Returns the project with its tables and their variables.
pub async fn get_project(
    auth: RequireOwner,
    State(state): State<Arc<AppState>>,
    Path(project_id): Path<i64>,
) -> impl IntoResponse {
    let detail = state
        .store
        .load_project(auth.id(), project_id)
        .api_err("Failed to load project")?;

    Ok::<_, ApiError>(Json(detail))
}

pub async fn rename_project(
    auth: RequireOwner,
    State(state): State<Arc<AppState>>,
    Path(project_id): Path<i64>,
    Json(req): Json<NameRequest>,
) -> impl IntoResponse {
    validate_project_name(&req.name)?;

    state
        .store
        .rename_project(auth.id(), project_id, &req.name)
        .api_err("Failed to rename project")?;

    Ok::<_, ApiError>(Json(StatusResponse::ok()))
}

pub async fn delete_project(
    auth: RequireOwner,
    State(state): State<Arc<AppState>>,
    Path(project_id): Path<i64>,
) -> impl IntoResponse {
    state
        .store
        .delete_project(auth.id(), project_id)
        .api_err("Failed to delete project")?;

    tracing::info!(owner_id = auth.id(), project_id, "Deleted project");

    Ok::<_, ApiError>(Json(StatusResponse::ok()))
}
