use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::IntoResponse};

use crate::auth::RequireOwner;
use crate::server::AppState;
use crate::server::dto::{CreateTableResponse, NameRequest};
use crate::server::extract::{Json, Path};
use crate::server::response::{ApiError, StatusResponse, StoreOptionExt, StoreResultExt};
use crate::server::validation::validate_table_name;
use crate::types::TableScope;

pub async fn list_tables(
    auth: RequireOwner,
    State(state): State<Arc<AppState>>,
    Path(project_id): Path<i64>,
) -> impl IntoResponse {
    let store = state.store.as_ref();

    // An empty list would not tell a foreign project from an empty one.
    store
        .get_project(auth.id(), project_id)
        .api_err("Failed to get project")?
        .or_not_found("Project not found")?;

    let tables = store
        .list_tables(auth.id(), project_id)
        .api_err("Failed to list tables")?;

    Ok::<_, ApiError>(Json(tables))
}

pub async fn create_table(
    auth: RequireOwner,
    State(state): State<Arc<AppState>>,
    Path(project_id): Path<i64>,
    Json(req): Json<NameRequest>,
) -> impl IntoResponse {
    validate_table_name(&req.name)?;

    let table = state
        .store
        .create_table(auth.id(), project_id, &req.name)
        .api_err("Failed to create table")?;

    Ok::<_, ApiError>((
        StatusCode::CREATED,
        Json(CreateTableResponse { table_id: table.id }),
    ))
}

pub async fn rename_table(
    auth: RequireOwner,
    State(state): State<Arc<AppState>>,
    Path((project_id, table_id)): Path<(i64, i64)>,
    Json(req): Json<NameRequest>,
) -> impl IntoResponse {
    validate_table_name(&req.name)?;

    let scope = TableScope::new(auth.id(), project_id, table_id);
    state
        .store
        .rename_table(&scope, &req.name)
        .api_err("Failed to rename table")?;

    Ok::<_, ApiError>(Json(StatusResponse::ok()))
}

pub async fn delete_table(
    auth: RequireOwner,
    State(state): State<Arc<AppState>>,
    Path((project_id, table_id)): Path<(i64, i64)>,
) -> impl IntoResponse {
    let scope = TableScope::new(auth.id(), project_id, table_id);
    state
        .store
        .delete_table(&scope)
        .api_err("Failed to delete table")?;

    Ok::<_, ApiError>(Json(StatusResponse::ok()))
}
