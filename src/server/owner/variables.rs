use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::IntoResponse};

use crate::auth::RequireOwner;
use crate::error::Error;
use crate::server::AppState;
use crate::server::dto::{CreateVariableRequest, UpdateVariableRequest};
use crate::server::extract::{Json, Path};
use crate::server::response::{ApiError, StatusResponse, StoreOptionExt, StoreResultExt};
use crate::server::validation::validate_variable_name;
use crate::types::{TableScope, VarType};

fn parse_kind(raw: &str) -> Result<VarType, ApiError> {
    if raw.is_empty() {
        return Err(Error::MissingField("type").into());
    }
    raw.parse::<VarType>().map_err(ApiError::from)
}

pub async fn list_variables(
    auth: RequireOwner,
    State(state): State<Arc<AppState>>,
    Path((project_id, table_id)): Path<(i64, i64)>,
) -> impl IntoResponse {
    let store = state.store.as_ref();
    let scope = TableScope::new(auth.id(), project_id, table_id);

    store
        .get_table(&scope)
        .api_err("Failed to get table")?
        .or_not_found("Table not found")?;

    let variables = store
        .list_variables(&scope)
        .api_err("Failed to list variables")?;

    Ok::<_, ApiError>(Json(variables))
}

pub async fn create_variable(
    auth: RequireOwner,
    State(state): State<Arc<AppState>>,
    Path((project_id, table_id)): Path<(i64, i64)>,
    Json(req): Json<CreateVariableRequest>,
) -> impl IntoResponse {
    validate_variable_name(&req.name)?;
    let kind = parse_kind(&req.kind)?;

    let scope = TableScope::new(auth.id(), project_id, table_id);
    state
        .store
        .create_variable(&scope, &req.name, kind, req.value.as_deref().unwrap_or(""))
        .api_err("Failed to create variable")?;

    Ok::<_, ApiError>((StatusCode::CREATED, Json(StatusResponse::ok())))
}

/// Renames and / or retypes a variable. The value is kept but must still
/// parse under the new type.
pub async fn update_variable(
    auth: RequireOwner,
    State(state): State<Arc<AppState>>,
    Path((project_id, table_id, name)): Path<(i64, i64, String)>,
    Json(req): Json<UpdateVariableRequest>,
) -> impl IntoResponse {
    let store = state.store.as_ref();
    let scope = TableScope::new(auth.id(), project_id, table_id);

    let current = store
        .get_variable(&scope, &name)
        .api_err("Failed to get variable")?
        .or_not_found("Variable not found")?;

    let new_name = req.new_name.unwrap_or_else(|| current.name.clone());
    validate_variable_name(&new_name)?;
    let new_kind = match req.new_type.as_deref() {
        Some(raw) => parse_kind(raw)?,
        None => current.kind,
    };

    store
        .update_variable(&scope, &current.name, &new_name, new_kind)
        .api_err("Failed to update variable")?;

    Ok::<_, ApiError>(Json(StatusResponse::ok()))
}

pub async fn delete_variable(
    auth: RequireOwner,
    State(state): State<Arc<AppState>>,
    Path((project_id, table_id, name)): Path<(i64, i64, String)>,
) -> impl IntoResponse {
    let scope = TableScope::new(auth.id(), project_id, table_id);
    state
        .store
        .delete_variable(&scope, &name)
        .api_err("Failed to delete variable")?;

    Ok::<_, ApiError>(Json(StatusResponse::ok()))
}
