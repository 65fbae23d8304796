mod projects;
mod tables;
mod variables;

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, put},
};

use crate::server::AppState;

/// Routes for the account owner. Every handler takes [`crate::auth::RequireOwner`],
/// and anything the caller does not own answers 404.
pub fn owner_router() -> Router<Arc<AppState>> {
    Router::new()
        // Projects
        .route(
            "/projects",
            get(projects::list_projects).post(projects::create_project),
        )
        .route(
            "/projects/{project_id}",
            get(projects::get_project)
                .put(projects::rename_project)
                .delete(projects::delete_project),
        )
        // Tables
        .route(
            "/projects/{project_id}/tables",
            get(tables::list_tables).post(tables::create_table),
        )
        .route(
            "/projects/{project_id}/tables/{table_id}",
            put(tables::rename_table).delete(tables::delete_table),
        )
        // Variables
        .route(
            "/projects/{project_id}/tables/{table_id}/variables",
            get(variables::list_variables).post(variables::create_variable),
        )
        .route(
            "/projects/{project_id}/tables/{table_id}/variables/{name}",
            put(variables::update_variable).delete(variables::delete_variable),
        )
}
