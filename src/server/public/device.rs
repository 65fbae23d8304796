use std::sync::Arc;

use axum::{extract::State, response::IntoResponse};

use crate::gateway::{self, DeviceRequest};
use crate::server::AppState;
use crate::server::extract::Json;
use crate::server::response::{ApiError, StoreResultExt};

pub async fn access(
    State(state): State<Arc<AppState>>,
    Json(req): Json<DeviceRequest>,
) -> impl IntoResponse {
    let response = gateway::handle(state.store.as_ref(), req).api_err("Device access failed")?;
    Ok::<_, ApiError>(Json(response))
}
