use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::IntoResponse};

use crate::auth;
use crate::server::AppState;
use crate::server::dto::{CredentialsRequest, LoginResponse, RegisterResponse};
use crate::server::extract::Json;
use crate::server::response::{ApiError, StoreResultExt};

pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CredentialsRequest>,
) -> impl IntoResponse {
    let identity = auth::register(
        state.store.as_ref(),
        &state.hasher,
        &req.username,
        &req.password,
    )
    .api_err("Failed to register")?;

    Ok::<_, ApiError>((StatusCode::CREATED, Json(RegisterResponse::from(identity))))
}

pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CredentialsRequest>,
) -> impl IntoResponse {
    let identity = auth::authenticate(
        state.store.as_ref(),
        &state.hasher,
        &req.username,
        &req.password,
    )
    .api_err("Failed to authenticate")?;

    let issued = state.signing.issue(&identity).api_err("Failed to sign token")?;

    Ok::<_, ApiError>(Json(LoginResponse {
        token: issued.token,
        expires_at: issued.expires_at,
    }))
}
