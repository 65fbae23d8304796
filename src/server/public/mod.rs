mod accounts;
mod device;

use std::sync::Arc;

use axum::{Router, routing::post};

use crate::server::AppState;

/// Routes that need no owner bearer token.
pub fn public_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/register", post(accounts::register))
        .route("/login", post(accounts::login))
        // Device plane: authenticated by the project access token in the body
        .route("/access", post(device::access))
}
