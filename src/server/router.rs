use std::sync::Arc;
use std::time::Instant;

use axum::extract::Request;
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::{Router, routing::get};
use tower_http::cors::CorsLayer;

use super::owner::owner_router;
use super::public::public_router;
use crate::auth::{CredentialHasher, SigningConfig};
use crate::store::Store;

pub struct AppState {
    pub store: Arc<dyn Store>,
    /// Issues and verifies owner-plane bearer tokens.
    pub signing: Arc<SigningConfig>,
    pub hasher: CredentialHasher,
}

impl AppState {
    #[must_use]
    pub fn new(
        store: Arc<dyn Store>,
        signing: Arc<SigningConfig>,
        hasher: CredentialHasher,
    ) -> Self {
        Self {
            store,
            signing,
            hasher,
        }
    }
}

async fn health() -> &'static str {
    "OK"
}

async fn log_request(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let start = Instant::now();

    let response = next.run(request).await;

    let latency = start.elapsed();
    let status = response.status();

    tracing::info!(
        "{} {} {} {}ms",
        method,
        uri.path(),
        status.as_u16(),
        latency.as_millis()
    );

    response
}

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .nest("/api", public_router())
        .nest("/api", owner_router())
        .layer(middleware::from_fn(log_request))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
