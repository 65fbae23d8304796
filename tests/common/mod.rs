//! In-process harness: a fresh SQLite file per test and the real router,
//! driven with `tower::ServiceExt::oneshot`.

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use varvault::auth::{CredentialHasher, SigningConfig};
use varvault::config::HashCost;
use varvault::server::{AppState, create_router};
use varvault::store::{SqliteStore, Store};

pub const SECRET: &[u8] = b"integration-test-signing-secret-0123456789";

pub struct TestApp {
    _temp_dir: TempDir,
    router: Router,
}

impl TestApp {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("create temp dir");
        let store = SqliteStore::new(temp_dir.path().join("varvault.db")).expect("open store");
        store.initialize().expect("initialize store");

        let signing =
            SigningConfig::new(SECRET, chrono::Duration::hours(1)).expect("signing config");
        let hasher = CredentialHasher::new(&HashCost::minimal()).expect("hasher");

        let state = Arc::new(AppState::new(Arc::new(store), Arc::new(signing), hasher));

        Self {
            _temp_dir: temp_dir,
            router: create_router(state),
        }
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        bearer: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = bearer {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }

        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .expect("build request"),
            None => builder.body(Body::empty()).expect("build request"),
        };

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");
        let status = response.status();

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("read body");
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };

        (status, json)
    }

    pub async fn get(&self, uri: &str, bearer: &str) -> (StatusCode, Value) {
        self.request(Method::GET, uri, Some(bearer), None).await
    }

    pub async fn post(&self, uri: &str, bearer: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.request(Method::POST, uri, bearer, Some(body)).await
    }

    pub async fn put(&self, uri: &str, bearer: &str, body: Value) -> (StatusCode, Value) {
        self.request(Method::PUT, uri, Some(bearer), Some(body)).await
    }

    pub async fn delete(&self, uri: &str, bearer: &str) -> (StatusCode, Value) {
        self.request(Method::DELETE, uri, Some(bearer), None).await
    }

    /// Registers `username` and returns a bearer token for it.
    pub async fn sign_up(&self, username: &str) -> String {
        let creds = serde_json::json!({"username": username, "password": "hunter22"});

        let (status, _) = self.post("/api/register", None, creds.clone()).await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, body) = self.post("/api/login", None, creds).await;
        assert_eq!(status, StatusCode::OK);
        body["token"].as_str().expect("token").to_string()
    }

    pub async fn device(&self, body: Value) -> (StatusCode, Value) {
        self.post("/api/access", None, body).await
    }
}
