//! # Varvault
//!
//! A multi-tenant store of typed variables. Owners manage projects, tables
//! and variables over a JWT-authenticated API; devices read and write
//! variable values with nothing but a per-project access token.
//!
//! ## Library Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use varvault::auth::{CredentialHasher, SigningConfig};
//! use varvault::config::ServerConfig;
//! use varvault::server::{AppState, create_router};
//! use varvault::store::{SqliteStore, Store};
//!
//! let config = ServerConfig::default();
//! let store = SqliteStore::new(config.db_path()).unwrap();
//! store.initialize().unwrap();
//!
//! let signing = SigningConfig::new(&secret, config.session_ttl().unwrap()).unwrap();
//! let hasher = CredentialHasher::new(&config.password_cost).unwrap();
//! let state = Arc::new(AppState::new(Arc::new(store), Arc::new(signing), hasher));
//! let router = create_router(state);
//! // Serve with axum...
//! ```
//!
//! ## Feature Flags
//!
//! - `cli` (default): Builds the `varvault` binary.

pub mod auth;
pub mod config;
pub mod error;
pub mod gateway;
pub mod server;
pub mod store;
pub mod types;
