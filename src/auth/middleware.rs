use std::sync::Arc;

use axum::{
    Json,
    extract::FromRequestParts,
    http::{HeaderValue, StatusCode, header::AUTHORIZATION, header::WWW_AUTHENTICATE, request::Parts},
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::error::Error;
use crate::server::AppState;
use crate::types::Identity;

/// Extractor that requires a valid owner bearer token.
pub struct RequireOwner {
    pub identity: Identity,
}

impl RequireOwner {
    #[must_use]
    pub fn id(&self) -> i64 {
        self.identity.id
    }
}

#[derive(Debug)]
pub enum AuthError {
    MissingAuth,
    InvalidScheme,
    InvalidToken,
    UnknownIdentity,
    InternalError,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AuthError::MissingAuth => (StatusCode::UNAUTHORIZED, "Authentication required"),
            AuthError::InvalidScheme => (StatusCode::UNAUTHORIZED, "Invalid authorization scheme"),
            AuthError::InvalidToken => (StatusCode::UNAUTHORIZED, "Invalid or expired token"),
            AuthError::UnknownIdentity => (StatusCode::UNAUTHORIZED, "Unknown identity"),
            AuthError::InternalError => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
        };

        let body = json!({ "error": message });

        let mut response = (status, Json(body)).into_response();

        if status == StatusCode::UNAUTHORIZED {
            response.headers_mut().insert(
                WWW_AUTHENTICATE,
                HeaderValue::from_static("Bearer realm=\"varvault\""),
            );
        }

        response
    }
}

/// Extracts the token from a `Bearer` authorization header.
/// Returns None if no auth header is present.
pub fn extract_bearer_token(auth_header: Option<&str>) -> Result<Option<&str>, AuthError> {
    match auth_header {
        Some(header) => match header.strip_prefix("Bearer ") {
            Some(token) if !token.trim().is_empty() => Ok(Some(token.trim())),
            Some(_) => Err(AuthError::InvalidToken),
            None => Err(AuthError::InvalidScheme),
        },
        None => Ok(None),
    }
}

impl FromRequestParts<Arc<AppState>> for RequireOwner {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|h| h.to_str().ok());

        let raw_token = extract_bearer_token(auth_header)?.ok_or(AuthError::MissingAuth)?;

        let claims = state.signing.verify(raw_token).map_err(|e| match e {
            Error::Unauthorized => AuthError::InvalidToken,
            _ => AuthError::InternalError,
        })?;

        let identity = state
            .store
            .get_identity(claims.sub)
            .map_err(|e| {
                tracing::error!("Failed to load identity {}: {e}", claims.sub);
                AuthError::InternalError
            })?
            .ok_or(AuthError::UnknownIdentity)?;

        Ok(RequireOwner { identity })
    }
}
