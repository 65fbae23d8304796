use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::json;

use crate::error::{Error, Result as StoreResult};

/// Body of write endpoints that have nothing else to say.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: &'static str,
}

impl StatusResponse {
    #[must_use]
    pub const fn ok() -> Self {
        Self { status: "ok" }
    }
}

/// API error that converts to a proper HTTP response
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    #[must_use]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn conflict(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::CONFLICT,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: message.into(),
        }
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        match err {
            Error::NotFound => ApiError::not_found("Not found"),
            Error::Conflict(msg) => ApiError::conflict(msg),
            Error::InvalidCredentials => ApiError::unauthorized("Invalid credentials"),
            Error::Unauthorized => ApiError::unauthorized("Unauthorized"),
            e @ (Error::MissingField(_)
            | Error::InvalidType(_)
            | Error::InvalidValue { .. }
            | Error::TypeMismatch { .. }
            | Error::UnknownAction(_)) => ApiError::bad_request(e.to_string()),
            Error::BadRequest(msg) => ApiError::bad_request(msg),
            e @ (Error::Database(_)
            | Error::Io(_)
            | Error::Config(_)
            | Error::TokenCollision
            | Error::Internal(_)) => {
                tracing::error!("{e}");
                ApiError::internal("Internal server error")
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = json!({ "error": self.message });
        (self.status, Json(body)).into_response()
    }
}

/// Extension trait for converting store results to API errors, logging
/// internal failures with some context.
pub trait StoreResultExt<T> {
    fn api_err(self, context: &'static str) -> Result<T, ApiError>;
}

impl<T> StoreResultExt<T> for StoreResult<T> {
    fn api_err(self, context: &'static str) -> Result<T, ApiError> {
        self.map_err(|e| {
            if matches!(
                e,
                Error::Database(_) | Error::Io(_) | Error::Internal(_) | Error::TokenCollision
            ) {
                tracing::error!("{context}: {e}");
                return ApiError::internal("Internal server error");
            }
            ApiError::from(e)
        })
    }
}

/// Extension for Option types from store operations.
pub trait StoreOptionExt<T> {
    fn or_not_found(self, message: &'static str) -> Result<T, ApiError>;
}

impl<T> StoreOptionExt<T> for Option<T> {
    fn or_not_found(self, message: &'static str) -> Result<T, ApiError> {
        self.ok_or_else(|| ApiError::not_found(message))
    }
}
