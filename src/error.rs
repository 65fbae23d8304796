use thiserror::Error;

use crate::types::VarType;

#[derive(Debug, Error)]
pub enum Error {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("not found")]
    NotFound,

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("unauthorized")]
    Unauthorized,

    #[error("missing field: {0}")]
    MissingField(&'static str),

    #[error("invalid type: {0:?} (expected one of string, int, float, bool)")]
    InvalidType(String),

    #[error("invalid value {value:?} for type {kind}")]
    InvalidValue { kind: VarType, value: String },

    #[error("type mismatch: variable is declared as {declared}, got {claimed}")]
    TypeMismatch { declared: VarType, claimed: VarType },

    #[error("unknown action: {0:?}")]
    UnknownAction(String),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("access token collision")]
    TokenCollision,

    #[error("internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, Error>;
