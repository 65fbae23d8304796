use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{Identity, scalar_text};

#[derive(Debug, Deserialize)]
pub struct CredentialsRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub id: i64,
    pub username: String,
}

impl From<Identity> for RegisterResponse {
    fn from(identity: Identity) -> Self {
        Self {
            id: identity.id,
            username: identity.username,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Body of create / rename for projects and tables.
#[derive(Debug, Deserialize)]
pub struct NameRequest {
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct CreateProjectResponse {
    pub project_id: i64,
    pub access_token: String,
}

#[derive(Debug, Serialize)]
pub struct CreateTableResponse {
    pub table_id: i64,
}

#[derive(Debug, Deserialize)]
pub struct CreateVariableRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default, rename = "type")]
    pub kind: String,
    #[serde(default, deserialize_with = "scalar_text")]
    pub value: Option<String>,
}

/// Either field may be omitted to keep the current name or type.
#[derive(Debug, Deserialize)]
pub struct UpdateVariableRequest {
    #[serde(default)]
    pub new_name: Option<String>,
    #[serde(default)]
    pub new_type: Option<String>,
}
