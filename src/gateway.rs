//! Device-facing entry point.
//!
//! A device holds only a project access token. The gateway exchanges it for
//! the project's identity and then reads or writes one variable value inside
//! that project. Devices never create, rename or retype anything.

use serde::{Deserialize, Serialize};

use crate::auth::looks_like_access_token;
use crate::error::{Error, Result};
use crate::store::Store;
use crate::types::{ResolvedProject, TableScope, VarType, scalar_text};

/// A device request. Every field is optional on the wire so that missing
/// fields surface as `MissingField` rather than a deserialization failure.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DeviceRequest {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default)]
    pub table: Option<i64>,
    #[serde(default)]
    pub variable: Option<String>,
    #[serde(default, deserialize_with = "scalar_text")]
    pub value: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Get,
    Set,
}

impl Action {
    pub fn parse(s: &str) -> Result<Self> {
        match s {
            "get" => Ok(Action::Get),
            "set" => Ok(Action::Set),
            other => Err(Error::UnknownAction(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum DeviceResponse {
    Value {
        value: String,
        #[serde(rename = "type")]
        kind: VarType,
    },
    Status { status: &'static str },
}

impl DeviceResponse {
    #[must_use]
    pub const fn ok() -> Self {
        DeviceResponse::Status { status: "ok" }
    }
}

/// Resolves a project access token. Unknown and malformed tokens are both
/// `Unauthorized`.
pub fn resolve_token(store: &dyn Store, token: Option<&str>) -> Result<ResolvedProject> {
    let token = token.filter(|t| !t.is_empty()).ok_or(Error::Unauthorized)?;
    if !looks_like_access_token(token) {
        return Err(Error::Unauthorized);
    }

    store
        .resolve_access_token(token)?
        .ok_or(Error::Unauthorized)
}

/// Handles one device request end to end.
pub fn handle(store: &dyn Store, request: DeviceRequest) -> Result<DeviceResponse> {
    let project = resolve_token(store, request.token.as_deref())?;

    let action = Action::parse(request.action.as_deref().ok_or(Error::MissingField("action"))?)?;
    let table_id = request.table.ok_or(Error::MissingField("table"))?;
    let name = request
        .variable
        .as_deref()
        .filter(|v| !v.is_empty())
        .ok_or(Error::MissingField("variable"))?;

    // The table must live in the token's project; a sibling project's token
    // does not reach it.
    let scope = TableScope::for_device(project, table_id);

    match action {
        Action::Get => {
            let variable = store.get_variable(&scope, name)?.ok_or(Error::NotFound)?;
            Ok(DeviceResponse::Value {
                value: variable.value,
                kind: variable.kind,
            })
        }
        Action::Set => {
            let claimed: VarType = request
                .kind
                .as_deref()
                .filter(|k| !k.is_empty())
                .ok_or(Error::MissingField("type"))?
                .parse()?;
            let value = request.value.as_deref().ok_or(Error::MissingField("value"))?;

            match store.set_variable_value(&scope, name, claimed, value) {
                Ok(_) => {
                    tracing::debug!(
                        project_id = project.project_id,
                        table_id,
                        "Device set {name}"
                    );
                    Ok(DeviceResponse::ok())
                }
                Err(e) => {
                    if matches!(e, Error::TypeMismatch { .. } | Error::InvalidValue { .. }) {
                        tracing::info!(
                            project_id = project.project_id,
                            table_id,
                            "Rejected device write to {name}: {e}"
                        );
                    }
                    Err(e)
                }
            }
        }
    }
}
