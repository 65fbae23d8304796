use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::VarType;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Identity {
    pub id: i64,
    pub username: String,
    pub created_at: DateTime<Utc>,
}

/// An identity together with its stored credential hash. Never serialized.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub identity: Identity,
    pub credential_hash: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub id: i64,
    pub owner_id: i64,
    pub name: String,
    pub access_token: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectSummary {
    pub id: i64,
    pub name: String,
}

/// A project as seen by the device plane after token resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedProject {
    pub project_id: i64,
    pub owner_id: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Table {
    pub id: i64,
    pub project_id: i64,
    #[serde(skip)]
    pub owner_id: i64,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSummary {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variable {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: VarType,
    pub value: String,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableDetail {
    pub id: i64,
    pub name: String,
    pub variables: Vec<Variable>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectDetail {
    pub id: i64,
    pub name: String,
    pub access_token: String,
    pub created_at: DateTime<Utc>,
    pub tables: Vec<TableDetail>,
}

/// Addresses one table on behalf of one owner. Every variable operation goes
/// through a scope, so a table outside `project_id` or not owned by
/// `owner_id` never matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableScope {
    pub owner_id: i64,
    pub project_id: i64,
    pub table_id: i64,
}

impl TableScope {
    #[must_use]
    pub const fn new(owner_id: i64, project_id: i64, table_id: i64) -> Self {
        Self {
            owner_id,
            project_id,
            table_id,
        }
    }

    /// The scope a device gets for `table_id` once its token resolved.
    #[must_use]
    pub const fn for_device(project: ResolvedProject, table_id: i64) -> Self {
        Self::new(project.owner_id, project.project_id, table_id)
    }
}
