mod schema;
mod sqlite;

pub use sqlite::SqliteStore;

use crate::error::Result;
use crate::types::*;

/// Store defines the database interface.
///
/// Every project, table and variable operation takes the acting owner (or a
/// [`TableScope`] carrying it). Rows belonging to another owner behave exactly
/// like rows that do not exist: reads return `None` or an empty list, writes
/// return [`crate::error::Error::NotFound`].
pub trait Store: Send + Sync {
    fn initialize(&self) -> Result<()>;

    // Identity operations
    fn create_identity(&self, username: &str, credential_hash: &str) -> Result<Identity>;
    fn get_identity(&self, id: i64) -> Result<Option<Identity>>;
    fn get_credentials(&self, username: &str) -> Result<Option<Credentials>>;

    // Project operations
    fn create_project(&self, owner_id: i64, name: &str) -> Result<Project>;
    fn get_project(&self, owner_id: i64, project_id: i64) -> Result<Option<Project>>;
    fn list_projects(&self, owner_id: i64) -> Result<Vec<ProjectSummary>>;
    fn load_project(&self, owner_id: i64, project_id: i64) -> Result<ProjectDetail>;
    fn rename_project(&self, owner_id: i64, project_id: i64, name: &str) -> Result<()>;
    fn delete_project(&self, owner_id: i64, project_id: i64) -> Result<()>;
    fn resolve_access_token(&self, token: &str) -> Result<Option<ResolvedProject>>;

    // Table operations
    fn create_table(&self, owner_id: i64, project_id: i64, name: &str) -> Result<Table>;
    fn get_table(&self, scope: &TableScope) -> Result<Option<Table>>;
    fn list_tables(&self, owner_id: i64, project_id: i64) -> Result<Vec<TableSummary>>;
    fn rename_table(&self, scope: &TableScope, name: &str) -> Result<()>;
    fn delete_table(&self, scope: &TableScope) -> Result<()>;

    // Variable operations
    fn create_variable(
        &self,
        scope: &TableScope,
        name: &str,
        kind: VarType,
        value: &str,
    ) -> Result<Variable>;
    fn list_variables(&self, scope: &TableScope) -> Result<Vec<Variable>>;
    fn get_variable(&self, scope: &TableScope, name: &str) -> Result<Option<Variable>>;
    fn update_variable(
        &self,
        scope: &TableScope,
        name: &str,
        new_name: &str,
        new_kind: VarType,
    ) -> Result<()>;
    /// Writes the value of an existing variable. `claimed` must equal the
    /// declared type and `value` must parse under it; otherwise nothing is
    /// written.
    fn set_variable_value(
        &self,
        scope: &TableScope,
        name: &str,
        claimed: VarType,
        value: &str,
    ) -> Result<TypedValue>;
    fn delete_variable(&self, scope: &TableScope, name: &str) -> Result<()>;

}
