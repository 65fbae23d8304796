use std::path::Path;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use rusqlite::{Connection, OptionalExtension, Row, params};

use super::Store;
use super::schema::SCHEMA;
use crate::auth::generate_access_token;
use crate::error::{Error, Result};
use crate::types::*;

const TOKEN_ATTEMPTS: usize = 3;

pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn new<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let conn = Connection::open(db_path)?;

        conn.pragma_update(None, "foreign_keys", "ON")?;
        conn.pragma_update(None, "journal_mode", "WAL")?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> std::sync::MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl ToSql for VarType {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(self.as_str().into())
    }
}

impl FromSql for VarType {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|_| FromSqlError::InvalidType)
    }
}

fn parse_datetime(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .or_else(|_| {
            // Handle SQLite's default datetime format: "YYYY-MM-DD HH:MM:SS"
            chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").map(|ndt| ndt.and_utc())
        })
        .unwrap_or_else(|e| {
            tracing::error!("Invalid datetime in database: '{}' - {}", s, e);
            Utc::now()
        })
}

fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339()
}

fn is_unique_violation(e: &rusqlite::Error) -> bool {
    matches!(
        e,
        rusqlite::Error::SqliteFailure(err, _)
            if err.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
    )
}

fn identity_from_row(row: &Row<'_>) -> rusqlite::Result<Identity> {
    Ok(Identity {
        id: row.get(0)?,
        username: row.get(1)?,
        created_at: parse_datetime(&row.get::<_, String>(2)?),
    })
}

fn project_from_row(row: &Row<'_>) -> rusqlite::Result<Project> {
    Ok(Project {
        id: row.get(0)?,
        owner_id: row.get(1)?,
        name: row.get(2)?,
        access_token: row.get(3)?,
        created_at: parse_datetime(&row.get::<_, String>(4)?),
    })
}

fn table_from_row(row: &Row<'_>) -> rusqlite::Result<Table> {
    Ok(Table {
        id: row.get(0)?,
        project_id: row.get(1)?,
        owner_id: row.get(2)?,
        name: row.get(3)?,
        created_at: parse_datetime(&row.get::<_, String>(4)?),
    })
}

fn variable_from_row(row: &Row<'_>, offset: usize) -> rusqlite::Result<Variable> {
    Ok(Variable {
        name: row.get(offset)?,
        kind: row.get(offset + 1)?,
        value: row.get(offset + 2)?,
        updated_at: parse_datetime(&row.get::<_, String>(offset + 3)?),
    })
}

impl Store for SqliteStore {
    fn initialize(&self) -> Result<()> {
        self.conn().execute_batch(SCHEMA)?;
        Ok(())
    }

    // Identity operations

    fn create_identity(&self, username: &str, credential_hash: &str) -> Result<Identity> {
        let conn = self.conn();
        let created_at = Utc::now();

        let result = conn.execute(
            "INSERT INTO identities (username, credential_hash, created_at) VALUES (?1, ?2, ?3)",
            params![username, credential_hash, format_datetime(&created_at)],
        );

        match result {
            Ok(_) => Ok(Identity {
                id: conn.last_insert_rowid(),
                username: username.to_string(),
                created_at,
            }),
            Err(e) if is_unique_violation(&e) => {
                Err(Error::Conflict(format!("username {username:?} is taken")))
            }
            Err(e) => Err(Error::from(e)),
        }
    }

    fn get_identity(&self, id: i64) -> Result<Option<Identity>> {
        let conn = self.conn();
        conn.query_row(
            "SELECT id, username, created_at FROM identities WHERE id = ?1",
            params![id],
            identity_from_row,
        )
        .optional()
        .map_err(Error::from)
    }

    fn get_credentials(&self, username: &str) -> Result<Option<Credentials>> {
        let conn = self.conn();
        conn.query_row(
            "SELECT id, username, created_at, credential_hash FROM identities WHERE username = ?1",
            params![username],
            |row| {
                Ok(Credentials {
                    identity: identity_from_row(row)?,
                    credential_hash: row.get(3)?,
                })
            },
        )
        .optional()
        .map_err(Error::from)
    }

    // Project operations

    fn create_project(&self, owner_id: i64, name: &str) -> Result<Project> {
        let conn = self.conn();
        let created_at = Utc::now();

        for _ in 0..TOKEN_ATTEMPTS {
            let access_token = generate_access_token();
            let result = conn.execute(
                "INSERT INTO projects (owner_id, name, access_token, created_at)
                 VALUES (?1, ?2, ?3, ?4)",
                params![owner_id, name, access_token, format_datetime(&created_at)],
            );

            match result {
                Ok(_) => {
                    return Ok(Project {
                        id: conn.last_insert_rowid(),
                        owner_id,
                        name: name.to_string(),
                        access_token,
                        created_at,
                    });
                }
                Err(e) if is_unique_violation(&e) => {
                    tracing::warn!("Access token collision, regenerating");
                }
                Err(e) => return Err(Error::from(e)),
            }
        }

        Err(Error::TokenCollision)
    }

    fn get_project(&self, owner_id: i64, project_id: i64) -> Result<Option<Project>> {
        let conn = self.conn();
        conn.query_row(
            "SELECT id, owner_id, name, access_token, created_at
             FROM projects WHERE id = ?1 AND owner_id = ?2",
            params![project_id, owner_id],
            project_from_row,
        )
        .optional()
        .map_err(Error::from)
    }

    fn list_projects(&self, owner_id: i64) -> Result<Vec<ProjectSummary>> {
        let conn = self.conn();
        let mut stmt =
            conn.prepare("SELECT id, name FROM projects WHERE owner_id = ?1 ORDER BY id")?;

        let rows = stmt.query_map(params![owner_id], |row| {
            Ok(ProjectSummary {
                id: row.get(0)?,
                name: row.get(1)?,
            })
        })?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    fn load_project(&self, owner_id: i64, project_id: i64) -> Result<ProjectDetail> {
        let mut conn = self.conn();
        // A read transaction keeps the nested view consistent.
        let tx = conn.transaction()?;

        let project = tx
            .query_row(
                "SELECT id, owner_id, name, access_token, created_at
                 FROM projects WHERE id = ?1 AND owner_id = ?2",
                params![project_id, owner_id],
                project_from_row,
            )
            .optional()?
            .ok_or(Error::NotFound)?;

        let mut tables = {
            let mut stmt = tx.prepare(
                "SELECT id, name FROM tables WHERE project_id = ?1 AND owner_id = ?2 ORDER BY id",
            )?;
            let rows = stmt.query_map(params![project_id, owner_id], |row| {
                Ok(TableDetail {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    variables: Vec::new(),
                })
            })?;
            rows.collect::<std::result::Result<Vec<_>, _>>()?
        };

        {
            let mut stmt = tx.prepare(
                "SELECT v.table_id, v.name, v.type, v.value, v.updated_at
                 FROM variables v JOIN tables t ON t.id = v.table_id
                 WHERE t.project_id = ?1 AND t.owner_id = ?2 AND v.owner_id = ?2
                 ORDER BY v.table_id, v.name",
            )?;
            let rows = stmt.query_map(params![project_id, owner_id], |row| {
                Ok((row.get::<_, i64>(0)?, variable_from_row(row, 1)?))
            })?;

            for row in rows {
                let (table_id, variable) = row?;
                if let Some(table) = tables.iter_mut().find(|t| t.id == table_id) {
                    table.variables.push(variable);
                }
            }
        }

        tx.commit()?;

        Ok(ProjectDetail {
            id: project.id,
            name: project.name,
            access_token: project.access_token,
            created_at: project.created_at,
            tables,
        })
    }

    fn rename_project(&self, owner_id: i64, project_id: i64, name: &str) -> Result<()> {
        let rows = self.conn().execute(
            "UPDATE projects SET name = ?1 WHERE id = ?2 AND owner_id = ?3",
            params![name, project_id, owner_id],
        )?;

        if rows == 0 {
            return Err(Error::NotFound);
        }
        Ok(())
    }

    fn delete_project(&self, owner_id: i64, project_id: i64) -> Result<()> {
        let rows = self.conn().execute(
            "DELETE FROM projects WHERE id = ?1 AND owner_id = ?2",
            params![project_id, owner_id],
        )?;

        if rows == 0 {
            return Err(Error::NotFound);
        }
        Ok(())
    }

    fn resolve_access_token(&self, token: &str) -> Result<Option<ResolvedProject>> {
        let conn = self.conn();
        conn.query_row(
            "SELECT id, owner_id FROM projects WHERE access_token = ?1",
            params![token],
            |row| {
                Ok(ResolvedProject {
                    project_id: row.get(0)?,
                    owner_id: row.get(1)?,
                })
            },
        )
        .optional()
        .map_err(Error::from)
    }

    // Table operations

    fn create_table(&self, owner_id: i64, project_id: i64, name: &str) -> Result<Table> {
        let conn = self.conn();
        let created_at = Utc::now();

        // Conditional insert: the ownership check and the write are one statement.
        let result = conn.execute(
            "INSERT INTO tables (project_id, owner_id, name, created_at)
             SELECT id, owner_id, ?3, ?4 FROM projects WHERE id = ?1 AND owner_id = ?2",
            params![project_id, owner_id, name, format_datetime(&created_at)],
        );

        match result {
            Ok(0) => Err(Error::NotFound),
            Ok(_) => Ok(Table {
                id: conn.last_insert_rowid(),
                project_id,
                owner_id,
                name: name.to_string(),
                created_at,
            }),
            Err(e) if is_unique_violation(&e) => {
                Err(Error::Conflict(format!("table {name:?} already exists")))
            }
            Err(e) => Err(Error::from(e)),
        }
    }

    fn get_table(&self, scope: &TableScope) -> Result<Option<Table>> {
        let conn = self.conn();
        conn.query_row(
            "SELECT id, project_id, owner_id, name, created_at
             FROM tables WHERE id = ?1 AND project_id = ?2 AND owner_id = ?3",
            params![scope.table_id, scope.project_id, scope.owner_id],
            table_from_row,
        )
        .optional()
        .map_err(Error::from)
    }

    fn list_tables(&self, owner_id: i64, project_id: i64) -> Result<Vec<TableSummary>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT id, name FROM tables WHERE project_id = ?1 AND owner_id = ?2 ORDER BY id",
        )?;

        let rows = stmt.query_map(params![project_id, owner_id], |row| {
            Ok(TableSummary {
                id: row.get(0)?,
                name: row.get(1)?,
            })
        })?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    fn rename_table(&self, scope: &TableScope, name: &str) -> Result<()> {
        let result = self.conn().execute(
            "UPDATE tables SET name = ?1 WHERE id = ?2 AND project_id = ?3 AND owner_id = ?4",
            params![name, scope.table_id, scope.project_id, scope.owner_id],
        );

        match result {
            Ok(0) => Err(Error::NotFound),
            Ok(_) => Ok(()),
            Err(e) if is_unique_violation(&e) => {
                Err(Error::Conflict(format!("table {name:?} already exists")))
            }
            Err(e) => Err(Error::from(e)),
        }
    }

    fn delete_table(&self, scope: &TableScope) -> Result<()> {
        let rows = self.conn().execute(
            "DELETE FROM tables WHERE id = ?1 AND project_id = ?2 AND owner_id = ?3",
            params![scope.table_id, scope.project_id, scope.owner_id],
        )?;

        if rows == 0 {
            return Err(Error::NotFound);
        }
        Ok(())
    }

    // Variable operations
    //
    // Every statement resolves the table through
    // `(SELECT id FROM tables WHERE id = ?1 AND project_id = ?2 AND owner_id = ?3)`
    // and also filters variables on owner_id = ?3.

    fn create_variable(
        &self,
        scope: &TableScope,
        name: &str,
        kind: VarType,
        value: &str,
    ) -> Result<Variable> {
        kind.check_stored(value)?;

        let conn = self.conn();
        let updated_at = Utc::now();

        let result = conn.execute(
            "INSERT INTO variables (table_id, owner_id, name, value, type, updated_at)
             SELECT id, owner_id, ?4, ?5, ?6, ?7
             FROM tables WHERE id = ?1 AND project_id = ?2 AND owner_id = ?3",
            params![
                scope.table_id,
                scope.project_id,
                scope.owner_id,
                name,
                value,
                kind,
                format_datetime(&updated_at),
            ],
        );

        match result {
            Ok(0) => Err(Error::NotFound),
            Ok(_) => Ok(Variable {
                name: name.to_string(),
                kind,
                value: value.to_string(),
                updated_at,
            }),
            Err(e) if is_unique_violation(&e) => {
                Err(Error::Conflict(format!("variable {name:?} already exists")))
            }
            Err(e) => Err(Error::from(e)),
        }
    }

    fn list_variables(&self, scope: &TableScope) -> Result<Vec<Variable>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT name, type, value, updated_at FROM variables
             WHERE table_id = (SELECT id FROM tables WHERE id = ?1 AND project_id = ?2 AND owner_id = ?3)
               AND owner_id = ?3
             ORDER BY name",
        )?;

        let rows = stmt.query_map(
            params![scope.table_id, scope.project_id, scope.owner_id],
            |row| variable_from_row(row, 0),
        )?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    fn get_variable(&self, scope: &TableScope, name: &str) -> Result<Option<Variable>> {
        let conn = self.conn();
        conn.query_row(
            "SELECT name, type, value, updated_at FROM variables
             WHERE table_id = (SELECT id FROM tables WHERE id = ?1 AND project_id = ?2 AND owner_id = ?3)
               AND owner_id = ?3 AND name = ?4",
            params![scope.table_id, scope.project_id, scope.owner_id, name],
            |row| variable_from_row(row, 0),
        )
        .optional()
        .map_err(Error::from)
    }

    fn update_variable(
        &self,
        scope: &TableScope,
        name: &str,
        new_name: &str,
        new_kind: VarType,
    ) -> Result<()> {
        let mut conn = self.conn();
        let tx = conn.transaction()?;

        let value: String = tx
            .query_row(
                "SELECT value FROM variables
                 WHERE table_id = (SELECT id FROM tables WHERE id = ?1 AND project_id = ?2 AND owner_id = ?3)
                   AND owner_id = ?3 AND name = ?4",
                params![scope.table_id, scope.project_id, scope.owner_id, name],
                |row| row.get(0),
            )
            .optional()?
            .ok_or(Error::NotFound)?;

        // A retype must not strand a value the new type cannot parse.
        new_kind.check_stored(&value)?;

        let result = tx.execute(
            "UPDATE variables SET name = ?5, type = ?6, updated_at = ?7
             WHERE table_id = (SELECT id FROM tables WHERE id = ?1 AND project_id = ?2 AND owner_id = ?3)
               AND owner_id = ?3 AND name = ?4",
            params![
                scope.table_id,
                scope.project_id,
                scope.owner_id,
                name,
                new_name,
                new_kind,
                format_datetime(&Utc::now()),
            ],
        );

        match result {
            Ok(_) => {}
            Err(e) if is_unique_violation(&e) => {
                return Err(Error::Conflict(format!(
                    "variable {new_name:?} already exists"
                )));
            }
            Err(e) => return Err(Error::from(e)),
        }

        tx.commit()?;
        Ok(())
    }

    fn set_variable_value(
        &self,
        scope: &TableScope,
        name: &str,
        claimed: VarType,
        value: &str,
    ) -> Result<TypedValue> {
        let mut conn = self.conn();
        let tx = conn.transaction()?;

        let declared: VarType = tx
            .query_row(
                "SELECT type FROM variables
                 WHERE table_id = (SELECT id FROM tables WHERE id = ?1 AND project_id = ?2 AND owner_id = ?3)
                   AND owner_id = ?3 AND name = ?4",
                params![scope.table_id, scope.project_id, scope.owner_id, name],
                |row| row.get(0),
            )
            .optional()?
            .ok_or(Error::NotFound)?;

        if claimed != declared {
            return Err(Error::TypeMismatch { declared, claimed });
        }

        let typed = declared.parse_value(value)?;

        tx.execute(
            "UPDATE variables SET value = ?5, updated_at = ?6
             WHERE table_id = (SELECT id FROM tables WHERE id = ?1 AND project_id = ?2 AND owner_id = ?3)
               AND owner_id = ?3 AND name = ?4",
            params![
                scope.table_id,
                scope.project_id,
                scope.owner_id,
                name,
                value,
                format_datetime(&Utc::now()),
            ],
        )?;

        tx.commit()?;
        Ok(typed)
    }

    fn delete_variable(&self, scope: &TableScope, name: &str) -> Result<()> {
        let rows = self.conn().execute(
            "DELETE FROM variables
             WHERE table_id = (SELECT id FROM tables WHERE id = ?1 AND project_id = ?2 AND owner_id = ?3)
               AND owner_id = ?3 AND name = ?4",
            params![scope.table_id, scope.project_id, scope.owner_id, name],
        )?;

        if rows == 0 {
            return Err(Error::NotFound);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    struct Fixture {
        _temp: TempDir,
        store: SqliteStore,
        alice: Identity,
        bob: Identity,
    }

    fn fixture() -> Fixture {
        let temp = TempDir::new().unwrap();
        let store = SqliteStore::new(temp.path().join("test.db")).unwrap();
        store.initialize().unwrap();

        let alice = store.create_identity("alice", "hash-a").unwrap();
        let bob = store.create_identity("bob", "hash-b").unwrap();

        Fixture {
            _temp: temp,
            store,
            alice,
            bob,
        }
    }

    /// Creates project -> table -> `x: int` for `owner` and returns the scope.
    fn seed(store: &SqliteStore, owner: &Identity) -> TableScope {
        let project = store.create_project(owner.id, "P").unwrap();
        let table = store.create_table(owner.id, project.id, "T1").unwrap();
        let scope = TableScope::new(owner.id, project.id, table.id);
        store
            .create_variable(&scope, "x", VarType::Int, "")
            .unwrap();
        scope
    }

    fn count(store: &SqliteStore, table: &str) -> i64 {
        store
            .conn()
            .query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| {
                row.get(0)
            })
            .unwrap()
    }

    #[test]
    fn test_initialize_creates_tables() {
        let f = fixture();

        let conn = f.store.conn();
        let tables: Vec<String> = conn
            .prepare("SELECT name FROM sqlite_master WHERE type='table' ORDER BY name")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<std::result::Result<Vec<_>, _>>()
            .unwrap();

        for expected in ["identities", "projects", "tables", "variables"] {
            assert!(tables.contains(&expected.to_string()), "missing {expected}");
        }
    }

    #[test]
    fn test_duplicate_username_conflicts() {
        let f = fixture();

        let err = f.store.create_identity("alice", "other-hash").unwrap_err();
        assert!(matches!(err, Error::Conflict(_)));

        let creds = f.store.get_credentials("alice").unwrap().unwrap();
        assert_eq!(creds.credential_hash, "hash-a");
        assert_eq!(creds.identity.id, f.alice.id);
    }

    #[test]
    fn test_project_crud() {
        let f = fixture();
        assert!(f.store.list_projects(f.alice.id).unwrap().is_empty());

        let project = f.store.create_project(f.alice.id, "P").unwrap();
        assert!(project.access_token.starts_with("varvault_"));

        let listed = f.store.list_projects(f.alice.id).unwrap();
        assert_eq!(
            listed,
            vec![ProjectSummary {
                id: project.id,
                name: "P".to_string()
            }]
        );

        f.store
            .rename_project(f.alice.id, project.id, "Renamed")
            .unwrap();
        let fetched = f.store.get_project(f.alice.id, project.id).unwrap().unwrap();
        assert_eq!(fetched.name, "Renamed");
        assert_eq!(fetched.access_token, project.access_token);

        f.store.delete_project(f.alice.id, project.id).unwrap();
        assert!(f.store.get_project(f.alice.id, project.id).unwrap().is_none());
    }

    #[test]
    fn test_project_names_may_repeat() {
        let f = fixture();
        let a = f.store.create_project(f.alice.id, "same").unwrap();
        let b = f.store.create_project(f.alice.id, "same").unwrap();
        assert_ne!(a.id, b.id);
        assert_ne!(a.access_token, b.access_token);
    }

    #[test]
    fn test_foreign_owner_sees_not_found() {
        let f = fixture();
        let scope = seed(&f.store, &f.alice);
        let bob_scope = TableScope::new(f.bob.id, scope.project_id, scope.table_id);

        assert!(f.store.get_project(f.bob.id, scope.project_id).unwrap().is_none());
        assert!(matches!(
            f.store.load_project(f.bob.id, scope.project_id),
            Err(Error::NotFound)
        ));
        assert!(matches!(
            f.store.rename_project(f.bob.id, scope.project_id, "stolen"),
            Err(Error::NotFound)
        ));
        assert!(matches!(
            f.store.delete_project(f.bob.id, scope.project_id),
            Err(Error::NotFound)
        ));
        assert!(f.store.list_tables(f.bob.id, scope.project_id).unwrap().is_empty());
        assert!(matches!(
            f.store.rename_table(&bob_scope, "stolen"),
            Err(Error::NotFound)
        ));
        assert!(matches!(f.store.delete_table(&bob_scope), Err(Error::NotFound)));
        assert!(f.store.list_variables(&bob_scope).unwrap().is_empty());
        assert!(f.store.get_variable(&bob_scope, "x").unwrap().is_none());
        assert!(matches!(
            f.store.delete_variable(&bob_scope, "x"),
            Err(Error::NotFound)
        ));
        assert!(matches!(
            f.store
                .update_variable(&bob_scope, "x", "y", VarType::String),
            Err(Error::NotFound)
        ));

        // Alice's data is untouched.
        let project = f.store.get_project(f.alice.id, scope.project_id).unwrap().unwrap();
        assert_eq!(project.name, "P");
        let table = f.store.get_table(&scope).unwrap().unwrap();
        assert_eq!(table.name, "T1");
        assert_eq!(f.store.list_variables(&scope).unwrap().len(), 1);
    }

    #[test]
    fn test_create_table_under_foreign_project_is_rejected() {
        let f = fixture();
        let project = f.store.create_project(f.alice.id, "P").unwrap();

        let err = f.store.create_table(f.bob.id, project.id, "sneaky").unwrap_err();
        assert!(matches!(err, Error::NotFound));
        assert_eq!(count(&f.store, "tables"), 0);

        let err = f.store.create_table(f.alice.id, 9999, "orphan").unwrap_err();
        assert!(matches!(err, Error::NotFound));
    }

    #[test]
    fn test_table_name_unique_within_project() {
        let f = fixture();
        let project = f.store.create_project(f.alice.id, "P").unwrap();
        let first = f.store.create_table(f.alice.id, project.id, "T1").unwrap();
        assert_eq!(first.owner_id, f.alice.id);

        assert!(matches!(
            f.store.create_table(f.alice.id, project.id, "T1"),
            Err(Error::Conflict(_))
        ));

        let other = f.store.create_project(f.alice.id, "Q").unwrap();
        assert!(f.store.create_table(f.alice.id, other.id, "T1").is_ok());
    }

    #[test]
    fn test_table_path_must_match_project() {
        let f = fixture();
        let scope = seed(&f.store, &f.alice);
        let sibling = f.store.create_project(f.alice.id, "Sibling").unwrap();
        let wrong = TableScope::new(f.alice.id, sibling.id, scope.table_id);

        assert!(f.store.get_table(&wrong).unwrap().is_none());
        assert!(matches!(f.store.delete_table(&wrong), Err(Error::NotFound)));
        assert!(f.store.get_variable(&wrong, "x").unwrap().is_none());
        assert!(matches!(
            f.store.create_variable(&wrong, "y", VarType::Int, "1"),
            Err(Error::NotFound)
        ));
    }

    #[test]
    fn test_delete_project_cascades() {
        let f = fixture();
        let scope = seed(&f.store, &f.alice);
        assert_eq!(count(&f.store, "tables"), 1);
        assert_eq!(count(&f.store, "variables"), 1);

        f.store.delete_project(f.alice.id, scope.project_id).unwrap();

        assert_eq!(count(&f.store, "tables"), 0);
        assert_eq!(count(&f.store, "variables"), 0);
    }

    #[test]
    fn test_delete_table_cascades() {
        let f = fixture();
        let scope = seed(&f.store, &f.alice);

        f.store.delete_table(&scope).unwrap();

        assert_eq!(count(&f.store, "variables"), 0);
        assert!(f.store.get_project(f.alice.id, scope.project_id).unwrap().is_some());
    }

    #[test]
    fn test_create_variable_validates_value() {
        let f = fixture();
        let scope = seed(&f.store, &f.alice);

        let err = f
            .store
            .create_variable(&scope, "flag", VarType::Bool, "maybe")
            .unwrap_err();
        assert!(matches!(err, Error::InvalidValue { .. }));

        let created = f
            .store
            .create_variable(&scope, "flag", VarType::Bool, "true")
            .unwrap();
        assert_eq!(created.value, "true");

        assert!(matches!(
            f.store.create_variable(&scope, "flag", VarType::Bool, "false"),
            Err(Error::Conflict(_))
        ));
    }

    #[test]
    fn test_set_then_get_round_trips() {
        let f = fixture();
        let scope = seed(&f.store, &f.alice);

        let cases = [
            (VarType::String, "s", "hello world"),
            (VarType::Int, "i", "-17"),
            (VarType::Float, "f", "2.50"),
            (VarType::Bool, "b", "false"),
        ];

        for (kind, name, value) in cases {
            f.store.create_variable(&scope, name, kind, "").unwrap();
            f.store.set_variable_value(&scope, name, kind, value).unwrap();

            let got = f.store.get_variable(&scope, name).unwrap().unwrap();
            assert_eq!(got.value, value);
            assert_eq!(got.kind, kind);
        }
    }

    #[test]
    fn test_set_rejects_type_mismatch_without_writing() {
        let f = fixture();
        let scope = seed(&f.store, &f.alice);
        f.store.set_variable_value(&scope, "x", VarType::Int, "5").unwrap();

        let err = f
            .store
            .set_variable_value(&scope, "x", VarType::String, "a")
            .unwrap_err();
        assert!(matches!(
            err,
            Error::TypeMismatch {
                declared: VarType::Int,
                claimed: VarType::String
            }
        ));

        let got = f.store.get_variable(&scope, "x").unwrap().unwrap();
        assert_eq!(got.value, "5");
        assert_eq!(got.kind, VarType::Int);
    }

    #[test]
    fn test_set_rejects_invalid_value_without_writing() {
        let f = fixture();
        let scope = seed(&f.store, &f.alice);
        f.store.set_variable_value(&scope, "x", VarType::Int, "5").unwrap();

        let err = f
            .store
            .set_variable_value(&scope, "x", VarType::Int, "five")
            .unwrap_err();
        assert!(matches!(err, Error::InvalidValue { .. }));
        assert_eq!(f.store.get_variable(&scope, "x").unwrap().unwrap().value, "5");
    }

    #[test]
    fn test_set_never_inserts() {
        let f = fixture();
        let scope = seed(&f.store, &f.alice);

        let err = f
            .store
            .set_variable_value(&scope, "missing", VarType::Int, "1")
            .unwrap_err();
        assert!(matches!(err, Error::NotFound));
        assert_eq!(count(&f.store, "variables"), 1);
    }

    #[test]
    fn test_update_variable_renames_and_retypes() {
        let f = fixture();
        let scope = seed(&f.store, &f.alice);
        f.store.set_variable_value(&scope, "x", VarType::Int, "5").unwrap();

        f.store
            .update_variable(&scope, "x", "y", VarType::Float)
            .unwrap();

        assert!(f.store.get_variable(&scope, "x").unwrap().is_none());
        let y = f.store.get_variable(&scope, "y").unwrap().unwrap();
        assert_eq!(y.kind, VarType::Float);
        assert_eq!(y.value, "5");
    }

    #[test]
    fn test_update_variable_revalidates_value() {
        let f = fixture();
        let scope = seed(&f.store, &f.alice);
        f.store
            .create_variable(&scope, "label", VarType::String, "hello")
            .unwrap();

        let err = f
            .store
            .update_variable(&scope, "label", "label", VarType::Int)
            .unwrap_err();
        assert!(matches!(err, Error::InvalidValue { .. }));
        assert_eq!(
            f.store.get_variable(&scope, "label").unwrap().unwrap().kind,
            VarType::String
        );

        // An unset value can take any type.
        f.store
            .update_variable(&scope, "x", "x", VarType::Bool)
            .unwrap();
    }

    #[test]
    fn test_update_variable_name_conflict() {
        let f = fixture();
        let scope = seed(&f.store, &f.alice);
        f.store
            .create_variable(&scope, "y", VarType::Int, "1")
            .unwrap();

        assert!(matches!(
            f.store.update_variable(&scope, "x", "y", VarType::Int),
            Err(Error::Conflict(_))
        ));
        assert!(f.store.get_variable(&scope, "x").unwrap().is_some());
    }

    #[test]
    fn test_load_project_nests_tables_and_variables() {
        let f = fixture();
        let scope = seed(&f.store, &f.alice);
        let second = f
            .store
            .create_table(f.alice.id, scope.project_id, "T2")
            .unwrap();
        let second_scope = TableScope::new(f.alice.id, scope.project_id, second.id);
        f.store
            .create_variable(&second_scope, "a", VarType::String, "v")
            .unwrap();
        f.store
            .create_variable(&second_scope, "b", VarType::Bool, "true")
            .unwrap();

        let detail = f.store.load_project(f.alice.id, scope.project_id).unwrap();
        assert_eq!(detail.name, "P");
        assert_eq!(detail.tables.len(), 2);
        assert_eq!(detail.tables[0].name, "T1");
        assert_eq!(detail.tables[0].variables.len(), 1);
        let names: Vec<_> = detail.tables[1]
            .variables
            .iter()
            .map(|v| v.name.as_str())
            .collect();
        assert_eq!(names, ["a", "b"]);
    }

    #[test]
    fn test_resolve_access_token() {
        let f = fixture();
        let project = f.store.create_project(f.alice.id, "P").unwrap();

        let resolved = f
            .store
            .resolve_access_token(&project.access_token)
            .unwrap()
            .unwrap();
        assert_eq!(
            resolved,
            ResolvedProject {
                project_id: project.id,
                owner_id: f.alice.id
            }
        );

        assert!(f.store.resolve_access_token("varvault_nope").unwrap().is_none());
    }
}
