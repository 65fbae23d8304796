pub const SCHEMA: &str = r#"
-- Accounts that own projects
CREATE TABLE IF NOT EXISTS identities (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    username TEXT NOT NULL UNIQUE,
    credential_hash TEXT NOT NULL,     -- argon2id PHC string with embedded salt
    created_at TEXT DEFAULT (datetime('now'))
);

-- Projects are the hierarchy root; the access token is the device credential
CREATE TABLE IF NOT EXISTS projects (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    owner_id INTEGER NOT NULL REFERENCES identities(id) ON DELETE CASCADE,
    name TEXT NOT NULL,
    access_token TEXT NOT NULL UNIQUE,
    created_at TEXT DEFAULT (datetime('now'))
);

-- owner_id is denormalized on purpose: every query filters on it
CREATE TABLE IF NOT EXISTS tables (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    project_id INTEGER NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
    owner_id INTEGER NOT NULL REFERENCES identities(id) ON DELETE CASCADE,
    name TEXT NOT NULL,
    created_at TEXT DEFAULT (datetime('now')),

    UNIQUE(project_id, owner_id, name)
);

-- Values are stored as text; the empty text means "unset"
CREATE TABLE IF NOT EXISTS variables (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    table_id INTEGER NOT NULL REFERENCES tables(id) ON DELETE CASCADE,
    owner_id INTEGER NOT NULL REFERENCES identities(id) ON DELETE CASCADE,
    name TEXT NOT NULL,
    value TEXT NOT NULL DEFAULT '',
    type TEXT NOT NULL CHECK (type IN ('string', 'int', 'float', 'bool')),
    updated_at TEXT DEFAULT (datetime('now')),

    UNIQUE(table_id, owner_id, name)
);

CREATE INDEX IF NOT EXISTS idx_projects_owner ON projects(owner_id);
CREATE INDEX IF NOT EXISTS idx_tables_project ON tables(project_id, owner_id);
CREATE INDEX IF NOT EXISTS idx_variables_table ON variables(table_id, owner_id);
"#;
