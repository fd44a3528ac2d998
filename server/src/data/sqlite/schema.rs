//! SQLite schema definitions
//!
//! `SCHEMA` is always the latest complete schema; older databases are brought
//! up to date by the versioned migrations in `migrations.rs`.

/// Current schema version
pub const SCHEMA_VERSION: i32 = 2;

/// Complete schema SQL
pub const SCHEMA: &str = r#"
-- =============================================================================
-- Infrastructure: Schema version tracking
-- =============================================================================
CREATE TABLE IF NOT EXISTS schema_version (
    id INTEGER PRIMARY KEY CHECK (id = 1),
    version INTEGER NOT NULL,
    applied_at INTEGER NOT NULL,
    description TEXT
);

CREATE TABLE IF NOT EXISTS schema_migrations (
    version INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    applied_at INTEGER NOT NULL,
    checksum TEXT NOT NULL,
    execution_time_ms INTEGER,
    success INTEGER NOT NULL DEFAULT 1
);

-- =============================================================================
-- 1. Users
-- =============================================================================
-- Timestamps are unix seconds; email uniqueness ignores ASCII case.
CREATE TABLE IF NOT EXISTS users (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL CHECK(length(name) >= 1 AND length(name) <= 255),
    email TEXT NOT NULL COLLATE NOCASE UNIQUE CHECK(length(email) >= 3 AND length(email) <= 255),
    email_verified_at INTEGER,
    created_at INTEGER NOT NULL,
    updated_at INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_users_name ON users(name);
CREATE INDEX IF NOT EXISTS idx_users_created ON users(created_at);

-- =============================================================================
-- 2. Posts (references users)
-- =============================================================================
CREATE TABLE IF NOT EXISTS posts (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    title TEXT NOT NULL CHECK(length(title) >= 1 AND length(title) <= 255),
    created_at INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_posts_user ON posts(user_id, id);
"#;

/// v2: indexes backing the grid's most common sort columns
pub const MIGRATION_V2: &str = r#"
CREATE INDEX IF NOT EXISTS idx_users_name ON users(name);
CREATE INDEX IF NOT EXISTS idx_users_created ON users(created_at);
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_contains_required_tables() {
        for table in ["schema_version", "schema_migrations", "users", "posts"] {
            assert!(
                SCHEMA.contains(&format!("CREATE TABLE IF NOT EXISTS {}", table)),
                "Schema missing table: {}",
                table
            );
        }
    }

    #[test]
    fn test_latest_schema_includes_migrated_indexes() {
        for statement in MIGRATION_V2.split(';').map(str::trim).filter(|s| !s.is_empty()) {
            assert!(
                SCHEMA.contains(statement),
                "Schema missing migrated statement: {}",
                statement
            );
        }
    }

    #[test]
    fn test_posts_cascade_with_user() {
        assert!(SCHEMA.contains("REFERENCES users(id) ON DELETE CASCADE"));
    }
}
