//! `SQLite` schema definitions for the key-value store.
//!
//! This module contains the SQL statements for creating the table and the
//! statements run against it.

/// SQL statement to create the key-value table.
pub const CREATE_KV_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS kv_store (
    key TEXT PRIMARY KEY NOT NULL,
    value TEXT NOT NULL,
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
)
";

/// All schema creation statements in order.
pub const SCHEMA_STATEMENTS: &[&str] = &[CREATE_KV_TABLE];

/// Read one value.
pub const SELECT_VALUE: &str = "SELECT value FROM kv_store WHERE key = ?1";

/// Insert or replace one value in a single statement.
pub const UPSERT_VALUE: &str = r"
INSERT INTO kv_store (key, value) VALUES (?1, ?2)
ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = datetime('now')
";

/// Remove one key.
pub const DELETE_VALUE: &str = "DELETE FROM kv_store WHERE key = ?1";
