//! SQLite schema definition.

/// Schema for the local session mirror.
pub const SCHEMA: &str = r#"
-- ============================================================================
-- Session fields (token, role, cached profile)
-- ============================================================================

CREATE TABLE IF NOT EXISTS session_fields (
    name TEXT PRIMARY KEY,
    value TEXT NOT NULL,
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);
"#;
