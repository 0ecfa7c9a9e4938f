//! SQLite schema definitions.

/// Current schema version for migrations.
pub const SCHEMA_VERSION: i32 = 1;

/// Complete schema for the local schedule database.
pub const SCHEMA: &str = r#"
-- One row per drilled key; the mistake set is the rows with weak = 1
CREATE TABLE IF NOT EXISTS schedule (
    key TEXT PRIMARY KEY,
    interval INTEGER NOT NULL DEFAULT 0,
    repetitions INTEGER NOT NULL DEFAULT 0,
    next_due TEXT NOT NULL,
    weak INTEGER NOT NULL DEFAULT 0,
    updated_at TEXT NOT NULL
);

-- Schema version tracking
CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER PRIMARY KEY
);

CREATE INDEX IF NOT EXISTS idx_schedule_next_due ON schedule(next_due);
CREATE INDEX IF NOT EXISTS idx_schedule_weak ON schedule(weak);
"#;

/// Record the schema version if not already present.
pub const INIT_SCHEMA_VERSION: &str = r#"
INSERT OR IGNORE INTO schema_version (version) VALUES (1);
"#;
