//! SQL schema for the insight store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

-- One row per file id that has ever had insights generated.
CREATE TABLE IF NOT EXISTS insight_sets (
    file_id      TEXT PRIMARY KEY,
    generated_at TEXT NOT NULL    -- ISO 8601 UTC of the latest save
);

-- The current insight set for each file id, in generation order.
-- A save deletes and re-inserts the whole set inside one transaction.
CREATE TABLE IF NOT EXISTS insights (
    file_id          TEXT    NOT NULL REFERENCES insight_sets(file_id) ON DELETE CASCADE,
    position         INTEGER NOT NULL,
    title            TEXT    NOT NULL,
    description      TEXT    NOT NULL,
    confidence_score REAL    NOT NULL,
    reference_rows   TEXT    NOT NULL DEFAULT '[]',   -- JSON array of row indices
    PRIMARY KEY (file_id, position)
);

PRAGMA user_version = 1;
";
