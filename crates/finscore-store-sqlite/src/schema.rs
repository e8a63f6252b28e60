//! SQL schema for the finscore SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

-- One row per subject; the subject id is its own partition key.
CREATE TABLE IF NOT EXISTS subjects (
    id    TEXT PRIMARY KEY,
    body  TEXT NOT NULL          -- JSON-encoded Subject
);

-- Documents and their sheets share one container, partitioned by subject.
-- Deleting a subject does not touch this table.
CREATE TABLE IF NOT EXISTS documents (
    subject_id   TEXT NOT NULL,
    id           TEXT NOT NULL,
    record_type  TEXT NOT NULL CHECK (record_type IN ('doc', 'sheet')),
    body         TEXT NOT NULL,  -- JSON-encoded Document or Sheet
    PRIMARY KEY (subject_id, id)
);

CREATE INDEX IF NOT EXISTS documents_partition_idx
    ON documents(subject_id, record_type);

PRAGMA user_version = 1;
";
