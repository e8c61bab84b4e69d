//! SQL schema for the Cohort SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

-- Read-only to the grouping engine.
CREATE TABLE IF NOT EXISTS contacts (
    user_id      TEXT NOT NULL,
    contact_id   TEXT NOT NULL,
    name         TEXT NOT NULL DEFAULT '',
    email        TEXT,
    company      TEXT,
    latitude     REAL,
    longitude    REAL,
    submitted_at TEXT,            -- RFC 3339, original offset kept
    created_at   TEXT,            -- RFC 3339, original offset kept
    PRIMARY KEY (user_id, contact_id)
);

-- One document per user. The whole collection is replaced in a single
-- transaction on every merge.
CREATE TABLE IF NOT EXISTS group_collections (
    user_id       TEXT PRIMARY KEY,
    groups_json   TEXT NOT NULL DEFAULT '[]',
    total_groups  INTEGER NOT NULL DEFAULT 0,
    last_modified TEXT NOT NULL   -- RFC 3339 UTC
);

CREATE INDEX IF NOT EXISTS contacts_user_idx ON contacts(user_id);

PRAGMA user_version = 1;
";
