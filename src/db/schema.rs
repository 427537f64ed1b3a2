//! Database schema migrations for STASH.
//!
//! Each entry in [`MIGRATIONS`] is applied once, in order, and recorded in
//! the `schema_version` table.

/// Ordered list of schema migrations.
pub const MIGRATIONS: &[&str] = &[
    // v1: file metadata table
    "CREATE TABLE files (
        id            INTEGER PRIMARY KEY AUTOINCREMENT,
        original_name TEXT NOT NULL,
        stored_name   TEXT NOT NULL UNIQUE,
        relative_path TEXT NOT NULL,
        content_type  TEXT NOT NULL,
        size_bytes    INTEGER NOT NULL,
        uploaded_at   TEXT NOT NULL,
        owner_id      INTEGER,
        description   TEXT,
        is_active     INTEGER NOT NULL DEFAULT 1
    );
    CREATE INDEX idx_files_uploaded_at ON files(uploaded_at);
    CREATE INDEX idx_files_owner_id ON files(owner_id);
    CREATE INDEX idx_files_content_type ON files(content_type);",
];
