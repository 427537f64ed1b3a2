//! File metadata records and repository for STASH.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use crate::{Result, StashError};

const RECORD_COLUMNS: &str = "id, original_name, stored_name, relative_path, content_type,
                              size_bytes, uploaded_at, owner_id, description, is_active";

/// Metadata for one uploaded blob.
///
/// Rows are append-only: deletion flips `is_active` and removes the blob,
/// but the record itself is kept.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct FileRecord {
    /// Unique record ID, assigned by the store.
    pub id: i64,
    /// Client-supplied display name (unsanitized; display only).
    pub original_name: String,
    /// System-generated unique name (`<uuid>.<ext>`).
    pub stored_name: String,
    /// Date-bucketed path relative to the storage root.
    pub relative_path: String,
    /// MIME type, validated against the allow-list at upload time.
    pub content_type: String,
    /// Byte length of the blob.
    pub size_bytes: i64,
    /// When the file was uploaded. Set once, never mutated.
    pub uploaded_at: DateTime<Utc>,
    /// Optional ID of the uploading principal.
    pub owner_id: Option<i64>,
    /// Optional free-text description.
    pub description: Option<String>,
    /// False once the file has been soft-deleted.
    pub is_active: bool,
}

/// Data for creating a new file record.
#[derive(Debug, Clone)]
pub struct NewFileRecord {
    /// Client-supplied display name.
    pub original_name: String,
    /// System-generated unique name.
    pub stored_name: String,
    /// Date-bucketed relative path.
    pub relative_path: String,
    /// MIME type.
    pub content_type: String,
    /// Byte length.
    pub size_bytes: i64,
    /// Optional owner ID.
    pub owner_id: Option<i64>,
    /// Optional description.
    pub description: Option<String>,
}

impl NewFileRecord {
    /// Create a new NewFileRecord.
    pub fn new(
        original_name: impl Into<String>,
        stored_name: impl Into<String>,
        relative_path: impl Into<String>,
        content_type: impl Into<String>,
        size_bytes: i64,
    ) -> Self {
        Self {
            original_name: original_name.into(),
            stored_name: stored_name.into(),
            relative_path: relative_path.into(),
            content_type: content_type.into(),
            size_bytes,
            owner_id: None,
            description: None,
        }
    }

    /// Set the owner ID.
    pub fn with_owner(mut self, owner_id: i64) -> Self {
        self.owner_id = Some(owner_id);
        self
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Repository for file metadata operations.
///
/// All queries are scoped to `is_active = 1` and list queries order by
/// `uploaded_at DESC, id DESC` (newest first, insertion order breaking
/// timestamp ties).
pub struct FileRecordRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> FileRecordRepository<'a> {
    /// Create a new repository with the given pool reference.
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a new file record.
    ///
    /// Returns the created record with the assigned ID.
    pub async fn insert(&self, new_record: &NewFileRecord) -> Result<FileRecord> {
        let result = sqlx::query(
            "INSERT INTO files (original_name, stored_name, relative_path, content_type,
                                size_bytes, uploaded_at, owner_id, description, is_active)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, 1)",
        )
        .bind(&new_record.original_name)
        .bind(&new_record.stored_name)
        .bind(&new_record.relative_path)
        .bind(&new_record.content_type)
        .bind(new_record.size_bytes)
        .bind(Utc::now())
        .bind(new_record.owner_id)
        .bind(&new_record.description)
        .execute(self.pool)
        .await?;

        let id = result.last_insert_rowid();
        self.get_by_id(id)
            .await?
            .ok_or_else(|| StashError::Database("inserted row not found".to_string()))
    }

    /// Get an active record by ID.
    pub async fn get_by_id(&self, id: i64) -> Result<Option<FileRecord>> {
        let record = sqlx::query_as::<_, FileRecord>(&format!(
            "SELECT {RECORD_COLUMNS} FROM files WHERE id = ? AND is_active = 1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(record)
    }

    /// Get an active record by stored name.
    pub async fn get_by_stored_name(&self, stored_name: &str) -> Result<Option<FileRecord>> {
        let record = sqlx::query_as::<_, FileRecord>(&format!(
            "SELECT {RECORD_COLUMNS} FROM files WHERE stored_name = ? AND is_active = 1"
        ))
        .bind(stored_name)
        .fetch_optional(self.pool)
        .await?;

        Ok(record)
    }

    /// List all active records, newest first.
    pub async fn list_active(&self) -> Result<Vec<FileRecord>> {
        let records = sqlx::query_as::<_, FileRecord>(&format!(
            "SELECT {RECORD_COLUMNS} FROM files WHERE is_active = 1
             ORDER BY uploaded_at DESC, id DESC"
        ))
        .fetch_all(self.pool)
        .await?;

        Ok(records)
    }

    /// List active records owned by one principal, newest first.
    pub async fn list_by_owner(&self, owner_id: i64) -> Result<Vec<FileRecord>> {
        let records = sqlx::query_as::<_, FileRecord>(&format!(
            "SELECT {RECORD_COLUMNS} FROM files WHERE owner_id = ? AND is_active = 1
             ORDER BY uploaded_at DESC, id DESC"
        ))
        .bind(owner_id)
        .fetch_all(self.pool)
        .await?;

        Ok(records)
    }

    /// Search active records whose original name contains the term.
    ///
    /// Uses SQLite `LIKE`, which is case-insensitive for ASCII.
    pub async fn search(&self, term: &str) -> Result<Vec<FileRecord>> {
        let pattern = format!("%{term}%");

        let records = sqlx::query_as::<_, FileRecord>(&format!(
            "SELECT {RECORD_COLUMNS} FROM files WHERE original_name LIKE ? AND is_active = 1
             ORDER BY uploaded_at DESC, id DESC"
        ))
        .bind(pattern)
        .fetch_all(self.pool)
        .await?;

        Ok(records)
    }

    /// List active records whose content type starts with the prefix.
    pub async fn list_by_type_prefix(&self, prefix: &str) -> Result<Vec<FileRecord>> {
        let pattern = format!("{prefix}%");

        let records = sqlx::query_as::<_, FileRecord>(&format!(
            "SELECT {RECORD_COLUMNS} FROM files WHERE content_type LIKE ? AND is_active = 1
             ORDER BY uploaded_at DESC, id DESC"
        ))
        .bind(pattern)
        .fetch_all(self.pool)
        .await?;

        Ok(records)
    }

    /// Total size in bytes across active records, 0 if none.
    pub async fn sum_size_bytes(&self) -> Result<i64> {
        let total: (i64,) =
            sqlx::query_as("SELECT COALESCE(SUM(size_bytes), 0) FROM files WHERE is_active = 1")
                .fetch_one(self.pool)
                .await?;

        Ok(total.0)
    }

    /// Count of active records.
    pub async fn count_active(&self) -> Result<i64> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM files WHERE is_active = 1")
            .fetch_one(self.pool)
            .await?;

        Ok(count.0)
    }

    /// Soft-delete a record by flipping its active flag.
    ///
    /// Returns `true` if an active record was deactivated, `false` if the
    /// record was absent or already inactive.
    pub async fn set_inactive(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("UPDATE files SET is_active = 0 WHERE id = ? AND is_active = 1")
            .bind(id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;

    async fn setup_db() -> Database {
        Database::open_in_memory().await.unwrap()
    }

    fn sample_record(name: &str, stored: &str, size: i64) -> NewFileRecord {
        NewFileRecord::new(
            name,
            stored,
            format!("2026/08/29/{stored}"),
            "text/plain",
            size,
        )
    }

    #[tokio::test]
    async fn test_insert() {
        let db = setup_db().await;
        let repo = FileRecordRepository::new(db.pool());

        let new_record = sample_record("notes.txt", "aaaa.txt", 100)
            .with_owner(7)
            .with_description("weekly notes");

        let record = repo.insert(&new_record).await.unwrap();

        assert_eq!(record.original_name, "notes.txt");
        assert_eq!(record.stored_name, "aaaa.txt");
        assert_eq!(record.relative_path, "2026/08/29/aaaa.txt");
        assert_eq!(record.content_type, "text/plain");
        assert_eq!(record.size_bytes, 100);
        assert_eq!(record.owner_id, Some(7));
        assert_eq!(record.description, Some("weekly notes".to_string()));
        assert!(record.is_active);
    }

    #[tokio::test]
    async fn test_get_by_id_not_found() {
        let db = setup_db().await;
        let repo = FileRecordRepository::new(db.pool());

        let found = repo.get_by_id(9999).await.unwrap();
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn test_get_by_stored_name() {
        let db = setup_db().await;
        let repo = FileRecordRepository::new(db.pool());

        repo.insert(&sample_record("a.txt", "unique-name.txt", 10))
            .await
            .unwrap();

        let found = repo.get_by_stored_name("unique-name.txt").await.unwrap();
        assert!(found.is_some());
        assert_eq!(found.unwrap().original_name, "a.txt");

        let missing = repo.get_by_stored_name("other.txt").await.unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_list_active_newest_first() {
        let db = setup_db().await;
        let repo = FileRecordRepository::new(db.pool());

        repo.insert(&sample_record("first.txt", "s1.txt", 1))
            .await
            .unwrap();
        repo.insert(&sample_record("second.txt", "s2.txt", 2))
            .await
            .unwrap();

        let records = repo.list_active().await.unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].original_name, "second.txt");
        assert_eq!(records[1].original_name, "first.txt");
    }

    #[tokio::test]
    async fn test_list_by_owner() {
        let db = setup_db().await;
        let repo = FileRecordRepository::new(db.pool());

        repo.insert(&sample_record("a.txt", "s1.txt", 1).with_owner(1))
            .await
            .unwrap();
        repo.insert(&sample_record("b.txt", "s2.txt", 2).with_owner(2))
            .await
            .unwrap();
        repo.insert(&sample_record("c.txt", "s3.txt", 3).with_owner(1))
            .await
            .unwrap();

        let owner1 = repo.list_by_owner(1).await.unwrap();
        assert_eq!(owner1.len(), 2);
        assert!(owner1.iter().all(|r| r.owner_id == Some(1)));

        let owner3 = repo.list_by_owner(3).await.unwrap();
        assert!(owner3.is_empty());
    }

    #[tokio::test]
    async fn test_search() {
        let db = setup_db().await;
        let repo = FileRecordRepository::new(db.pool());

        repo.insert(&sample_record("report-2026.pdf", "s1.pdf", 1))
            .await
            .unwrap();
        repo.insert(&sample_record("notes.txt", "s2.txt", 2))
            .await
            .unwrap();

        let matches = repo.search("report").await.unwrap();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].original_name, "report-2026.pdf");

        // SQLite LIKE is case-insensitive for ASCII
        let matches = repo.search("REPORT").await.unwrap();
        assert_eq!(matches.len(), 1);

        let matches = repo.search("missing").await.unwrap();
        assert!(matches.is_empty());
    }

    #[tokio::test]
    async fn test_search_excludes_inactive() {
        let db = setup_db().await;
        let repo = FileRecordRepository::new(db.pool());

        let record = repo
            .insert(&sample_record("report.pdf", "s1.pdf", 1))
            .await
            .unwrap();
        repo.set_inactive(record.id).await.unwrap();

        let matches = repo.search("report").await.unwrap();
        assert!(matches.is_empty());
    }

    #[tokio::test]
    async fn test_list_by_type_prefix() {
        let db = setup_db().await;
        let repo = FileRecordRepository::new(db.pool());

        let mut image = sample_record("photo.png", "s1.png", 1);
        image.content_type = "image/png".to_string();
        repo.insert(&image).await.unwrap();

        repo.insert(&sample_record("notes.txt", "s2.txt", 2))
            .await
            .unwrap();

        let images = repo.list_by_type_prefix("image/").await.unwrap();
        assert_eq!(images.len(), 1);
        assert_eq!(images[0].content_type, "image/png");

        let texts = repo.list_by_type_prefix("text/").await.unwrap();
        assert_eq!(texts.len(), 1);
    }

    #[tokio::test]
    async fn test_sum_and_count() {
        let db = setup_db().await;
        let repo = FileRecordRepository::new(db.pool());

        assert_eq!(repo.sum_size_bytes().await.unwrap(), 0);
        assert_eq!(repo.count_active().await.unwrap(), 0);

        repo.insert(&sample_record("a.txt", "s1.txt", 100))
            .await
            .unwrap();
        let second = repo
            .insert(&sample_record("b.txt", "s2.txt", 250))
            .await
            .unwrap();

        assert_eq!(repo.sum_size_bytes().await.unwrap(), 350);
        assert_eq!(repo.count_active().await.unwrap(), 2);

        repo.set_inactive(second.id).await.unwrap();

        assert_eq!(repo.sum_size_bytes().await.unwrap(), 100);
        assert_eq!(repo.count_active().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_set_inactive() {
        let db = setup_db().await;
        let repo = FileRecordRepository::new(db.pool());

        let record = repo
            .insert(&sample_record("a.txt", "s1.txt", 1))
            .await
            .unwrap();

        assert!(repo.set_inactive(record.id).await.unwrap());

        // The record is hidden from active-scoped lookups but not removed
        assert!(repo.get_by_id(record.id).await.unwrap().is_none());
        let raw: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM files")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(raw.0, 1);

        // Second flip reports failure
        assert!(!repo.set_inactive(record.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_set_inactive_missing_record() {
        let db = setup_db().await;
        let repo = FileRecordRepository::new(db.pool());

        assert!(!repo.set_inactive(9999).await.unwrap());
    }

    #[test]
    fn test_new_record_builder() {
        let record = NewFileRecord::new("a.txt", "s.txt", "2026/01/01/s.txt", "text/plain", 42)
            .with_owner(5)
            .with_description("desc");

        assert_eq!(record.original_name, "a.txt");
        assert_eq!(record.stored_name, "s.txt");
        assert_eq!(record.size_bytes, 42);
        assert_eq!(record.owner_id, Some(5));
        assert_eq!(record.description, Some("desc".to_string()));
    }
}
