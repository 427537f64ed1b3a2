//! Upload/retrieval service for STASH.
//!
//! Composes validation, blob storage, and the metadata repository into the
//! operations the web layer exposes.

use std::sync::Arc;

use tracing::{info, warn};

use crate::db::Database;
use crate::{Result, StashError};

use super::record::{FileRecord, FileRecordRepository, NewFileRecord};
use super::storage::FileStorage;
use super::validation::{clean_path, validate_upload};
use super::{is_text_content_type, BINARY_CONTENT_SENTINEL, DEFAULT_ALLOWED_TYPES, DEFAULT_MAX_FILE_SIZE};

/// An upload as received from a client.
#[derive(Debug, Clone)]
pub struct UploadRequest {
    /// Client-supplied filename.
    pub original_name: String,
    /// File bytes.
    pub content: Vec<u8>,
    /// Declared MIME type, if any.
    pub content_type: Option<String>,
    /// Uploading principal, if known.
    pub owner_id: Option<i64>,
    /// Optional free-text description.
    pub description: Option<String>,
}

impl UploadRequest {
    /// Create a new upload request.
    pub fn new(original_name: impl Into<String>, content: Vec<u8>) -> Self {
        Self {
            original_name: original_name.into(),
            content,
            content_type: None,
            owner_id: None,
            description: None,
        }
    }

    /// Set the declared content type.
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// Set the uploading principal.
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

/// A record together with its blob content.
#[derive(Debug, Clone)]
pub struct DownloadResult {
    pub record: FileRecord,
    pub content: Vec<u8>,
}

/// Aggregate storage statistics across active files.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StorageStats {
    pub total_bytes: i64,
    pub file_count: i64,
}

/// File upload/retrieval service.
///
/// Uploads validate first, then write the blob, then insert metadata. A
/// metadata insert failure leaves an orphan blob behind; orphans are
/// invisible to every lookup and harmless beyond disk usage.
pub struct FileService {
    db: Arc<Database>,
    storage: FileStorage,
    max_file_size: u64,
    allowed_types: Vec<String>,
}

impl FileService {
    /// Create a service with default size limit and allow-list.
    pub fn new(db: Arc<Database>, storage: FileStorage) -> Self {
        Self {
            db,
            storage,
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            allowed_types: DEFAULT_ALLOWED_TYPES.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Override the maximum accepted file size.
    pub fn with_max_file_size(mut self, max_file_size: u64) -> Self {
        self.max_file_size = max_file_size;
        self
    }

    /// Override the content-type allow-list.
    pub fn with_allowed_types(mut self, allowed_types: Vec<String>) -> Self {
        self.allowed_types = allowed_types;
        self
    }

    /// Maximum accepted file size in bytes.
    pub fn max_file_size(&self) -> u64 {
        self.max_file_size
    }

    /// Store an upload and record its metadata.
    pub async fn upload(&self, request: UploadRequest) -> Result<FileRecord> {
        validate_upload(
            request.content.len() as u64,
            request.content_type.as_deref(),
            &request.original_name,
            self.max_file_size,
            &self.allowed_types,
        )?;

        let cleaned_name = clean_path(&request.original_name);
        let extension = FileStorage::extract_extension(&cleaned_name);

        let relative_path = self.storage.store(&request.content, &extension)?;
        let stored_name = relative_path
            .rsplit('/')
            .next()
            .unwrap_or(&relative_path)
            .to_string();

        // Validation guarantees a content type at this point
        let content_type = request
            .content_type
            .clone()
            .unwrap_or_else(|| "application/octet-stream".to_string());

        let mut new_record = NewFileRecord::new(
            &cleaned_name,
            &stored_name,
            &relative_path,
            content_type,
            request.content.len() as i64,
        );
        if let Some(owner_id) = request.owner_id {
            new_record = new_record.with_owner(owner_id);
        }
        if let Some(description) = &request.description {
            new_record = new_record.with_description(description);
        }

        let repo = FileRecordRepository::new(self.db.pool());
        let record = repo.insert(&new_record).await?;

        info!(
            "Stored file '{}' as {} ({} bytes)",
            record.original_name, record.relative_path, record.size_bytes
        );

        Ok(record)
    }

    /// List all active files, newest first.
    pub async fn list_all(&self) -> Result<Vec<FileRecord>> {
        FileRecordRepository::new(self.db.pool()).list_active().await
    }

    /// List active files owned by one principal, newest first.
    pub async fn list_by_owner(&self, owner_id: i64) -> Result<Vec<FileRecord>> {
        FileRecordRepository::new(self.db.pool())
            .list_by_owner(owner_id)
            .await
    }

    /// Search active files by original name substring.
    pub async fn search(&self, term: &str) -> Result<Vec<FileRecord>> {
        FileRecordRepository::new(self.db.pool()).search(term).await
    }

    /// List active files by content-type prefix.
    ///
    /// The special value `all` returns everything.
    pub async fn files_by_type(&self, file_type: &str) -> Result<Vec<FileRecord>> {
        let repo = FileRecordRepository::new(self.db.pool());

        if file_type == "all" {
            repo.list_active().await
        } else {
            repo.list_by_type_prefix(file_type).await
        }
    }

    /// Get an active file record by ID.
    pub async fn get_file(&self, id: i64) -> Result<FileRecord> {
        FileRecordRepository::new(self.db.pool())
            .get_by_id(id)
            .await?
            .ok_or_else(|| StashError::NotFound(format!("file {id}")))
    }

    /// Get a record together with its blob content.
    pub async fn download(&self, id: i64) -> Result<DownloadResult> {
        let record = self.get_file(id).await?;
        let content = self.storage.load(&record.relative_path)?;

        Ok(DownloadResult { record, content })
    }

    /// Get a file's content decoded as text.
    ///
    /// Non-text content types yield a fixed sentinel instead of bytes.
    pub async fn view_content(&self, id: i64) -> Result<(FileRecord, String)> {
        let result = self.download(id).await?;

        let text = if is_text_content_type(&result.record.content_type) {
            String::from_utf8_lossy(&result.content).into_owned()
        } else {
            BINARY_CONTENT_SENTINEL.to_string()
        };

        Ok((result.record, text))
    }

    /// Delete a file: remove the blob, then deactivate the record.
    ///
    /// Returns `true` when an active record was deactivated. An absent or
    /// already-deleted file yields `false` without touching storage.
    pub async fn delete(&self, id: i64) -> Result<bool> {
        let repo = FileRecordRepository::new(self.db.pool());

        let record = match repo.get_by_id(id).await? {
            Some(record) => record,
            None => return Ok(false),
        };

        // Blob first. If the blob removal errors the record stays active
        // and the delete can be retried.
        if !self.storage.delete(&record.relative_path)? {
            warn!("Blob already missing for file {id} at {}", record.relative_path);
        }

        let deactivated = repo.set_inactive(id).await?;
        if deactivated {
            info!("Deleted file {id} ('{}')", record.original_name);
        }

        Ok(deactivated)
    }

    /// Aggregate size and count across active files.
    pub async fn stats(&self) -> Result<StorageStats> {
        let repo = FileRecordRepository::new(self.db.pool());

        Ok(StorageStats {
            total_bytes: repo.sum_size_bytes().await?,
            file_count: repo.count_active().await?,
        })
    }
}
