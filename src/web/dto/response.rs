//! Response DTOs for the STASH HTTP API.

use serde::Serialize;

use crate::file::{format_file_size, FileRecord};

/// Generic API response envelope.
///
/// Every successful response carries `success: true`, a human-readable
/// message, and optionally the payload under `data`.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    /// Always true for successful responses.
    pub success: bool,
    /// Human-readable message.
    pub message: String,
    /// Response payload, omitted when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    /// Create a successful response with a payload.
    pub fn success(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: Some(data),
        }
    }
}

impl ApiResponse<()> {
    /// Create a successful response with no payload.
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: None,
        }
    }
}

/// File metadata in responses.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileResponse {
    /// File ID.
    pub id: i64,
    /// Client-supplied filename.
    pub original_name: String,
    /// MIME type.
    pub file_type: String,
    /// Human-readable size (`"1.5 KB"`).
    pub file_size: String,
    /// Exact size in bytes.
    pub size_bytes: i64,
    /// Upload timestamp (RFC 3339).
    pub upload_date: String,
    /// Owner ID, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner_id: Option<i64>,
    /// Description, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// URL for downloading the file.
    pub download_url: String,
    /// URL for the text view of the file.
    pub view_url: String,
}

impl From<&FileRecord> for FileResponse {
    fn from(record: &FileRecord) -> Self {
        Self {
            id: record.id,
            original_name: record.original_name.clone(),
            file_type: record.content_type.clone(),
            file_size: format_file_size(record.size_bytes.max(0) as u64),
            size_bytes: record.size_bytes,
            upload_date: record.uploaded_at.to_rfc3339(),
            owner_id: record.owner_id,
            description: record.description.clone(),
            download_url: format!("/api/files/{}/download", record.id),
            view_url: format!("/api/files/{}/view", record.id),
        }
    }
}

/// Aggregate storage statistics response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsResponse {
    /// Total bytes across active files.
    pub total_storage: i64,
    /// Human-readable total (`"1.5 MB"`).
    pub total_storage_formatted: String,
    /// Number of active files.
    pub file_count: i64,
}

/// Text view response: metadata plus decoded content.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewResponse {
    /// File metadata.
    pub file: FileResponse,
    /// Decoded text content, or a fixed sentinel for binary files.
    pub content: String,
}
