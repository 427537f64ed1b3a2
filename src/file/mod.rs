//! File management module for STASH.
//!
//! This module provides file upload/retrieval functionality including:
//! - Upload validation (size, content type, path traversal)
//! - Date-bucketed blob storage with UUID naming
//! - File metadata records with soft delete
//! - The upload/retrieval service composing the three

mod record;
mod service;
mod storage;
mod validation;

pub use record::{FileRecord, FileRecordRepository, NewFileRecord};
pub use service::{DownloadResult, FileService, StorageStats, UploadRequest};
pub use storage::FileStorage;
pub use validation::{clean_path, validate_upload};

/// Default maximum file size (10MB).
pub const DEFAULT_MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// Default content-type allow-list.
pub const DEFAULT_ALLOWED_TYPES: &[&str] = &[
    "image/jpeg",
    "image/png",
    "image/gif",
    "text/plain",
    "application/json",
    "application/pdf",
    "text/csv",
];

/// Sentinel returned by the text view for non-text content.
pub const BINARY_CONTENT_SENTINEL: &str = "Binary file content cannot be displayed as text";

/// Format a byte count as a human-readable size.
///
/// Whole byte counts below 1 KB are rendered without a decimal
/// (`"100 Bytes"`); larger sizes use one decimal place and the unit
/// derived from `floor(log1024(bytes))`, clamped to GB.
pub fn format_file_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];

    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let unit_index = ((bytes as f64).ln() / 1024f64.ln()).floor() as usize;
    let unit_index = unit_index.min(UNITS.len() - 1);

    if unit_index == 0 {
        return format!("{bytes} Bytes");
    }

    let size = bytes as f64 / 1024f64.powi(unit_index as i32);
    format!("{size:.1} {}", UNITS[unit_index])
}

/// Whether a content type is rendered inline by browsers.
///
/// Used to pick the Content-Disposition for downloads.
pub fn is_inline_content_type(content_type: &str) -> bool {
    content_type.starts_with("image/")
        || content_type == "application/pdf"
        || content_type.starts_with("text/")
}

/// Whether a content type can be decoded and returned as text.
pub fn is_text_content_type(content_type: &str) -> bool {
    content_type.starts_with("text/")
        || content_type == "application/json"
        || content_type == "application/xml"
        || content_type == "text/csv"
}
