//! HTTP handlers for the STASH API.

mod files;

pub use files::{
    delete_file, download_file, filter_files, get_file, inline_file, list_files,
    list_files_by_user, search_files, stats, upload_file, view_file,
};

use std::sync::Arc;

use crate::file::FileService;

/// Shared application state.
pub struct AppState {
    /// File upload/retrieval service.
    pub service: Arc<FileService>,
}

impl AppState {
    /// Create a new application state.
    pub fn new(service: Arc<FileService>) -> Self {
        Self { service }
    }
}
