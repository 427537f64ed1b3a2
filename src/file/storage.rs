//! Blob storage for STASH.
//!
//! This module persists file bytes under a configured root directory:
//! - UUID-based stored names
//! - Date-bucketed directory structure (`YYYY/MM/DD`)
//! - Store, load, delete, and existence checks by relative path

use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use chrono::Utc;
use uuid::Uuid;

use crate::{Result, StashError};

/// Blob store rooted at a configured directory.
///
/// Files are stored in date-bucketed subdirectories:
/// ```text
/// {root}/
/// ├── 2026/08/29/
/// │   └── ab12cd34-5678-90ab-cdef-123456789012.txt
/// ├── 2026/08/30/
/// │   └── cd90ab12-3456-7890-abcd-ef1234567890.pdf
/// └── ...
/// ```
///
/// Stored names are random UUIDs, so overwrites are impossible by
/// construction regardless of original-name collisions.
#[derive(Debug, Clone)]
pub struct FileStorage {
    /// Root directory for blob storage.
    root: PathBuf,
}

impl FileStorage {
    /// Create a new FileStorage with the given root directory.
    ///
    /// The root directory will be created if it doesn't exist.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;

        Ok(Self { root })
    }

    /// Get the root directory of this storage.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Store content under a freshly generated name in today's date bucket.
    ///
    /// Returns the relative path (`YYYY/MM/DD/<uuid>.<ext>`) identifying the
    /// blob. The extension is used as-is; pass an empty string for none.
    pub fn store(&self, content: &[u8], extension: &str) -> Result<String> {
        let stored_name = Self::generate_stored_name(extension);
        let bucket = Utc::now().format("%Y/%m/%d").to_string();

        let bucket_dir = self.root.join(&bucket);
        fs::create_dir_all(&bucket_dir)?;

        fs::write(bucket_dir.join(&stored_name), content)?;

        Ok(format!("{bucket}/{stored_name}"))
    }

    /// Load blob content by relative path.
    ///
    /// Fails with `NotFound` if no blob exists at the path.
    pub fn load(&self, relative_path: &str) -> Result<Vec<u8>> {
        let path = self.resolve(relative_path)?;

        match fs::read(&path) {
            Ok(content) => Ok(content),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                Err(StashError::NotFound(format!("file {relative_path}")))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Delete a blob by relative path.
    ///
    /// Returns `true` if a file was removed, `false` if it was already
    /// absent. Idempotent.
    pub fn delete(&self, relative_path: &str) -> Result<bool> {
        let path = self.resolve(relative_path)?;

        match fs::remove_file(&path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// Check if a blob exists at the given relative path.
    pub fn exists(&self, relative_path: &str) -> bool {
        self.resolve(relative_path)
            .map(|path| path.exists())
            .unwrap_or(false)
    }

    /// Resolve a relative path against the root.
    ///
    /// Stored paths come from our own metadata, but they are still
    /// re-normalized here: absolute paths and `..` segments are rejected so
    /// no resolved path can escape the root.
    fn resolve(&self, relative_path: &str) -> Result<PathBuf> {
        let mut resolved = self.root.clone();

        for component in Path::new(relative_path).components() {
            match component {
                Component::Normal(segment) => resolved.push(segment),
                Component::CurDir => {}
                _ => return Err(StashError::InvalidPath(relative_path.to_string())),
            }
        }

        Ok(resolved)
    }

    /// Generate a new UUID-based stored name with the given extension.
    ///
    /// An empty extension yields a bare UUID with no trailing dot.
    pub fn generate_stored_name(extension: &str) -> String {
        let uuid = Uuid::new_v4();
        if extension.is_empty() {
            uuid.to_string()
        } else {
            format!("{uuid}.{extension}")
        }
    }

    /// Extract the lowercased extension from a filename.
    ///
    /// Returns an empty string when the filename has no extension.
    pub fn extract_extension(filename: &str) -> String {
        Path::new(filename)
            .extension()
            .and_then(|s| s.to_str())
            .map(|s| s.to_lowercase())
            .unwrap_or_default()
    }
}
