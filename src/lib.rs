//! STASH - a small file upload and retrieval service over HTTP.
//!
//! Files are validated, written to a date-bucketed blob store under
//! UUID names, and tracked in a SQLite metadata database with soft
//! delete. The HTTP layer exposes upload, listing, search, filtering,
//! download, text view, delete, and storage statistics.

pub mod config;
pub mod db;
pub mod error;
pub mod file;
pub mod logging;
pub mod web;

pub use config::Config;
pub use db::Database;
pub use error::{Result, StashError};
pub use file::{format_file_size, FileService, FileStorage};
