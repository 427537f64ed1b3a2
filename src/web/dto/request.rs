//! Request DTOs for the STASH HTTP API.

use serde::Deserialize;

/// Query parameters for filename search.
#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    /// Substring to match against original filenames.
    pub q: String,
}

/// Query parameters for content-type filtering.
#[derive(Debug, Deserialize)]
pub struct TypeFilterQuery {
    /// Content-type prefix, or `all` for no filtering.
    #[serde(rename = "type")]
    pub file_type: String,
}
