//! Upload validation for STASH.
//!
//! Pure checks against the configured size limit, content-type allow-list,
//! and path-traversal patterns in the client-supplied filename. No side
//! effects; storage and metadata are only touched after these pass.

use crate::{format_file_size, Result, StashError};

/// Normalize a client-supplied filename into a clean relative path.
///
/// Backslashes become slashes, empty and `.` segments are dropped, and
/// `..` segments cancel the preceding segment where possible. A leading
/// run of `..` segments cannot be resolved and is kept, which is what
/// [`validate_upload`] rejects.
pub fn clean_path(name: &str) -> String {
    let normalized = name.replace('\\', "/");
    let mut parts: Vec<&str> = Vec::new();

    for segment in normalized.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                if parts.last().is_some_and(|p| *p != "..") {
                    parts.pop();
                } else {
                    parts.push("..");
                }
            }
            other => parts.push(other),
        }
    }

    parts.join("/")
}

/// Validate an upload before anything is written.
///
/// Checks, in order: empty payload, size limit, content-type allow-list
/// (exact string match), and parent-directory traversal in the cleaned
/// original name.
pub fn validate_upload(
    size: u64,
    content_type: Option<&str>,
    original_name: &str,
    max_size: u64,
    allowed_types: &[String],
) -> Result<()> {
    if size == 0 {
        return Err(StashError::EmptyInput);
    }

    if size > max_size {
        return Err(StashError::TooLarge(format_file_size(max_size)));
    }

    match content_type {
        Some(ct) if allowed_types.iter().any(|t| t == ct) => {}
        Some(ct) => return Err(StashError::UnsupportedType(ct.to_string())),
        None => return Err(StashError::UnsupportedType("unknown".to_string())),
    }

    let cleaned = clean_path(original_name);
    if cleaned.split('/').any(|segment| segment == "..") {
        return Err(StashError::InvalidPath(original_name.to_string()));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn allowed() -> Vec<String> {
        vec!["text/plain".to_string(), "image/png".to_string()]
    }

    #[test]
    fn test_valid_upload() {
        let result = validate_upload(100, Some("text/plain"), "notes.txt", 1024, &allowed());
        assert!(result.is_ok());
    }

    #[test]
    fn test_empty_payload() {
        let result = validate_upload(0, Some("text/plain"), "notes.txt", 1024, &allowed());
        assert!(matches!(result, Err(StashError::EmptyInput)));
    }

    #[test]
    fn test_size_at_limit_passes() {
        let result = validate_upload(1024, Some("text/plain"), "notes.txt", 1024, &allowed());
        assert!(result.is_ok());
    }

    #[test]
    fn test_too_large() {
        let result = validate_upload(1025, Some("text/plain"), "notes.txt", 1024, &allowed());
        assert!(matches!(result, Err(StashError::TooLarge(_))));
    }

    #[test]
    fn test_too_large_reports_formatted_max() {
        let result = validate_upload(2048, Some("text/plain"), "notes.txt", 1024, &allowed());
        match result {
            Err(StashError::TooLarge(max)) => assert_eq!(max, "1.0 KB"),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_missing_content_type() {
        let result = validate_upload(100, None, "notes.txt", 1024, &allowed());
        assert!(matches!(result, Err(StashError::UnsupportedType(_))));
    }

    #[test]
    fn test_disallowed_content_type() {
        let result = validate_upload(100, Some("application/zip"), "a.zip", 1024, &allowed());
        assert!(matches!(result, Err(StashError::UnsupportedType(_))));
    }

    #[test]
    fn test_content_type_exact_match_only() {
        // Prefix of an allowed type is not enough
        let result = validate_upload(100, Some("text/plain; charset=utf-8"), "a.txt", 1024, &allowed());
        assert!(matches!(result, Err(StashError::UnsupportedType(_))));
    }

    #[test]
    fn test_traversal_in_name() {
        let result = validate_upload(100, Some("text/plain"), "../../etc/passwd", 1024, &allowed());
        assert!(matches!(result, Err(StashError::InvalidPath(_))));
    }

    #[test]
    fn test_traversal_with_backslashes() {
        let result = validate_upload(100, Some("text/plain"), "..\\..\\secret.txt", 1024, &allowed());
        assert!(matches!(result, Err(StashError::InvalidPath(_))));
    }

    #[test]
    fn test_resolvable_traversal_passes() {
        // "a/../notes.txt" cleans to "notes.txt" and is harmless
        let result = validate_upload(100, Some("text/plain"), "a/../notes.txt", 1024, &allowed());
        assert!(result.is_ok());
    }

    #[test]
    fn test_clean_path() {
        assert_eq!(clean_path("notes.txt"), "notes.txt");
        assert_eq!(clean_path("./notes.txt"), "notes.txt");
        assert_eq!(clean_path("a/b/../c.txt"), "a/c.txt");
        assert_eq!(clean_path("a/../../c.txt"), "../c.txt");
        assert_eq!(clean_path("..\\c.txt"), "../c.txt");
        assert_eq!(clean_path("a//b.txt"), "a/b.txt");
        assert_eq!(clean_path(""), "");
    }
}
