//! File handlers for the STASH API.

use axum::{
    body::Body,
    extract::{Multipart, Path, Query, State},
    http::header,
    response::Response,
    Json,
};
use std::sync::Arc;

use crate::file::{is_inline_content_type, UploadRequest};
use crate::web::dto::{ApiResponse, FileResponse, SearchQuery, StatsResponse, TypeFilterQuery, ViewResponse};
use crate::web::error::ApiError;
use crate::web::handlers::AppState;

/// Generate a safe Content-Disposition header value for file downloads.
///
/// Sanitizes the filename to prevent header injection and uses RFC 5987
/// encoding for non-ASCII filenames.
fn content_disposition_header(disposition: &str, filename: &str) -> String {
    // Sanitize filename for the basic filename parameter (ASCII fallback)
    let sanitized: String = filename
        .chars()
        .filter(|c| !c.is_control())
        .map(|c| match c {
            '"' => '_',
            '\\' => '_',
            _ => c,
        })
        .collect();

    // For ASCII-only filenames, use simple format
    if filename.is_ascii() && !filename.chars().any(|c| c.is_control() || c == '"' || c == '\\') {
        return format!("{disposition}; filename=\"{filename}\"");
    }

    // RFC 5987 filename* parameter with UTF-8 encoding
    let encoded = urlencoding::encode(filename);

    format!("{disposition}; filename=\"{sanitized}\"; filename*=UTF-8''{encoded}")
}

/// Build a raw-bytes response with the given disposition.
fn content_response(
    content_type: &str,
    disposition: &str,
    filename: &str,
    content: Vec<u8>,
) -> Result<Response<Body>, ApiError> {
    Response::builder()
        .header(header::CONTENT_TYPE, content_type)
        .header(
            header::CONTENT_DISPOSITION,
            content_disposition_header(disposition, filename),
        )
        .header(header::CONTENT_LENGTH, content.len())
        .body(Body::from(content))
        .map_err(|e| {
            tracing::error!("Failed to build response: {}", e);
            ApiError::internal("Failed to build response")
        })
}

/// POST /api/files/upload - Upload a file.
///
/// Request body: multipart/form-data with a "file" field and optional
/// "userId" and "description" fields.
pub async fn upload_file(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<ApiResponse<FileResponse>>, ApiError> {
    let mut filename: Option<String> = None;
    let mut content_type: Option<String> = None;
    let mut content: Option<Vec<u8>> = None;
    let mut owner_id: Option<i64> = None;
    let mut description: Option<String> = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        tracing::error!("Failed to read multipart field: {}", e);
        ApiError::bad_request("Invalid multipart data")
    })? {
        let name = field.name().unwrap_or("").to_string();

        match name.as_str() {
            "file" => {
                filename = field.file_name().map(|s| s.to_string());
                content_type = field.content_type().map(|s| s.to_string());
                content = Some(
                    field
                        .bytes()
                        .await
                        .map_err(|e| {
                            tracing::error!("Failed to read file content: {}", e);
                            ApiError::bad_request("Failed to read file")
                        })?
                        .to_vec(),
                );
            }
            "userId" => {
                let text = field
                    .text()
                    .await
                    .map_err(|_| ApiError::bad_request("Invalid userId"))?;
                owner_id = Some(
                    text.trim()
                        .parse()
                        .map_err(|_| ApiError::bad_request("Invalid userId"))?,
                );
            }
            "description" => {
                description = Some(
                    field
                        .text()
                        .await
                        .map_err(|_| ApiError::bad_request("Invalid description"))?,
                );
            }
            _ => {}
        }
    }

    let filename = filename.ok_or_else(|| ApiError::bad_request("No file provided"))?;
    let content = content.ok_or_else(|| ApiError::bad_request("No file content"))?;

    // Fall back to a filename-based guess when the part has no declared type
    let content_type = content_type.unwrap_or_else(|| {
        mime_guess::from_path(&filename)
            .first_or_octet_stream()
            .to_string()
    });

    let mut request = UploadRequest::new(&filename, content).with_content_type(content_type);
    if let Some(owner_id) = owner_id {
        request = request.with_owner(owner_id);
    }
    if let Some(description) = description {
        if !description.trim().is_empty() {
            request = request.with_description(description);
        }
    }

    let record = state.service.upload(request).await?;

    Ok(Json(ApiResponse::success(
        "File uploaded successfully",
        FileResponse::from(&record),
    )))
}

/// GET /api/files - List all files.
pub async fn list_files(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<FileResponse>>>, ApiError> {
    let files = state.service.list_all().await?;
    let responses: Vec<FileResponse> = files.iter().map(FileResponse::from).collect();

    Ok(Json(ApiResponse::success(
        "Files retrieved successfully",
        responses,
    )))
}

/// GET /api/files/user/:user_id - List files uploaded by one user.
pub async fn list_files_by_user(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<i64>,
) -> Result<Json<ApiResponse<Vec<FileResponse>>>, ApiError> {
    let files = state.service.list_by_owner(user_id).await?;
    let responses: Vec<FileResponse> = files.iter().map(FileResponse::from).collect();

    Ok(Json(ApiResponse::success(
        "Files retrieved successfully",
        responses,
    )))
}

/// GET /api/files/search?q= - Search files by original name.
pub async fn search_files(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<ApiResponse<Vec<FileResponse>>>, ApiError> {
    let files = state.service.search(&query.q).await?;
    let responses: Vec<FileResponse> = files.iter().map(FileResponse::from).collect();

    Ok(Json(ApiResponse::success(
        "Search completed successfully",
        responses,
    )))
}

/// GET /api/files/filter?type= - Filter files by content-type prefix.
pub async fn filter_files(
    State(state): State<Arc<AppState>>,
    Query(query): Query<TypeFilterQuery>,
) -> Result<Json<ApiResponse<Vec<FileResponse>>>, ApiError> {
    let files = state.service.files_by_type(&query.file_type).await?;
    let responses: Vec<FileResponse> = files.iter().map(FileResponse::from).collect();

    Ok(Json(ApiResponse::success(
        "Files retrieved successfully",
        responses,
    )))
}

/// GET /api/files/:id - Get file metadata.
pub async fn get_file(
    State(state): State<Arc<AppState>>,
    Path(file_id): Path<i64>,
) -> Result<Json<ApiResponse<FileResponse>>, ApiError> {
    let record = state.service.get_file(file_id).await?;

    Ok(Json(ApiResponse::success(
        "File retrieved successfully",
        FileResponse::from(&record),
    )))
}

/// GET /api/files/:id/download - Download a file.
///
/// Browser-renderable types (images, PDF, text) are served inline;
/// everything else is served as an attachment.
pub async fn download_file(
    State(state): State<Arc<AppState>>,
    Path(file_id): Path<i64>,
) -> Result<Response<Body>, ApiError> {
    let result = state.service.download(file_id).await?;

    let disposition = if is_inline_content_type(&result.record.content_type) {
        "inline"
    } else {
        "attachment"
    };

    content_response(
        &result.record.content_type,
        disposition,
        &result.record.original_name,
        result.content,
    )
}

/// GET /api/files/:id/inline - Serve a file inline regardless of type.
pub async fn inline_file(
    State(state): State<Arc<AppState>>,
    Path(file_id): Path<i64>,
) -> Result<Response<Body>, ApiError> {
    let result = state.service.download(file_id).await?;

    content_response(
        &result.record.content_type,
        "inline",
        &result.record.original_name,
        result.content,
    )
}

/// GET /api/files/:id/view - Get file content as text.
pub async fn view_file(
    State(state): State<Arc<AppState>>,
    Path(file_id): Path<i64>,
) -> Result<Json<ApiResponse<ViewResponse>>, ApiError> {
    let (record, content) = state.service.view_content(file_id).await?;

    Ok(Json(ApiResponse::success(
        "File content retrieved successfully",
        ViewResponse {
            file: FileResponse::from(&record),
            content,
        },
    )))
}

/// DELETE /api/files/:id - Delete a file.
pub async fn delete_file(
    State(state): State<Arc<AppState>>,
    Path(file_id): Path<i64>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    if state.service.delete(file_id).await? {
        Ok(Json(ApiResponse::message("File deleted successfully")))
    } else {
        Err(ApiError::bad_request("Failed to delete file"))
    }
}

/// GET /api/files/stats - Aggregate storage statistics.
pub async fn stats(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<StatsResponse>>, ApiError> {
    let stats = state.service.stats().await?;

    Ok(Json(ApiResponse::success(
        "Statistics retrieved successfully",
        StatsResponse {
            total_storage: stats.total_bytes,
            total_storage_formatted: crate::file::format_file_size(
                stats.total_bytes.max(0) as u64
            ),
            file_count: stats.file_count,
        },
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_disposition_header_simple_ascii() {
        let result = content_disposition_header("attachment", "document.txt");
        assert_eq!(result, "attachment; filename=\"document.txt\"");
    }

    #[test]
    fn test_content_disposition_header_inline() {
        let result = content_disposition_header("inline", "photo.png");
        assert_eq!(result, "inline; filename=\"photo.png\"");
    }

    #[test]
    fn test_content_disposition_header_with_spaces() {
        let result = content_disposition_header("attachment", "my document.txt");
        assert_eq!(result, "attachment; filename=\"my document.txt\"");
    }

    #[test]
    fn test_content_disposition_header_non_ascii() {
        let result = content_disposition_header("attachment", "résumé.pdf");
        assert!(result.starts_with("attachment; filename=\""));
        assert!(result.contains("filename*=UTF-8''"));
        assert!(result.contains("r%C3%A9sum%C3%A9"));
    }

    #[test]
    fn test_content_disposition_header_double_quote() {
        let result = content_disposition_header("attachment", "test\"file.txt");
        assert!(result.contains("filename=\"test_file.txt\""));
        assert!(result.contains("filename*=UTF-8''"));
        assert!(result.contains("%22"));
    }

    #[test]
    fn test_content_disposition_header_header_injection() {
        let result = content_disposition_header("attachment", "test\r\nX-Injected: bad.txt");
        assert!(!result.contains('\r'));
        assert!(!result.contains('\n'));
        assert!(result.starts_with("attachment; filename="));
    }

    #[test]
    fn test_content_disposition_header_null_character() {
        let result = content_disposition_header("attachment", "test\x00null.txt");
        assert!(!result.contains('\x00'));
        assert!(result.starts_with("attachment; filename="));
    }
}
