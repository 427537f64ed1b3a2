//! HTTP API for STASH.
//!
//! Exposes the file service over an axum router:
//! - Multipart upload
//! - Listing, search, and type filtering
//! - Download, inline serving, and text view
//! - Soft delete and storage statistics

pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod server;

pub use error::{ApiError, ErrorCode};
pub use router::{create_health_router, create_router};
pub use server::WebServer;
