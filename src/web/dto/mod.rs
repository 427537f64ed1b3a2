//! Data transfer objects for the STASH HTTP API.

mod request;
mod response;

pub use request::{SearchQuery, TypeFilterQuery};
pub use response::{ApiResponse, FileResponse, StatsResponse, ViewResponse};
