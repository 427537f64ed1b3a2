//! Middleware for the STASH HTTP API.

mod cors;

pub use cors::create_cors_layer;
