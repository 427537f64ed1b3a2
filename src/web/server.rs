//! Web server for STASH.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;
use tower_http::compression::CompressionLayer;

use crate::config::ServerConfig;
use crate::file::FileService;
use crate::{Result, StashError};

use super::handlers::AppState;
use super::router::{create_health_router, create_router};

/// Web server for the API.
pub struct WebServer {
    /// Server address.
    addr: SocketAddr,
    /// Application state.
    app_state: Arc<AppState>,
    /// CORS origins.
    cors_origins: Vec<String>,
    /// Maximum accepted upload size in bytes.
    max_upload_size: u64,
}

impl WebServer {
    /// Create a new web server.
    pub fn new(config: &ServerConfig, service: Arc<FileService>) -> Result<Self> {
        let addr = format!("{}:{}", config.host, config.port)
            .parse()
            .map_err(|_| {
                StashError::Config(format!(
                    "invalid server address {}:{}",
                    config.host, config.port
                ))
            })?;

        let max_upload_size = service.max_file_size();

        Ok(Self {
            addr,
            app_state: Arc::new(AppState::new(service)),
            cors_origins: config.cors_origins.clone(),
            max_upload_size,
        })
    }

    /// Get the server address.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    fn build_router(&self) -> axum::Router {
        create_router(
            self.app_state.clone(),
            &self.cors_origins,
            self.max_upload_size,
        )
        .merge(create_health_router())
        .layer(CompressionLayer::new())
    }

    /// Run the web server.
    pub async fn run(self) -> Result<()> {
        let router = self.build_router();

        let listener = TcpListener::bind(self.addr).await?;
        let local_addr = listener.local_addr()?;

        tracing::info!("Web server listening on http://{}", local_addr);

        axum::serve(listener, router).await?;
        Ok(())
    }

    /// Run the server in the background and return the actual bound address.
    ///
    /// This is useful for testing when binding to port 0.
    pub async fn run_with_addr(self) -> Result<SocketAddr> {
        let router = self.build_router();

        let listener = TcpListener::bind(self.addr).await?;
        let local_addr = listener.local_addr()?;

        tracing::info!("Web server listening on http://{}", local_addr);

        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, router).await {
                tracing::error!("Web server error: {}", e);
            }
        });

        Ok(local_addr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;
    use crate::file::FileStorage;

    #[tokio::test]
    async fn test_web_server_new() {
        let dir = tempfile::tempdir().unwrap();
        let db = Arc::new(Database::open_in_memory().await.unwrap());
        let storage = FileStorage::new(dir.path()).unwrap();
        let service = Arc::new(FileService::new(db, storage));

        let config = ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            cors_origins: vec![],
        };

        let server = WebServer::new(&config, service).unwrap();
        assert_eq!(server.addr().ip().to_string(), "127.0.0.1");
    }

    #[tokio::test]
    async fn test_web_server_rejects_bad_address() {
        let dir = tempfile::tempdir().unwrap();
        let db = Arc::new(Database::open_in_memory().await.unwrap());
        let storage = FileStorage::new(dir.path()).unwrap();
        let service = Arc::new(FileService::new(db, storage));

        let config = ServerConfig {
            host: "not an address".to_string(),
            port: 0,
            cors_origins: vec![],
        };

        assert!(WebServer::new(&config, service).is_err());
    }
}
