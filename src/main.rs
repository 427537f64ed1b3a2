//! STASH server entry point.

use std::sync::Arc;

use stash::config::Config;
use stash::db::Database;
use stash::file::{FileService, FileStorage};
use stash::web::WebServer;
use stash::{logging, Result};

const CONFIG_PATH: &str = "config.toml";

#[tokio::main]
async fn main() -> Result<()> {
    let config = match Config::load(CONFIG_PATH) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Could not load {CONFIG_PATH} ({e}), using default configuration");
            Config::default()
        }
    };

    if let Err(e) = logging::init(&config.logging) {
        eprintln!("Could not open log file ({e}), logging to console only");
        logging::init_console_only(&config.logging.level);
    }

    tracing::info!("Starting STASH");

    let db = Arc::new(Database::open(&config.database.path).await?);
    let storage = FileStorage::new(&config.storage.upload_dir)?;

    let service = Arc::new(
        FileService::new(db, storage)
            .with_max_file_size(config.storage.max_file_size_bytes)
            .with_allowed_types(config.storage.allowed_types.clone()),
    );

    let server = WebServer::new(&config.server, service)?;
    server.run().await
}
