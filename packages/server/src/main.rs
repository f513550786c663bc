//! Hierarchy index dev server binary
//!
//! # Environment Variables
//!
//! - `HIERARCHY_SERVER_PORT`, `HIERARCHY_STORE`, `HIERARCHY_DB_PATH`,
//!   `HIERARCHY_PAGE_SIZE`, `CORS_ALLOW_ORIGIN`: see [`hierarchy_server::config`]
//! - `RUST_LOG`: Logging level (e.g., "info", "debug", "hierarchy_core=trace")

use hierarchy_server::ServerConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = ServerConfig::from_env()?;
    tracing::info!("Port: {}", config.port);

    hierarchy_server::start_server(config).await
}
