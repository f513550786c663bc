//! Development HTTP server for the hierarchy index
//!
//! Mounts the transport-agnostic handlers from `hierarchy_core::api` on an
//! axum router, so the index can be exercised with curl or a browser.
//!
//! # Usage
//!
//! ```bash
//! # libsql database under ~/.hierarchy-index, port 3001
//! cargo run -p hierarchy-server
//!
//! # In-memory store on another port
//! HIERARCHY_STORE=memory HIERARCHY_SERVER_PORT=3002 cargo run -p hierarchy-server
//! ```
//!
//! # Security
//!
//! - CORS restricted to localhost dev origins
//! - No authentication (local development only)

use axum::{
    http::{header, Method},
    Router,
};
use hierarchy_core::db::{LibsqlStore, MemoryStore, RecordStore};
use hierarchy_core::{HierarchyRepository, MemoryStoreConfig, NodeHandlers};
use std::sync::Arc;
use tokio::sync::Mutex;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub mod config;
mod http_error;
mod node_endpoints;

pub use config::{ServerConfig, StoreBackend};
pub use http_error::HttpError;

/// Application state shared across all endpoints
///
/// The repository leaves concurrent mutations of overlapping subtrees to its
/// caller. `write_lock` serializes every create, rename, move and delete this
/// server accepts; reads do not take it.
#[derive(Clone)]
pub struct AppState {
    pub handlers: NodeHandlers,
    pub write_lock: Arc<Mutex<()>>,
}

impl AppState {
    pub fn new(handlers: NodeHandlers) -> Self {
        Self {
            handlers,
            write_lock: Arc::new(Mutex::new(())),
        }
    }
}

/// Create the application router
pub fn create_router(state: AppState, cors_origin: Option<&str>) -> Router {
    Router::new()
        .merge(node_endpoints::routes(state))
        .layer(cors_layer(cors_origin))
        .layer(TraceLayer::new_for_http())
}

/// CORS for local dev front-ends, plus `extra_origin` when it parses
fn cors_layer(extra_origin: Option<&str>) -> CorsLayer {
    let mut origins: Vec<header::HeaderValue> = [
        "http://localhost:1420",
        "http://localhost:5173",
        "http://localhost:3000",
    ]
    .iter()
    .filter_map(|o| o.parse().ok())
    .collect();

    if let Some(origin) = extra_origin {
        match origin.parse::<header::HeaderValue>() {
            Ok(value) => origins.push(value),
            Err(_) => tracing::warn!("Ignoring invalid CORS origin '{}'", origin),
        }
    }

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers(Any)
        .allow_credentials(false)
}

/// Open the configured store and wrap it in handlers
pub async fn build_handlers(config: &ServerConfig) -> anyhow::Result<NodeHandlers> {
    let store: Arc<dyn RecordStore> = match config.store {
        StoreBackend::Memory => {
            let store_config = MemoryStoreConfig {
                page_size: config.page_size,
                ..Default::default()
            };
            Arc::new(MemoryStore::with_config(store_config)?)
        }
        StoreBackend::Libsql => {
            let db_path = config.resolve_db_path()?;
            tracing::info!("Database: {}", db_path.display());
            let store = LibsqlStore::new(db_path).await?;
            match config.page_size {
                Some(size) => Arc::new(store.with_page_size(size)?),
                None => Arc::new(store),
            }
        }
    };

    let repository = HierarchyRepository::with_config(store, config.repository.clone())?;
    Ok(NodeHandlers::new(Arc::new(repository)))
}

/// Start the HTTP dev server
///
/// # Errors
///
/// Returns error if the store cannot be opened or the server fails to bind.
pub async fn start_server(config: ServerConfig) -> anyhow::Result<()> {
    let handlers = build_handlers(&config).await?;
    let app = create_router(AppState::new(handlers), config.cors_origin.as_deref());

    let addr = format!("127.0.0.1:{}", config.port);
    tracing::info!("Hierarchy dev server starting on http://{}", addr);
    tracing::info!("Store backend: {}", config.store);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
