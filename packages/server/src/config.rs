//! Server configuration
//!
//! Defaults are overridden from environment variables:
//!
//! - `HIERARCHY_SERVER_PORT`: listen port (default: 3001)
//! - `HIERARCHY_STORE`: `memory` or `libsql` (default: `libsql`)
//! - `HIERARCHY_DB_PATH`: libsql database file
//!   (default: `~/.hierarchy-index/database/hierarchy.db`)
//! - `HIERARCHY_PAGE_SIZE`: records per store page (default: unbounded)
//! - `CORS_ALLOW_ORIGIN`: extra allowed browser origin

use anyhow::{anyhow, Context, Result};
use hierarchy_core::RepositoryConfig;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

pub const PORT_VAR: &str = "HIERARCHY_SERVER_PORT";
pub const STORE_VAR: &str = "HIERARCHY_STORE";
pub const DB_PATH_VAR: &str = "HIERARCHY_DB_PATH";
pub const PAGE_SIZE_VAR: &str = "HIERARCHY_PAGE_SIZE";
pub const CORS_ORIGIN_VAR: &str = "CORS_ALLOW_ORIGIN";

/// Which record store backs the server
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// In-process store, emptied on restart
    Memory,
    /// Embedded libsql database file
    Libsql,
}

impl FromStr for StoreBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(StoreBackend::Memory),
            "libsql" => Ok(StoreBackend::Libsql),
            other => Err(anyhow!(
                "unknown store backend '{}' (expected 'memory' or 'libsql')",
                other
            )),
        }
    }
}

impl fmt::Display for StoreBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreBackend::Memory => write!(f, "memory"),
            StoreBackend::Libsql => write!(f, "libsql"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ServerConfig {
    pub port: u16,
    pub store: StoreBackend,
    /// Database file for the libsql backend; resolved under the home
    /// directory when unset
    pub db_path: Option<PathBuf>,
    pub page_size: Option<usize>,
    pub cors_origin: Option<String>,
    pub repository: RepositoryConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 3001,
            store: StoreBackend::Libsql,
            db_path: None,
            page_size: None,
            cors_origin: None,
            repository: RepositoryConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Defaults overridden by the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Defaults overridden by whatever `lookup` returns for each variable
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(port) = var(PORT_VAR) {
            config.port = port
                .trim()
                .parse()
                .with_context(|| format!("{} must be a port number, got '{}'", PORT_VAR, port))?;
        }
        if let Some(store) = var(STORE_VAR) {
            config.store = store.parse()?;
        }
        if let Some(path) = var(DB_PATH_VAR) {
            config.db_path = Some(PathBuf::from(path));
        }
        if let Some(size) = var(PAGE_SIZE_VAR) {
            config.page_size = Some(size.trim().parse().with_context(|| {
                format!("{} must be a positive integer, got '{}'", PAGE_SIZE_VAR, size)
            })?);
        }
        config.cors_origin = var(CORS_ORIGIN_VAR);

        config.validate().map_err(|e| anyhow!(e))?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.page_size == Some(0) {
            return Err("page_size must be greater than 0".to_string());
        }
        self.repository.validate()
    }

    /// The libsql database file, defaulting to
    /// `~/.hierarchy-index/database/hierarchy.db`
    pub fn resolve_db_path(&self) -> Result<PathBuf> {
        if let Some(path) = &self.db_path {
            return Ok(path.clone());
        }

        let home_dir = dirs::home_dir().ok_or_else(|| anyhow!("Failed to get home directory"))?;
        Ok(home_dir
            .join(".hierarchy-index")
            .join("database")
            .join("hierarchy.db"))
    }
}
