use std::sync::{Arc, OnceLock};

use serde::Deserialize;
use tracing::info;

use crate::error::SqlMapperError;
use crate::raw::{RawConnection, RawConnectionFactory};

/// Connection parameters for a backing store.
///
/// Deserializes from configuration files with every field optional; defaults
/// are listed per field. Backends use the subset that makes sense for them
/// (the SQLite adapter, for example, only reads `database` as a file path).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ConnectionConfig {
    /// Login user. Default: `"root"`.
    pub user: String,
    /// Login credential. Default: empty.
    pub password: String,
    /// Database name, or file path for file-backed stores. Default:
    /// `":memory:"`.
    pub database: String,
    /// Server host. Default: `"127.0.0.1"`.
    pub host: String,
    /// Server port. Default: `3306`.
    pub port: u16,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            user: "root".to_string(),
            password: String::new(),
            database: ":memory:".to_string(),
            host: "127.0.0.1".to_string(),
            port: 3306,
        }
    }
}

/// Immutable holder of a [`RawConnectionFactory`].
///
/// Engines are constructed explicitly and passed (as `Arc`) into each
/// [`ExecutionContext`](crate::context::ExecutionContext); there is no ambient
/// lookup. A process-wide slot is available via [`install`] for programs that
/// want one shared engine, with an explicit already-configured check instead
/// of silent reinitialization.
pub struct Engine {
    factory: Box<dyn RawConnectionFactory>,
}

impl Engine {
    /// Wrap a connection factory.
    pub fn new(factory: impl RawConnectionFactory + 'static) -> Arc<Self> {
        info!("database engine created");
        Arc::new(Self {
            factory: Box::new(factory),
        })
    }

    /// Open a new raw connection from the underlying factory.
    ///
    /// # Errors
    /// Returns `SqlMapperError` if the driver cannot connect.
    pub fn connect(&self) -> Result<Box<dyn RawConnection>, SqlMapperError> {
        self.factory.connect()
    }
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine").finish_non_exhaustive()
    }
}

static INSTALLED: OnceLock<Arc<Engine>> = OnceLock::new();

/// Install a process-wide engine.
///
/// # Errors
/// Returns `SqlMapperError::ConfigError` if an engine was already installed;
/// reinitialization is never silent.
pub fn install(engine: Arc<Engine>) -> Result<(), SqlMapperError> {
    INSTALLED
        .set(engine)
        .map_err(|_| SqlMapperError::ConfigError("engine already installed".to_string()))
}

/// The process-wide engine, if one was installed.
#[must_use]
pub fn installed() -> Option<Arc<Engine>> {
    INSTALLED.get().cloned()
}
