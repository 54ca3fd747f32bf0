use std::sync::Arc;

use tracing::info;

use crate::engine::Engine;
use crate::error::SqlMapperError;
use crate::raw::{RawConnection, RawCursor};
use crate::translation::PlaceholderStyle;

/// A connection wrapper that defers opening the raw connection until the
/// first cursor request.
pub struct LazyConnection {
    engine: Arc<Engine>,
    raw: Option<Box<dyn RawConnection>>,
}

impl LazyConnection {
    fn new(engine: Arc<Engine>) -> Self {
        Self { engine, raw: None }
    }

    /// Whether the raw connection has actually been opened yet.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.raw.is_some()
    }

    fn ensure_open(&mut self) -> Result<&mut (dyn RawConnection + 'static), SqlMapperError> {
        if self.raw.is_none() {
            let conn = self.engine.connect()?;
            info!("open connection");
            self.raw = Some(conn);
        }
        self.raw
            .as_deref_mut()
            .ok_or_else(|| SqlMapperError::ConnectionError("connection unavailable".to_string()))
    }

    /// Open a cursor, establishing the raw connection first if needed.
    ///
    /// # Errors
    /// Returns `SqlMapperError` if connecting or cursor creation fails.
    pub fn cursor(&mut self) -> Result<Box<dyn RawCursor + '_>, SqlMapperError> {
        self.ensure_open()?.cursor()
    }

    /// The driver's placeholder style, establishing the raw connection first
    /// if needed.
    ///
    /// # Errors
    /// Returns `SqlMapperError` if connecting fails.
    pub fn placeholder_style(&mut self) -> Result<PlaceholderStyle, SqlMapperError> {
        Ok(self.ensure_open()?.placeholder_style())
    }

    /// Commit on the raw connection. A no-op if it was never opened.
    ///
    /// # Errors
    /// Returns `SqlMapperError` if the driver rejects the commit.
    pub fn commit(&mut self) -> Result<(), SqlMapperError> {
        match self.raw.as_mut() {
            Some(raw) => raw.commit(),
            None => Ok(()),
        }
    }

    /// Roll back on the raw connection. A no-op if it was never opened.
    ///
    /// # Errors
    /// Returns `SqlMapperError` if the driver rejects the rollback.
    pub fn rollback(&mut self) -> Result<(), SqlMapperError> {
        match self.raw.as_mut() {
            Some(raw) => raw.rollback(),
            None => Ok(()),
        }
    }

    /// Close the raw connection if open and forget it.
    ///
    /// # Errors
    /// Returns `SqlMapperError` if the driver fails to close cleanly.
    pub fn cleanup(&mut self) -> Result<(), SqlMapperError> {
        if let Some(raw) = self.raw.take() {
            raw.close()?;
            info!("close connection");
        }
        Ok(())
    }
}

/// Per-thread (or per-logical-task) holder of at most one [`LazyConnection`]
/// plus the current transaction depth.
///
/// A context is confined to its owner by being passed `&mut` into every
/// data-access call; nothing in this layer shares it across threads. It is
/// initialized by the first [`ConnectionScope`](crate::scope::ConnectionScope)
/// entry and cleaned when the outermost scope exits, so it never carries state
/// across logical units of work.
pub struct ExecutionContext {
    engine: Arc<Engine>,
    connection: Option<LazyConnection>,
    transaction_depth: u32,
}

impl ExecutionContext {
    /// Create an uninitialized context bound to an engine.
    #[must_use]
    pub fn new(engine: Arc<Engine>) -> Self {
        Self {
            engine,
            connection: None,
            transaction_depth: 0,
        }
    }

    /// Whether a connection scope is currently active.
    #[must_use]
    pub fn is_init(&self) -> bool {
        self.connection.is_some()
    }

    /// Current transaction nesting depth (0 = no open transaction).
    #[must_use]
    pub fn transaction_depth(&self) -> u32 {
        self.transaction_depth
    }

    pub(crate) fn init(&mut self) {
        self.connection = Some(LazyConnection::new(self.engine.clone()));
        self.transaction_depth = 0;
    }

    pub(crate) fn cleanup(&mut self) -> Result<(), SqlMapperError> {
        self.transaction_depth = 0;
        match self.connection.take() {
            Some(mut conn) => conn.cleanup(),
            None => Ok(()),
        }
    }

    /// The active lazy connection.
    ///
    /// # Errors
    /// Returns `SqlMapperError::ConnectionError` if no connection scope is
    /// active.
    pub fn connection(&mut self) -> Result<&mut LazyConnection, SqlMapperError> {
        self.connection.as_mut().ok_or_else(|| {
            SqlMapperError::ConnectionError("no active connection scope".to_string())
        })
    }

    pub(crate) fn increment_depth(&mut self) -> u32 {
        self.transaction_depth += 1;
        self.transaction_depth
    }

    pub(crate) fn decrement_depth(&mut self) -> u32 {
        self.transaction_depth = self.transaction_depth.saturating_sub(1);
        self.transaction_depth
    }
}
