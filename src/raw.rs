use std::sync::Arc;

use crate::error::SqlMapperError;
use crate::translation::PlaceholderStyle;
use crate::types::RowValues;

/// Produces a raw driver connection on demand.
///
/// Implemented by each backend (see the `sqlite` module for the shipped
/// adapter) and by closures, which keeps test doubles cheap:
/// ```rust
/// # use sql_mapper::raw::{RawConnection, RawConnectionFactory};
/// # use sql_mapper::SqlMapperError;
/// fn factory_from<F>(f: F) -> Box<dyn RawConnectionFactory>
/// where
///     F: Fn() -> Result<Box<dyn RawConnection>, SqlMapperError> + Send + Sync + 'static,
/// {
///     Box::new(f)
/// }
/// ```
pub trait RawConnectionFactory: Send + Sync {
    /// Open a new raw connection.
    ///
    /// # Errors
    /// Returns `SqlMapperError` if the driver cannot establish a connection.
    fn connect(&self) -> Result<Box<dyn RawConnection>, SqlMapperError>;
}

impl<F> RawConnectionFactory for F
where
    F: Fn() -> Result<Box<dyn RawConnection>, SqlMapperError> + Send + Sync,
{
    fn connect(&self) -> Result<Box<dyn RawConnection>, SqlMapperError> {
        self()
    }
}

/// A live driver-level connection.
///
/// The contract mirrors what mainstream drivers expose: a cursor factory plus
/// transaction control. Implementations decide what `commit`/`rollback` mean
/// when no statement has run yet; both must then be no-ops rather than errors.
pub trait RawConnection: Send {
    /// Open a cursor for statement execution. The cursor borrows the
    /// connection; dropping it releases any statement resources.
    ///
    /// # Errors
    /// Returns `SqlMapperError` if the driver cannot produce a cursor.
    fn cursor(&mut self) -> Result<Box<dyn RawCursor + '_>, SqlMapperError>;

    /// Commit the current driver-level transaction.
    ///
    /// # Errors
    /// Returns `SqlMapperError` if the driver rejects the commit.
    fn commit(&mut self) -> Result<(), SqlMapperError>;

    /// Roll back the current driver-level transaction.
    ///
    /// # Errors
    /// Returns `SqlMapperError` if the driver rejects the rollback.
    fn rollback(&mut self) -> Result<(), SqlMapperError>;

    /// Close the connection, rolling back any open transaction first.
    ///
    /// # Errors
    /// Returns `SqlMapperError` if the driver fails to close cleanly.
    fn close(self: Box<Self>) -> Result<(), SqlMapperError>;

    /// The positional placeholder marker this driver expects. Portable `?`
    /// placeholders are rewritten to this style before execution.
    fn placeholder_style(&self) -> PlaceholderStyle;
}

/// A driver cursor: executes one statement and exposes its results.
///
/// `execute` must be called before any fetch; fetches after a DML statement
/// yield no rows. Row values come back as [`RowValues`] so nothing above the
/// driver boundary depends on driver types.
pub trait RawCursor {
    /// Execute a statement with already-translated placeholders.
    ///
    /// # Errors
    /// Returns `SqlMapperError` on driver-level failure (malformed SQL,
    /// constraint violation, parameter-count mismatch).
    fn execute(&mut self, sql: &str, params: &[RowValues]) -> Result<(), SqlMapperError>;

    /// Ordered column names of the current result, or `None` for a statement
    /// that produces no rows.
    fn description(&self) -> Option<Arc<Vec<String>>>;

    /// Fetch the next row, or `None` when the result is exhausted.
    ///
    /// # Errors
    /// Returns `SqlMapperError` if the driver fails mid-fetch.
    fn fetch_one(&mut self) -> Result<Option<Vec<RowValues>>, SqlMapperError>;

    /// Fetch all remaining rows.
    ///
    /// # Errors
    /// Returns `SqlMapperError` if the driver fails mid-fetch.
    fn fetch_all(&mut self) -> Result<Vec<Vec<RowValues>>, SqlMapperError>;

    /// Rows affected by the executed statement (DML only; 0 for queries).
    fn row_count(&self) -> usize;
}
