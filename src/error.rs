use thiserror::Error;

/// Unified error type for the data-access layer.
///
/// Driver-level failures (malformed SQL, constraint violations, connectivity
/// loss) are carried transparently and never swallowed; the remaining variants
/// cover configuration and usage errors raised by this layer itself.
#[derive(Debug, Error)]
pub enum SqlMapperError {
    #[cfg(feature = "sqlite")]
    #[error(transparent)]
    SqliteError(#[from] rusqlite::Error),

    /// Setup/registration-time failure: engine installed twice, or a mapped
    /// type declaring zero or more than one primary key.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("SQL execution error: {0}")]
    ExecutionError(String),

    /// A scalar select returned a row with other than exactly one column.
    #[error("Expected a single column, query returned {0}")]
    MultiColumn(usize),

    /// A result row was asked for a column it does not contain. Distinct from
    /// a column whose value is SQL NULL.
    #[error("No such column in result row: {0}")]
    MissingColumn(String),

    /// A record was given a value for a field its mapping does not declare.
    #[error("No mapped field named: {0}")]
    UnknownField(String),
}
