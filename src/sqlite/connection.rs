use std::collections::VecDeque;
use std::sync::Arc;

use rusqlite::{Connection, ToSql};
use tracing::debug;

use crate::engine::ConnectionConfig;
use crate::error::SqlMapperError;
use crate::raw::{RawConnection, RawConnectionFactory, RawCursor};
use crate::translation::PlaceholderStyle;
use crate::types::RowValues;

use super::params::{from_sqlite_value, to_params};

/// Opens a `SQLite` connection per request, from a file path or `:memory:`.
#[derive(Debug, Clone)]
pub struct SqliteFactory {
    path: String,
}

impl SqliteFactory {
    /// Factory for a file-backed database.
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }

    /// Factory for an in-memory database. Note that each connection gets its
    /// own private memory database unless a shared-cache URI path is used.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(":memory:")
    }

    /// Factory from a [`ConnectionConfig`]; only `database` is meaningful for
    /// `SQLite` and is interpreted as the file path.
    #[must_use]
    pub fn from_config(config: &ConnectionConfig) -> Self {
        Self::new(config.database.clone())
    }
}

impl RawConnectionFactory for SqliteFactory {
    fn connect(&self) -> Result<Box<dyn RawConnection>, SqlMapperError> {
        let conn = Connection::open(&self.path)?;
        Ok(Box::new(SqliteRawConnection::new(conn)))
    }
}

/// [`RawConnection`] over a `rusqlite` connection.
pub struct SqliteRawConnection {
    conn: Connection,
    in_transaction: bool,
}

impl SqliteRawConnection {
    /// Wrap an already-open `rusqlite` connection.
    #[must_use]
    pub fn new(conn: Connection) -> Self {
        Self {
            conn,
            in_transaction: false,
        }
    }
}

impl RawConnection for SqliteRawConnection {
    fn cursor(&mut self) -> Result<Box<dyn RawCursor + '_>, SqlMapperError> {
        if !self.in_transaction {
            self.conn.execute_batch("BEGIN DEFERRED")?;
            self.in_transaction = true;
        }
        Ok(Box::new(SqliteCursor::new(&self.conn)))
    }

    fn commit(&mut self) -> Result<(), SqlMapperError> {
        if self.in_transaction {
            self.conn.execute_batch("COMMIT")?;
            self.in_transaction = false;
        }
        Ok(())
    }

    fn rollback(&mut self) -> Result<(), SqlMapperError> {
        if self.in_transaction {
            self.conn.execute_batch("ROLLBACK")?;
            self.in_transaction = false;
        }
        Ok(())
    }

    fn close(self: Box<Self>) -> Result<(), SqlMapperError> {
        let this = *self;
        if this.in_transaction {
            debug!("closing with open transaction, rolling back");
            this.conn.execute_batch("ROLLBACK")?;
        }
        this.conn.close().map_err(|(_, err)| err.into())
    }

    fn placeholder_style(&self) -> PlaceholderStyle {
        PlaceholderStyle::Sqlite
    }
}

/// Cursor over one statement execution.
///
/// `rusqlite` rows borrow their statement, so query results are materialized
/// eagerly at execute time and handed out from a queue by the fetch calls.
struct SqliteCursor<'c> {
    conn: &'c Connection,
    columns: Option<Arc<Vec<String>>>,
    rows: VecDeque<Vec<RowValues>>,
    affected: usize,
}

impl<'c> SqliteCursor<'c> {
    fn new(conn: &'c Connection) -> Self {
        Self {
            conn,
            columns: None,
            rows: VecDeque::new(),
            affected: 0,
        }
    }
}

impl RawCursor for SqliteCursor<'_> {
    fn execute(&mut self, sql: &str, params: &[RowValues]) -> Result<(), SqlMapperError> {
        let mut stmt = self.conn.prepare(sql)?;
        let values = to_params(params);
        let refs: Vec<&dyn ToSql> = values.iter().map(|v| v as &dyn ToSql).collect();

        self.columns = None;
        self.rows.clear();
        self.affected = 0;

        if stmt.column_count() == 0 {
            self.affected = stmt.execute(&refs[..])?;
            return Ok(());
        }

        let column_names: Vec<String> = stmt
            .column_names()
            .iter()
            .map(std::string::ToString::to_string)
            .collect();
        let column_count = column_names.len();
        self.columns = Some(Arc::new(column_names));

        let mut rows_iter = stmt.query(&refs[..])?;
        while let Some(row) = rows_iter.next()? {
            let mut row_values = Vec::with_capacity(column_count);
            for i in 0..column_count {
                let value: rusqlite::types::Value = row.get(i)?;
                row_values.push(from_sqlite_value(value));
            }
            self.rows.push_back(row_values);
        }
        Ok(())
    }

    fn description(&self) -> Option<Arc<Vec<String>>> {
        self.columns.clone()
    }

    fn fetch_one(&mut self) -> Result<Option<Vec<RowValues>>, SqlMapperError> {
        Ok(self.rows.pop_front())
    }

    fn fetch_all(&mut self) -> Result<Vec<Vec<RowValues>>, SqlMapperError> {
        Ok(self.rows.drain(..).collect())
    }

    fn row_count(&self) -> usize {
        self.affected
    }
}
