//! Stateless query execution against an [`ExecutionContext`].
//!
//! Every function auto-opens a connection scope if none is active and closes
//! it again if this call opened it, so one-off queries need no explicit scope
//! management. Portable `?` placeholders are rewritten to the driver's native
//! marker before execution; placeholder/argument count mismatches are left to
//! the driver to reject.

use tracing::debug;

use crate::context::ExecutionContext;
use crate::error::SqlMapperError;
use crate::results::ResultRow;
use crate::scope::with_connection;
use crate::translation::translate_placeholders;
use crate::types::RowValues;

fn fetch(
    ctx: &mut ExecutionContext,
    sql: &str,
    params: &[RowValues],
    first_only: bool,
) -> Result<Vec<ResultRow>, SqlMapperError> {
    let conn = ctx.connection()?;
    let style = conn.placeholder_style()?;
    let translated = translate_placeholders(sql, style);
    debug!(sql = %translated, params = ?params, "executing query");
    let mut cursor = conn.cursor()?;
    cursor.execute(&translated, params)?;
    let column_names = cursor.description().unwrap_or_default();
    if first_only {
        match cursor.fetch_one()? {
            Some(values) => Ok(vec![ResultRow::new(column_names, values)]),
            None => Ok(Vec::new()),
        }
    } else {
        Ok(cursor
            .fetch_all()?
            .into_iter()
            .map(|values| ResultRow::new(column_names.clone(), values))
            .collect())
    }
}

/// Execute a query and fetch only the first row.
///
/// Zero matching rows is `Ok(None)`, never an error.
///
/// # Errors
/// Returns `SqlMapperError` on connection or driver failure.
pub fn select_one(
    ctx: &mut ExecutionContext,
    sql: &str,
    params: &[RowValues],
) -> Result<Option<ResultRow>, SqlMapperError> {
    with_connection(ctx, |ctx| Ok(fetch(ctx, sql, params, true)?.pop()))
}

/// Execute a query and fetch all rows. Zero matching rows is an empty vec.
///
/// # Errors
/// Returns `SqlMapperError` on connection or driver failure.
pub fn select_all(
    ctx: &mut ExecutionContext,
    sql: &str,
    params: &[RowValues],
) -> Result<Vec<ResultRow>, SqlMapperError> {
    with_connection(ctx, |ctx| fetch(ctx, sql, params, false))
}

/// Execute a query expected to yield a single one-column row and return that
/// column's value.
///
/// # Errors
/// Returns `SqlMapperError::MultiColumn` if the row does not have exactly one
/// column, or `SqlMapperError::ExecutionError` if no row matched.
pub fn select_scalar(
    ctx: &mut ExecutionContext,
    sql: &str,
    params: &[RowValues],
) -> Result<RowValues, SqlMapperError> {
    let row = select_one(ctx, sql, params)?.ok_or_else(|| {
        SqlMapperError::ExecutionError("scalar select returned no row".to_string())
    })?;
    if row.column_count() != 1 {
        return Err(SqlMapperError::MultiColumn(row.column_count()));
    }
    row.into_values()
        .pop()
        .ok_or_else(|| SqlMapperError::ExecutionError("scalar select returned no value".to_string()))
}

/// Execute an insert/update/delete and return the affected-row count.
///
/// At transaction depth 0 the mutation is committed immediately after
/// execution; inside a transaction the commit is deferred to the owning
/// [`TransactionScope`](crate::scope::TransactionScope).
///
/// # Errors
/// Returns `SqlMapperError` on connection, driver, or auto-commit failure.
pub fn execute(
    ctx: &mut ExecutionContext,
    sql: &str,
    params: &[RowValues],
) -> Result<usize, SqlMapperError> {
    with_connection(ctx, |ctx| {
        let depth = ctx.transaction_depth();
        let conn = ctx.connection()?;
        let style = conn.placeholder_style()?;
        let translated = translate_placeholders(sql, style);
        debug!(sql = %translated, params = ?params, "executing mutation");
        let affected = {
            let mut cursor = conn.cursor()?;
            cursor.execute(&translated, params)?;
            cursor.row_count()
        };
        if depth == 0 {
            debug!("auto-commit");
            conn.commit()?;
        }
        Ok(affected)
    })
}
