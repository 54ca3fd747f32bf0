use tracing::{info, warn};

use crate::context::ExecutionContext;
use crate::error::SqlMapperError;

/// Scoped acquisition of a context's connection.
///
/// Entering an uninitialized context initializes its
/// [`LazyConnection`](crate::context::LazyConnection) and marks this scope as
/// owning the lifecycle; entering an initialized one reuses the existing
/// connection.
/// Only the owning (outermost) scope tears the connection down on exit;
/// nested entries leave it open. Prefer [`with_connection`], which guarantees
/// the exit contract on every path.
#[must_use = "a scope must be exited; use with_connection for automatic exit"]
pub struct ConnectionScope {
    owns_lifecycle: bool,
}

impl ConnectionScope {
    /// Enter a connection scope on the given context.
    pub fn enter(ctx: &mut ExecutionContext) -> Self {
        if ctx.is_init() {
            Self {
                owns_lifecycle: false,
            }
        } else {
            ctx.init();
            Self {
                owns_lifecycle: true,
            }
        }
    }

    /// Whether this scope initialized the connection and will tear it down.
    #[must_use]
    pub fn owns_lifecycle(&self) -> bool {
        self.owns_lifecycle
    }

    /// Exit the scope. Tears down the connection (closing the raw connection
    /// and resetting transaction depth) only if this scope owns the lifecycle.
    ///
    /// # Errors
    /// Returns `SqlMapperError` if closing the raw connection fails.
    pub fn exit(self, ctx: &mut ExecutionContext) -> Result<(), SqlMapperError> {
        if self.owns_lifecycle { ctx.cleanup() } else { Ok(()) }
    }
}

/// Scoped nested transaction, layered on [`ConnectionScope`].
///
/// Any number of nested entries collapse to a single physical commit or
/// rollback at the outermost exit. Prefer [`with_transaction`].
#[must_use = "a scope must be exited; use with_transaction for automatic exit"]
pub struct TransactionScope {
    connection: ConnectionScope,
}

impl TransactionScope {
    /// Enter a transaction scope, opening a connection scope if none is
    /// active and incrementing the transaction depth.
    pub fn enter(ctx: &mut ExecutionContext) -> Self {
        let connection = ConnectionScope::enter(ctx);
        let depth = ctx.increment_depth();
        if depth == 1 {
            info!("begin transaction");
        } else {
            info!(depth, "join current transaction");
        }
        Self { connection }
    }

    /// Exit the scope, decrementing the depth. When the depth reaches 0 this
    /// performs the single physical commit (on success) or rollback (on
    /// failure), then tears down the connection if this scope owns it.
    ///
    /// # Errors
    /// A commit failure triggers an automatic rollback attempt; if that
    /// rollback also fails, its error is surfaced, otherwise the commit error
    /// is. Plain rollback failures propagate directly.
    pub fn exit(self, ctx: &mut ExecutionContext, failed: bool) -> Result<(), SqlMapperError> {
        let depth = ctx.decrement_depth();
        let outcome = if depth == 0 {
            if failed {
                rollback(ctx)
            } else {
                commit(ctx)
            }
        } else {
            Ok(())
        };
        let cleanup = self.connection.exit(ctx);
        outcome.and(cleanup)
    }
}

fn commit(ctx: &mut ExecutionContext) -> Result<(), SqlMapperError> {
    info!("commit transaction");
    match ctx.connection()?.commit() {
        Ok(()) => {
            info!("commit ok");
            Ok(())
        }
        Err(commit_err) => {
            warn!(error = %commit_err, "commit failed, attempting rollback");
            match ctx.connection()?.rollback() {
                Ok(()) => {
                    warn!("rollback after failed commit ok");
                    Err(commit_err)
                }
                Err(rollback_err) => Err(rollback_err),
            }
        }
    }
}

fn rollback(ctx: &mut ExecutionContext) -> Result<(), SqlMapperError> {
    warn!("rollback transaction");
    ctx.connection()?.rollback()?;
    info!("rollback ok");
    Ok(())
}

/// Run `f` inside a connection scope, exiting the scope on every path.
///
/// If `f` fails, its error wins over any teardown error (which is logged).
///
/// # Errors
/// Returns the error from `f`, or from connection teardown if `f` succeeded.
pub fn with_connection<T, F>(ctx: &mut ExecutionContext, f: F) -> Result<T, SqlMapperError>
where
    F: FnOnce(&mut ExecutionContext) -> Result<T, SqlMapperError>,
{
    let scope = ConnectionScope::enter(ctx);
    let result = f(ctx);
    let cleanup = scope.exit(ctx);
    match result {
        Ok(value) => cleanup.map(|()| value),
        Err(err) => {
            if let Err(cleanup_err) = cleanup {
                warn!(error = %cleanup_err, "connection teardown failed after error");
            }
            Err(err)
        }
    }
}

/// Run `f` inside a transaction scope: commit on success, roll back on
/// failure, collapsing nested calls to one physical commit/rollback.
///
/// # Errors
/// Returns the error from `f` (after rolling back), a rollback failure (which
/// takes priority over the error that caused it), or a commit failure.
pub fn with_transaction<T, F>(ctx: &mut ExecutionContext, f: F) -> Result<T, SqlMapperError>
where
    F: FnOnce(&mut ExecutionContext) -> Result<T, SqlMapperError>,
{
    let scope = TransactionScope::enter(ctx);
    match f(ctx) {
        Ok(value) => scope.exit(ctx, false).map(|()| value),
        Err(err) => match scope.exit(ctx, true) {
            Ok(()) => Err(err),
            Err(exit_err) => Err(exit_err),
        },
    }
}
