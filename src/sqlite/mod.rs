//! Reference driver adapter backed by `rusqlite`.
//!
//! SQLite connections are opened in auto-commit mode, so the adapter issues an
//! explicit `BEGIN DEFERRED` before the first statement of each unit of work;
//! [`RawConnection::commit`](crate::raw::RawConnection::commit) and
//! `rollback` then map to the matching SQL commands. Closing a connection with
//! an open transaction rolls it back first.

mod connection;
mod params;

pub use connection::{SqliteFactory, SqliteRawConnection};
pub use params::{from_sqlite_value, to_sqlite_value};
