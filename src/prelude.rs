//! Convenient imports for common functionality.
//!
//! Re-exports the types and functions most call sites need, so one `use
//! sql_mapper::prelude::*;` covers engine setup, scopes, queries, and mapping
//! registration.

pub use crate::context::{ExecutionContext, LazyConnection};
pub use crate::engine::{ConnectionConfig, Engine};
pub use crate::error::SqlMapperError;
pub use crate::executor::{execute, select_all, select_one, select_scalar};
pub use crate::record::Record;
pub use crate::results::ResultRow;
pub use crate::schema::{DefaultValue, Field, Mapping, MappingBuilder};
pub use crate::scope::{ConnectionScope, TransactionScope, with_connection, with_transaction};
pub use crate::translation::{PlaceholderStyle, translate_placeholders};
pub use crate::types::RowValues;

#[cfg(feature = "sqlite")]
pub use crate::sqlite::{SqliteFactory, SqliteRawConnection};
