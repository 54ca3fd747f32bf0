//! Minimal synchronous data-access layer.
//!
//! Three pieces, layered bottom-up:
//!
//! - an execution context ([`context::ExecutionContext`]) holding one lazily
//!   opened connection and a transaction-depth counter, acquired and released
//!   through scopes ([`scope`]) that collapse arbitrary nesting to a single
//!   physical commit or rollback;
//! - stateless query functions ([`executor`]) over a driver-agnostic
//!   [`raw::RawConnection`] contract, with portable `?` placeholders
//!   rewritten per driver ([`translation`]);
//! - a declarative mapping subsystem ([`schema`], [`record`]) that compiles
//!   typed field descriptors into CREATE TABLE DDL and CRUD SQL.
//!
//! A `rusqlite`-backed adapter ships behind the default `sqlite` feature.
//!
//! ```rust
//! use sql_mapper::prelude::*;
//!
//! # fn main() -> Result<(), SqlMapperError> {
//! let engine = Engine::new(SqliteFactory::in_memory());
//! let mut ctx = ExecutionContext::new(engine);
//!
//! let users = Mapping::builder("User")
//!     .field("id", Field::integer().primary_key())
//!     .field("name", Field::string())
//!     .build()?;
//!
//! // One scope keeps the in-memory database alive across calls.
//! with_connection(&mut ctx, |ctx| {
//!     execute(ctx, users.ddl(), &[])?;
//!     let mut alice = users.new_record();
//!     alice.set("id", RowValues::Int(1))?;
//!     alice.set("name", RowValues::Text("alice".into()))?;
//!     assert_eq!(alice.insert(ctx)?, 1);
//!     assert!(users.get(ctx, RowValues::Int(1))?.is_some());
//!     Ok(())
//! })?;
//! # Ok(())
//! # }
//! ```

pub mod context;
pub mod engine;
pub mod error;
pub mod executor;
pub mod raw;
pub mod record;
pub mod results;
pub mod schema;
pub mod scope;
pub mod translation;
pub mod types;

pub mod prelude;

#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use error::SqlMapperError;
pub use types::RowValues;
