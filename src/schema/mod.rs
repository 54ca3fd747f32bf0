//! Declarative schema descriptors: typed fields and the per-type mapping
//! compiled from them.

mod field;
mod mapping;

pub use field::{DefaultValue, Field};
pub use mapping::{Hook, Mapping, MappingBuilder};
