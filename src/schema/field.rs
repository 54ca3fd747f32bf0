use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::types::RowValues;

// Declaration-order counter; keeps generated DDL column order stable no
// matter how fields are stored or iterated later.
static DECLARATION_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Default for a field that has no value at insert time.
///
/// A `Generated` producer is re-invoked on every use, never memoized, so
/// defaults like "current timestamp" stay fresh per insert.
#[derive(Clone)]
pub enum DefaultValue {
    /// No default; the field stays unset.
    None,
    /// A literal value cloned per use.
    Value(RowValues),
    /// A zero-argument producer resolved at the point of use.
    Generated(Arc<dyn Fn() -> RowValues + Send + Sync>),
}

impl std::fmt::Debug for DefaultValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DefaultValue::None => f.write_str("None"),
            DefaultValue::Value(v) => f.debug_tuple("Value").field(v).finish(),
            DefaultValue::Generated(_) => f.write_str("Generated(..)"),
        }
    }
}

/// Typed column descriptor: SQL type, nullability, key role, insert/update
/// policy, and default.
///
/// Constructed via the typed shorthands ([`Field::integer`], [`Field::string`],
/// …) which differ only in default DDL type and default value, then refined
/// with the chainable builder methods:
/// ```rust
/// use sql_mapper::prelude::*;
///
/// let email = Field::string().not_updatable();
/// let note = Field::text().nullable();
/// # let _ = (email, note);
/// ```
#[derive(Debug, Clone)]
pub struct Field {
    name: Option<String>,
    ddl: String,
    nullable: bool,
    primary_key: bool,
    insertable: bool,
    updatable: bool,
    default: DefaultValue,
    order: u64,
}

impl Field {
    /// A field with an explicit DDL type and no default.
    pub fn new(ddl: impl Into<String>) -> Self {
        Self {
            name: None,
            ddl: ddl.into(),
            nullable: false,
            primary_key: false,
            insertable: true,
            updatable: true,
            default: DefaultValue::None,
            order: DECLARATION_COUNTER.fetch_add(1, Ordering::Relaxed),
        }
    }

    /// `bigint` column defaulting to `0`.
    #[must_use]
    pub fn integer() -> Self {
        Self::new("bigint").default_value(RowValues::Int(0))
    }

    /// `text` column defaulting to the empty string.
    #[must_use]
    pub fn string() -> Self {
        Self::new("text").default_value(RowValues::Text(String::new()))
    }

    /// `real` column defaulting to `0.0`.
    #[must_use]
    pub fn float() -> Self {
        Self::new("real").default_value(RowValues::Float(0.0))
    }

    /// `bool` column defaulting to `false`.
    #[must_use]
    pub fn boolean() -> Self {
        Self::new("bool").default_value(RowValues::Bool(false))
    }

    /// `text` column defaulting to the empty string.
    #[must_use]
    pub fn text() -> Self {
        Self::new("text").default_value(RowValues::Text(String::new()))
    }

    /// `blob` column defaulting to empty bytes.
    #[must_use]
    pub fn blob() -> Self {
        Self::new("blob").default_value(RowValues::Blob(Vec::new()))
    }

    /// `bigint` version counter starting at `0`.
    #[must_use]
    pub fn version() -> Self {
        Self::new("bigint").default_value(RowValues::Int(0))
    }

    /// Override the column name (otherwise the declaring attribute name from
    /// [`MappingBuilder::field`](crate::schema::MappingBuilder::field) is
    /// used).
    #[must_use]
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Override the DDL type string.
    #[must_use]
    pub fn ddl(mut self, ddl: impl Into<String>) -> Self {
        self.ddl = ddl.into();
        self
    }

    /// Allow SQL NULL for this column.
    #[must_use]
    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    /// Mark this field as the primary key.
    #[must_use]
    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self
    }

    /// Exclude this field from generated INSERT statements.
    #[must_use]
    pub fn not_insertable(mut self) -> Self {
        self.insertable = false;
        self
    }

    /// Exclude this field from generated UPDATE statements.
    #[must_use]
    pub fn not_updatable(mut self) -> Self {
        self.updatable = false;
        self
    }

    /// Use a literal default value.
    #[must_use]
    pub fn default_value(mut self, value: RowValues) -> Self {
        self.default = DefaultValue::Value(value);
        self
    }

    /// Use a zero-argument default producer, re-invoked per use.
    #[must_use]
    pub fn default_fn(mut self, f: impl Fn() -> RowValues + Send + Sync + 'static) -> Self {
        self.default = DefaultValue::Generated(Arc::new(f));
        self
    }

    /// The declared column name override, if any.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// The DDL type string.
    #[must_use]
    pub fn ddl_type(&self) -> &str {
        &self.ddl
    }

    #[must_use]
    pub fn is_nullable(&self) -> bool {
        self.nullable
    }

    #[must_use]
    pub fn is_primary_key(&self) -> bool {
        self.primary_key
    }

    #[must_use]
    pub fn is_insertable(&self) -> bool {
        self.insertable
    }

    #[must_use]
    pub fn is_updatable(&self) -> bool {
        self.updatable
    }

    /// Position in overall field declaration order.
    #[must_use]
    pub fn declaration_order(&self) -> u64 {
        self.order
    }

    /// Resolve the default for one use: literals are cloned, producers are
    /// invoked fresh.
    #[must_use]
    pub fn resolve_default(&self) -> Option<RowValues> {
        match &self.default {
            DefaultValue::None => None,
            DefaultValue::Value(v) => Some(v.clone()),
            DefaultValue::Generated(f) => Some(f()),
        }
    }

    pub(crate) fn force_non_nullable(&mut self) {
        self.nullable = false;
    }

    pub(crate) fn force_non_updatable(&mut self) {
        self.updatable = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicI64;

    #[test]
    fn typed_shorthands_carry_defaults() {
        assert_eq!(Field::integer().resolve_default(), Some(RowValues::Int(0)));
        assert_eq!(
            Field::string().resolve_default(),
            Some(RowValues::Text(String::new()))
        );
        assert_eq!(Field::float().resolve_default(), Some(RowValues::Float(0.0)));
        assert_eq!(
            Field::boolean().resolve_default(),
            Some(RowValues::Bool(false))
        );
        assert_eq!(Field::integer().ddl_type(), "bigint");
        assert_eq!(Field::float().ddl_type(), "real");
    }

    #[test]
    fn generated_default_is_fresh_per_use() {
        static CALLS: AtomicI64 = AtomicI64::new(0);
        let f = Field::integer()
            .default_fn(|| RowValues::Int(CALLS.fetch_add(1, Ordering::SeqCst)));
        assert_eq!(f.resolve_default(), Some(RowValues::Int(0)));
        assert_eq!(f.resolve_default(), Some(RowValues::Int(1)));
    }

    #[test]
    fn declaration_order_is_monotonic() {
        let a = Field::integer();
        let b = Field::string();
        assert!(a.declaration_order() < b.declaration_order());
    }
}
