use std::sync::Arc;

use tracing::warn;

use crate::error::SqlMapperError;
use crate::record::Record;
use crate::schema::field::Field;

/// Optional per-type extension point invoked before insert/update/delete.
pub type Hook = Arc<dyn Fn(&mut Record) -> Result<(), SqlMapperError> + Send + Sync>;

#[derive(Default, Clone)]
pub(crate) struct Hooks {
    pub(crate) pre_insert: Option<Hook>,
    pub(crate) pre_update: Option<Hook>,
    pub(crate) pre_delete: Option<Hook>,
}

struct MappingInner {
    type_name: String,
    table: String,
    ddl: String,
    // (column name, field), sorted by field declaration order
    fields: Vec<(String, Field)>,
    pk_index: usize,
    hooks: Hooks,
}

/// The compiled schema for one record type: resolved fields, primary key,
/// table name, and generated CREATE TABLE DDL.
///
/// Built once at registration time via [`Mapping::builder`]; cheap to clone
/// (`Arc` inner). The builder is the explicit registration step that replaces
/// definition-time attribute scanning:
/// ```rust
/// use sql_mapper::prelude::*;
///
/// let users = Mapping::builder("User")
///     .field("id", Field::integer().primary_key())
///     .field("name", Field::string())
///     .build()?;
/// assert_eq!(users.table_name(), "user");
/// # Ok::<(), SqlMapperError>(())
/// ```
#[derive(Clone)]
pub struct Mapping {
    inner: Arc<MappingInner>,
}

impl Mapping {
    /// Start registering a record type. The table name defaults to the
    /// lower-cased type name unless overridden.
    pub fn builder(type_name: impl Into<String>) -> MappingBuilder {
        MappingBuilder {
            type_name: type_name.into(),
            table: None,
            fields: Vec::new(),
            hooks: Hooks::default(),
        }
    }

    /// The registered type name.
    #[must_use]
    pub fn type_name(&self) -> &str {
        &self.inner.type_name
    }

    /// The resolved table name.
    #[must_use]
    pub fn table_name(&self) -> &str {
        &self.inner.table
    }

    /// The generated CREATE TABLE statement.
    #[must_use]
    pub fn ddl(&self) -> &str {
        &self.inner.ddl
    }

    /// `(column name, field)` pairs in declaration order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &Field)> {
        self.inner
            .fields
            .iter()
            .map(|(name, field)| (name.as_str(), field))
    }

    /// Look up a field by column name.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.inner
            .fields
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, f)| f)
    }

    /// The primary key column name.
    #[must_use]
    pub fn primary_key_name(&self) -> &str {
        &self.inner.fields[self.inner.pk_index].0
    }

    /// The primary key field.
    #[must_use]
    pub fn primary_key(&self) -> &Field {
        &self.inner.fields[self.inner.pk_index].1
    }

    pub(crate) fn run_pre_insert(&self, record: &mut Record) -> Result<(), SqlMapperError> {
        match &self.inner.hooks.pre_insert {
            Some(hook) => hook(record),
            None => Ok(()),
        }
    }

    pub(crate) fn run_pre_update(&self, record: &mut Record) -> Result<(), SqlMapperError> {
        match &self.inner.hooks.pre_update {
            Some(hook) => hook(record),
            None => Ok(()),
        }
    }

    pub(crate) fn run_pre_delete(&self, record: &mut Record) -> Result<(), SqlMapperError> {
        match &self.inner.hooks.pre_delete {
            Some(hook) => hook(record),
            None => Ok(()),
        }
    }
}

impl std::fmt::Debug for Mapping {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Mapping")
            .field("type_name", &self.inner.type_name)
            .field("table", &self.inner.table)
            .field("fields", &self.inner.fields.len())
            .finish_non_exhaustive()
    }
}

/// Registration-time builder for a [`Mapping`].
#[must_use]
pub struct MappingBuilder {
    type_name: String,
    table: Option<String>,
    fields: Vec<(String, Field)>,
    hooks: Hooks,
}

impl MappingBuilder {
    /// Override the table name.
    pub fn table(mut self, table: impl Into<String>) -> Self {
        self.table = Some(table.into());
        self
    }

    /// Declare a field under an attribute name. An unnamed field takes the
    /// attribute name as its column name; a `named` override wins.
    pub fn field(mut self, attribute: impl Into<String>, field: Field) -> Self {
        self.fields.push((attribute.into(), field));
        self
    }

    /// Hook invoked before each `insert`.
    pub fn pre_insert(
        mut self,
        hook: impl Fn(&mut Record) -> Result<(), SqlMapperError> + Send + Sync + 'static,
    ) -> Self {
        self.hooks.pre_insert = Some(Arc::new(hook));
        self
    }

    /// Hook invoked before each `update`.
    pub fn pre_update(
        mut self,
        hook: impl Fn(&mut Record) -> Result<(), SqlMapperError> + Send + Sync + 'static,
    ) -> Self {
        self.hooks.pre_update = Some(Arc::new(hook));
        self
    }

    /// Hook invoked before each `delete`.
    pub fn pre_delete(
        mut self,
        hook: impl Fn(&mut Record) -> Result<(), SqlMapperError> + Send + Sync + 'static,
    ) -> Self {
        self.hooks.pre_delete = Some(Arc::new(hook));
        self
    }

    /// Compile the mapping.
    ///
    /// # Errors
    /// Returns `SqlMapperError::ConfigError` unless exactly one field is a
    /// primary key. The primary key is forced non-nullable and non-updatable,
    /// with a warning when that overrides declared flags.
    pub fn build(self) -> Result<Mapping, SqlMapperError> {
        let MappingBuilder {
            type_name,
            table,
            fields,
            hooks,
        } = self;

        let mut resolved: Vec<(String, Field)> = fields
            .into_iter()
            .map(|(attribute, field)| {
                let column = field.name().map_or(attribute, str::to_string);
                (column, field)
            })
            .collect();
        resolved.sort_by_key(|(_, field)| field.declaration_order());

        let pk_indexes: Vec<usize> = resolved
            .iter()
            .enumerate()
            .filter(|(_, (_, field))| field.is_primary_key())
            .map(|(i, _)| i)
            .collect();
        let pk_index = match pk_indexes.as_slice() {
            [single] => *single,
            [] => {
                return Err(SqlMapperError::ConfigError(format!(
                    "no primary key defined for type {type_name}"
                )));
            }
            _ => {
                return Err(SqlMapperError::ConfigError(format!(
                    "more than one primary key defined for type {type_name}"
                )));
            }
        };

        {
            let (pk_name, pk_field) = &mut resolved[pk_index];
            if pk_field.is_updatable() {
                warn!(field = %pk_name, "primary key forced non-updatable");
                pk_field.force_non_updatable();
            }
            if pk_field.is_nullable() {
                warn!(field = %pk_name, "primary key forced non-nullable");
                pk_field.force_non_nullable();
            }
        }

        let table = table.unwrap_or_else(|| type_name.to_lowercase());
        let ddl = generate_ddl(&table, &resolved, &resolved[pk_index].0);

        Ok(Mapping {
            inner: Arc::new(MappingInner {
                type_name,
                table,
                ddl,
                fields: resolved,
                pk_index,
                hooks,
            }),
        })
    }
}

fn generate_ddl(table: &str, fields: &[(String, Field)], pk_name: &str) -> String {
    let mut lines = Vec::with_capacity(fields.len() + 3);
    lines.push(format!("create table {table} ("));
    for (name, field) in fields {
        let ddl = field.ddl_type();
        if field.is_nullable() {
            lines.push(format!("  {name} {ddl},"));
        } else {
            lines.push(format!("  {name} {ddl} not null,"));
        }
    }
    lines.push(format!("  primary key({pk_name})"));
    lines.push(");".to_string());
    lines.join("\n")
}
