use std::collections::HashMap;

use tracing::debug;

use crate::context::ExecutionContext;
use crate::error::SqlMapperError;
use crate::executor;
use crate::results::ResultRow;
use crate::schema::Mapping;
use crate::types::RowValues;

/// One row of a mapped type: a mutable name-to-value bag conforming to a
/// [`Mapping`].
///
/// Records carry no persistent identity beyond their primary-key value; they
/// are built from literals via [`Mapping::new_record`] or from query results,
/// and discarded when the caller is done.
#[derive(Clone)]
pub struct Record {
    mapping: Mapping,
    values: HashMap<String, RowValues>,
}

impl Mapping {
    /// An empty record conforming to this mapping.
    #[must_use]
    pub fn new_record(&self) -> Record {
        Record {
            mapping: self.clone(),
            values: HashMap::new(),
        }
    }

    /// Build a record from a query result row, taking the columns this
    /// mapping declares.
    #[must_use]
    pub fn record_from_row(&self, row: &ResultRow) -> Record {
        let mut record = self.new_record();
        for (name, _) in self.fields() {
            if let Some(value) = row.get_opt(name) {
                record.values.insert(name.to_string(), value.clone());
            }
        }
        record
    }

    /// Fetch one record by primary key. Absent rows are `Ok(None)`.
    ///
    /// # Errors
    /// Returns `SqlMapperError` on connection or driver failure.
    pub fn get(
        &self,
        ctx: &mut ExecutionContext,
        pk: RowValues,
    ) -> Result<Option<Record>, SqlMapperError> {
        let sql = format!(
            "select * from {} where {}=?",
            self.table_name(),
            self.primary_key_name()
        );
        let row = executor::select_one(ctx, &sql, &[pk])?;
        Ok(row.map(|row| self.record_from_row(&row)))
    }

    /// Fetch the first record matching a trailing SQL fragment (for example
    /// `"where age>? order by name"`).
    ///
    /// # Errors
    /// Returns `SqlMapperError` on connection or driver failure.
    pub fn find_first(
        &self,
        ctx: &mut ExecutionContext,
        where_clause: &str,
        params: &[RowValues],
    ) -> Result<Option<Record>, SqlMapperError> {
        let sql = format!("select * from {} {}", self.table_name(), where_clause);
        let row = executor::select_one(ctx, &sql, params)?;
        Ok(row.map(|row| self.record_from_row(&row)))
    }

    /// Fetch all records matching a trailing SQL fragment.
    ///
    /// # Errors
    /// Returns `SqlMapperError` on connection or driver failure.
    pub fn find_by(
        &self,
        ctx: &mut ExecutionContext,
        where_clause: &str,
        params: &[RowValues],
    ) -> Result<Vec<Record>, SqlMapperError> {
        let sql = format!("select * from {} {}", self.table_name(), where_clause);
        let rows = executor::select_all(ctx, &sql, params)?;
        Ok(rows.iter().map(|row| self.record_from_row(row)).collect())
    }

    /// Fetch every record of this mapping.
    ///
    /// # Errors
    /// Returns `SqlMapperError` on connection or driver failure.
    pub fn find_all(&self, ctx: &mut ExecutionContext) -> Result<Vec<Record>, SqlMapperError> {
        let sql = format!("select * from {}", self.table_name());
        let rows = executor::select_all(ctx, &sql, &[])?;
        Ok(rows.iter().map(|row| self.record_from_row(row)).collect())
    }

    /// Count all rows of this mapping.
    ///
    /// # Errors
    /// Returns `SqlMapperError` on connection or driver failure, or if the
    /// count did not come back as an integer.
    pub fn count_all(&self, ctx: &mut ExecutionContext) -> Result<i64, SqlMapperError> {
        self.count_by(ctx, "", &[])
    }

    /// Count rows matching a trailing SQL fragment.
    ///
    /// # Errors
    /// Returns `SqlMapperError` on connection or driver failure, or if the
    /// count did not come back as an integer.
    pub fn count_by(
        &self,
        ctx: &mut ExecutionContext,
        where_clause: &str,
        params: &[RowValues],
    ) -> Result<i64, SqlMapperError> {
        let sql = format!(
            "select count({}) from {} {}",
            self.primary_key_name(),
            self.table_name(),
            where_clause
        );
        let value = executor::select_scalar(ctx, &sql, params)?;
        value.as_int().copied().ok_or_else(|| {
            SqlMapperError::ExecutionError("count query returned a non-integer".to_string())
        })
    }
}

impl Record {
    /// The mapping this record conforms to.
    #[must_use]
    pub fn mapping(&self) -> &Mapping {
        &self.mapping
    }

    /// Current value of a field, if set.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&RowValues> {
        self.values.get(name)
    }

    /// Whether a field currently has a value.
    #[must_use]
    pub fn is_set(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Set a field value.
    ///
    /// # Errors
    /// Returns `SqlMapperError::UnknownField` for a name the mapping does not
    /// declare.
    pub fn set(&mut self, name: &str, value: RowValues) -> Result<(), SqlMapperError> {
        if self.mapping.field(name).is_none() {
            return Err(SqlMapperError::UnknownField(name.to_string()));
        }
        self.values.insert(name.to_string(), value);
        Ok(())
    }

    /// Remove a field value, returning the previous one.
    pub fn unset(&mut self, name: &str) -> Option<RowValues> {
        self.values.remove(name)
    }

    /// Current primary key value, if set.
    #[must_use]
    pub fn primary_key_value(&self) -> Option<&RowValues> {
        self.values.get(self.mapping.primary_key_name())
    }

    fn required_primary_key(&self) -> Result<RowValues, SqlMapperError> {
        self.primary_key_value().cloned().ok_or_else(|| {
            SqlMapperError::ExecutionError(format!(
                "primary key {} not set on record",
                self.mapping.primary_key_name()
            ))
        })
    }

    /// Insert this record.
    ///
    /// Runs the pre-insert hook, fills resolved defaults for unset insertable
    /// fields, strips values of non-insertable fields, then executes an
    /// INSERT over the remaining fields. Returns the affected-row count
    /// (expected 1).
    ///
    /// # Errors
    /// Returns `SqlMapperError` on hook, connection, or driver failure
    /// (including key-constraint violations).
    pub fn insert(&mut self, ctx: &mut ExecutionContext) -> Result<usize, SqlMapperError> {
        let mapping = self.mapping.clone();
        mapping.run_pre_insert(self)?;

        for (name, field) in mapping.fields() {
            if field.is_insertable() {
                if !self.values.contains_key(name)
                    && let Some(default) = field.resolve_default()
                {
                    self.values.insert(name.to_string(), default);
                }
            } else if self.values.remove(name).is_some() {
                debug!(field = name, "stripped non-insertable field before insert");
            }
        }

        let mut columns = Vec::new();
        let mut args = Vec::new();
        for (name, field) in mapping.fields() {
            if field.is_insertable()
                && let Some(value) = self.values.get(name)
            {
                columns.push(name);
                args.push(value.clone());
            }
        }

        let placeholders = vec!["?"; columns.len()].join(", ");
        let sql = format!(
            "insert into {} ({}) values ({})",
            mapping.table_name(),
            columns.join(", "),
            placeholders
        );
        executor::execute(ctx, &sql, &args)
    }

    /// Update this record by primary key.
    ///
    /// Runs the pre-update hook, then updates every updatable field that
    /// currently has a value. If no row with this primary key exists, falls
    /// back to [`insert`](Record::insert) and returns its affected-row count.
    ///
    /// # Errors
    /// Returns `SqlMapperError` on hook, connection, or driver failure, or if
    /// the primary key is unset.
    pub fn update(&mut self, ctx: &mut ExecutionContext) -> Result<usize, SqlMapperError> {
        let mapping = self.mapping.clone();
        mapping.run_pre_update(self)?;

        let pk = self.required_primary_key()?;
        if mapping.get(ctx, pk.clone())?.is_none() {
            debug!(
                table = mapping.table_name(),
                "update target missing, falling back to insert"
            );
            return self.insert(ctx);
        }

        let mut assignments = Vec::new();
        let mut args = Vec::new();
        for (name, field) in mapping.fields() {
            if field.is_updatable()
                && let Some(value) = self.values.get(name)
            {
                assignments.push(format!("{name}=?"));
                args.push(value.clone());
            }
        }
        if assignments.is_empty() {
            debug!(table = mapping.table_name(), "no updatable values set");
            return Ok(0);
        }
        args.push(pk);

        let sql = format!(
            "update {} set {} where {}=?",
            mapping.table_name(),
            assignments.join(", "),
            mapping.primary_key_name()
        );
        executor::execute(ctx, &sql, &args)
    }

    /// Delete this record by primary key. Returns 0 if the row was already
    /// absent.
    ///
    /// # Errors
    /// Returns `SqlMapperError` on hook, connection, or driver failure, or if
    /// the primary key is unset.
    pub fn delete(&mut self, ctx: &mut ExecutionContext) -> Result<usize, SqlMapperError> {
        let mapping = self.mapping.clone();
        mapping.run_pre_delete(self)?;

        let pk = self.required_primary_key()?;
        let sql = format!(
            "delete from {} where {}=?",
            mapping.table_name(),
            mapping.primary_key_name()
        );
        executor::execute(ctx, &sql, &[pk])
    }
}

impl std::fmt::Debug for Record {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut map = f.debug_map();
        for (name, _) in self.mapping.fields() {
            if let Some(value) = self.values.get(name) {
                map.entry(&name, value);
            }
        }
        map.finish()
    }
}
