use std::fmt::Write;

use rusqlite::types::Value;

use crate::types::RowValues;

/// Convert a single [`RowValues`] to a rusqlite `Value`.
#[must_use]
pub fn to_sqlite_value(value: &RowValues) -> Value {
    match value {
        RowValues::Int(i) => Value::Integer(*i),
        RowValues::Float(f) => Value::Real(*f),
        RowValues::Text(s) => Value::Text(s.clone()),
        RowValues::Bool(b) => Value::Integer(i64::from(*b)),
        RowValues::Timestamp(dt) => {
            let mut buf = String::with_capacity(32);
            // Infallible: writing into a String cannot fail
            let _ = write!(buf, "{}", dt.format("%F %T%.f"));
            Value::Text(buf)
        }
        RowValues::Null => Value::Null,
        RowValues::JSON(jval) => Value::Text(jval.to_string()),
        RowValues::Blob(bytes) => Value::Blob(bytes.clone()),
    }
}

/// Convert a rusqlite `Value` back into a [`RowValues`].
///
/// SQLite has no boolean, timestamp, or JSON storage classes, so those come
/// back as `Int`/`Text`; the `RowValues::as_bool`/`as_timestamp` accessors
/// absorb that on the read side.
#[must_use]
pub fn from_sqlite_value(value: Value) -> RowValues {
    match value {
        Value::Null => RowValues::Null,
        Value::Integer(i) => RowValues::Int(i),
        Value::Real(f) => RowValues::Float(f),
        Value::Text(s) => RowValues::Text(s),
        Value::Blob(b) => RowValues::Blob(b),
    }
}

pub(crate) fn to_params(params: &[RowValues]) -> Vec<Value> {
    params.iter().map(to_sqlite_value).collect()
}
