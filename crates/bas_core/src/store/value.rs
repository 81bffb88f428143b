//! Conversion between JSON parameter values and SQLite storage values.
//!
//! # Invariants
//! - `BOOLEAN` columns store `0`/`1` and read back as JSON booleans.
//! - `JSON` columns store serialized documents and read back parsed.
//! - Non-finite floats and blobs are rejected instead of being coerced.

use super::{StoreError, StoreResult};
use crate::db::ColumnKind;
use rusqlite::types::{Value as SqlValue, ValueRef};
use serde_json::{Number, Value};

/// Converts a parameter value for storage in a column of `kind`.
pub fn to_sql_value(kind: ColumnKind, value: &Value) -> StoreResult<SqlValue> {
    if value.is_null() {
        return Ok(SqlValue::Null);
    }
    if kind == ColumnKind::Json {
        let document = serde_json::to_string(value)
            .map_err(|err| StoreError::InvalidData(format!("unserializable JSON value: {err}")))?;
        return Ok(SqlValue::Text(document));
    }

    let converted = match value {
        Value::Null => SqlValue::Null,
        Value::Bool(flag) => SqlValue::Integer(i64::from(*flag)),
        Value::Number(number) => {
            if let Some(integer) = number.as_i64() {
                SqlValue::Integer(integer)
            } else if let Some(real) = number.as_f64() {
                SqlValue::Real(real)
            } else {
                return Err(StoreError::InvalidData(format!(
                    "number `{number}` does not fit a SQLite value"
                )));
            }
        }
        Value::String(text) => SqlValue::Text(text.clone()),
        Value::Array(_) | Value::Object(_) => SqlValue::Text(value.to_string()),
    };
    Ok(converted)
}

/// Converts a stored value of `column` (kind `kind`) back into JSON.
pub fn from_sql_value(column: &str, kind: ColumnKind, value: ValueRef<'_>) -> StoreResult<Value> {
    let converted = match (kind, value) {
        (_, ValueRef::Null) => Value::Null,
        (ColumnKind::Boolean, ValueRef::Integer(flag)) => Value::Bool(flag != 0),
        (ColumnKind::Json, ValueRef::Text(bytes)) => {
            serde_json::from_slice(bytes).map_err(|err| {
                StoreError::InvalidData(format!("invalid JSON in column `{column}`: {err}"))
            })?
        }
        (_, ValueRef::Integer(integer)) => Value::from(integer),
        (_, ValueRef::Real(real)) => Number::from_f64(real).map(Value::Number).ok_or_else(|| {
            StoreError::InvalidData(format!("non-finite number in column `{column}`"))
        })?,
        (_, ValueRef::Text(bytes)) => Value::String(
            std::str::from_utf8(bytes)
                .map_err(|_| {
                    StoreError::InvalidData(format!("invalid UTF-8 text in column `{column}`"))
                })?
                .to_string(),
        ),
        (_, ValueRef::Blob(_)) => {
            return Err(StoreError::InvalidData(format!(
                "unsupported blob value in column `{column}`"
            )));
        }
    };
    Ok(converted)
}

/// `null`, `false` and empty or whitespace-only strings count as blank.
pub fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null | Value::Bool(false) => true,
        Value::String(text) => text.trim().is_empty(),
        _ => false,
    }
}
