//! Generic CRUD persistence primitives shared by every entity service.
//!
//! # Responsibility
//! - Filter parameter maps down to declared attributes.
//! - Resolve external identifiers into internal foreign keys.
//! - Snapshot rows into history tables before updates.
//! - Execute insert/update/delete/find/query inside transactions.
//!
//! # Invariants
//! - Identifiers interpolated into SQL come from declarations or the reflected
//!   schema, never from unchecked caller input.
//! - Errors are returned unchanged; nothing in this layer retries or recovers.

use crate::db::DbError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod attributes;
pub mod crud;
pub mod history;
pub mod relations;
pub mod value;

/// Column name to value map, used both for write parameters and read rows.
pub type Record = serde_json::Map<String, serde_json::Value>;

/// Database-assigned primary key.
pub type RecordId = i64;

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug)]
pub enum StoreError {
    Db(DbError),
    /// `update`/`delete` called without a usable id.
    MissingId {
        entity: &'static str,
        action: &'static str,
    },
    MissingRequiredTable(String),
    MissingRequiredColumn {
        table: String,
        column: String,
    },
    /// Query condition names a column the table does not have.
    UnknownColumn {
        table: String,
        column: String,
    },
    /// Value cannot be written to or read from its column.
    InvalidData(String),
}

impl StoreError {
    /// Stable code used in log events.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Db(DbError::Sqlite(_)) => "db_error",
            Self::Db(DbError::UnsupportedSchemaVersion { .. }) => "unsupported_schema",
            Self::MissingId { .. } => "missing_id",
            Self::MissingRequiredTable(_) => "missing_table",
            Self::MissingRequiredColumn { .. } => "missing_column",
            Self::UnknownColumn { .. } => "unknown_column",
            Self::InvalidData(_) => "invalid_data",
        }
    }
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::MissingId { entity, action } => {
                write!(f, "{entity} id is required to {action}")
            }
            Self::MissingRequiredTable(table) => write!(f, "required table `{table}` is missing"),
            Self::MissingRequiredColumn { table, column } => {
                write!(f, "required column `{column}` is missing from table `{table}`")
            }
            Self::UnknownColumn { table, column } => {
                write!(f, "table `{table}` has no column `{column}`")
            }
            Self::InvalidData(message) => write!(f, "invalid data: {message}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}
