//! SQLite storage bootstrap, schema reflection and migration entry points.
//!
//! # Responsibility
//! - Open and configure SQLite connections for the storage core.
//! - Apply schema migrations in deterministic order.
//! - Describe live table layouts for the CRUD executor.
//!
//! # Invariants
//! - Migration version is tracked via `PRAGMA user_version`.
//! - Entity services must not read/write rows before migrations succeed.

use std::error::Error;
use std::fmt::{Display, Formatter};

mod handle;
pub mod migrations;
mod open;
pub mod schema;

pub use handle::DbHandle;
pub use open::{connect, open_db, open_db_in_memory, IN_MEMORY_DBNAME};
pub use schema::{ColumnKind, TableSchema};

pub type DbResult<T> = Result<T, DbError>;

#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::UnsupportedSchemaVersion {
                db_version,
                latest_supported,
            } => write!(
                f,
                "database schema version {db_version} is newer than supported {latest_supported}"
            ),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::UnsupportedSchemaVersion { .. } => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}
