//! Live table layout reflection.
//!
//! # Responsibility
//! - Read column names and declared types via `PRAGMA table_info`.
//! - Classify declared types into the value kinds the CRUD executor converts.
//!
//! # Invariants
//! - Column order follows the table definition.
//! - A table is "timestamped" only when it has both `created_at` and `updated_at`.

use super::DbResult;
use rusqlite::Connection;

pub const ID_COLUMN: &str = "id";
pub const CREATED_AT_COLUMN: &str = "created_at";
pub const UPDATED_AT_COLUMN: &str = "updated_at";

/// Value kind derived from a column's declared type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Integer,
    Real,
    Text,
    Boolean,
    Json,
}

impl ColumnKind {
    /// Classifies a declared SQLite column type.
    ///
    /// Follows SQLite affinity rules, with `BOOL*` and `JSON*` split out so
    /// reads can restore booleans and documents.
    pub fn from_declared_type(declared: &str) -> Self {
        let upper = declared.trim().to_ascii_uppercase();
        if upper.starts_with("BOOL") {
            Self::Boolean
        } else if upper.starts_with("JSON") {
            Self::Json
        } else if upper.contains("INT") {
            Self::Integer
        } else if upper.contains("CHAR") || upper.contains("CLOB") || upper.contains("TEXT") {
            Self::Text
        } else if upper.contains("REAL")
            || upper.contains("FLOA")
            || upper.contains("DOUB")
            || upper.contains("NUMERIC")
            || upper.contains("DECIMAL")
        {
            Self::Real
        } else {
            Self::Text
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub name: String,
    pub kind: ColumnKind,
}

/// Reflected layout of one table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSchema {
    name: String,
    columns: Vec<Column>,
}

impl TableSchema {
    pub fn new(name: impl Into<String>, columns: Vec<Column>) -> Self {
        Self {
            name: name.into(),
            columns,
        }
    }

    /// Loads the layout of `table`, or `None` when the table does not exist.
    pub fn load(conn: &Connection, table: &str) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare("SELECT name, type FROM pragma_table_info(?1);")?;
        let mut rows = stmt.query([table])?;
        let mut columns = Vec::new();
        while let Some(row) = rows.next()? {
            let name: String = row.get(0)?;
            let declared: String = row.get(1)?;
            columns.push(Column {
                name,
                kind: ColumnKind::from_declared_type(&declared),
            });
        }

        if columns.is_empty() {
            return Ok(None);
        }
        Ok(Some(Self::new(table, columns)))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|column| column.name.as_str())
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column(name).is_some()
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|column| column.name == name)
    }

    /// Kind used to convert values of `name`; unknown columns read as text.
    pub fn kind_of(&self, name: &str) -> ColumnKind {
        self.column(name)
            .map_or(ColumnKind::Text, |column| column.kind)
    }

    pub fn is_timestamped(&self) -> bool {
        self.has_column(CREATED_AT_COLUMN) && self.has_column(UPDATED_AT_COLUMN)
    }
}
