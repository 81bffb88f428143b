//! Append-only snapshots of rows taken before they are updated.

use super::crud::{insert_item, query_item};
use super::{Record, RecordId, StoreError, StoreResult};
use crate::db::schema::ID_COLUMN;
use crate::db::TableSchema;
use rusqlite::Connection;
use serde_json::Value;

/// History table declaration attached to an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoryTable {
    pub table: &'static str,
    /// Column referencing the owning row, e.g. `kpi_id`.
    pub foreign_key: &'static str,
}

/// Writes snapshots into one history table.
///
/// The writable columns are the history table's own columns minus `id`, so a
/// snapshot keeps every parent column the history table mirrors.
#[derive(Debug, Clone)]
pub struct HistoryRecorder {
    schema: TableSchema,
    foreign_key: &'static str,
}

impl HistoryRecorder {
    /// Loads the history table layout; fails when the table or its foreign
    /// key column is missing.
    pub fn try_new(conn: &Connection, history: HistoryTable) -> StoreResult<Self> {
        let schema = TableSchema::load(conn, history.table)?
            .ok_or_else(|| StoreError::MissingRequiredTable(history.table.to_string()))?;
        if !schema.has_column(history.foreign_key) {
            return Err(StoreError::MissingRequiredColumn {
                table: history.table.to_string(),
                column: history.foreign_key.to_string(),
            });
        }
        Ok(Self {
            schema,
            foreign_key: history.foreign_key,
        })
    }

    /// Stores `record` as a snapshot of `parent_id` and returns the snapshot id.
    ///
    /// Must run inside the transaction of the update it precedes.
    pub fn save(
        &self,
        conn: &Connection,
        parent_id: RecordId,
        record: &Record,
    ) -> StoreResult<RecordId> {
        let mut snapshot = record.clone();
        snapshot.remove(ID_COLUMN);
        snapshot.insert(self.foreign_key.to_string(), Value::from(parent_id));

        let attributes = self
            .schema
            .column_names()
            .filter(|column| *column != ID_COLUMN)
            .collect::<Vec<_>>();
        insert_item(conn, &self.schema, &attributes, snapshot)
    }

    /// Snapshots of `parent_id`, oldest first.
    pub fn list(&self, conn: &Connection, parent_id: RecordId) -> StoreResult<Vec<Record>> {
        let mut conditions = Record::new();
        conditions.insert(self.foreign_key.to_string(), Value::from(parent_id));
        query_item(conn, &self.schema, &conditions)
    }
}
