//! Attribute whitelisting applied before every write.

use super::Record;
use crate::db::schema::{TableSchema, CREATED_AT_COLUMN, ID_COLUMN, UPDATED_AT_COLUMN};

const IMPLICIT_COLUMNS: [&str; 3] = [ID_COLUMN, CREATED_AT_COLUMN, UPDATED_AT_COLUMN];

/// Keeps only keys in `attributes`, plus `id`/`created_at`/`updated_at` when
/// the table has those columns. Everything else is dropped silently.
pub fn entity_attributes(schema: &TableSchema, attributes: &[&str], params: Record) -> Record {
    params
        .into_iter()
        .filter(|(key, _)| {
            attributes.contains(&key.as_str())
                || (IMPLICIT_COLUMNS.contains(&key.as_str()) && schema.has_column(key))
        })
        .collect()
}
