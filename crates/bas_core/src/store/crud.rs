//! Table-level CRUD executor.
//!
//! # Responsibility
//! - Build and run insert/update/delete/select statements for one table.
//! - Auto-populate `created_at`/`updated_at` on timestamped tables.
//! - Provide the transaction wrapper used by every write.
//!
//! # Invariants
//! - Writes go through `entity_attributes` before SQL is built.
//! - Reads return full rows as stored, ordered by primary key.
//! - Query conditions are equality-AND; `null` compiles to `IS NULL`.

use super::attributes::entity_attributes;
use super::value::{from_sql_value, to_sql_value};
use super::{Record, RecordId, StoreError, StoreResult};
use crate::db::schema::{TableSchema, CREATED_AT_COLUMN, ID_COLUMN, UPDATED_AT_COLUMN};
use rusqlite::types::Value as SqlValue;
use rusqlite::{params_from_iter, Connection, Row, Transaction, TransactionBehavior};
use serde_json::Value;
use std::time::{SystemTime, UNIX_EPOCH};

/// Returns every row matching all `conditions`; all rows when empty.
pub fn query_item(
    conn: &Connection,
    schema: &TableSchema,
    conditions: &Record,
) -> StoreResult<Vec<Record>> {
    let mut sql = format!("SELECT * FROM {}", quote_ident(schema.name()));
    let mut bind_values = Vec::new();

    let mut clauses = Vec::with_capacity(conditions.len());
    for (column, value) in conditions {
        let Some(definition) = schema.column(column) else {
            return Err(StoreError::UnknownColumn {
                table: schema.name().to_string(),
                column: column.clone(),
            });
        };
        if value.is_null() {
            clauses.push(format!("{} IS NULL", quote_ident(column)));
        } else {
            bind_values.push(to_sql_value(definition.kind, value)?);
            clauses.push(format!("{} = ?{}", quote_ident(column), bind_values.len()));
        }
    }
    if !clauses.is_empty() {
        sql.push_str(" WHERE ");
        sql.push_str(&clauses.join(" AND "));
    }
    sql.push_str(&format!(" ORDER BY {} ASC;", quote_ident(ID_COLUMN)));

    let mut stmt = conn.prepare(&sql)?;
    let column_names = stmt
        .column_names()
        .into_iter()
        .map(str::to_string)
        .collect::<Vec<_>>();
    let mut rows = stmt.query(params_from_iter(bind_values))?;
    let mut records = Vec::new();
    while let Some(row) = rows.next()? {
        records.push(parse_row(schema, &column_names, row)?);
    }
    Ok(records)
}

/// Loads one row by primary key.
pub fn find_item(
    conn: &Connection,
    schema: &TableSchema,
    id: RecordId,
) -> StoreResult<Option<Record>> {
    let mut conditions = Record::new();
    conditions.insert(ID_COLUMN.to_string(), Value::from(id));
    Ok(query_item(conn, schema, &conditions)?.into_iter().next())
}

/// Inserts one row and returns its generated primary key.
///
/// Timestamped tables get `created_at`/`updated_at` set to now when the
/// caller left them absent or `null`.
pub fn insert_item(
    conn: &Connection,
    schema: &TableSchema,
    attributes: &[&str],
    mut params: Record,
) -> StoreResult<RecordId> {
    if schema.is_timestamped() {
        let now = Value::from(now_epoch_ms());
        for column in [CREATED_AT_COLUMN, UPDATED_AT_COLUMN] {
            let entry = params.entry(column).or_insert(Value::Null);
            if entry.is_null() {
                *entry = now.clone();
            }
        }
    }
    let params = entity_attributes(schema, attributes, params);

    let table = quote_ident(schema.name());
    if params.is_empty() {
        conn.execute(&format!("INSERT INTO {table} DEFAULT VALUES;"), [])?;
        return Ok(conn.last_insert_rowid());
    }

    let (columns, bind_values) = bind_params(schema, &params)?;
    let placeholders = (1..=bind_values.len())
        .map(|index| format!("?{index}"))
        .collect::<Vec<_>>()
        .join(", ");
    conn.execute(
        &format!(
            "INSERT INTO {table} ({}) VALUES ({placeholders});",
            columns.join(", ")
        ),
        params_from_iter(bind_values),
    )?;
    Ok(conn.last_insert_rowid())
}

/// Updates the row with primary key `id`; returns the affected row count.
///
/// Timestamped tables always get `updated_at` set to now, overriding any
/// caller-provided value.
pub fn update_item(
    conn: &Connection,
    schema: &TableSchema,
    attributes: &[&str],
    id: RecordId,
    mut params: Record,
) -> StoreResult<usize> {
    if schema.is_timestamped() {
        params.insert(UPDATED_AT_COLUMN.to_string(), Value::from(now_epoch_ms()));
    }
    let params = entity_attributes(schema, attributes, params);
    if params.is_empty() {
        return Ok(0);
    }

    let (columns, mut bind_values) = bind_params(schema, &params)?;
    let assignments = columns
        .iter()
        .enumerate()
        .map(|(index, column)| format!("{column} = ?{}", index + 1))
        .collect::<Vec<_>>()
        .join(", ");
    bind_values.push(SqlValue::Integer(id));
    let changed = conn.execute(
        &format!(
            "UPDATE {} SET {assignments} WHERE {} = ?{};",
            quote_ident(schema.name()),
            quote_ident(ID_COLUMN),
            bind_values.len()
        ),
        params_from_iter(bind_values),
    )?;
    Ok(changed)
}

/// Hard-deletes the row with primary key `id`; returns the affected row count.
pub fn delete_item(conn: &Connection, schema: &TableSchema, id: RecordId) -> StoreResult<usize> {
    let changed = conn.execute(
        &format!(
            "DELETE FROM {} WHERE {} = ?1;",
            quote_ident(schema.name()),
            quote_ident(ID_COLUMN)
        ),
        [id],
    )?;
    Ok(changed)
}

/// Runs `body` atomically.
///
/// Opens an immediate transaction when `conn` is in autocommit mode and joins
/// the enclosing transaction otherwise. An `Err` from `body` rolls the
/// transaction back and is returned unchanged.
pub fn transaction<T>(
    conn: &Connection,
    body: impl FnOnce(&Connection) -> StoreResult<T>,
) -> StoreResult<T> {
    if !conn.is_autocommit() {
        return body(conn);
    }

    let tx = Transaction::new_unchecked(conn, TransactionBehavior::Immediate)?;
    let value = body(&*tx)?;
    tx.commit()?;
    Ok(value)
}

/// Current time as epoch milliseconds, the unit of timestamp columns.
pub fn now_epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| elapsed.as_millis() as i64)
}

fn bind_params(schema: &TableSchema, params: &Record) -> StoreResult<(Vec<String>, Vec<SqlValue>)> {
    let mut columns = Vec::with_capacity(params.len());
    let mut bind_values = Vec::with_capacity(params.len());
    for (column, value) in params {
        columns.push(quote_ident(column));
        bind_values.push(to_sql_value(schema.kind_of(column), value)?);
    }
    Ok((columns, bind_values))
}

fn parse_row(schema: &TableSchema, column_names: &[String], row: &Row<'_>) -> StoreResult<Record> {
    let mut record = Record::new();
    for (index, column) in column_names.iter().enumerate() {
        let value = from_sql_value(column, schema.kind_of(column), row.get_ref(index)?)?;
        record.insert(column.clone(), value);
    }
    Ok(record)
}

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

#[cfg(test)]
mod tests {
    use super::{delete_item, find_item, insert_item, query_item, transaction, update_item};
    use crate::db::TableSchema;
    use crate::store::{Record, StoreError};
    use rusqlite::Connection;
    use serde_json::{json, Value};

    fn scratch() -> (Connection, TableSchema, TableSchema) {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TABLE notes (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                body TEXT NOT NULL,
                pinned BOOLEAN,
                created_at INTEGER NOT NULL,
                updated_at INTEGER NOT NULL
            );
            CREATE TABLE counters (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                hits INTEGER
            );",
        )
        .unwrap();
        let notes = TableSchema::load(&conn, "notes").unwrap().unwrap();
        let counters = TableSchema::load(&conn, "counters").unwrap().unwrap();
        (conn, notes, counters)
    }

    fn record(value: Value) -> Record {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn insert_populates_timestamps_and_find_reads_back() {
        let (conn, notes, _) = scratch();
        let id = insert_item(
            &conn,
            &notes,
            &["body", "pinned"],
            record(json!({"body": "hello", "pinned": true})),
        )
        .unwrap();

        let row = find_item(&conn, &notes, id).unwrap().unwrap();
        assert_eq!(row["body"], json!("hello"));
        assert_eq!(row["pinned"], json!(true));
        assert!(row["created_at"].as_i64().unwrap() > 0);
        assert_eq!(row["created_at"], row["updated_at"]);
    }

    #[test]
    fn insert_keeps_caller_timestamps() {
        let (conn, notes, _) = scratch();
        let id = insert_item(
            &conn,
            &notes,
            &["body"],
            record(json!({"body": "old", "created_at": 10, "updated_at": 20})),
        )
        .unwrap();

        let row = find_item(&conn, &notes, id).unwrap().unwrap();
        assert_eq!(row["created_at"], json!(10));
        assert_eq!(row["updated_at"], json!(20));
    }

    #[test]
    fn update_overrides_updated_at() {
        let (conn, notes, _) = scratch();
        let id = insert_item(
            &conn,
            &notes,
            &["body"],
            record(json!({"body": "old", "created_at": 10, "updated_at": 20})),
        )
        .unwrap();

        let changed = update_item(
            &conn,
            &notes,
            &["body"],
            id,
            record(json!({"body": "new", "updated_at": 30})),
        )
        .unwrap();
        assert_eq!(changed, 1);

        let row = find_item(&conn, &notes, id).unwrap().unwrap();
        assert_eq!(row["body"], json!("new"));
        assert_eq!(row["created_at"], json!(10));
        assert!(row["updated_at"].as_i64().unwrap() > 30);
    }

    #[test]
    fn untimestamped_tables_are_left_alone() {
        let (conn, _, counters) = scratch();
        let id = insert_item(&conn, &counters, &["hits"], record(json!({"hits": 1}))).unwrap();
        let row = find_item(&conn, &counters, id).unwrap().unwrap();
        assert_eq!(row.len(), 2);

        let empty = insert_item(&conn, &counters, &["hits"], Record::new()).unwrap();
        assert!(empty > id);
    }

    #[test]
    fn query_filters_by_equality_and_null() {
        let (conn, notes, _) = scratch();
        for (body, pinned) in [("a", json!(true)), ("b", json!(null)), ("c", json!(true))] {
            insert_item(
                &conn,
                &notes,
                &["body", "pinned"],
                record(json!({"body": body, "pinned": pinned})),
            )
            .unwrap();
        }

        assert_eq!(query_item(&conn, &notes, &Record::new()).unwrap().len(), 3);
        let pinned = query_item(&conn, &notes, &record(json!({"pinned": true}))).unwrap();
        assert_eq!(pinned.len(), 2);
        let unset = query_item(&conn, &notes, &record(json!({"pinned": null}))).unwrap();
        assert_eq!(unset.len(), 1);
        assert_eq!(unset[0]["body"], json!("b"));
    }

    #[test]
    fn query_rejects_unknown_columns() {
        let (conn, notes, _) = scratch();
        let err =
            query_item(&conn, &notes, &record(json!({"body; DROP TABLE notes": 1}))).unwrap_err();
        assert!(matches!(err, StoreError::UnknownColumn { .. }));
    }

    #[test]
    fn delete_removes_row() {
        let (conn, notes, _) = scratch();
        let id = insert_item(&conn, &notes, &["body"], record(json!({"body": "x"}))).unwrap();
        assert_eq!(delete_item(&conn, &notes, id).unwrap(), 1);
        assert_eq!(delete_item(&conn, &notes, id).unwrap(), 0);
        assert!(find_item(&conn, &notes, id).unwrap().is_none());
    }

    #[test]
    fn transaction_rolls_back_on_error_and_joins_outer() {
        let (conn, notes, _) = scratch();
        let result: Result<(), StoreError> = transaction(&conn, |conn| {
            insert_item(conn, &notes, &["body"], record(json!({"body": "lost"})))?;
            transaction(conn, |conn| {
                insert_item(conn, &notes, &["body"], record(json!({"body": null})))
            })?;
            Ok(())
        });

        assert!(result.is_err());
        assert!(conn.is_autocommit());
        assert!(query_item(&conn, &notes, &Record::new()).unwrap().is_empty());
    }
}
