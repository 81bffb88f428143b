//! Generic entity service.
//!
//! # Responsibility
//! - Expose insert/update/delete/find/query for any `Entity`.
//! - Keep one database handle for the lifetime of the instance.
//!
//! # Invariants
//! - `update`/`delete` reject missing ids before touching the database.
//! - Each write runs in exactly one transaction; the history snapshot and
//!   the update it precedes commit or roll back together.
//! - Table layout is reflected once, when the instance is constructed.

use crate::config::DbConfig;
use crate::db::{connect, DbHandle, TableSchema};
use crate::entity::Entity;
use crate::logging::sanitize_message;
use crate::store::crud::{
    delete_item, find_item, insert_item, query_item, transaction, update_item,
};
use crate::store::history::HistoryRecorder;
use crate::store::relations::{assign_relations, Queryable};
use crate::store::{Record, RecordId, StoreError, StoreResult};
use log::{debug, error};
use rusqlite::Connection;
use std::marker::PhantomData;
use std::time::Instant;

const MAX_LOGGED_ERROR_CHARS: usize = 240;

/// CRUD service for entity `E` over one database handle.
pub struct EntityService<'conn, E: Entity> {
    handle: DbHandle<'conn>,
    schema: TableSchema,
    history: Option<HistoryRecorder>,
    _entity: PhantomData<fn() -> E>,
}

impl<E: Entity> EntityService<'static, E> {
    /// Opens a dedicated connection from `config`.
    pub fn connect(config: &DbConfig) -> StoreResult<Self> {
        Self::try_new(connect(config)?)
    }
}

impl<'conn, E: Entity> EntityService<'conn, E> {
    /// Builds a service over an owned or borrowed connection.
    ///
    /// Fails when the live schema lacks the entity table, a declared
    /// attribute, a relation's internal key, or the history table.
    pub fn try_new(handle: impl Into<DbHandle<'conn>>) -> StoreResult<Self> {
        let handle = handle.into();
        let schema = TableSchema::load(&handle, E::TABLE)?
            .ok_or_else(|| StoreError::MissingRequiredTable(E::TABLE.to_string()))?;
        ensure_entity_columns::<E>(&schema)?;
        let history = E::HISTORY
            .map(|history| HistoryRecorder::try_new(&handle, history))
            .transpose()?;

        Ok(Self {
            handle,
            schema,
            history,
            _entity: PhantomData,
        })
    }

    pub fn connection(&self) -> &Connection {
        self.handle.connection()
    }

    pub fn schema(&self) -> &TableSchema {
        &self.schema
    }

    /// Inserts one record and returns its id.
    ///
    /// Relations are resolved before the write transaction opens.
    pub fn insert(&self, params: Record) -> StoreResult<RecordId> {
        self.logged("insert", None, || {
            let mut params = params;
            self.assign_relations(&mut params)?;
            transaction(self.connection(), |conn| {
                insert_item(conn, &self.schema, E::ATTRIBUTES, params)
            })
        })
    }

    /// Updates one record; returns the affected row count.
    ///
    /// Entities with a history table snapshot the current row first, in the
    /// same transaction. A missing row yields `0` and no snapshot.
    pub fn update(&self, id: impl Into<Option<RecordId>>, params: Record) -> StoreResult<usize> {
        let id = id.into();
        self.logged("update", id, || {
            let id = require_id::<E>(id, "update")?;
            let mut params = params;
            self.assign_relations(&mut params)?;
            transaction(self.connection(), |conn| {
                if let Some(history) = &self.history {
                    if let Some(current) = find_item(conn, &self.schema, id)? {
                        history.save(conn, id, &current)?;
                    }
                }
                update_item(conn, &self.schema, E::ATTRIBUTES, id, params)
            })
        })
    }

    /// Hard-deletes one record; returns the affected row count.
    pub fn delete(&self, id: impl Into<Option<RecordId>>) -> StoreResult<usize> {
        let id = id.into();
        self.logged("delete", id, || {
            let id = require_id::<E>(id, "delete")?;
            transaction(self.connection(), |conn| delete_item(conn, &self.schema, id))
        })
    }

    pub fn find(&self, id: RecordId) -> StoreResult<Option<Record>> {
        self.logged("find", Some(id), || find_item(self.connection(), &self.schema, id))
    }

    /// Returns rows equal on every condition; all rows when empty.
    pub fn query(&self, conditions: &Record) -> StoreResult<Vec<Record>> {
        self.logged("query", None, || {
            query_item(self.connection(), &self.schema, conditions)
        })
    }

    /// History snapshots of one record, oldest first.
    ///
    /// Empty for entities without a history table.
    pub fn history(&self, id: RecordId) -> StoreResult<Vec<Record>> {
        self.logged("history", Some(id), || match &self.history {
            Some(history) => history.list(self.connection(), id),
            None => Ok(Vec::new()),
        })
    }

    /// Runs `body` atomically; services built over the same connection
    /// inside `body` join the transaction.
    pub fn transaction<T>(&self, body: impl FnOnce(&Self) -> StoreResult<T>) -> StoreResult<T> {
        transaction(self.connection(), |_| body(self))
    }

    fn assign_relations(&self, params: &mut Record) -> StoreResult<()> {
        let conn = self.connection();
        assign_relations(params, E::RELATIONS, E::RELATION_MODE, |relation| {
            (relation.target)(conn)
        })
    }

    fn logged<T>(
        &self,
        action: &'static str,
        id: Option<RecordId>,
        body: impl FnOnce() -> StoreResult<T>,
    ) -> StoreResult<T> {
        let started_at = Instant::now();
        let result = body();
        let id = id.map_or_else(|| "none".to_string(), |id| id.to_string());
        match &result {
            Ok(_) => debug!(
                "event=entity_{action} module=service status=ok entity={} table={} id={id} duration_ms={}",
                E::NAME,
                E::TABLE,
                started_at.elapsed().as_millis()
            ),
            Err(err) => error!(
                "event=entity_{action} module=service status=error entity={} table={} id={id} duration_ms={} error_code={} error={}",
                E::NAME,
                E::TABLE,
                started_at.elapsed().as_millis(),
                err.error_code(),
                sanitize_message(&err.to_string(), MAX_LOGGED_ERROR_CHARS)
            ),
        }
        result
    }
}

/// Relation lookups run inside another service's logged operation, so this
/// path does not log on its own.
impl<E: Entity> Queryable for EntityService<'_, E> {
    fn query(&self, conditions: &Record) -> StoreResult<Vec<Record>> {
        query_item(self.connection(), &self.schema, conditions)
    }
}

fn require_id<E: Entity>(id: Option<RecordId>, action: &'static str) -> StoreResult<RecordId> {
    match id {
        Some(id) if id > 0 => Ok(id),
        _ => Err(StoreError::MissingId {
            entity: E::NAME,
            action,
        }),
    }
}

fn ensure_entity_columns<E: Entity>(schema: &TableSchema) -> StoreResult<()> {
    let required = E::ATTRIBUTES
        .iter()
        .chain(E::RELATIONS.iter().map(|relation| &relation.internal_key));
    for column in required {
        if !schema.has_column(column) {
            return Err(StoreError::MissingRequiredColumn {
                table: E::TABLE.to_string(),
                column: (*column).to_string(),
            });
        }
    }
    Ok(())
}
