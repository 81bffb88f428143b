//! Connection bootstrap for the storage core.
//!
//! # Responsibility
//! - Open file or in-memory SQLite connections, eagerly.
//! - Configure connection pragmas required by relation and history writes.
//! - Trigger schema migrations before returning a usable connection.
//!
//! # Invariants
//! - Returned connections have `foreign_keys=ON`.
//! - Returned connections have migrations fully applied.
//! - No pooling or reconnection: a failed open is returned to the caller.

use super::migrations::apply_migrations;
use super::DbResult;
use crate::config::DbConfig;
use log::{error, info};
use rusqlite::Connection;
use std::path::Path;
use std::time::{Duration, Instant};

/// `dbname` value that selects a private in-memory database.
pub const IN_MEMORY_DBNAME: &str = ":memory:";

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Opens the database described by `config`.
///
/// `config.dbname` is a file path, or [`IN_MEMORY_DBNAME`].
pub fn connect(config: &DbConfig) -> DbResult<Connection> {
    if config.dbname.trim() == IN_MEMORY_DBNAME {
        open_db_in_memory()
    } else {
        open_db(config.dbname.trim())
    }
}

/// Opens a SQLite database file and applies all pending migrations.
///
/// # Side effects
/// - Emits `db_open` logging events with duration and status.
pub fn open_db(path: impl AsRef<Path>) -> DbResult<Connection> {
    open_with("file", || Connection::open(path))
}

/// Opens an in-memory SQLite database and applies all pending migrations.
pub fn open_db_in_memory() -> DbResult<Connection> {
    open_with("memory", Connection::open_in_memory)
}

fn open_with(
    mode: &'static str,
    open: impl FnOnce() -> rusqlite::Result<Connection>,
) -> DbResult<Connection> {
    let started_at = Instant::now();
    info!("event=db_open module=db status=start mode={mode}");

    let mut conn = open().map_err(|err| {
        error!(
            "event=db_open module=db status=error mode={mode} duration_ms={} error_code=db_open_failed error={err}",
            started_at.elapsed().as_millis()
        );
        err
    })?;

    if let Err(err) = bootstrap_connection(&mut conn) {
        error!(
            "event=db_open module=db status=error mode={mode} duration_ms={} error_code=db_bootstrap_failed error={err}",
            started_at.elapsed().as_millis()
        );
        return Err(err);
    }

    info!(
        "event=db_open module=db status=ok mode={mode} duration_ms={}",
        started_at.elapsed().as_millis()
    );
    Ok(conn)
}

fn bootstrap_connection(conn: &mut Connection) -> DbResult<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(BUSY_TIMEOUT)?;
    apply_migrations(conn)?;
    Ok(())
}
