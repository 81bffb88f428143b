//! SQLite migration registry and executor.
//!
//! # Responsibility
//! - Register schema migrations in strictly increasing order.
//! - Apply pending migrations atomically.
//! - Own every entity and history table definition.
//!
//! # Invariants
//! - `version` values must remain monotonic.
//! - Applied migration version is mirrored to `PRAGMA user_version`.

use crate::db::{DbError, DbResult};
use log::info;
use rusqlite::Connection;

/// One schema step; `tables` lists what it creates.
#[derive(Debug, Clone, Copy)]
struct Migration {
    version: u32,
    name: &'static str,
    tables: &'static [&'static str],
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        name: "portfolio",
        tables: &[
            "domains",
            "persons",
            "activities",
            "kpis",
            "milestones",
            "work_items",
            "weekly_scopes",
        ],
        sql: include_str!("0001_portfolio.sql"),
    },
    Migration {
        version: 2,
        name: "history",
        tables: &["kpi_history", "person_history"],
        sql: include_str!("0002_history.sql"),
    },
    Migration {
        version: 3,
        name: "integrations",
        tables: &["github_issues", "github_pull_requests", "apollo_metrics"],
        sql: include_str!("0003_integrations.sql"),
    },
];

/// Returns the latest migration version known by this binary.
pub fn latest_version() -> u32 {
    MIGRATIONS.last().map_or(0, |migration| migration.version)
}

/// Applies all pending migrations on the provided connection.
///
/// Rejects databases written by a newer binary instead of guessing at their layout.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<()> {
    let current_version = current_user_version(conn)?;
    let latest = latest_version();

    if current_version > latest {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version: current_version,
            latest_supported: latest,
        });
    }

    if current_version == latest {
        return Ok(());
    }

    info!(
        "event=db_migrate module=db status=start from_version={current_version} to_version={latest}"
    );
    let tx = conn.transaction()?;
    for migration in pending(current_version) {
        tx.execute_batch(migration.sql)?;
        tx.execute_batch(&format!("PRAGMA user_version = {};", migration.version))?;
        info!(
            "event=db_migrate module=db status=applied version={} name={} tables={}",
            migration.version,
            migration.name,
            migration.tables.join(",")
        );
    }
    tx.commit()?;
    info!("event=db_migrate module=db status=ok version={latest}");

    Ok(())
}

/// Returns the schema version recorded in `PRAGMA user_version`.
pub fn current_user_version(conn: &Connection) -> DbResult<u32> {
    let version = conn.query_row("PRAGMA user_version;", [], |row| row.get::<_, u32>(0))?;
    Ok(version)
}

fn pending(current_version: u32) -> impl Iterator<Item = &'static Migration> {
    MIGRATIONS
        .iter()
        .filter(move |migration| migration.version > current_version)
}
