//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `bas_core` wiring against the configured database.
//! - Print schema version and row counts per entity table.

use bas_core::db::migrations::current_user_version;
use bas_core::entity::{
    Activity, ApolloMetric, Domain, Entity, GithubIssue, GithubPullRequest, Kpi, Milestone,
    Person, WeeklyScope, WorkItem,
};
use bas_core::{connect, init_logging_from_config, EntityService, Record, StoreConfig};
use log::error;
use rusqlite::Connection;
use std::process::ExitCode;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            error!("event=cli_run module=cli status=error error={message}");
            eprintln!("bas: {message}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), String> {
    let config = StoreConfig::load().map_err(|err| err.to_string())?;
    init_logging_from_config(&config.logging)?;

    let conn = connect(&config.database).map_err(|err| err.to_string())?;
    let version = current_user_version(&conn).map_err(|err| err.to_string())?;
    println!("bas_core version={}", bas_core::core_version());
    println!("database={} schema_version={version}", config.database.dbname);

    print_count::<Domain>(&conn)?;
    print_count::<Person>(&conn)?;
    print_count::<Activity>(&conn)?;
    print_count::<Kpi>(&conn)?;
    print_count::<Milestone>(&conn)?;
    print_count::<WorkItem>(&conn)?;
    print_count::<WeeklyScope>(&conn)?;
    print_count::<GithubIssue>(&conn)?;
    print_count::<GithubPullRequest>(&conn)?;
    print_count::<ApolloMetric>(&conn)?;
    Ok(())
}

fn print_count<E: Entity>(conn: &Connection) -> Result<(), String> {
    let rows = EntityService::<E>::try_new(conn)
        .and_then(|service| service.query(&Record::new()))
        .map_err(|err| err.to_string())?;
    println!("{} rows={}", E::TABLE, rows.len());
    Ok(())
}
