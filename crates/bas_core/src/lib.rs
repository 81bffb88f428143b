//! Storage core for the bas pipeline.
//!
//! Bots hand plain key-value records to entity services; the services filter
//! them to declared attributes, resolve external ids into foreign keys,
//! snapshot history where declared, and persist them transactionally.

pub mod config;
pub mod db;
pub mod entity;
pub mod logging;
pub mod service;
pub mod store;

pub use config::{ConfigError, DbConfig, LoggingConfig, StoreConfig};
pub use db::{connect, open_db, open_db_in_memory, DbError, DbHandle, DbResult};
pub use entity::{
    Activity, ApolloMetric, Domain, Entity, GithubIssue, GithubPullRequest, Kpi, Milestone,
    Person, WeeklyScope, WorkItem,
};
pub use logging::{default_log_level, init_logging, init_logging_from_config, logging_status};
pub use service::EntityService;
pub use store::history::{HistoryRecorder, HistoryTable};
pub use store::relations::{Queryable, Relation, RelationMode};
pub use store::{Record, RecordId, StoreError, StoreResult};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
