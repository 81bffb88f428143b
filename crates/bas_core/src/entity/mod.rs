//! Static per-entity declarations.
//!
//! # Responsibility
//! - Declare, once per entity type, the table, attribute whitelist,
//!   relations and optional history table every CRUD verb reuses.
//!
//! # Invariants
//! - Declarations are compile-time constants; instances carry no schema.
//! - History capture is opt-in per entity (`HISTORY = None` by default).

use crate::service::EntityService;
use crate::store::history::HistoryTable;
use crate::store::relations::{Queryable, Relation, RelationMode};
use crate::store::StoreResult;
use rusqlite::Connection;

mod apollo;
mod github;
mod kpi;
mod people;
mod portfolio;

pub use apollo::ApolloMetric;
pub use github::{GithubIssue, GithubPullRequest};
pub use kpi::Kpi;
pub use people::Person;
pub use portfolio::{Activity, Domain, Milestone, WeeklyScope, WorkItem};

/// Table-backed entity declaration.
pub trait Entity: 'static {
    /// Name used in error messages and logs.
    const NAME: &'static str;
    const TABLE: &'static str;
    /// Columns callers may write, besides `id`/`created_at`/`updated_at`.
    const ATTRIBUTES: &'static [&'static str];
    const RELATIONS: &'static [Relation] = &[];
    const RELATION_MODE: RelationMode = RelationMode::SkipBlank;
    const HISTORY: Option<HistoryTable> = None;
}

impl Relation {
    /// Declares a relation resolved through `E`'s `query`.
    pub const fn to<E: Entity>(external_key: &'static str, internal_key: &'static str) -> Self {
        Self {
            target_name: E::NAME,
            target: relation_target::<E>,
            external_key,
            internal_key,
        }
    }
}

fn relation_target<E: Entity>(conn: &Connection) -> StoreResult<Box<dyn Queryable + '_>> {
    Ok(Box::new(EntityService::<E>::try_new(conn)?))
}

/// Table names of every shipped entity, in migration order.
pub const ENTITY_TABLES: &[&str] = &[
    Domain::TABLE,
    Person::TABLE,
    Activity::TABLE,
    Kpi::TABLE,
    Milestone::TABLE,
    WorkItem::TABLE,
    WeeklyScope::TABLE,
    GithubIssue::TABLE,
    GithubPullRequest::TABLE,
    ApolloMetric::TABLE,
];
