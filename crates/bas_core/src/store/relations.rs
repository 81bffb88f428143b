//! Foreign-key resolution from external identifiers.
//!
//! # Responsibility
//! - Replace an external (business) identifier in write parameters with the
//!   internal primary key of the row it names.
//!
//! # Invariants
//! - A consumed external key is always removed from the parameters.
//! - A lookup miss sets the internal key to `null`; it is never an error.
//! - When several rows match, the lowest primary key wins.
//! - Relations are applied independently, in declaration order.

use super::value::is_blank;
use super::{Record, StoreResult};
use crate::db::schema::ID_COLUMN;
use log::debug;
use rusqlite::Connection;
use serde_json::Value;

/// Anything that can answer an equality-AND lookup over its rows.
pub trait Queryable {
    fn query(&self, conditions: &Record) -> StoreResult<Vec<Record>>;
}

/// Opens the lookup target of a relation on a shared connection.
pub type RelationTarget = for<'c> fn(&'c Connection) -> StoreResult<Box<dyn Queryable + 'c>>;

/// How blank external values are treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RelationMode {
    /// Blank external values are dropped and the internal key is left as is.
    #[default]
    SkipBlank,
    /// Blank external values clear the internal key to `null`.
    ClearBlank,
}

/// Static foreign-key mapping declared by an entity.
#[derive(Clone, Copy)]
pub struct Relation {
    /// Entity name of the lookup target, for logs.
    pub target_name: &'static str,
    pub target: RelationTarget,
    /// Key callers supply, also the target's lookup column.
    pub external_key: &'static str,
    /// Foreign-key column written on the owning entity.
    pub internal_key: &'static str,
}

impl std::fmt::Debug for Relation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Relation")
            .field("target", &self.target_name)
            .field("external_key", &self.external_key)
            .field("internal_key", &self.internal_key)
            .finish()
    }
}

/// Resolves every relation in `relations` against `params`, in place.
///
/// `open` yields the lookup target for a relation; entity services pass
/// [`Relation::target`] applied to their own connection.
pub fn assign_relations<'c>(
    params: &mut Record,
    relations: &[Relation],
    mode: RelationMode,
    mut open: impl FnMut(&Relation) -> StoreResult<Box<dyn Queryable + 'c>>,
) -> StoreResult<()> {
    for relation in relations {
        let Some(external_value) = params.remove(relation.external_key) else {
            continue;
        };

        if is_blank(&external_value) {
            if mode == RelationMode::ClearBlank {
                params.insert(relation.internal_key.to_string(), Value::Null);
            }
            continue;
        }

        let mut conditions = Record::new();
        conditions.insert(relation.external_key.to_string(), external_value);
        let found = open(relation)?.query(&conditions)?.into_iter().next();

        let internal_value = match found.and_then(|mut row| row.remove(ID_COLUMN)) {
            Some(id) => id,
            None => {
                debug!(
                    "event=relation_resolve module=store status=miss target={} external_key={}",
                    relation.target_name, relation.external_key
                );
                Value::Null
            }
        };
        params.insert(relation.internal_key.to_string(), internal_value);
    }
    Ok(())
}
