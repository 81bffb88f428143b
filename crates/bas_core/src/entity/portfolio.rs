//! Domains, activities and the work planned under them.

use super::people::Person;
use super::Entity;
use crate::store::relations::{Relation, RelationMode};

pub struct Domain;

impl Entity for Domain {
    const NAME: &'static str = "Domain";
    const TABLE: &'static str = "domains";
    const ATTRIBUTES: &'static [&'static str] = &["external_domain_id", "name", "archived"];
}

pub struct Activity;

impl Entity for Activity {
    const NAME: &'static str = "Activity";
    const TABLE: &'static str = "activities";
    const ATTRIBUTES: &'static [&'static str] = &[
        "external_activity_id",
        "name",
        "description",
        "tags",
        "deadline",
        "domain_id",
    ];
    const RELATIONS: &'static [Relation] =
        &[Relation::to::<Domain>("external_domain_id", "domain_id")];
}

/// Milestones clear their activity link when the external id arrives blank.
pub struct Milestone;

impl Entity for Milestone {
    const NAME: &'static str = "Milestone";
    const TABLE: &'static str = "milestones";
    const ATTRIBUTES: &'static [&'static str] = &[
        "external_milestone_id",
        "name",
        "status",
        "completion_date",
        "activity_id",
    ];
    const RELATIONS: &'static [Relation] =
        &[Relation::to::<Activity>("external_activity_id", "activity_id")];
    const RELATION_MODE: RelationMode = RelationMode::ClearBlank;
}

pub struct WorkItem;

impl Entity for WorkItem {
    const NAME: &'static str = "WorkItem";
    const TABLE: &'static str = "work_items";
    const ATTRIBUTES: &'static [&'static str] = &[
        "external_work_item_id",
        "name",
        "status",
        "completion_date",
        "activity_id",
        "milestone_id",
        "person_id",
    ];
    const RELATIONS: &'static [Relation] = &[
        Relation::to::<Activity>("external_activity_id", "activity_id"),
        Relation::to::<Milestone>("external_milestone_id", "milestone_id"),
        Relation::to::<Person>("external_person_id", "person_id"),
    ];
    const RELATION_MODE: RelationMode = RelationMode::ClearBlank;
}

pub struct WeeklyScope;

impl Entity for WeeklyScope {
    const NAME: &'static str = "WeeklyScope";
    const TABLE: &'static str = "weekly_scopes";
    const ATTRIBUTES: &'static [&'static str] = &[
        "external_weekly_scope_id",
        "description",
        "start_week",
        "end_week",
        "person_id",
    ];
    const RELATIONS: &'static [Relation] =
        &[Relation::to::<Person>("external_person_id", "person_id")];
}
