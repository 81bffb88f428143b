use super::Entity;
use crate::store::history::HistoryTable;

pub struct Person;

impl Entity for Person {
    const NAME: &'static str = "Person";
    const TABLE: &'static str = "persons";
    const ATTRIBUTES: &'static [&'static str] = &[
        "external_person_id",
        "full_name",
        "email_address",
        "github_username",
        "role",
        "is_active",
    ];
    const HISTORY: Option<HistoryTable> = Some(HistoryTable {
        table: "person_history",
        foreign_key: "person_id",
    });
}
