use super::portfolio::Domain;
use super::Entity;
use crate::store::history::HistoryTable;
use crate::store::relations::Relation;

/// Key performance indicator; every update snapshots the previous values.
pub struct Kpi;

impl Entity for Kpi {
    const NAME: &'static str = "Kpi";
    const TABLE: &'static str = "kpis";
    const ATTRIBUTES: &'static [&'static str] = &[
        "external_kpi_id",
        "description",
        "status",
        "current_value",
        "percentage",
        "target_value",
        "domain_id",
    ];
    const RELATIONS: &'static [Relation] =
        &[Relation::to::<Domain>("external_domain_id", "domain_id")];
    const HISTORY: Option<HistoryTable> = Some(HistoryTable {
        table: "kpi_history",
        foreign_key: "kpi_id",
    });
}
