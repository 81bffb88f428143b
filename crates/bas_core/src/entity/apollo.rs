use super::Entity;

/// Daily outreach metrics snapshot. The table carries no timestamps.
pub struct ApolloMetric;

impl Entity for ApolloMetric {
    const NAME: &'static str = "ApolloMetric";
    const TABLE: &'static str = "apollo_metrics";
    const ATTRIBUTES: &'static [&'static str] = &[
        "total_number_of_contacts",
        "leads_count",
        "people_count",
        "email_sent_count",
        "opportunities",
        "recorded_on",
    ];
}
