use bas_core::db::open_db_in_memory;
use bas_core::{
    ApolloMetric, DbConfig, Domain, EntityService, GithubIssue, Kpi, Record, StoreError,
};
use serde_json::{json, Value};

fn params(value: Value) -> Record {
    value.as_object().cloned().unwrap()
}

#[test]
fn domain_insert_and_find_roundtrip() {
    let conn = open_db_in_memory().unwrap();
    let domains = EntityService::<Domain>::try_new(&conn).unwrap();

    let id = domains
        .insert(params(json!({
            "external_domain_id": "ext-d-1",
            "name": "Domain One",
            "archived": false
        })))
        .unwrap();

    let found = domains.find(id).unwrap().unwrap();
    assert_eq!(found["id"], json!(id));
    assert_eq!(found["name"], json!("Domain One"));
    assert_eq!(found["external_domain_id"], json!("ext-d-1"));
    assert_eq!(found["archived"], json!(false));
    assert!(found["created_at"].as_i64().unwrap() > 0);
    assert!(found["updated_at"].as_i64().unwrap() > 0);
}

#[test]
fn keys_outside_whitelist_are_not_persisted() {
    let conn = open_db_in_memory().unwrap();
    let domains = EntityService::<Domain>::try_new(&conn).unwrap();

    let id = domains
        .insert(params(json!({
            "name": "Filtered",
            "archived": true,
            "notion_page_url": "https://example.invalid/page",
            "unexpected": 1
        })))
        .unwrap();
    domains
        .update(id, params(json!({"name": "Still filtered", "bogus": "x"})))
        .unwrap();

    let found = domains.find(id).unwrap().unwrap();
    assert_eq!(found["name"], json!("Still filtered"));
    assert!(!found.contains_key("notion_page_url"));
    assert!(!found.contains_key("unexpected"));
    assert!(!found.contains_key("bogus"));
}

#[test]
fn update_changes_fields_and_bumps_updated_at() {
    let conn = open_db_in_memory().unwrap();
    let domains = EntityService::<Domain>::try_new(&conn).unwrap();
    let id = domains
        .insert(params(json!({
            "name": "Before",
            "archived": false,
            "created_at": 1_000,
            "updated_at": 1_000
        })))
        .unwrap();

    let changed = domains
        .update(id, params(json!({"archived": true, "updated_at": 5})))
        .unwrap();
    assert_eq!(changed, 1);

    let found = domains.find(id).unwrap().unwrap();
    assert_eq!(found["name"], json!("Before"));
    assert_eq!(found["archived"], json!(true));
    assert_eq!(found["created_at"], json!(1_000));
    assert!(found["updated_at"].as_i64().unwrap() > 1_000);
}

#[test]
fn update_of_missing_row_affects_nothing() {
    let conn = open_db_in_memory().unwrap();
    let domains = EntityService::<Domain>::try_new(&conn).unwrap();

    assert_eq!(domains.update(42, params(json!({"name": "Nobody"}))).unwrap(), 0);
    assert!(domains.find(42).unwrap().is_none());
}

#[test]
fn update_and_delete_without_id_fail_before_writing() {
    let conn = open_db_in_memory().unwrap();
    let domains = EntityService::<Domain>::try_new(&conn).unwrap();
    let id = domains
        .insert(params(json!({"name": "Untouched", "archived": false})))
        .unwrap();

    let err = domains
        .update(None, params(json!({"name": "Oops"})))
        .unwrap_err();
    assert!(matches!(err, StoreError::MissingId { entity: "Domain", .. }));
    assert!(err.to_string().contains("id is required to update"));

    let err = domains.update(0, params(json!({"name": "Oops"}))).unwrap_err();
    assert!(matches!(err, StoreError::MissingId { .. }));

    let err = domains.delete(None).unwrap_err();
    assert_eq!(err.to_string(), "Domain id is required to delete");

    let found = domains.find(id).unwrap().unwrap();
    assert_eq!(found["name"], json!("Untouched"));
    assert_eq!(domains.query(&Record::new()).unwrap().len(), 1);
}

#[test]
fn delete_then_find_returns_none_and_query_shrinks() {
    let conn = open_db_in_memory().unwrap();
    let domains = EntityService::<Domain>::try_new(&conn).unwrap();
    let keep = domains
        .insert(params(json!({"name": "Keep", "archived": false})))
        .unwrap();
    let doomed = domains
        .insert(params(json!({"name": "Drop", "archived": false})))
        .unwrap();
    let before = domains.query(&Record::new()).unwrap().len();

    assert_eq!(domains.delete(doomed).unwrap(), 1);

    assert!(domains.find(doomed).unwrap().is_none());
    assert!(domains.find(keep).unwrap().is_some());
    assert_eq!(domains.query(&Record::new()).unwrap().len(), before - 1);
    assert_eq!(domains.delete(doomed).unwrap(), 0);
}

#[test]
fn query_filters_with_equality_and() {
    let conn = open_db_in_memory().unwrap();
    let domains = EntityService::<Domain>::try_new(&conn).unwrap();
    for (name, archived) in [("Alpha", false), ("Beta", true), ("Gamma", true)] {
        domains
            .insert(params(json!({"name": name, "archived": archived})))
            .unwrap();
    }

    let archived = domains.query(&params(json!({"archived": true}))).unwrap();
    let names = archived
        .iter()
        .map(|row| row["name"].as_str().unwrap())
        .collect::<Vec<_>>();
    assert_eq!(names, vec!["Beta", "Gamma"]);

    let exact = domains
        .query(&params(json!({"archived": true, "name": "Gamma"})))
        .unwrap();
    assert_eq!(exact.len(), 1);

    let err = domains
        .query(&params(json!({"no_such_column": 1})))
        .unwrap_err();
    assert_eq!(err.error_code(), "unknown_column");
}

#[test]
fn constraint_violations_surface_unchanged() {
    let conn = open_db_in_memory().unwrap();
    let domains = EntityService::<Domain>::try_new(&conn).unwrap();

    let err = domains
        .insert(params(json!({"external_domain_id": "ext-no-name"})))
        .unwrap_err();
    match err {
        StoreError::Db(db_err) => assert!(db_err.to_string().contains("NOT NULL")),
        other => panic!("unexpected error: {other}"),
    }
    assert!(domains.query(&Record::new()).unwrap().is_empty());
}

#[test]
fn json_columns_roundtrip_documents() {
    let conn = open_db_in_memory().unwrap();
    let issues = EntityService::<GithubIssue>::try_new(&conn).unwrap();

    let id = issues
        .insert(params(json!({
            "issue_id": 1201,
            "title": "Fix pagination",
            "status": "open",
            "labels": ["bug", {"name": "priority", "level": 1}]
        })))
        .unwrap();

    let found = issues.find(id).unwrap().unwrap();
    assert_eq!(found["issue_id"], json!(1201));
    assert_eq!(found["labels"], json!(["bug", {"name": "priority", "level": 1}]));
    assert_eq!(found["person_id"], Value::Null);
}

#[test]
fn real_columns_read_back_as_floats() {
    let conn = open_db_in_memory().unwrap();
    let kpis = EntityService::<Kpi>::try_new(&conn).unwrap();

    let id = kpis
        .insert(params(json!({
            "description": "Signed customers",
            "status": "On Track",
            "current_value": 50,
            "target_value": 120.5
        })))
        .unwrap();

    let found = kpis.find(id).unwrap().unwrap();
    assert_eq!(found["current_value"], json!(50.0));
    assert_ne!(found["current_value"], json!(50));
    assert_eq!(found["target_value"], json!(120.5));
    assert_eq!(found["percentage"], Value::Null);
    assert_eq!(found["id"], json!(id));
}

#[test]
fn tables_without_timestamps_are_written_as_given() {
    let conn = open_db_in_memory().unwrap();
    let metrics = EntityService::<ApolloMetric>::try_new(&conn).unwrap();

    let id = metrics
        .insert(params(json!({
            "leads_count": 12,
            "people_count": 40,
            "opportunities": {"open": 3},
            "created_at": 99
        })))
        .unwrap();
    metrics
        .update(id, params(json!({"leads_count": 13})))
        .unwrap();

    let found = metrics.find(id).unwrap().unwrap();
    assert_eq!(found["leads_count"], json!(13));
    assert_eq!(found["opportunities"], json!({"open": 3}));
    assert!(!found.contains_key("created_at"));
    assert!(!found.contains_key("updated_at"));
}

#[test]
fn caller_transaction_rolls_back_every_write() {
    let conn = open_db_in_memory().unwrap();
    let domains = EntityService::<Domain>::try_new(&conn).unwrap();

    let result: Result<(), StoreError> = domains.transaction(|domains| {
        domains.insert(params(json!({"name": "First", "archived": false})))?;
        domains.insert(params(json!({"archived": false})))?;
        Ok(())
    });

    assert!(result.is_err());
    assert!(domains.query(&Record::new()).unwrap().is_empty());
}

#[test]
fn service_can_own_its_connection() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("owned.sqlite3");
    let config = DbConfig::new(path.to_str().unwrap());

    let id = {
        let domains = EntityService::<Domain>::connect(&config).unwrap();
        domains
            .insert(params(json!({"name": "Persisted", "archived": false})))
            .unwrap()
    };

    let reopened = EntityService::<Domain>::connect(&config).unwrap();
    let found = reopened.find(id).unwrap().unwrap();
    assert_eq!(found["name"], json!("Persisted"));
}
