use resource_core::db::open_db_in_memory;
use resource_core::{
    Attributes, DbConnections, DispatchError, Hydrator, RecordRepository, RepoError,
    ResourceObject, ResourceValidationError, SearchParameters, SqliteHydrator,
    SqliteRecordRepository, SqliteStore, Store,
};
use serde_json::json;
use uuid::Uuid;

fn attributes(pairs: &[(&str, serde_json::Value)]) -> Attributes {
    pairs
        .iter()
        .map(|(key, value)| (key.to_string(), value.clone()))
        .collect()
}

#[test]
fn insert_and_get_roundtrip() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteRecordRepository::new(&conn);
    let id = Uuid::new_v4();

    let inserted = repo
        .insert_record(id, "posts", &attributes(&[("title", json!("first"))]))
        .unwrap();
    let loaded = repo.get_record(id).unwrap().unwrap();

    assert_eq!(inserted, loaded);
    assert_eq!(loaded.resource_type, "posts");
    assert_eq!(loaded.attributes["title"], json!("first"));
    assert!(loaded.created_at > 0);
}

#[test]
fn insert_rejects_blank_resource_type() {
    let conn = open_db_in_memory().unwrap();
    let err = SqliteRecordRepository::new(&conn)
        .insert_record(Uuid::new_v4(), " ", &Attributes::new())
        .unwrap_err();
    assert!(matches!(
        err,
        RepoError::Validation(ResourceValidationError::EmptyResourceType)
    ));
}

#[test]
fn update_missing_record_returns_not_found() {
    let conn = open_db_in_memory().unwrap();
    let id = Uuid::new_v4();
    let err = SqliteRecordRepository::new(&conn)
        .update_attributes(id, &Attributes::new())
        .unwrap_err();
    assert!(matches!(err, RepoError::NotFound(missing) if missing == id));
}

#[test]
fn delete_reports_whether_a_row_was_removed() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteRecordRepository::new(&conn);
    let id = Uuid::new_v4();
    repo.insert_record(id, "posts", &Attributes::new()).unwrap();

    assert!(repo.delete_record(id).unwrap());
    assert!(!repo.delete_record(id).unwrap());
    assert!(repo.get_record(id).unwrap().is_none());
}

#[test]
fn list_filters_by_type_and_attributes() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteRecordRepository::new(&conn);
    repo.insert_record(
        Uuid::new_v4(),
        "posts",
        &attributes(&[("status", json!("draft")), ("pinned", json!(true))]),
    )
    .unwrap();
    repo.insert_record(
        Uuid::new_v4(),
        "posts",
        &attributes(&[("status", json!("published")), ("pinned", json!(false))]),
    )
    .unwrap();
    repo.insert_record(
        Uuid::new_v4(),
        "comments",
        &attributes(&[("status", json!("draft"))]),
    )
    .unwrap();

    let drafts = repo
        .list_records(
            "posts",
            &SearchParameters::default().with_filter("status", json!("draft")),
        )
        .unwrap();
    assert_eq!(drafts.len(), 1);
    assert_eq!(drafts[0].attributes["pinned"], json!(true));

    let unpinned = repo
        .list_records(
            "posts",
            &SearchParameters::default().with_filter("pinned", json!(false)),
        )
        .unwrap();
    assert_eq!(unpinned.len(), 1);
    assert_eq!(unpinned[0].attributes["status"], json!("published"));

    let missing_field = repo
        .list_records(
            "posts",
            &SearchParameters::default().with_filter("author", json!(null)),
        )
        .unwrap();
    assert_eq!(missing_field.len(), 2);
}

#[test]
fn list_pages_with_limit_and_offset() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteRecordRepository::new(&conn);
    for _ in 0..5 {
        repo.insert_record(Uuid::new_v4(), "posts", &Attributes::new())
            .unwrap();
    }

    let first_page = SearchParameters {
        limit: Some(2),
        ..SearchParameters::default()
    };
    let second_page = SearchParameters {
        limit: Some(2),
        offset: 2,
        ..SearchParameters::default()
    };
    let first = repo.list_records("posts", &first_page).unwrap();
    let second = repo.list_records("posts", &second_page).unwrap();

    assert_eq!(first.len(), 2);
    assert_eq!(second.len(), 2);
    assert!(first.iter().all(|record| !second.contains(record)));
}

#[test]
fn store_delegates_to_repository_listing() {
    let conn = open_db_in_memory().unwrap();
    let connections = DbConnections::new(conn);
    let conn = connections.connection(None).unwrap();
    SqliteRecordRepository::new(conn)
        .insert_record(Uuid::new_v4(), "posts", &Attributes::new())
        .unwrap();

    let listed = SqliteStore
        .query(conn, "posts", &SearchParameters::default())
        .unwrap();
    assert_eq!(listed.len(), 1);
}

#[test]
fn hydrator_create_honors_client_generated_id() {
    let conn = open_db_in_memory().unwrap();
    let id = Uuid::new_v4();
    let payload = ResourceObject::new("posts", Attributes::new()).with_id(id.to_string());

    let record = SqliteHydrator::new("posts").create(&conn, &payload).unwrap();

    assert_eq!(record.id, id);
}

#[test]
fn hydrator_update_merges_and_removes_null_attributes() {
    let conn = open_db_in_memory().unwrap();
    let hydrator = SqliteHydrator::new("posts");
    let record = hydrator
        .create(
            &conn,
            &ResourceObject::new(
                "posts",
                attributes(&[("title", json!("draft")), ("subtitle", json!("old"))]),
            ),
        )
        .unwrap();

    let updated = hydrator
        .update(
            &conn,
            &ResourceObject::new(
                "posts",
                attributes(&[("subtitle", json!(null)), ("body", json!("text"))]),
            ),
            record,
        )
        .unwrap();

    assert_eq!(
        updated.attributes,
        attributes(&[("body", json!("text")), ("title", json!("draft"))])
    );
}

#[test]
fn hydrator_update_rejects_mismatched_id() {
    let conn = open_db_in_memory().unwrap();
    let hydrator = SqliteHydrator::new("posts");
    let record = hydrator
        .create(&conn, &ResourceObject::new("posts", Attributes::new()))
        .unwrap();

    let err = hydrator
        .update(
            &conn,
            &ResourceObject::new("posts", Attributes::new()).with_id(Uuid::new_v4().to_string()),
            record,
        )
        .unwrap_err();

    assert!(matches!(
        err,
        DispatchError::Validation(ResourceValidationError::IdMismatch { .. })
    ));
}
