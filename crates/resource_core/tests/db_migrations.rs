use resource_core::db::migrations::latest_version;
use resource_core::db::{open_db, open_db_in_memory, DbError};
use rusqlite::Connection;

fn user_version(conn: &Connection) -> u32 {
    conn.query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap()
}

#[test]
fn in_memory_db_is_fully_migrated() {
    let conn = open_db_in_memory().unwrap();
    assert_eq!(user_version(&conn), latest_version());

    let tables: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = 'resources';",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(tables, 1);
}

#[test]
fn reopening_a_file_db_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("resources.sqlite3");

    drop(open_db(&path).unwrap());
    let conn = open_db(&path).unwrap();

    assert_eq!(user_version(&conn), latest_version());
}

#[test]
fn newer_schema_version_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.sqlite3");
    {
        let conn = Connection::open(&path).unwrap();
        conn.execute_batch(&format!("PRAGMA user_version = {};", latest_version() + 1))
            .unwrap();
    }

    let err = open_db(&path).unwrap_err();
    assert!(matches!(
        err,
        DbError::UnsupportedSchemaVersion { db_version, latest_supported }
            if db_version == latest_version() + 1 && latest_supported == latest_version()
    ));
}

#[test]
fn attributes_column_rejects_invalid_json() {
    let conn = open_db_in_memory().unwrap();
    let result = conn.execute(
        "INSERT INTO resources (id, resource_type, attributes) VALUES ('x', 'posts', 'not json');",
        [],
    );
    assert!(result.is_err());
}
