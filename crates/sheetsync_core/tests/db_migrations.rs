use rusqlite::Connection;
use sheetsync_core::db::migrations::apply_migrations;
use sheetsync_core::db::{latest_version, open_db, open_db_in_memory, schema_version, DbError};
use sheetsync_core::{RepoError, SqliteSnapshotRepository};

#[test]
fn open_db_in_memory_applies_all_migrations() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(schema_version(&conn).unwrap(), latest_version());
    assert_table_exists(&conn, "sheet_snapshots");
}

#[test]
fn opening_same_database_twice_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sheetsync.db");

    let first = open_db(&path).unwrap();
    assert_eq!(schema_version(&first).unwrap(), latest_version());
    drop(first);

    let second = open_db(&path).unwrap();
    assert_eq!(schema_version(&second).unwrap(), latest_version());
    assert_table_exists(&second, "sheet_snapshots");
}

#[test]
fn file_databases_use_wal_journaling() {
    let dir = tempfile::tempdir().unwrap();
    let conn = open_db(dir.path().join("wal.db")).unwrap();

    let mode: String = conn
        .query_row("PRAGMA journal_mode;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(mode.to_ascii_lowercase(), "wal");
}

#[test]
fn opening_database_with_newer_schema_version_returns_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.db");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    match open_db(&path).unwrap_err() {
        DbError::SchemaTooNew { found, supported } => {
            assert_eq!(found, 999);
            assert_eq!(supported, latest_version());
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn migrating_a_fresh_connection_reports_each_step() {
    let mut conn = Connection::open_in_memory().unwrap();

    let report = apply_migrations(&mut conn).unwrap();
    assert_eq!(report.from_version, 0);
    assert_eq!(report.to_version, latest_version());
    assert_eq!(report.applied, (1..=latest_version()).collect::<Vec<_>>());

    let again = apply_migrations(&mut conn).unwrap();
    assert!(again.is_noop());
    assert_eq!(again.from_version, latest_version());
}

#[test]
fn snapshot_step_rolls_back_when_its_table_name_is_taken_by_a_view() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("shadowed.db");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("CREATE VIEW sheet_snapshots AS SELECT 1 AS payload;")
        .unwrap();
    drop(conn);

    match open_db(&path).unwrap_err() {
        DbError::MissingTable { version, table } => {
            assert_eq!(version, 1);
            assert_eq!(table, "sheet_snapshots");
        }
        other => panic!("unexpected error: {other}"),
    }

    let conn = Connection::open(&path).unwrap();
    assert_eq!(schema_version(&conn).unwrap(), 0);
}

#[test]
fn snapshot_repository_rejects_unmigrated_connections() {
    let conn = Connection::open_in_memory().unwrap();

    match SqliteSnapshotRepository::try_new(conn) {
        Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        }) => {
            assert_eq!(expected_version, latest_version());
            assert_eq!(actual_version, 0);
        }
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("unmigrated connection was accepted"),
    }
}

fn assert_table_exists(conn: &Connection, table_name: &str) {
    let exists: i64 = conn
        .query_row(
            "SELECT EXISTS(
                SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1
            );",
            [table_name],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(exists, 1, "expected table `{table_name}` to exist");
}
