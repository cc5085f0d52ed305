//! Versioned schema steps for the snapshot database.
//!
//! Every step owns one table and runs in its own transaction. A failing step
//! rolls back alone, leaving the file at the previous version with earlier
//! steps intact.

use crate::db::{DbError, DbResult};
use log::{debug, info};
use rusqlite::Connection;

struct Migration {
    version: u32,
    /// Table the step creates; checked after the batch runs.
    table: &'static str,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    table: "sheet_snapshots",
    sql: include_str!("0001_snapshots.sql"),
}];

/// What `apply_migrations` did to a connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationReport {
    pub from_version: u32,
    pub to_version: u32,
    /// Versions applied in this call, ascending.
    pub applied: Vec<u32>,
}

impl MigrationReport {
    pub fn is_noop(&self) -> bool {
        self.applied.is_empty()
    }
}

/// Snapshot schema version this binary writes.
pub fn latest_version() -> u32 {
    MIGRATIONS.last().map_or(0, |migration| migration.version)
}

/// Schema version recorded in the connection's file.
pub fn schema_version(conn: &Connection) -> DbResult<u32> {
    Ok(conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?)
}

/// Brings the snapshot schema up to [`latest_version`].
pub fn apply_migrations(conn: &mut Connection) -> DbResult<MigrationReport> {
    let from_version = schema_version(conn)?;
    let supported = latest_version();
    if from_version > supported {
        return Err(DbError::SchemaTooNew {
            found: from_version,
            supported,
        });
    }

    let mut applied = Vec::new();
    for migration in MIGRATIONS.iter().filter(|m| m.version > from_version) {
        migration.run(conn)?;
        info!(
            "event=db_migrate module=db status=ok version={} table={}",
            migration.version, migration.table
        );
        applied.push(migration.version);
    }
    if applied.is_empty() {
        debug!("event=db_migrate module=db status=skip version={from_version}");
    }

    Ok(MigrationReport {
        from_version,
        to_version: schema_version(conn)?,
        applied,
    })
}

impl Migration {
    fn run(&self, conn: &mut Connection) -> DbResult<()> {
        let failed = |source| DbError::Migration {
            version: self.version,
            table: self.table,
            source,
        };
        let tx = conn.transaction().map_err(failed)?;
        tx.execute_batch(self.sql).map_err(failed)?;
        if !table_exists(&tx, self.table).map_err(failed)? {
            // Dropping `tx` rolls the step back.
            return Err(DbError::MissingTable {
                version: self.version,
                table: self.table,
            });
        }
        tx.pragma_update(None, "user_version", self.version)
            .map_err(failed)?;
        tx.commit().map_err(failed)
    }
}

fn table_exists(conn: &Connection, table: &str) -> rusqlite::Result<bool> {
    conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1);",
        [table],
        |row| row.get(0),
    )
}
