//! SQLite file that keeps the durable sheet snapshot.
//!
//! # Responsibility
//! - Hand out connections whose snapshot schema is current.
//! - Name the failing schema step and the table it owns when bootstrap fails.
//!
//! # Invariants
//! - The snapshot schema version lives in `PRAGMA user_version`.
//! - Snapshot rows are only touched through connections from [`open_db`] or
//!   [`open_db_in_memory`].

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod migrations;
mod open;

pub use migrations::{latest_version, schema_version, MigrationReport};
pub use open::{open_db, open_db_in_memory};

pub type DbResult<T> = Result<T, DbError>;

/// Reasons the snapshot database could not be made ready.
#[derive(Debug)]
pub enum DbError {
    /// SQLite refused a pragma or schema query outside any migration step.
    Sqlite(rusqlite::Error),
    /// A schema step failed and its transaction was rolled back.
    Migration {
        version: u32,
        table: &'static str,
        source: rusqlite::Error,
    },
    /// A schema step ran but the table it owns is not there afterwards.
    MissingTable { version: u32, table: &'static str },
    /// The file carries a snapshot schema written by a newer binary.
    SchemaTooNew { found: u32, supported: u32 },
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "snapshot database error: {err}"),
            Self::Migration {
                version,
                table,
                source,
            } => write!(
                f,
                "snapshot schema step {version} (`{table}`) failed: {source}"
            ),
            Self::MissingTable { version, table } => write!(
                f,
                "snapshot schema step {version} left no `{table}` table behind"
            ),
            Self::SchemaTooNew { found, supported } => write!(
                f,
                "snapshot schema version {found} is newer than supported {supported}"
            ),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) | Self::Migration { source: err, .. } => Some(err),
            Self::MissingTable { .. } | Self::SchemaTooNew { .. } => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}
