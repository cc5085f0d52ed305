//! Snapshot repository contracts with SQLite and in-memory implementations.

use crate::db::{latest_version, schema_version, DbError};
use crate::model::sheet::SheetData;
use rusqlite::{params, Connection, OptionalExtension};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Key under which the single sheet snapshot is stored.
pub const SNAPSHOT_KEY: &str = "sheet-data";

/// Serialization format of the stored payload.
pub const SNAPSHOT_FORMAT_VERSION: u32 = 1;

pub type RepoResult<T> = Result<T, RepoError>;

/// Snapshot storage errors.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    /// Stored payload cannot be decoded into a sheet.
    InvalidData(String),
    /// Sheet could not be encoded for storage.
    Encode(serde_json::Error),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "snapshot repository requires schema version {expected_version}, got {actual_version}"
            ),
            Self::InvalidData(message) => write!(f, "invalid snapshot data: {message}"),
            Self::Encode(err) => write!(f, "failed to encode snapshot: {err}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Encode(err) => Some(err),
            Self::UninitializedConnection { .. } | Self::InvalidData(_) => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Storage contract for the durable sheet snapshot.
pub trait SnapshotRepository: Send + Sync {
    /// Loads the stored snapshot, `None` when nothing was saved yet.
    fn load_snapshot(&self) -> RepoResult<Option<SheetData>>;
    /// Replaces the stored snapshot.
    fn save_snapshot(&self, data: &SheetData) -> RepoResult<()>;
    /// Removes the stored snapshot.
    fn clear_snapshot(&self) -> RepoResult<()>;
}

/// SQLite-backed snapshot repository.
///
/// Owns its connection behind a mutex so the repository can be shared with
/// async persistence handles.
pub struct SqliteSnapshotRepository {
    conn: Mutex<Connection>,
}

impl SqliteSnapshotRepository {
    /// Creates a repository from a migrated connection.
    pub fn try_new(conn: Connection) -> RepoResult<Self> {
        let expected_version = latest_version();
        let actual_version = schema_version(&conn)?;
        if actual_version != expected_version {
            return Err(RepoError::UninitializedConnection {
                expected_version,
                actual_version,
            });
        }
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl SnapshotRepository for SqliteSnapshotRepository {
    fn load_snapshot(&self) -> RepoResult<Option<SheetData>> {
        let row: Option<(u32, String)> = self
            .conn()
            .query_row(
                "SELECT format_version, payload
                 FROM sheet_snapshots
                 WHERE snapshot_key = ?1;",
                [SNAPSHOT_KEY],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;

        match row {
            None => Ok(None),
            Some((version, _)) if version != SNAPSHOT_FORMAT_VERSION => Err(
                RepoError::InvalidData(format!("unsupported snapshot format version {version}")),
            ),
            Some((_, payload)) => decode_snapshot(&payload).map(Some),
        }
    }

    fn save_snapshot(&self, data: &SheetData) -> RepoResult<()> {
        let payload = encode_snapshot(data)?;
        self.conn().execute(
            "INSERT INTO sheet_snapshots (snapshot_key, format_version, payload)
             VALUES (?1, ?2, ?3)
             ON CONFLICT(snapshot_key) DO UPDATE SET
                format_version = excluded.format_version,
                payload = excluded.payload,
                updated_at = (strftime('%s', 'now') * 1000);",
            params![SNAPSHOT_KEY, SNAPSHOT_FORMAT_VERSION, payload],
        )?;
        Ok(())
    }

    fn clear_snapshot(&self) -> RepoResult<()> {
        self.conn().execute(
            "DELETE FROM sheet_snapshots WHERE snapshot_key = ?1;",
            [SNAPSHOT_KEY],
        )?;
        Ok(())
    }
}

/// Keeps the serialized payload in memory, mirroring the SQLite round trip.
#[derive(Debug, Default)]
pub struct MemorySnapshotRepository {
    payload: Mutex<Option<String>>,
}

impl MemorySnapshotRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the repository with a raw payload, valid or not.
    pub fn with_payload(payload: impl Into<String>) -> Self {
        Self {
            payload: Mutex::new(Some(payload.into())),
        }
    }

    /// Raw stored payload, if any.
    pub fn payload(&self) -> Option<String> {
        self.slot().clone()
    }

    fn slot(&self) -> MutexGuard<'_, Option<String>> {
        self.payload.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl SnapshotRepository for MemorySnapshotRepository {
    fn load_snapshot(&self) -> RepoResult<Option<SheetData>> {
        self.slot().as_deref().map(decode_snapshot).transpose()
    }

    fn save_snapshot(&self, data: &SheetData) -> RepoResult<()> {
        *self.slot() = Some(encode_snapshot(data)?);
        Ok(())
    }

    fn clear_snapshot(&self) -> RepoResult<()> {
        *self.slot() = None;
        Ok(())
    }
}

fn encode_snapshot(data: &SheetData) -> RepoResult<String> {
    serde_json::to_string(data).map_err(RepoError::Encode)
}

fn decode_snapshot(payload: &str) -> RepoResult<SheetData> {
    serde_json::from_str(payload).map_err(|err| RepoError::InvalidData(err.to_string()))
}
