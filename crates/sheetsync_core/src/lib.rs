//! Client-resident sync engine for a hierarchical checklist
//! (sheet → topics → sub-topics → questions).
//! Owns the normalized graph, its optimistic write protocol, the link index
//! and the read-side search/duplicate queries.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod remote;
pub mod repo;
pub mod search;
pub mod seed;
pub mod service;
pub mod store;

pub use config::{ConfigError, CoreConfig};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::ids::{QuestionId, SubTopicId, TopicId};
pub use model::question::{Difficulty, Question, QuestionDraft, QuestionPatch, ValidationError};
pub use model::sheet::{Sheet, SheetData, SubTopic, Topic};
pub use remote::local::LocalSheetService;
pub use remote::{EntityKind, RemoteError, RemoteResult, SheetPersistence};
pub use repo::snapshot_repo::{
    MemorySnapshotRepository, RepoError, RepoResult, SnapshotRepository,
    SqliteSnapshotRepository,
};
pub use search::duplicates::DuplicateLocation;
pub use search::filter::SearchMatches;
pub use service::notice::{Operation, SyncError, SyncNotice};
pub use service::sheet_service::{SheetService, SyncResult};
pub use store::progress::{Progress, SheetProgress};
pub use store::{SheetState, StoreError};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
