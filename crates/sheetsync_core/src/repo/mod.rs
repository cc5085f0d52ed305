//! Repository layer for the durable local snapshot.
//!
//! # Responsibility
//! - Define the snapshot storage contract used by the local persistence
//!   service.
//! - Keep SQLite details inside the repository boundary.
//!
//! # Invariants
//! - A snapshot is one serialized `SheetData` record under a fixed key.
//! - Undecodable payloads surface as `RepoError::InvalidData`, never as a
//!   silently empty sheet.

pub mod snapshot_repo;
