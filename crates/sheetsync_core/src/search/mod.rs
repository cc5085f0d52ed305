//! Read-only queries over the sheet graph.
//!
//! # Responsibility
//! - Hierarchical substring filtering with match propagation.
//! - Duplicate-link lookup for the question being added or edited.
//! - Splitting display text into highlighted and plain runs.
//!
//! # Invariants
//! - Nothing here mutates `SheetState`.

pub mod duplicates;
pub mod filter;
pub mod highlight;
