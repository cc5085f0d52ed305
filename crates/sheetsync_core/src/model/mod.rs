//! Normalized domain model for the checklist hierarchy.
//!
//! # Responsibility
//! - Define the entity records held by the store (sheet, topic, sub-topic,
//!   question) and their identifiers.
//! - Define the write-side inputs (`QuestionDraft`, `QuestionPatch`) and the
//!   serializable `SheetData` bundle exchanged with persistence.
//!
//! # Invariants
//! - Ids are opaque and never reassigned once a record exists.
//! - Blank external links are represented as `None`, never as `Some("")`.

pub mod ids;
pub mod question;
pub mod sheet;
