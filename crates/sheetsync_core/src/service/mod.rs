//! Sync engine services.
//!
//! # Responsibility
//! - Orchestrate local store writes and remote persistence calls into
//!   user-level operations.
//! - Keep rendering hosts decoupled from persistence details.

pub mod notice;
pub mod reorder;
pub mod sheet_service;
