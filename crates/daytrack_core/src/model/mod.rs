//! Domain model for tasks, goals and user profiles.
//!
//! # Responsibility
//! - Define the canonical records persisted by the repository layer.
//! - Enforce field-level rules before anything reaches storage.
//!
//! # Invariants
//! - Every task and goal is identified by a stable UUID.
//! - Deletion is hard; removed records leave no tombstone behind.
//!
//! # See also
//! - docs/architecture/data-model.md

pub mod goal;
pub mod task;
pub mod user;
