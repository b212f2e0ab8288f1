//! Domain model for the owner → project → task tree.
//!
//! # Responsibility
//! - Define canonical read models returned by repositories and services.
//! - Define raw input forms and their validation into clean drafts.
//!
//! # Invariants
//! - Projects and tasks are identified by stable v4 UUIDs.
//! - Task priority is positive and unique within its project.
//! - Deletion is a hard delete; there are no tombstones.

pub mod form;
pub mod project;
pub mod task;
