//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into request-level APIs.
//! - Keep the request/rendering layer decoupled from storage details.
//!
//! # Invariants
//! - Every entry point takes the owner id supplied by the auth provider and
//!   scopes all lookups by it.

pub mod project_service;
pub mod task_service;

/// Returns the trimmed owner id, or `None` when it is blank.
pub(crate) fn normalize_owner(owner_id: &str) -> Option<&str> {
    let trimmed = owner_id.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}
