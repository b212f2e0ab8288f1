//! Project domain model.
//!
//! # Invariants
//! - `name` is trimmed and non-empty once persisted.
//! - `owner_id` never changes after creation.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier for one project.
pub type ProjectId = Uuid;

/// Opaque identity handed over by the authentication provider.
pub type OwnerId = String;

/// Project read model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    /// Stable project id.
    pub uuid: ProjectId,
    /// Owning user. Every lookup is scoped by this value.
    pub owner_id: OwnerId,
    /// User-facing label.
    pub name: String,
    /// Epoch ms creation timestamp.
    pub created_at: i64,
    /// Epoch ms update timestamp.
    pub updated_at: i64,
}

impl Display for Project {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Project: {}", self.name)
    }
}
