//! Task domain model.
//!
//! # Responsibility
//! - Define the task record rendered inside a project.
//! - Provide small read-side helpers over persisted fields.
//!
//! # Invariants
//! - `priority` is positive and unique within `project_uuid`.
//! - Lower priority values come earlier in execution order.
//! - Priorities are dense after creation and reorders, but deletes leave gaps.
//! - `deadline` is stored as Unix epoch milliseconds (UTC).

use crate::model::project::ProjectId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier for one task.
pub type TaskId = Uuid;

/// Task read model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Stable task id.
    pub uuid: TaskId,
    /// Owning project.
    pub project_uuid: ProjectId,
    /// User-facing label.
    pub name: String,
    /// Rank within the project; `1` runs first.
    pub priority: i64,
    /// Completion flag. New tasks start incomplete.
    pub is_done: bool,
    /// Epoch ms due time.
    pub deadline: i64,
    /// Epoch ms creation timestamp.
    pub created_at: i64,
    /// Epoch ms update timestamp.
    pub updated_at: i64,
}

impl Task {
    /// Returns the deadline as a UTC timestamp.
    ///
    /// Returns `None` only when the stored value is outside chrono's range.
    pub fn deadline_utc(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.deadline)
    }
}

impl Display for Task {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Task: {}", self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::Task;
    use uuid::Uuid;

    fn sample(deadline: i64) -> Task {
        Task {
            uuid: Uuid::new_v4(),
            project_uuid: Uuid::new_v4(),
            name: "Write report".to_string(),
            priority: 1,
            is_done: false,
            deadline,
            created_at: 0,
            updated_at: 0,
        }
    }

    #[test]
    fn display_uses_task_prefix() {
        assert_eq!(sample(0).to_string(), "Task: Write report");
    }

    #[test]
    fn deadline_utc_converts_epoch_millis() {
        let deadline = sample(1_700_000_000_000).deadline_utc().unwrap();
        assert_eq!(deadline.to_rfc3339(), "2023-11-14T22:13:20+00:00");
    }
}
