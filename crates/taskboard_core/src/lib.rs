//! Core domain logic for the taskboard project/task tracker.
//! This crate is the single source of truth for ranking invariants.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod ranking;
pub mod repo;
pub mod service;

pub use config::{ConfigError, TrackerConfig};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::form::{
    parse_deadline, ProjectDraft, ProjectForm, TaskDraft, TaskForm, ValidationErrors,
};
pub use model::project::{OwnerId, Project, ProjectId};
pub use model::task::{Task, TaskId};
pub use ranking::{MoveDirection, RankError, SwapPlan};
pub use repo::project_repo::{ProjectRepository, SqliteProjectRepository};
pub use repo::task_repo::{SqliteTaskRepository, TaskRepository};
pub use repo::{RepoError, RepoResult};
pub use service::project_service::{ProjectService, ProjectServiceError};
pub use service::task_service::{ProjectTasks, TaskService, TaskServiceError};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
