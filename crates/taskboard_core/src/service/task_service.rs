//! Task use-case service.
//!
//! # Responsibility
//! - Enforce owner scoping before any task read or write.
//! - Validate task forms and drive priority assignment and reordering.
//! - Return the project's task list after ranking mutations, ready to render.
//!
//! # Invariants
//! - The project must belong to the owner and the task to the project.
//! - New tasks are appended after the current maximum priority.
//! - Move up/down swap with the adjacent rank, or leave the list unchanged
//!   at the boundary.
//! - Delete leaves a gap; remaining priorities are not renumbered.

use crate::model::form::{TaskForm, ValidationErrors};
use crate::model::project::{Project, ProjectId};
use crate::model::task::{Task, TaskId};
use crate::ranking::MoveDirection;
use crate::repo::project_repo::ProjectRepository;
use crate::repo::task_repo::TaskRepository;
use crate::repo::RepoError;
use crate::service::normalize_owner;
use log::{info, warn};
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Errors from task service operations.
#[derive(Debug)]
pub enum TaskServiceError {
    /// Owner identity is blank.
    InvalidOwner,
    /// Form input failed validation; nothing was persisted.
    Validation(ValidationErrors),
    /// Project does not exist for this owner.
    ProjectNotFound(ProjectId),
    /// Task does not exist in this project.
    TaskNotFound(TaskId),
    /// Repository-level failure.
    Repo(RepoError),
}

impl Display for TaskServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidOwner => write!(f, "owner id must not be blank"),
            Self::Validation(errors) => write!(f, "invalid task input: {errors}"),
            Self::ProjectNotFound(id) => write!(f, "project not found: {id}"),
            Self::TaskNotFound(id) => write!(f, "task not found: {id}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for TaskServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(errors) => Some(errors),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for TaskServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::ProjectNotFound(project_uuid) => Self::ProjectNotFound(project_uuid),
            RepoError::TaskNotFound(task_uuid) => Self::TaskNotFound(task_uuid),
            other => Self::Repo(other),
        }
    }
}

impl From<ValidationErrors> for TaskServiceError {
    fn from(value: ValidationErrors) -> Self {
        Self::Validation(value)
    }
}

/// One project with its tasks in execution order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectTasks {
    pub project: Project,
    pub tasks: Vec<Task>,
}

impl ProjectTasks {
    /// Task priorities in list order.
    pub fn priorities(&self) -> Vec<i64> {
        self.tasks.iter().map(|task| task.priority).collect()
    }
}

/// Task service facade.
pub struct TaskService<P: ProjectRepository, T: TaskRepository> {
    projects: P,
    tasks: T,
}

impl<P: ProjectRepository, T: TaskRepository> TaskService<P, T> {
    /// Creates service from repository implementations.
    pub fn new(projects: P, tasks: T) -> Self {
        Self { projects, tasks }
    }

    /// Lists tasks of one owned project by ascending priority.
    pub fn list_tasks(
        &self,
        owner_id: &str,
        project_uuid: ProjectId,
    ) -> Result<ProjectTasks, TaskServiceError> {
        let project = self.owned_project(owner_id, project_uuid)?;
        self.snapshot(project)
    }

    /// Loads one task of one owned project.
    pub fn get_task(
        &self,
        owner_id: &str,
        project_uuid: ProjectId,
        task_uuid: TaskId,
    ) -> Result<Task, TaskServiceError> {
        self.owned_project(owner_id, project_uuid)?;
        self.project_task(project_uuid, task_uuid)
    }

    /// Creates one task at the end of the project ranking.
    ///
    /// # Contract
    /// - `priority = MAX(priority) + 1`, or `1` for an empty project.
    /// - Status starts incomplete.
    pub fn create_task(
        &self,
        owner_id: &str,
        project_uuid: ProjectId,
        form: &TaskForm,
    ) -> Result<Task, TaskServiceError> {
        self.owned_project(owner_id, project_uuid)?;
        let draft = form.validate()?;
        let task = self.tasks.create_task(project_uuid, &draft)?;
        info!(
            "event=task_create module=task_service status=ok project={project_uuid} task={} priority={}",
            task.uuid, task.priority
        );
        Ok(task)
    }

    /// Replaces task name and deadline.
    pub fn update_task(
        &self,
        owner_id: &str,
        project_uuid: ProjectId,
        task_uuid: TaskId,
        form: &TaskForm,
    ) -> Result<Task, TaskServiceError> {
        self.owned_project(owner_id, project_uuid)?;
        let draft = form.validate()?;
        self.tasks.update_task(project_uuid, task_uuid, &draft)?;
        info!("event=task_update module=task_service status=ok project={project_uuid} task={task_uuid}");
        self.project_task(project_uuid, task_uuid)
    }

    /// Deletes one task without renumbering the rest.
    pub fn delete_task(
        &self,
        owner_id: &str,
        project_uuid: ProjectId,
        task_uuid: TaskId,
    ) -> Result<ProjectTasks, TaskServiceError> {
        let project = self.owned_project(owner_id, project_uuid)?;
        self.tasks.delete_task(project_uuid, task_uuid)?;
        info!("event=task_delete module=task_service status=ok project={project_uuid} task={task_uuid}");
        self.snapshot(project)
    }

    /// Moves one task a single step earlier in execution order.
    pub fn move_task_up(
        &self,
        owner_id: &str,
        project_uuid: ProjectId,
        task_uuid: TaskId,
    ) -> Result<ProjectTasks, TaskServiceError> {
        self.move_task(owner_id, project_uuid, task_uuid, MoveDirection::Up)
    }

    /// Moves one task a single step later in execution order.
    pub fn move_task_down(
        &self,
        owner_id: &str,
        project_uuid: ProjectId,
        task_uuid: TaskId,
    ) -> Result<ProjectTasks, TaskServiceError> {
        self.move_task(owner_id, project_uuid, task_uuid, MoveDirection::Down)
    }

    /// Flips completion status and returns the updated task.
    pub fn toggle_task_status(
        &self,
        owner_id: &str,
        project_uuid: ProjectId,
        task_uuid: TaskId,
    ) -> Result<Task, TaskServiceError> {
        self.owned_project(owner_id, project_uuid)?;
        let is_done = self.tasks.toggle_task_status(project_uuid, task_uuid)?;
        info!(
            "event=task_toggle module=task_service status=ok project={project_uuid} task={task_uuid} is_done={is_done}"
        );
        self.project_task(project_uuid, task_uuid)
    }

    fn move_task(
        &self,
        owner_id: &str,
        project_uuid: ProjectId,
        task_uuid: TaskId,
        direction: MoveDirection,
    ) -> Result<ProjectTasks, TaskServiceError> {
        let project = self.owned_project(owner_id, project_uuid)?;
        match self.tasks.move_task(project_uuid, task_uuid, direction)? {
            Some(plan) => info!(
                "event=task_reorder module=task_service status=ok direction={} project={project_uuid} task={task_uuid} from={} to={} neighbour={}",
                direction.as_str(),
                plan.target.priority,
                plan.neighbour.priority,
                plan.neighbour.task_uuid
            ),
            None => info!(
                "event=task_reorder module=task_service status=noop direction={} project={project_uuid} task={task_uuid}",
                direction.as_str()
            ),
        }
        self.snapshot(project)
    }

    fn owned_project(
        &self,
        owner_id: &str,
        project_uuid: ProjectId,
    ) -> Result<Project, TaskServiceError> {
        let owner_id = normalize_owner(owner_id).ok_or(TaskServiceError::InvalidOwner)?;
        match self.projects.get_project(owner_id, project_uuid)? {
            Some(project) => Ok(project),
            None => {
                warn!(
                    "event=project_lookup module=task_service status=not_found project={project_uuid}"
                );
                Err(TaskServiceError::ProjectNotFound(project_uuid))
            }
        }
    }

    fn project_task(
        &self,
        project_uuid: ProjectId,
        task_uuid: TaskId,
    ) -> Result<Task, TaskServiceError> {
        match self.tasks.get_task(project_uuid, task_uuid)? {
            Some(task) => Ok(task),
            None => {
                warn!(
                    "event=task_lookup module=task_service status=not_found project={project_uuid} task={task_uuid}"
                );
                Err(TaskServiceError::TaskNotFound(task_uuid))
            }
        }
    }

    fn snapshot(&self, project: Project) -> Result<ProjectTasks, TaskServiceError> {
        let tasks = self.tasks.list_tasks(project.uuid)?;
        Ok(ProjectTasks { project, tasks })
    }
}
