//! Project use-case service.
//!
//! # Responsibility
//! - Validate project forms before they reach persistence.
//! - Provide owner-scoped create, list, rename and delete entry points.
//!
//! # Invariants
//! - Invalid forms never reach the repository.
//! - A project owned by another user is reported as not found.

use crate::model::form::{ProjectForm, ValidationErrors};
use crate::model::project::{Project, ProjectId};
use crate::repo::project_repo::ProjectRepository;
use crate::repo::RepoError;
use crate::service::normalize_owner;
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Errors from project service operations.
#[derive(Debug)]
pub enum ProjectServiceError {
    /// Owner identity is blank.
    InvalidOwner,
    /// Form input failed validation; nothing was persisted.
    Validation(ValidationErrors),
    /// Project does not exist for this owner.
    ProjectNotFound(ProjectId),
    /// Repository-level failure.
    Repo(RepoError),
}

impl Display for ProjectServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidOwner => write!(f, "owner id must not be blank"),
            Self::Validation(errors) => write!(f, "invalid project input: {errors}"),
            Self::ProjectNotFound(id) => write!(f, "project not found: {id}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ProjectServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(errors) => Some(errors),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for ProjectServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::ProjectNotFound(project_uuid) => Self::ProjectNotFound(project_uuid),
            other => Self::Repo(other),
        }
    }
}

impl From<ValidationErrors> for ProjectServiceError {
    fn from(value: ValidationErrors) -> Self {
        Self::Validation(value)
    }
}

/// Project service facade.
pub struct ProjectService<R: ProjectRepository> {
    repo: R,
}

impl<R: ProjectRepository> ProjectService<R> {
    /// Creates service from repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Creates one project for the owner.
    pub fn create_project(
        &self,
        owner_id: &str,
        form: &ProjectForm,
    ) -> Result<Project, ProjectServiceError> {
        let owner_id = owner(owner_id)?;
        let draft = form.validate()?;
        let project = self.repo.create_project(owner_id, draft.name.as_str())?;
        info!(
            "event=project_create module=project_service status=ok project={}",
            project.uuid
        );
        Ok(project)
    }

    /// Lists the owner's projects in creation order.
    pub fn list_projects(&self, owner_id: &str) -> Result<Vec<Project>, ProjectServiceError> {
        let owner_id = owner(owner_id)?;
        self.repo.list_projects(owner_id).map_err(Into::into)
    }

    /// Loads one owned project.
    pub fn get_project(
        &self,
        owner_id: &str,
        project_uuid: ProjectId,
    ) -> Result<Project, ProjectServiceError> {
        let owner_id = owner(owner_id)?;
        match self.repo.get_project(owner_id, project_uuid)? {
            Some(project) => Ok(project),
            None => {
                warn!(
                    "event=project_lookup module=project_service status=not_found project={project_uuid}"
                );
                Err(ProjectServiceError::ProjectNotFound(project_uuid))
            }
        }
    }

    /// Renames one owned project and returns the updated record.
    pub fn rename_project(
        &self,
        owner_id: &str,
        project_uuid: ProjectId,
        form: &ProjectForm,
    ) -> Result<Project, ProjectServiceError> {
        let owner_id = owner(owner_id)?;
        let draft = form.validate()?;
        self.repo
            .rename_project(owner_id, project_uuid, draft.name.as_str())?;
        info!(
            "event=project_rename module=project_service status=ok project={project_uuid}"
        );
        self.get_project(owner_id, project_uuid)
    }

    /// Deletes one owned project with all its tasks.
    ///
    /// Returns the owner's remaining projects.
    pub fn delete_project(
        &self,
        owner_id: &str,
        project_uuid: ProjectId,
    ) -> Result<Vec<Project>, ProjectServiceError> {
        let owner_id = owner(owner_id)?;
        self.repo.delete_project(owner_id, project_uuid)?;
        info!(
            "event=project_delete module=project_service status=ok project={project_uuid}"
        );
        self.list_projects(owner_id)
    }
}

fn owner(owner_id: &str) -> Result<&str, ProjectServiceError> {
    normalize_owner(owner_id).ok_or(ProjectServiceError::InvalidOwner)
}
