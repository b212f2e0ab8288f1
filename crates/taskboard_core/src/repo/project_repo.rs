//! Project repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide owner-scoped CRUD over the `projects` table.
//!
//! # Invariants
//! - Every read and write filters by `owner_id`; a project owned by someone
//!   else is indistinguishable from a missing one.
//! - Listing is deterministic: creation order, then insertion order.
//! - Deleting a project removes its tasks through `ON DELETE CASCADE`.

use super::{ensure_connection_ready, parse_uuid, RepoError, RepoResult};
use crate::model::project::{Project, ProjectId};
use rusqlite::{params, Connection, Row};
use uuid::Uuid;

const PROJECT_SELECT_SQL: &str = "SELECT
    project_uuid,
    owner_id,
    name,
    created_at,
    updated_at
FROM projects";

/// Repository interface for project operations.
pub trait ProjectRepository {
    /// Creates one project for `owner_id` with an already validated name.
    fn create_project(&self, owner_id: &str, name: &str) -> RepoResult<Project>;
    /// Loads one owned project.
    fn get_project(&self, owner_id: &str, project_uuid: ProjectId)
        -> RepoResult<Option<Project>>;
    /// Lists all projects of one owner.
    fn list_projects(&self, owner_id: &str) -> RepoResult<Vec<Project>>;
    /// Replaces the name of one owned project.
    fn rename_project(
        &self,
        owner_id: &str,
        project_uuid: ProjectId,
        name: &str,
    ) -> RepoResult<()>;
    /// Deletes one owned project and, by cascade, its tasks.
    fn delete_project(&self, owner_id: &str, project_uuid: ProjectId) -> RepoResult<()>;
}

/// SQLite-backed project repository.
pub struct SqliteProjectRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteProjectRepository<'conn> {
    /// Creates repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, "projects")?;
        Ok(Self { conn })
    }
}

impl ProjectRepository for SqliteProjectRepository<'_> {
    fn create_project(&self, owner_id: &str, name: &str) -> RepoResult<Project> {
        let project_uuid = Uuid::new_v4();
        self.conn.execute(
            "INSERT INTO projects (project_uuid, owner_id, name) VALUES (?1, ?2, ?3);",
            params![project_uuid.to_string(), owner_id, name],
        )?;

        self.get_project(owner_id, project_uuid)?
            .ok_or(RepoError::ProjectNotFound(project_uuid))
    }

    fn get_project(
        &self,
        owner_id: &str,
        project_uuid: ProjectId,
    ) -> RepoResult<Option<Project>> {
        let mut stmt = self.conn.prepare(&format!(
            "{PROJECT_SELECT_SQL}
             WHERE project_uuid = ?1
               AND owner_id = ?2;"
        ))?;

        let mut rows = stmt.query(params![project_uuid.to_string(), owner_id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_project_row(row)?));
        }

        Ok(None)
    }

    fn list_projects(&self, owner_id: &str) -> RepoResult<Vec<Project>> {
        let mut stmt = self.conn.prepare(&format!(
            "{PROJECT_SELECT_SQL}
             WHERE owner_id = ?1
             ORDER BY created_at ASC, rowid ASC;"
        ))?;

        let mut rows = stmt.query([owner_id])?;
        let mut projects = Vec::new();
        while let Some(row) = rows.next()? {
            projects.push(parse_project_row(row)?);
        }

        Ok(projects)
    }

    fn rename_project(
        &self,
        owner_id: &str,
        project_uuid: ProjectId,
        name: &str,
    ) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE projects
             SET name = ?3,
                 updated_at = (strftime('%s', 'now') * 1000)
             WHERE project_uuid = ?1
               AND owner_id = ?2;",
            params![project_uuid.to_string(), owner_id, name],
        )?;

        if changed == 0 {
            return Err(RepoError::ProjectNotFound(project_uuid));
        }

        Ok(())
    }

    fn delete_project(&self, owner_id: &str, project_uuid: ProjectId) -> RepoResult<()> {
        let changed = self.conn.execute(
            "DELETE FROM projects
             WHERE project_uuid = ?1
               AND owner_id = ?2;",
            params![project_uuid.to_string(), owner_id],
        )?;

        if changed == 0 {
            return Err(RepoError::ProjectNotFound(project_uuid));
        }

        Ok(())
    }
}

fn parse_project_row(row: &Row<'_>) -> RepoResult<Project> {
    let uuid_text: String = row.get("project_uuid")?;
    let name: String = row.get("name")?;
    if name.trim().is_empty() {
        return Err(RepoError::InvalidData(format!(
            "blank name for project `{uuid_text}` in projects.name"
        )));
    }

    Ok(Project {
        uuid: parse_uuid(&uuid_text, "projects.project_uuid")?,
        owner_id: row.get("owner_id")?,
        name,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}
