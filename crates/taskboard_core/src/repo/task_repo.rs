//! Task repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide project-scoped CRUD over the `tasks` table.
//! - Own the transactional parts of priority ranking: append on create and
//!   neighbour swap on reorder.
//!
//! # Invariants
//! - Listing is deterministic: `priority ASC`.
//! - Create and reorder run in `BEGIN IMMEDIATE` transactions, so the
//!   snapshot they rank against cannot go stale before their writes land.
//! - `(project_uuid, priority)` is unique at commit time; priority `0` is
//!   only visible inside an in-flight swap.
//! - Delete never renumbers the remaining tasks.

use super::{ensure_connection_ready, parse_uuid, RepoError, RepoResult};
use crate::model::form::TaskDraft;
use crate::model::project::ProjectId;
use crate::model::task::{Task, TaskId};
use crate::ranking::{
    next_priority, plan_swap, MoveDirection, Rank, SwapPlan, SWAP_PARKING_PRIORITY,
};
use rusqlite::{params, Connection, Row, Transaction, TransactionBehavior};
use uuid::Uuid;

const TASK_SELECT_SQL: &str = "SELECT
    task_uuid,
    project_uuid,
    name,
    priority,
    is_done,
    deadline,
    created_at,
    updated_at
FROM tasks";

/// Repository interface for task operations.
///
/// Callers are expected to have checked project ownership already; these
/// methods only scope by project.
pub trait TaskRepository {
    /// Appends one task to the end of the project ranking.
    fn create_task(&self, project_uuid: ProjectId, draft: &TaskDraft) -> RepoResult<Task>;
    /// Returns `MAX(priority)` for the project, `None` when it has no tasks.
    fn max_priority(&self, project_uuid: ProjectId) -> RepoResult<Option<i64>>;
    /// Loads one task of the project.
    fn get_task(&self, project_uuid: ProjectId, task_uuid: TaskId) -> RepoResult<Option<Task>>;
    /// Lists project tasks in execution order.
    fn list_tasks(&self, project_uuid: ProjectId) -> RepoResult<Vec<Task>>;
    /// Replaces name and deadline. Priority and status are untouched.
    fn update_task(
        &self,
        project_uuid: ProjectId,
        task_uuid: TaskId,
        draft: &TaskDraft,
    ) -> RepoResult<()>;
    /// Flips completion status and returns the new value.
    fn toggle_task_status(&self, project_uuid: ProjectId, task_uuid: TaskId) -> RepoResult<bool>;
    /// Deletes one task, leaving a gap in the ranking.
    fn delete_task(&self, project_uuid: ProjectId, task_uuid: TaskId) -> RepoResult<()>;
    /// Swaps priorities with the neighbour in `direction`.
    ///
    /// Returns the applied plan, or `None` when the task sits at the boundary.
    fn move_task(
        &self,
        project_uuid: ProjectId,
        task_uuid: TaskId,
        direction: MoveDirection,
    ) -> RepoResult<Option<SwapPlan>>;
}

/// SQLite-backed task repository.
pub struct SqliteTaskRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteTaskRepository<'conn> {
    /// Creates repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, "tasks")?;
        Ok(Self { conn })
    }
}

impl TaskRepository for SqliteTaskRepository<'_> {
    fn create_task(&self, project_uuid: ProjectId, draft: &TaskDraft) -> RepoResult<Task> {
        let task_uuid = Uuid::new_v4();

        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let priority = next_priority(query_max_priority(&tx, project_uuid)?);
        tx.execute(
            "INSERT INTO tasks (
                task_uuid,
                project_uuid,
                name,
                priority,
                is_done,
                deadline
            ) VALUES (?1, ?2, ?3, ?4, 0, ?5);",
            params![
                task_uuid.to_string(),
                project_uuid.to_string(),
                draft.name.as_str(),
                priority,
                draft.deadline,
            ],
        )?;
        let task = load_required_task(&tx, project_uuid, task_uuid)?;
        tx.commit()?;

        Ok(task)
    }

    fn max_priority(&self, project_uuid: ProjectId) -> RepoResult<Option<i64>> {
        query_max_priority(self.conn, project_uuid)
    }

    fn get_task(&self, project_uuid: ProjectId, task_uuid: TaskId) -> RepoResult<Option<Task>> {
        let mut stmt = self.conn.prepare(&format!(
            "{TASK_SELECT_SQL}
             WHERE task_uuid = ?1
               AND project_uuid = ?2;"
        ))?;

        let mut rows = stmt.query(params![task_uuid.to_string(), project_uuid.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_task_row(row)?));
        }

        Ok(None)
    }

    fn list_tasks(&self, project_uuid: ProjectId) -> RepoResult<Vec<Task>> {
        let mut stmt = self.conn.prepare(&format!(
            "{TASK_SELECT_SQL}
             WHERE project_uuid = ?1
             ORDER BY priority ASC;"
        ))?;

        let mut rows = stmt.query([project_uuid.to_string()])?;
        let mut tasks = Vec::new();
        while let Some(row) = rows.next()? {
            tasks.push(parse_task_row(row)?);
        }

        Ok(tasks)
    }

    fn update_task(
        &self,
        project_uuid: ProjectId,
        task_uuid: TaskId,
        draft: &TaskDraft,
    ) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE tasks
             SET name = ?3,
                 deadline = ?4,
                 updated_at = (strftime('%s', 'now') * 1000)
             WHERE task_uuid = ?1
               AND project_uuid = ?2;",
            params![
                task_uuid.to_string(),
                project_uuid.to_string(),
                draft.name.as_str(),
                draft.deadline,
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::TaskNotFound(task_uuid));
        }

        Ok(())
    }

    fn toggle_task_status(&self, project_uuid: ProjectId, task_uuid: TaskId) -> RepoResult<bool> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let changed = tx.execute(
            "UPDATE tasks
             SET is_done = 1 - is_done,
                 updated_at = (strftime('%s', 'now') * 1000)
             WHERE task_uuid = ?1
               AND project_uuid = ?2;",
            params![task_uuid.to_string(), project_uuid.to_string()],
        )?;
        if changed == 0 {
            return Err(RepoError::TaskNotFound(task_uuid));
        }

        let is_done = load_required_task(&tx, project_uuid, task_uuid)?.is_done;
        tx.commit()?;
        Ok(is_done)
    }

    fn delete_task(&self, project_uuid: ProjectId, task_uuid: TaskId) -> RepoResult<()> {
        let changed = self.conn.execute(
            "DELETE FROM tasks
             WHERE task_uuid = ?1
               AND project_uuid = ?2;",
            params![task_uuid.to_string(), project_uuid.to_string()],
        )?;

        if changed == 0 {
            return Err(RepoError::TaskNotFound(task_uuid));
        }

        Ok(())
    }

    fn move_task(
        &self,
        project_uuid: ProjectId,
        task_uuid: TaskId,
        direction: MoveDirection,
    ) -> RepoResult<Option<SwapPlan>> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let ranks = list_ranks(&tx, project_uuid)?;
        let Some(plan) = plan_swap(&ranks, task_uuid, direction)? else {
            return Ok(None);
        };

        let (moved, displaced) = plan.applied();
        set_priority(&tx, plan.target.task_uuid, SWAP_PARKING_PRIORITY)?;
        set_priority(&tx, displaced.task_uuid, displaced.priority)?;
        set_priority(&tx, moved.task_uuid, moved.priority)?;
        tx.commit()?;

        Ok(Some(plan))
    }
}

fn query_max_priority(conn: &Connection, project_uuid: ProjectId) -> RepoResult<Option<i64>> {
    let max = conn.query_row(
        "SELECT MAX(priority)
         FROM tasks
         WHERE project_uuid = ?1;",
        [project_uuid.to_string()],
        |row| row.get::<_, Option<i64>>(0),
    )?;
    Ok(max)
}

fn list_ranks(conn: &Connection, project_uuid: ProjectId) -> RepoResult<Vec<Rank>> {
    let mut stmt = conn.prepare(
        "SELECT task_uuid, priority
         FROM tasks
         WHERE project_uuid = ?1
         ORDER BY priority ASC;",
    )?;

    let mut rows = stmt.query([project_uuid.to_string()])?;
    let mut ranks = Vec::new();
    while let Some(row) = rows.next()? {
        let task_uuid_text: String = row.get(0)?;
        ranks.push(Rank {
            task_uuid: parse_uuid(&task_uuid_text, "tasks.task_uuid")?,
            priority: row.get(1)?,
        });
    }
    Ok(ranks)
}

fn set_priority(conn: &Connection, task_uuid: TaskId, priority: i64) -> RepoResult<()> {
    let changed = conn.execute(
        "UPDATE tasks
         SET priority = ?2,
             updated_at = (strftime('%s', 'now') * 1000)
         WHERE task_uuid = ?1;",
        params![task_uuid.to_string(), priority],
    )?;
    if changed == 0 {
        return Err(RepoError::TaskNotFound(task_uuid));
    }
    Ok(())
}

fn load_required_task(
    conn: &Connection,
    project_uuid: ProjectId,
    task_uuid: TaskId,
) -> RepoResult<Task> {
    let mut stmt = conn.prepare(&format!(
        "{TASK_SELECT_SQL}
         WHERE task_uuid = ?1
           AND project_uuid = ?2;"
    ))?;
    let mut rows = stmt.query(params![task_uuid.to_string(), project_uuid.to_string()])?;
    if let Some(row) = rows.next()? {
        return parse_task_row(row);
    }
    Err(RepoError::TaskNotFound(task_uuid))
}

fn parse_task_row(row: &Row<'_>) -> RepoResult<Task> {
    let task_uuid_text: String = row.get("task_uuid")?;
    let project_uuid_text: String = row.get("project_uuid")?;

    let priority: i64 = row.get("priority")?;
    if priority < 1 {
        return Err(RepoError::InvalidData(format!(
            "invalid priority `{priority}` for task `{task_uuid_text}` in tasks.priority"
        )));
    }

    let is_done = match row.get::<_, i64>("is_done")? {
        0 => false,
        1 => true,
        other => {
            return Err(RepoError::InvalidData(format!(
                "invalid is_done value `{other}` in tasks.is_done"
            )));
        }
    };

    Ok(Task {
        uuid: parse_uuid(&task_uuid_text, "tasks.task_uuid")?,
        project_uuid: parse_uuid(&project_uuid_text, "tasks.project_uuid")?,
        name: row.get("name")?,
        priority,
        is_done,
        deadline: row.get("deadline")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}
