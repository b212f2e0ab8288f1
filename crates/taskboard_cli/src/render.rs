//! Plain-text and JSON rendering of core results.

use serde::Serialize;
use taskboard_core::{Project, ProjectTasks, Task, ValidationErrors};

pub fn projects(json: bool, projects: &[Project]) -> anyhow::Result<()> {
    if json {
        return emit_json(&projects);
    }
    if projects.is_empty() {
        println!("No projects yet.");
    }
    for project in projects {
        println!("{}  {}", project.uuid, project.name);
    }
    Ok(())
}

pub fn project(json: bool, project: &Project) -> anyhow::Result<()> {
    if json {
        return emit_json(project);
    }
    println!("{}  {}", project.uuid, project.name);
    Ok(())
}

pub fn board(json: bool, board: &ProjectTasks) -> anyhow::Result<()> {
    if json {
        return emit_json(board);
    }
    println!("{}", board.project);
    if board.tasks.is_empty() {
        println!("  (no tasks)");
    }
    for task in &board.tasks {
        println!("{}", task_line(task));
    }
    Ok(())
}

/// Writes `{"errors": {field: [messages]}}` to stderr.
pub fn validation_errors(errors: &ValidationErrors) {
    let payload = serde_json::json!({ "errors": errors });
    eprintln!("{payload}");
}

fn task_line(task: &Task) -> String {
    let mark = if task.is_done { 'x' } else { ' ' };
    let due = task
        .deadline_utc()
        .map(|deadline| deadline.format("%Y-%m-%d %H:%M UTC").to_string())
        .unwrap_or_else(|| task.deadline.to_string());
    format!(
        "{:>4}. [{mark}] {}  due {due}  ({})",
        task.priority, task.name, task.uuid
    )
}

fn emit_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::task_line;
    use taskboard_core::Task;
    use uuid::Uuid;

    #[test]
    fn task_line_shows_rank_status_and_deadline() {
        let task = Task {
            uuid: Uuid::nil(),
            project_uuid: Uuid::nil(),
            name: "Ship it".to_string(),
            priority: 3,
            is_done: true,
            deadline: 1_709_285_400_000,
            created_at: 0,
            updated_at: 0,
        };
        assert_eq!(
            task_line(&task),
            "   3. [x] Ship it  due 2024-03-01 09:30 UTC  (00000000-0000-0000-0000-000000000000)"
        );
    }
}
