use rusqlite::Connection;
use taskboard_core::db::open_db_in_memory;
use taskboard_core::{
    parse_deadline, Project, ProjectForm, ProjectService, SqliteProjectRepository,
    SqliteTaskRepository, TaskForm, TaskService, TaskServiceError,
};
use uuid::Uuid;

type Service<'conn> = TaskService<SqliteProjectRepository<'conn>, SqliteTaskRepository<'conn>>;

fn setup() -> Connection {
    open_db_in_memory().unwrap()
}

fn task_service(conn: &Connection) -> Service<'_> {
    TaskService::new(
        SqliteProjectRepository::try_new(conn).unwrap(),
        SqliteTaskRepository::try_new(conn).unwrap(),
    )
}

fn create_project(conn: &Connection, owner: &str, name: &str) -> Project {
    ProjectService::new(SqliteProjectRepository::try_new(conn).unwrap())
        .create_project(owner, &ProjectForm::new(name))
        .unwrap()
}

#[test]
fn create_task_defaults_to_incomplete_with_parsed_deadline() {
    let conn = setup();
    let project = create_project(&conn, "alice", "Test Project");
    let service = task_service(&conn);

    let task = service
        .create_task(
            "alice",
            project.uuid,
            &TaskForm::new("Test Task", "2024-05-01T12:00:00Z"),
        )
        .unwrap();

    assert_eq!(task.name, "Test Task");
    assert_eq!(task.project_uuid, project.uuid);
    assert_eq!(task.priority, 1);
    assert!(!task.is_done);
    assert_eq!(Some(task.deadline), parse_deadline("2024-05-01T12:00:00Z"));
    assert_eq!(task.to_string(), "Task: Test Task");
}

#[test]
fn create_task_with_invalid_form_persists_nothing() {
    let conn = setup();
    let project = create_project(&conn, "alice", "Test Project");
    let service = task_service(&conn);

    let err = service
        .create_task("alice", project.uuid, &TaskForm::new("", "not a date"))
        .unwrap_err();
    match err {
        TaskServiceError::Validation(errors) => {
            assert!(errors.contains("name"));
            assert!(errors.contains("deadline"));
        }
        other => panic!("unexpected error: {other}"),
    }

    assert!(service
        .list_tasks("alice", project.uuid)
        .unwrap()
        .tasks
        .is_empty());
}

#[test]
fn task_operations_require_project_ownership() {
    let conn = setup();
    let project = create_project(&conn, "alice", "Private");
    let service = task_service(&conn);
    let task = service
        .create_task("alice", project.uuid, &TaskForm::new("Secret", "2024-01-01"))
        .unwrap();

    let err = service.list_tasks("mallory", project.uuid).unwrap_err();
    assert!(matches!(err, TaskServiceError::ProjectNotFound(id) if id == project.uuid));

    let err = service
        .create_task("mallory", project.uuid, &TaskForm::new("Spam", "2024-01-01"))
        .unwrap_err();
    assert!(matches!(err, TaskServiceError::ProjectNotFound(_)));

    let err = service
        .toggle_task_status("mallory", project.uuid, task.uuid)
        .unwrap_err();
    assert!(matches!(err, TaskServiceError::ProjectNotFound(_)));

    let err = service
        .delete_task("mallory", project.uuid, task.uuid)
        .unwrap_err();
    assert!(matches!(err, TaskServiceError::ProjectNotFound(_)));

    let err = service
        .move_task_down("mallory", project.uuid, task.uuid)
        .unwrap_err();
    assert!(matches!(err, TaskServiceError::ProjectNotFound(_)));

    assert!(!service.get_task("alice", project.uuid, task.uuid).unwrap().is_done);
}

#[test]
fn task_must_belong_to_the_addressed_project() {
    let conn = setup();
    let home = create_project(&conn, "alice", "Home");
    let work = create_project(&conn, "alice", "Work");
    let service = task_service(&conn);

    let task = service
        .create_task("alice", home.uuid, &TaskForm::new("Dishes", "2024-01-01"))
        .unwrap();

    let err = service
        .update_task(
            "alice",
            work.uuid,
            task.uuid,
            &TaskForm::new("Renamed", "2024-01-02"),
        )
        .unwrap_err();
    assert!(matches!(err, TaskServiceError::TaskNotFound(id) if id == task.uuid));

    let err = service.delete_task("alice", work.uuid, task.uuid).unwrap_err();
    assert!(matches!(err, TaskServiceError::TaskNotFound(_)));

    let err = service.move_task_up("alice", work.uuid, task.uuid).unwrap_err();
    assert!(matches!(err, TaskServiceError::TaskNotFound(_)));

    assert_eq!(
        service.get_task("alice", home.uuid, task.uuid).unwrap().name,
        "Dishes"
    );
}

#[test]
fn update_task_replaces_name_and_deadline_only() {
    let conn = setup();
    let project = create_project(&conn, "alice", "Test Project");
    let service = task_service(&conn);

    service
        .create_task("alice", project.uuid, &TaskForm::new("First", "2024-01-01"))
        .unwrap();
    let task = service
        .create_task("alice", project.uuid, &TaskForm::new("Second", "2024-01-01"))
        .unwrap();
    service
        .toggle_task_status("alice", project.uuid, task.uuid)
        .unwrap();

    let updated = service
        .update_task(
            "alice",
            project.uuid,
            task.uuid,
            &TaskForm::new("Updated Task", "2024-02-02 08:00"),
        )
        .unwrap();

    assert_eq!(updated.name, "Updated Task");
    assert_eq!(Some(updated.deadline), parse_deadline("2024-02-02T08:00:00Z"));
    assert_eq!(updated.priority, 2);
    assert!(updated.is_done);
}

#[test]
fn update_task_rejects_invalid_form() {
    let conn = setup();
    let project = create_project(&conn, "alice", "Test Project");
    let service = task_service(&conn);
    let task = service
        .create_task("alice", project.uuid, &TaskForm::new("Keep", "2024-01-01"))
        .unwrap();

    let err = service
        .update_task("alice", project.uuid, task.uuid, &TaskForm::new("  ", "2024-01-01"))
        .unwrap_err();
    assert!(matches!(err, TaskServiceError::Validation(_)));
    assert_eq!(
        service.get_task("alice", project.uuid, task.uuid).unwrap().name,
        "Keep"
    );
}

#[test]
fn toggle_twice_restores_original_status() {
    let conn = setup();
    let project = create_project(&conn, "alice", "Test Project");
    let service = task_service(&conn);
    let task = service
        .create_task("alice", project.uuid, &TaskForm::new("Flip", "2024-01-01"))
        .unwrap();

    let once = service
        .toggle_task_status("alice", project.uuid, task.uuid)
        .unwrap();
    assert!(once.is_done);
    assert_eq!(once.priority, task.priority);

    let twice = service
        .toggle_task_status("alice", project.uuid, task.uuid)
        .unwrap();
    assert_eq!(twice.is_done, task.is_done);
}

#[test]
fn delete_task_removes_row_and_returns_remaining_list() {
    let conn = setup();
    let project = create_project(&conn, "alice", "Test Project");
    let service = task_service(&conn);
    let task = service
        .create_task("alice", project.uuid, &TaskForm::new("Gone", "2024-01-01"))
        .unwrap();

    let board = service.delete_task("alice", project.uuid, task.uuid).unwrap();
    assert_eq!(board.project.uuid, project.uuid);
    assert!(board.tasks.is_empty());

    let err = service
        .delete_task("alice", project.uuid, task.uuid)
        .unwrap_err();
    assert!(matches!(err, TaskServiceError::TaskNotFound(_)));
}

#[test]
fn unknown_task_is_not_found() {
    let conn = setup();
    let project = create_project(&conn, "alice", "Test Project");
    let service = task_service(&conn);
    let missing = Uuid::new_v4();

    let err = service.get_task("alice", project.uuid, missing).unwrap_err();
    assert!(matches!(err, TaskServiceError::TaskNotFound(id) if id == missing));

    let err = service
        .toggle_task_status("alice", project.uuid, missing)
        .unwrap_err();
    assert!(matches!(err, TaskServiceError::TaskNotFound(_)));
}
