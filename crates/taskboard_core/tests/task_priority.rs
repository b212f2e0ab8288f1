use proptest::prelude::*;
use rusqlite::Connection;
use std::collections::HashMap;
use taskboard_core::db::open_db_in_memory;
use taskboard_core::{
    Project, ProjectForm, ProjectService, ProjectTasks, SqliteProjectRepository,
    SqliteTaskRepository, Task, TaskForm, TaskId, TaskRepository, TaskService,
};

const OWNER: &str = "alice";

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

fn create_project(conn: &Connection, name: &str) -> Project {
    ProjectService::new(SqliteProjectRepository::try_new(conn).unwrap())
        .create_project(OWNER, &ProjectForm::new(name))
        .unwrap()
}

fn add(service: &Service<'_>, project: &Project, name: &str) -> Task {
    service
        .create_task(OWNER, project.uuid, &TaskForm::new(name, "2024-06-01 10:00"))
        .unwrap()
}

fn priority_by_id(board: &ProjectTasks) -> HashMap<TaskId, i64> {
    board
        .tasks
        .iter()
        .map(|task| (task.uuid, task.priority))
        .collect()
}

fn priority_of(board: &ProjectTasks, task: &Task) -> i64 {
    priority_by_id(board)[&task.uuid]
}

#[test]
fn creation_assigns_priorities_in_order() {
    let conn = setup();
    let project = create_project(&conn, "Test Project");
    let service = task_service(&conn);

    let created = (1..=5)
        .map(|index| add(&service, &project, &format!("Task {index}")))
        .collect::<Vec<_>>();
    assert_eq!(
        created.iter().map(|task| task.priority).collect::<Vec<_>>(),
        vec![1, 2, 3, 4, 5]
    );

    let board = service.list_tasks(OWNER, project.uuid).unwrap();
    assert_eq!(board.priorities(), vec![1, 2, 3, 4, 5]);
    assert_eq!(
        board.tasks.iter().map(|task| task.uuid).collect::<Vec<_>>(),
        created.iter().map(|task| task.uuid).collect::<Vec<_>>()
    );
}

#[test]
fn priorities_are_independent_per_project() {
    let conn = setup();
    let home = create_project(&conn, "Home");
    let work = create_project(&conn, "Work");
    let service = task_service(&conn);

    add(&service, &home, "Dishes");
    add(&service, &home, "Laundry");
    let first_work = add(&service, &work, "Email");
    assert_eq!(first_work.priority, 1);
}

#[test]
fn move_down_then_move_up_scenario() {
    let conn = setup();
    let project = create_project(&conn, "Test Project");
    let service = task_service(&conn);
    let a = add(&service, &project, "A");
    let b = add(&service, &project, "B");
    let c = add(&service, &project, "C");

    let board = service.move_task_down(OWNER, project.uuid, a.uuid).unwrap();
    assert_eq!(
        (
            priority_of(&board, &a),
            priority_of(&board, &b),
            priority_of(&board, &c)
        ),
        (2, 1, 3)
    );
    assert_eq!(
        board.tasks.iter().map(|t| t.name.as_str()).collect::<Vec<_>>(),
        vec!["B", "A", "C"]
    );

    let board = service.move_task_up(OWNER, project.uuid, c.uuid).unwrap();
    assert_eq!(
        (
            priority_of(&board, &a),
            priority_of(&board, &b),
            priority_of(&board, &c)
        ),
        (3, 1, 2)
    );
    assert_eq!(
        board.tasks.iter().map(|t| t.name.as_str()).collect::<Vec<_>>(),
        vec!["B", "C", "A"]
    );
}

#[test]
fn move_up_swaps_only_with_predecessor() {
    let conn = setup();
    let project = create_project(&conn, "Test Project");
    let service = task_service(&conn);
    let tasks = (1..=4)
        .map(|index| add(&service, &project, &format!("T{index}")))
        .collect::<Vec<_>>();

    let before = service.list_tasks(OWNER, project.uuid).unwrap();
    let after = service
        .move_task_up(OWNER, project.uuid, tasks[2].uuid)
        .unwrap();

    assert_eq!(priority_of(&after, &tasks[2]), priority_of(&before, &tasks[1]));
    assert_eq!(priority_of(&after, &tasks[1]), priority_of(&before, &tasks[2]));
    assert_eq!(priority_of(&after, &tasks[0]), priority_of(&before, &tasks[0]));
    assert_eq!(priority_of(&after, &tasks[3]), priority_of(&before, &tasks[3]));
}

#[test]
fn moves_at_the_boundaries_are_noops() {
    let conn = setup();
    let project = create_project(&conn, "Test Project");
    let service = task_service(&conn);
    let first = add(&service, &project, "First");
    add(&service, &project, "Middle");
    let last = add(&service, &project, "Last");

    let before = service.list_tasks(OWNER, project.uuid).unwrap();
    let after_up = service
        .move_task_up(OWNER, project.uuid, first.uuid)
        .unwrap();
    assert_eq!(priority_by_id(&after_up), priority_by_id(&before));

    let after_down = service
        .move_task_down(OWNER, project.uuid, last.uuid)
        .unwrap();
    assert_eq!(priority_by_id(&after_down), priority_by_id(&before));
}

#[test]
fn delete_leaves_gap_and_new_task_appends_after_max() {
    let conn = setup();
    let project = create_project(&conn, "Test Project");
    let service = task_service(&conn);

    let x = add(&service, &project, "X");
    let y = add(&service, &project, "Y");
    assert_eq!((x.priority, y.priority), (1, 2));

    let board = service.delete_task(OWNER, project.uuid, x.uuid).unwrap();
    assert_eq!(board.priorities(), vec![2]);

    let z = add(&service, &project, "Z");
    assert_eq!(z.priority, 3);
    assert_eq!(
        service.list_tasks(OWNER, project.uuid).unwrap().priorities(),
        vec![2, 3]
    );
}

#[test]
fn moves_step_over_gaps_left_by_delete() {
    let conn = setup();
    let project = create_project(&conn, "Test Project");
    let service = task_service(&conn);
    let a = add(&service, &project, "A");
    let b = add(&service, &project, "B");
    let c = add(&service, &project, "C");
    service.delete_task(OWNER, project.uuid, b.uuid).unwrap();

    let board = service.move_task_up(OWNER, project.uuid, c.uuid).unwrap();
    assert_eq!(priority_of(&board, &c), 1);
    assert_eq!(priority_of(&board, &a), 3);
}

#[test]
fn max_priority_tracks_highest_rank_not_count() {
    let conn = setup();
    let project = create_project(&conn, "Test Project");
    let service = task_service(&conn);
    let repo = SqliteTaskRepository::try_new(&conn).unwrap();

    assert_eq!(repo.max_priority(project.uuid).unwrap(), None);

    let first = add(&service, &project, "First");
    add(&service, &project, "Second");
    service.delete_task(OWNER, project.uuid, first.uuid).unwrap();

    assert_eq!(repo.max_priority(project.uuid).unwrap(), Some(2));
}

#[test]
fn toggling_status_does_not_change_rank() {
    let conn = setup();
    let project = create_project(&conn, "Test Project");
    let service = task_service(&conn);
    add(&service, &project, "A");
    let b = add(&service, &project, "B");

    service
        .toggle_task_status(OWNER, project.uuid, b.uuid)
        .unwrap();
    let board = service.list_tasks(OWNER, project.uuid).unwrap();
    assert_eq!(board.priorities(), vec![1, 2]);
    assert_eq!(board.tasks[1].uuid, b.uuid);
}

#[derive(Debug, Clone)]
enum Op {
    Create,
    Up(usize),
    Down(usize),
    Delete(usize),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => Just(Op::Create),
        2 => any::<usize>().prop_map(Op::Up),
        2 => any::<usize>().prop_map(Op::Down),
        1 => any::<usize>().prop_map(Op::Delete),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn priorities_stay_unique_and_dense_until_first_delete(
        ops in proptest::collection::vec(op_strategy(), 1..40)
    ) {
        let conn = setup();
        let project = create_project(&conn, "Property");
        let service = task_service(&conn);
        let mut deleted_any = false;

        for op in ops {
            let board = service.list_tasks(OWNER, project.uuid).unwrap();
            let pick = |index: usize| board.tasks[index % board.tasks.len()].uuid;
            match op {
                Op::Create => {
                    add(&service, &project, "generated");
                }
                Op::Up(index) if !board.tasks.is_empty() => {
                    service.move_task_up(OWNER, project.uuid, pick(index)).unwrap();
                }
                Op::Down(index) if !board.tasks.is_empty() => {
                    service.move_task_down(OWNER, project.uuid, pick(index)).unwrap();
                }
                Op::Delete(index) if !board.tasks.is_empty() => {
                    service.delete_task(OWNER, project.uuid, pick(index)).unwrap();
                    deleted_any = true;
                }
                _ => {}
            }

            let priorities = service.list_tasks(OWNER, project.uuid).unwrap().priorities();
            prop_assert!(priorities.windows(2).all(|pair| pair[0] < pair[1]));
            prop_assert!(priorities.iter().all(|priority| *priority >= 1));
            if !deleted_any {
                let expected = (1..=priorities.len() as i64).collect::<Vec<_>>();
                prop_assert_eq!(priorities, expected);
            }
        }
    }
}
