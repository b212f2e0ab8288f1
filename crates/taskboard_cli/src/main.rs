//! Command-line front end for the taskboard core.
//!
//! # Responsibility
//! - Stand in for the request-handling layer: resolve config, open the
//!   database, take the owner identity, and dispatch one operation.
//! - Map core outcomes onto exit codes: `2` for validation failures, `3` for
//!   not-found, `1` for everything else.

mod render;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use log::{error, info};
use std::path::PathBuf;
use std::process::ExitCode;
use taskboard_core::db::open_db;
use taskboard_core::{
    core_version, init_logging, ProjectForm, ProjectId, ProjectService, ProjectServiceError,
    SqliteProjectRepository, SqliteTaskRepository, TaskForm, TaskId, TaskService,
    TaskServiceError, TrackerConfig, ValidationErrors,
};

const EXIT_FAILURE: u8 = 1;
const EXIT_VALIDATION: u8 = 2;
const EXIT_NOT_FOUND: u8 = 3;

/// Personal project and task tracker.
#[derive(Parser, Debug)]
#[command(name = "taskboard", version = core_version(), about, long_about = None)]
struct Cli {
    /// TOML config file
    #[arg(long, global = true, env = "TASKBOARD_CONFIG")]
    config: Option<PathBuf>,

    /// SQLite database file, overriding the config value
    #[arg(long, global = true, env = "TASKBOARD_DB")]
    db: Option<PathBuf>,

    /// Authenticated owner identity
    #[arg(long, env = "TASKBOARD_OWNER")]
    owner: String,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Manage projects
    #[command(subcommand)]
    Project(ProjectCommand),
    /// Manage tasks inside a project
    #[command(subcommand)]
    Task(TaskCommand),
}

#[derive(Subcommand, Debug)]
enum ProjectCommand {
    /// List your projects
    List,
    /// Create a project
    Add { name: String },
    /// Rename a project
    Rename { project: ProjectId, name: String },
    /// Delete a project and all its tasks
    Delete { project: ProjectId },
}

#[derive(Subcommand, Debug)]
enum TaskCommand {
    /// List tasks by priority
    List { project: ProjectId },
    /// Append a task to a project
    Add {
        project: ProjectId,
        #[command(flatten)]
        input: TaskInput,
    },
    /// Replace a task's name and deadline
    Edit {
        project: ProjectId,
        task: TaskId,
        #[command(flatten)]
        input: TaskInput,
    },
    /// Delete a task
    Delete { project: ProjectId, task: TaskId },
    /// Move a task one step earlier
    Up { project: ProjectId, task: TaskId },
    /// Move a task one step later
    Down { project: ProjectId, task: TaskId },
    /// Flip a task between done and not done
    Toggle { project: ProjectId, task: TaskId },
}

#[derive(Args, Debug)]
struct TaskInput {
    name: String,
    /// Due time, e.g. `2024-05-01 17:00` or RFC 3339
    #[arg(long)]
    deadline: String,
}

impl TaskInput {
    fn form(&self) -> TaskForm {
        TaskForm::new(self.name.as_str(), self.deadline.as_str())
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => report(&err),
    }
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let mut config = TrackerConfig::load(cli.config.as_deref())?;
    if let Some(db) = &cli.db {
        config.database_path = db.clone();
    }
    if let Some(log_dir) = &config.log_dir {
        init_logging(&config.log_level, log_dir)?;
    }

    let conn = open_db(&config.database_path).with_context(|| {
        format!(
            "failed to open database `{}`",
            config.database_path.display()
        )
    })?;
    let owner = cli.owner.as_str();
    let projects = ProjectService::new(SqliteProjectRepository::try_new(&conn)?);
    let tasks = TaskService::new(
        SqliteProjectRepository::try_new(&conn)?,
        SqliteTaskRepository::try_new(&conn)?,
    );

    match &cli.command {
        Command::Project(command) => match command {
            ProjectCommand::List => render::projects(cli.json, &projects.list_projects(owner)?),
            ProjectCommand::Add { name } => {
                projects.create_project(owner, &ProjectForm::new(name.as_str()))?;
                render::projects(cli.json, &projects.list_projects(owner)?)
            }
            ProjectCommand::Rename { project, name } => {
                let project =
                    projects.rename_project(owner, *project, &ProjectForm::new(name.as_str()))?;
                render::project(cli.json, &project)
            }
            ProjectCommand::Delete { project } => {
                render::projects(cli.json, &projects.delete_project(owner, *project)?)
            }
        },
        Command::Task(command) => match command {
            TaskCommand::List { project } => {
                render::board(cli.json, &tasks.list_tasks(owner, *project)?)
            }
            TaskCommand::Add { project, input } => {
                tasks.create_task(owner, *project, &input.form())?;
                render::board(cli.json, &tasks.list_tasks(owner, *project)?)
            }
            TaskCommand::Edit {
                project,
                task,
                input,
            } => {
                tasks.update_task(owner, *project, *task, &input.form())?;
                render::board(cli.json, &tasks.list_tasks(owner, *project)?)
            }
            TaskCommand::Delete { project, task } => {
                render::board(cli.json, &tasks.delete_task(owner, *project, *task)?)
            }
            TaskCommand::Up { project, task } => {
                render::board(cli.json, &tasks.move_task_up(owner, *project, *task)?)
            }
            TaskCommand::Down { project, task } => {
                render::board(cli.json, &tasks.move_task_down(owner, *project, *task)?)
            }
            TaskCommand::Toggle { project, task } => {
                tasks.toggle_task_status(owner, *project, *task)?;
                render::board(cli.json, &tasks.list_tasks(owner, *project)?)
            }
        },
    }
}

fn report(err: &anyhow::Error) -> ExitCode {
    if let Some(errors) = validation_errors(err) {
        info!("event=cli_request module=cli status=invalid fields={}", errors.iter().count());
        render::validation_errors(errors);
        return ExitCode::from(EXIT_VALIDATION);
    }

    eprintln!("error: {err}");
    if is_not_found(err) {
        return ExitCode::from(EXIT_NOT_FOUND);
    }
    error!("event=cli_request module=cli status=error error={err}");
    ExitCode::from(EXIT_FAILURE)
}

fn validation_errors(err: &anyhow::Error) -> Option<&ValidationErrors> {
    match err.downcast_ref::<ProjectServiceError>() {
        Some(ProjectServiceError::Validation(errors)) => return Some(errors),
        Some(_) => return None,
        None => {}
    }
    match err.downcast_ref::<TaskServiceError>() {
        Some(TaskServiceError::Validation(errors)) => Some(errors),
        _ => None,
    }
}

fn is_not_found(err: &anyhow::Error) -> bool {
    matches!(
        err.downcast_ref::<ProjectServiceError>(),
        Some(ProjectServiceError::ProjectNotFound(_))
    ) || matches!(
        err.downcast_ref::<TaskServiceError>(),
        Some(TaskServiceError::ProjectNotFound(_) | TaskServiceError::TaskNotFound(_))
    )
}
