use clap::Subcommand;
use focusweek_core::planner::{day_name, parse_day, DAYS};
use focusweek_core::{Command, Config, Session, Task, TaskStatus, MAX_TASKS_PER_DAY};
use serde::Serialize;

use super::{open_session, print_json, CliResult};

#[derive(Subcommand)]
pub enum TaskAction {
    /// Add a task to a day (0-6, "monday", "tue", ...)
    Add {
        day: String,
        /// Task text; may be left empty and filled in later
        content: Vec<String>,
    },
    /// List tasks grouped by day
    List {
        /// Only show this day
        #[arg(long)]
        day: Option<String>,
    },
    /// Replace a task's text
    Edit {
        id: String,
        content: Vec<String>,
    },
    /// Set a task's status (todo, wip, done)
    Status {
        id: String,
        status: String,
    },
    /// Toggle a task between done and todo
    Done {
        id: String,
    },
    /// Move a task to another day or position
    Move {
        id: String,
        day: String,
        /// Slot within the target day, starting at 0
        #[arg(long)]
        position: Option<usize>,
    },
    /// Delete a task
    Delete {
        id: String,
    },
    /// Focus on a task: link it to the timer and start a focus session
    Focus {
        id: String,
    },
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DaySummary<'a> {
    pub day: &'static str,
    pub index: u8,
    pub count: usize,
    pub full: bool,
    pub tasks: Vec<&'a Task>,
}

pub fn day_summary(session: &Session, day: u8) -> DaySummary<'_> {
    let tasks = session.tasks().for_day(day);
    DaySummary {
        day: day_name(day),
        index: day,
        count: tasks.len(),
        full: tasks.len() >= MAX_TASKS_PER_DAY,
        tasks,
    }
}

pub fn week_summary(session: &Session) -> Vec<DaySummary<'_>> {
    (0..DAYS.len() as u8)
        .map(|day| day_summary(session, day))
        .collect()
}

fn task_json(session: &Session, id: &str) -> CliResult {
    match session.tasks().get(id) {
        Some(task) => print_json(task),
        None => print_json(&serde_json::json!({ "deleted": id })),
    }
}

pub fn run(action: TaskAction, config: &Config) -> CliResult {
    let mut session = open_session(config)?;
    match action {
        TaskAction::Add { day, content } => {
            let task = session.add_task(parse_day(&day)?, &content.join(" "))?;
            eprintln!("Task added to {}: {}", day_name(task.day_index), task.id);
            print_json(&task)?;
        }
        TaskAction::List { day } => match day {
            Some(day) => print_json(&day_summary(&session, parse_day(&day)?))?,
            None => print_json(&week_summary(&session))?,
        },
        TaskAction::Edit { id, content } => {
            session.set_task_content(&id, &content.join(" "))?;
            task_json(&session, &id)?;
        }
        TaskAction::Status { id, status } => {
            session.set_task_status(&id, status.parse::<TaskStatus>()?)?;
            task_json(&session, &id)?;
        }
        TaskAction::Done { id } => {
            let status = session.toggle_task_done(&id)?;
            eprintln!("Task {id} is now {status}");
            task_json(&session, &id)?;
        }
        TaskAction::Move { id, day, position } => {
            session.move_task(&id, parse_day(&day)?, position)?;
            task_json(&session, &id)?;
        }
        TaskAction::Delete { id } => {
            let task = session.delete_task(&id)?;
            eprintln!("Task deleted: {}", task.id);
            print_json(&task)?;
        }
        TaskAction::Focus { id } => {
            let events = session.dispatch(Command::AttachTask(id))?;
            print_json(&serde_json::json!({
                "events": events,
                "status": session.view(),
            }))?;
        }
    }
    session.save()?;
    Ok(())
}
