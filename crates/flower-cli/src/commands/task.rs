//! Task management commands over the SQLite repository.

use clap::Subcommand;
use flower_core::storage::NewTask;
use flower_core::{DatabaseError, Task};

use super::{open_database, CliResult};

#[derive(Subcommand)]
pub enum TaskAction {
    /// Create a new task
    Add {
        /// Task name
        name: String,
        /// Task description
        #[arg(long, alias = "desc")]
        description: Option<String>,
        /// ID of the parent task
        #[arg(long)]
        parent_id: Option<i64>,
    },
    /// Show a single task
    Get {
        /// Task ID
        id: i64,
        /// Display as JSON
        #[arg(long)]
        json: bool,
    },
    /// List all tasks
    List {
        /// Display as JSON
        #[arg(long)]
        json: bool,
    },
    /// Remove a task by ID
    #[command(alias = "rm")]
    Remove {
        /// Task ID
        id: i64,
    },
    /// Remove all tasks
    Clear,
}

fn stringify_task(task: &Task) -> String {
    let mut out = format!("[{}] {}", task.id, task.name);
    if !task.description.is_empty() {
        out.push_str(&format!(" - {}", task.description));
    }
    if let Some(parent) = &task.parent {
        out.push_str(&format!(" (parent: [{}] {})", parent.id, parent.name));
    }
    out
}

pub fn run(action: TaskAction) -> CliResult {
    let db = open_database()?;

    match action {
        TaskAction::Add {
            name,
            description,
            parent_id,
        } => {
            let new = NewTask {
                name,
                description: description.unwrap_or_default(),
                parent_id,
            };
            match db.create_task(&new) {
                Ok(task) => println!("New task added with ID {}.", task.id),
                Err(DatabaseError::NotFound) => {
                    let id = parent_id.unwrap_or_default();
                    println!("Parent task with ID {id} not found.");
                }
                Err(e) => return Err(e.into()),
            }
        }
        TaskAction::Get { id, json } => match db.get_task(id) {
            Ok(task) => {
                if json {
                    println!("{}", serde_json::to_string_pretty(&task)?);
                } else {
                    println!("{}", stringify_task(&task));
                }
            }
            Err(DatabaseError::NotFound) => println!("Task with ID {id} not found."),
            Err(e) => return Err(e.into()),
        },
        TaskAction::List { json } => {
            let tasks = db.list_tasks()?;
            if json {
                println!("{}", serde_json::to_string_pretty(&tasks)?);
                return Ok(());
            }
            if tasks.is_empty() {
                println!("No tasks found.");
                return Ok(());
            }
            for task in &tasks {
                println!("{}", stringify_task(task));
            }
        }
        TaskAction::Remove { id } => match db.delete_task(id) {
            Ok(()) => println!("Task removed."),
            Err(DatabaseError::NotFound) => println!("Task with ID {id} not found."),
            Err(e) => return Err(e.into()),
        },
        TaskAction::Clear => {
            let removed = db.delete_all_tasks()?;
            println!("{removed} tasks removed.");
        }
    }
    Ok(())
}
