//! Session tracking commands over the SQLite repository.

use chrono::Utc;
use clap::Subcommand;
use flower_core::format::format_duration_short;
use flower_core::storage::SessionFilter;
use flower_core::DatabaseError;

use super::{open_database, CliResult};

#[derive(Subcommand)]
pub enum SessionAction {
    /// Start a session for a task
    Start {
        /// Task ID to associate with this session
        task_id: i64,
    },
    /// Stop a session by ID
    Stop {
        /// Session ID
        id: i64,
    },
    /// List sessions ordered by start time
    List {
        /// Show only open sessions
        #[arg(long, conflicts_with = "closed")]
        open: bool,
        /// Show only closed sessions
        #[arg(long)]
        closed: bool,
        /// Display as JSON
        #[arg(long)]
        json: bool,
    },
}

pub fn run(action: SessionAction) -> CliResult {
    let db = open_database()?;

    match action {
        SessionAction::Start { task_id } => match db.start_session(task_id, Utc::now()) {
            Ok(session) => println!("Session started for task \"{}\".", session.task.name),
            Err(DatabaseError::NotFound) => println!("Task with ID {task_id} not found."),
            Err(e) => return Err(e.into()),
        },
        SessionAction::Stop { id } => match db.stop_session(id, Utc::now()) {
            Ok(session) => {
                let end = session.ended_at.unwrap_or(session.started_at);
                let duration = (end - session.started_at).to_std().unwrap_or_default();
                println!("Session stopped after {}.", format_duration_short(duration));
            }
            Err(DatabaseError::NotFound) => println!("Session with ID {id} not found."),
            Err(e) => return Err(e.into()),
        },
        SessionAction::List { open, closed, json } => {
            let filter = if open {
                SessionFilter::Open
            } else if closed {
                SessionFilter::Closed
            } else {
                SessionFilter::All
            };
            let sessions = db.list_sessions(filter)?;

            if json {
                println!("{}", serde_json::to_string_pretty(&sessions)?);
                return Ok(());
            }
            if sessions.is_empty() {
                println!("No sessions found.");
                return Ok(());
            }
            match sessions.len() {
                1 => println!("1 session found:"),
                n => println!("{n} sessions found:"),
            }

            let now = Utc::now();
            for session in &sessions {
                let (state, end) = match session.ended_at {
                    Some(end) => ("Closed", end),
                    None => ("Open", now),
                };
                let duration = (end - session.started_at).to_std().unwrap_or_default();
                println!(
                    "  - Task: \"{}\", Duration: {}, State: {}",
                    session.task.name,
                    format_duration_short(duration),
                    state
                );
            }
        }
    }
    Ok(())
}
