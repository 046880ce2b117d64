//! Flow commands over the JSON state file: load, apply one transition,
//! save, print.

use chrono::{Local, Utc};
use flower_core::format::{format_duration, format_duration_short, format_human_datetime};
use flower_core::paginate::reverse_paginate;
use flower_core::session::{Resumed, Status};

use super::{load_config, open_state_store, CliResult};

pub fn start(task: &str) -> CliResult {
    let store = open_state_store()?;
    let mut state = store.load()?;
    let now = Utc::now();
    state.start(task, now)?;
    store.save(&mut state)?;

    println!(
        "Started: {} at {}",
        task.trim(),
        now.with_timezone(&Local).format("%H:%M")
    );
    Ok(())
}

pub fn take_break() -> CliResult {
    let store = open_state_store()?;
    let mut state = store.load()?;
    let started = state.take_break(Utc::now())?;
    store.save(&mut state)?;

    println!(
        "Flow ran {}. Starting a {} break.",
        format_duration_short(started.flow),
        format_duration_short(started.suggested)
    );
    Ok(())
}

pub fn resume() -> CliResult {
    let store = open_state_store()?;
    let mut state = store.load()?;
    let resumed = state.resume(Utc::now())?;
    store.save(&mut state)?;

    let which = match resumed {
        Resumed::Current => "Current",
        Resumed::Previous => "Previous",
    };
    println!("Break ended. {which} session resumed.");
    Ok(())
}

pub fn stop() -> CliResult {
    let store = open_state_store()?;
    let mut state = store.load()?;
    let done = state.stop(Utc::now())?;
    store.save(&mut state)?;

    println!(
        "Session ended: {} (flow {}).",
        done.task,
        format_duration_short(done.flow_duration)
    );
    Ok(())
}

pub fn status() -> CliResult {
    let store = open_state_store()?;
    let state = store.load()?;

    match state.status(Utc::now()) {
        Status::Idle => println!("No active session"),
        Status::Working { task, elapsed } => {
            println!("Working on '{task}' for {}", format_duration(elapsed));
        }
        Status::BreakRemaining { remaining } => {
            println!("Break: {} remaining", format_duration(remaining));
        }
        Status::BreakOvertime { overtime } => {
            println!("Break: {} overtime", format_duration(overtime));
        }
    }
    Ok(())
}

pub fn log(page: usize, count: Option<usize>) -> CliResult {
    let count = match count {
        Some(count) => count,
        None => load_config()?.log_page_size,
    };
    if count == 0 {
        return Err("count must be greater than zero".into());
    }
    if page == 0 {
        return Err("page must be greater than zero".into());
    }

    let store = open_state_store()?;
    let state = store.load()?;
    if state.completed_sessions.is_empty() {
        println!("No completed sessions");
        return Ok(());
    }

    let now = Local::now();
    println!("Recent sessions:");
    for session in reverse_paginate(&state.completed_sessions, page, count) {
        let break_info = match session.break_duration {
            Some(d) => format!("break {}", format_duration_short(d)),
            None => "no break".to_string(),
        };
        println!(
            "  {} - {} (flow {}, {})",
            format_human_datetime(session.completed_at.with_timezone(&Local), now),
            session.task,
            format_duration_short(session.flow_duration),
            break_info
        );
    }
    Ok(())
}

pub fn locate() -> CliResult {
    let store = open_state_store()?;
    println!("{}", store.path().display());
    Ok(())
}
