//! Core error types for flower-core.
//!
//! Errors are grouped by concern and rolled up into [`CoreError`]. The
//! distinguished conditions callers are expected to match on -- a missing
//! row, a parent-chain cycle -- stay reachable through the umbrella enum.

use std::path::PathBuf;
use thiserror::Error;

use crate::session::MAX_TASK_LEN;

/// Core error type for flower-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Session state-machine violations
    #[error(transparent)]
    Session(#[from] SessionError),

    /// State-file errors
    #[error(transparent)]
    State(#[from] StateError),

    /// Task/session repository errors
    #[error(transparent)]
    Database(#[from] DatabaseError),

    /// Configuration errors
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Validation and precondition violations of the flow state machine.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum SessionError {
    #[error("task description cannot be empty")]
    EmptyTask,

    #[error("task description cannot exceed {} characters", MAX_TASK_LEN)]
    TaskTooLong,

    #[error("session already running: {task}")]
    AlreadyRunning { task: String },

    #[error("no active work session")]
    NoActiveSession,

    #[error("already on break")]
    AlreadyOnBreak,

    #[error("cannot resume; already working")]
    AlreadyWorking,

    #[error("no active break to resume")]
    NothingToResume,
}

/// State-file errors, with the offending path attached.
#[derive(Error, Debug)]
pub enum StateError {
    #[error("reading state file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parsing state file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("serializing state: {0}")]
    Serialize(#[source] serde_json::Error),

    #[error("writing temp state file {path}: {source}")]
    WriteTemp {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("replacing state file {path}: {source}")]
    Replace {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Task/session repository errors.
///
/// `NotFound` is the distinguished condition for operating on an absent row;
/// everything else passes through from rusqlite unwrapped.
#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("not found")]
    NotFound,

    #[error("cycle detected in task hierarchy at task {id}")]
    Cycle { id: i64 },

    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),
}

/// Configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("could not determine a data directory")]
    NoDataDir,

    #[error("failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    #[error("failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
