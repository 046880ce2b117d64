//! # Flower Core Library
//!
//! Core logic for Flower, a flowtime-technique focus timer: work until the
//! flow runs out, take a break sized by how long you worked, resume.
//!
//! ## Key Components
//!
//! - [`AppState`]: the flow session state machine (Idle -> Working ->
//!   Breaking), driven with explicit timestamps
//! - [`heuristic::suggested_break`]: the work-to-break mapping
//! - [`StateStore`]: atomic JSON persistence of the state document
//! - [`Database`]: SQLite repository for hierarchical tasks and the work
//!   sessions tracked against them
//!
//! The CLI binary is a thin layer over this crate: it loads state, applies
//! one transition or repository call, persists, and prints.

pub mod error;
pub mod format;
pub mod heuristic;
pub mod paginate;
pub mod session;
pub mod storage;

pub use error::{ConfigError, CoreError, DatabaseError, Result, SessionError, StateError};
pub use session::{
    AppState, BreakStarted, CompletedSession, CurrentBreak, CurrentSession, Phase, Resumed,
    Status,
};
pub use storage::{Config, Database, NewTask, Session, SessionFilter, StateStore, Task};
