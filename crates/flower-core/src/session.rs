//! Flow session state machine.
//!
//! The state machine is wall-clock based: every transition takes `now`
//! explicitly, so nothing here reads the system clock. The caller loads
//! [`AppState`], applies a transition, and persists the result.
//!
//! ## State Transitions
//!
//! ```text
//! Idle -> Working -> Breaking -> Working (resume, same task)
//!                 \          \-> Idle (stop)
//!                  \-> Idle (stop)
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::SessionError;
use crate::heuristic::suggested_break;

/// Current version of the persisted state document.
pub const STATE_VERSION: u32 = 1;

/// Maximum length of a task description, in characters.
pub const MAX_TASK_LEN: usize = 100;

/// The session being worked on right now.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentSession {
    pub task: String,
    pub start_time: DateTime<Utc>,
}

/// The break in progress. Only ever present alongside a current session,
/// except in legacy state files where the session was already folded away.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentBreak {
    pub start_time: DateTime<Utc>,
    /// Derived via the break heuristic, never user-set.
    pub suggested_duration: Duration,
}

/// One finished span of focused work, appended to history in order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletedSession {
    pub task: String,
    pub flow_duration: Duration,
    /// Absent when the session was stopped without ever taking a break.
    pub break_duration: Option<Duration>,
    pub completed_at: DateTime<Utc>,
}

/// The whole persisted application state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppState {
    #[serde(default)]
    pub version: u32,
    #[serde(default)]
    pub current_session: Option<CurrentSession>,
    #[serde(default)]
    pub current_break: Option<CurrentBreak>,
    #[serde(default)]
    pub completed_sessions: Vec<CompletedSession>,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

/// Derived phase of the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Working,
    Breaking,
}

/// Which session a successful [`AppState::resume`] re-opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resumed {
    /// The current session was folded into history and re-opened.
    Current,
    /// No current session existed; the most recently completed one was
    /// re-opened by name.
    Previous,
}

/// Outcome of [`AppState::take_break`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BreakStarted {
    /// How long the flow ran before the break.
    pub flow: Duration,
    pub suggested: Duration,
}

/// Snapshot answer for the status query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    Idle,
    Working { task: String, elapsed: Duration },
    BreakRemaining { remaining: Duration },
    BreakOvertime { overtime: Duration },
}

fn elapsed_between(from: DateTime<Utc>, to: DateTime<Utc>) -> Duration {
    (to - from).to_std().unwrap_or(Duration::ZERO)
}

impl AppState {
    /// Fresh state: current version, nothing active, empty history.
    pub fn new() -> Self {
        Self {
            version: STATE_VERSION,
            current_session: None,
            current_break: None,
            completed_sessions: Vec::new(),
        }
    }

    pub fn phase(&self) -> Phase {
        match (&self.current_session, &self.current_break) {
            (None, _) => Phase::Idle,
            (Some(_), None) => Phase::Working,
            (Some(_), Some(_)) => Phase::Breaking,
        }
    }

    /// Begin a flow session. Only legal from `Idle`.
    pub fn start(&mut self, task: &str, now: DateTime<Utc>) -> Result<(), SessionError> {
        let task = task.trim();
        if task.is_empty() {
            return Err(SessionError::EmptyTask);
        }
        if task.chars().count() > MAX_TASK_LEN {
            return Err(SessionError::TaskTooLong);
        }
        if let Some(current) = &self.current_session {
            return Err(SessionError::AlreadyRunning {
                task: current.task.clone(),
            });
        }

        self.current_session = Some(CurrentSession {
            task: task.to_string(),
            start_time: now,
        });
        Ok(())
    }

    /// End the flow and open a break sized by the heuristic. Only legal
    /// from `Working`.
    pub fn take_break(&mut self, now: DateTime<Utc>) -> Result<BreakStarted, SessionError> {
        let session = self
            .current_session
            .as_ref()
            .ok_or(SessionError::NoActiveSession)?;
        if self.current_break.is_some() {
            return Err(SessionError::AlreadyOnBreak);
        }

        let flow = elapsed_between(session.start_time, now);
        let suggested = suggested_break(flow);
        self.current_break = Some(CurrentBreak {
            start_time: now,
            suggested_duration: suggested,
        });
        Ok(BreakStarted { flow, suggested })
    }

    /// End the break: fold the current session into history and immediately
    /// re-open a session with the same task label.
    ///
    /// When no session exists but a break record survived, a session named
    /// after the most recently completed one is opened instead.
    pub fn resume(&mut self, now: DateTime<Utc>) -> Result<Resumed, SessionError> {
        match (self.current_session.take(), self.current_break.take()) {
            (Some(session), Some(brk)) => {
                let flow = elapsed_between(session.start_time, brk.start_time);
                let break_duration = elapsed_between(brk.start_time, now);
                self.completed_sessions.push(CompletedSession {
                    task: session.task.clone(),
                    flow_duration: flow,
                    break_duration: Some(break_duration),
                    completed_at: now,
                });
                self.current_session = Some(CurrentSession {
                    task: session.task,
                    start_time: now,
                });
                Ok(Resumed::Current)
            }
            (None, Some(brk)) => {
                let previous = match self.completed_sessions.last() {
                    Some(previous) => previous,
                    None => {
                        self.current_break = Some(brk);
                        return Err(SessionError::NothingToResume);
                    }
                };
                self.current_session = Some(CurrentSession {
                    task: previous.task.clone(),
                    start_time: now,
                });
                Ok(Resumed::Previous)
            }
            (Some(session), None) => {
                self.current_session = Some(session);
                Err(SessionError::AlreadyWorking)
            }
            (None, None) => Err(SessionError::NothingToResume),
        }
    }

    /// Finalize the current session into history and return to `Idle`.
    /// Legal from `Working` or `Breaking`.
    pub fn stop(&mut self, now: DateTime<Utc>) -> Result<CompletedSession, SessionError> {
        let session = self
            .current_session
            .take()
            .ok_or(SessionError::NoActiveSession)?;

        let completed = match self.current_break.take() {
            Some(brk) => CompletedSession {
                task: session.task,
                flow_duration: elapsed_between(session.start_time, brk.start_time),
                break_duration: Some(elapsed_between(brk.start_time, now)),
                completed_at: now,
            },
            None => CompletedSession {
                task: session.task,
                flow_duration: elapsed_between(session.start_time, now),
                break_duration: None,
                completed_at: now,
            },
        };
        self.completed_sessions.push(completed.clone());
        Ok(completed)
    }

    /// Report the current phase without transitioning.
    ///
    /// While breaking this reports time remaining until the suggested break
    /// expires, or how far past the suggestion the break has run.
    pub fn status(&self, now: DateTime<Utc>) -> Status {
        let Some(session) = &self.current_session else {
            return Status::Idle;
        };
        match &self.current_break {
            None => Status::Working {
                task: session.task.clone(),
                elapsed: elapsed_between(session.start_time, now),
            },
            Some(brk) => {
                let elapsed = (now - brk.start_time).num_seconds();
                let remaining = brk.suggested_duration.as_secs() as i64 - elapsed.max(0);
                if remaining > 0 {
                    Status::BreakRemaining {
                        remaining: Duration::from_secs(remaining as u64),
                    }
                } else {
                    Status::BreakOvertime {
                        overtime: Duration::from_secs(remaining.unsigned_abs()),
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 10, 9, minute, 0).unwrap()
    }

    #[test]
    fn start_from_idle_enters_working() {
        let mut state = AppState::new();
        state.start("write report", at(0)).unwrap();
        assert_eq!(state.phase(), Phase::Working);
        assert_eq!(state.current_session.as_ref().unwrap().task, "write report");
    }

    #[test]
    fn start_trims_whitespace() {
        let mut state = AppState::new();
        state.start("  write report  ", at(0)).unwrap();
        assert_eq!(state.current_session.as_ref().unwrap().task, "write report");
    }

    #[test]
    fn start_rejects_empty_and_oversized_tasks() {
        let mut state = AppState::new();
        assert_eq!(state.start("", at(0)), Err(SessionError::EmptyTask));
        assert_eq!(state.start("   ", at(0)), Err(SessionError::EmptyTask));
        let long = "x".repeat(MAX_TASK_LEN + 1);
        assert_eq!(state.start(&long, at(0)), Err(SessionError::TaskTooLong));
        // Exactly at the limit is fine.
        state.start(&"x".repeat(MAX_TASK_LEN), at(0)).unwrap();
    }

    #[test]
    fn start_fails_while_a_session_is_active() {
        let mut state = AppState::new();
        state.start("one", at(0)).unwrap();
        assert_eq!(
            state.start("two", at(1)),
            Err(SessionError::AlreadyRunning {
                task: "one".into()
            })
        );
    }

    #[test]
    fn take_break_suggests_from_elapsed_work() {
        let mut state = AppState::new();
        state.start("deep work", at(0)).unwrap();
        let started = state.take_break(at(40)).unwrap();
        assert_eq!(started.flow, Duration::from_secs(40 * 60));
        assert_eq!(started.suggested, Duration::from_secs(8 * 60));
        assert_eq!(state.phase(), Phase::Breaking);
    }

    #[test]
    fn take_break_requires_working() {
        let mut state = AppState::new();
        assert_eq!(state.take_break(at(0)), Err(SessionError::NoActiveSession));
        state.start("t", at(0)).unwrap();
        state.take_break(at(10)).unwrap();
        assert_eq!(state.take_break(at(11)), Err(SessionError::AlreadyOnBreak));
    }

    #[test]
    fn break_then_resume_appends_one_completed_session() {
        let mut state = AppState::new();
        state.start("deep work", at(0)).unwrap();
        state.take_break(at(30)).unwrap();
        assert_eq!(state.resume(at(38)), Ok(Resumed::Current));

        assert_eq!(state.completed_sessions.len(), 1);
        let done = &state.completed_sessions[0];
        assert_eq!(done.task, "deep work");
        assert_eq!(done.flow_duration, Duration::from_secs(30 * 60));
        assert_eq!(done.break_duration, Some(Duration::from_secs(8 * 60)));
        assert_eq!(done.completed_at, at(38));

        // Resume re-enters Working with the same task and a fresh start.
        assert_eq!(state.phase(), Phase::Working);
        let session = state.current_session.as_ref().unwrap();
        assert_eq!(session.task, "deep work");
        assert_eq!(session.start_time, at(38));
    }

    #[test]
    fn resume_without_session_reopens_previous_by_name() {
        let mut state = AppState::new();
        state.start("deep work", at(0)).unwrap();
        state.take_break(at(30)).unwrap();
        state.stop(at(35)).unwrap();

        // Legacy shape: break record without a session.
        state.current_break = Some(CurrentBreak {
            start_time: at(35),
            suggested_duration: Duration::from_secs(300),
        });
        assert_eq!(state.resume(at(40)), Ok(Resumed::Previous));
        assert_eq!(state.current_session.as_ref().unwrap().task, "deep work");
        assert!(state.current_break.is_none());
        assert_eq!(state.completed_sessions.len(), 1);
    }

    #[test]
    fn resume_fails_when_nothing_to_resume() {
        let mut state = AppState::new();
        assert_eq!(state.resume(at(0)), Err(SessionError::NothingToResume));

        state.start("t", at(0)).unwrap();
        assert_eq!(state.resume(at(5)), Err(SessionError::AlreadyWorking));
        // The failed resume must not have consumed the session.
        assert_eq!(state.phase(), Phase::Working);
    }

    #[test]
    fn stop_from_working_records_no_break() {
        let mut state = AppState::new();
        state.start("t", at(0)).unwrap();
        let done = state.stop(at(45)).unwrap();
        assert_eq!(done.flow_duration, Duration::from_secs(45 * 60));
        assert_eq!(done.break_duration, None);
        assert_eq!(state.phase(), Phase::Idle);
        assert_eq!(state.completed_sessions.len(), 1);
    }

    #[test]
    fn stop_from_breaking_records_both_durations() {
        let mut state = AppState::new();
        state.start("t", at(0)).unwrap();
        state.take_break(at(20)).unwrap();
        let done = state.stop(at(26)).unwrap();
        assert_eq!(done.flow_duration, Duration::from_secs(20 * 60));
        assert_eq!(done.break_duration, Some(Duration::from_secs(6 * 60)));
        assert_eq!(state.phase(), Phase::Idle);
        assert!(state.current_break.is_none());
    }

    #[test]
    fn stop_fails_when_idle() {
        let mut state = AppState::new();
        assert_eq!(state.stop(at(0)), Err(SessionError::NoActiveSession));
    }

    #[test]
    fn status_reports_each_phase() {
        let mut state = AppState::new();
        assert_eq!(state.status(at(0)), Status::Idle);

        state.start("t", at(0)).unwrap();
        assert_eq!(
            state.status(at(12)),
            Status::Working {
                task: "t".into(),
                elapsed: Duration::from_secs(12 * 60),
            }
        );

        // 20 minutes of work suggests a 5 minute break.
        state.take_break(at(20)).unwrap();
        assert_eq!(
            state.status(at(22)),
            Status::BreakRemaining {
                remaining: Duration::from_secs(3 * 60),
            }
        );
        assert_eq!(
            state.status(at(27)),
            Status::BreakOvertime {
                overtime: Duration::from_secs(2 * 60),
            }
        );
    }

    #[test]
    fn break_implies_session_through_transitions() {
        let mut state = AppState::new();
        state.start("t", at(0)).unwrap();
        state.take_break(at(10)).unwrap();
        assert!(state.current_session.is_some());
        state.stop(at(15)).unwrap();
        assert!(state.current_session.is_none() && state.current_break.is_none());
    }
}
