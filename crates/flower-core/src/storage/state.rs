//! JSON state store with atomic save.
//!
//! The whole [`AppState`] document lives in a single `state.json`. Saves go
//! through a temporary sibling file followed by a rename, so the real file
//! is never left partially written. Nothing here protects against
//! concurrent writers; there is assumed to be one process.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::error::{Result, StateError};
use crate::session::{AppState, STATE_VERSION};

/// File name inside the data directory.
pub const STATE_FILE: &str = "state.json";

/// Load/save access to the persisted [`AppState`].
#[derive(Debug, Clone)]
pub struct StateStore {
    path: PathBuf,
}

impl StateStore {
    /// A store backed by an explicit state-file path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// A store backed by `<dir>/state.json`.
    pub fn in_dir(dir: &Path) -> Self {
        Self::new(dir.join(STATE_FILE))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut os: OsString = self.path.clone().into_os_string();
        os.push(".tmp");
        PathBuf::from(os)
    }

    /// Load the state document.
    ///
    /// A missing file is not an error: it yields a fresh state at the
    /// current version with empty history. A version of zero (absent in
    /// old files) is normalized to the current version.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed; corrupt
    /// state is not repaired.
    pub fn load(&self) -> Result<AppState> {
        let data = match std::fs::read(&self.path) {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(AppState::new()),
            Err(e) => {
                return Err(StateError::Read {
                    path: self.path.clone(),
                    source: e,
                }
                .into())
            }
        };

        let mut state: AppState =
            serde_json::from_slice(&data).map_err(|e| StateError::Parse {
                path: self.path.clone(),
                source: e,
            })?;

        if state.version == 0 {
            state.version = STATE_VERSION;
        }
        Ok(state)
    }

    /// Persist the state document atomically.
    ///
    /// The version is pinned to the current one before writing. On rename
    /// failure the temp file is removed and the error surfaced.
    pub fn save(&self, state: &mut AppState) -> Result<()> {
        state.version = STATE_VERSION;

        let data = serde_json::to_vec_pretty(state).map_err(StateError::Serialize)?;

        let temp = self.temp_path();
        std::fs::write(&temp, data).map_err(|e| StateError::WriteTemp {
            path: temp.clone(),
            source: e,
        })?;

        if let Err(e) = std::fs::rename(&temp, &self.path) {
            let _ = std::fs::remove_file(&temp);
            return Err(StateError::Replace {
                path: self.path.clone(),
                source: e,
            }
            .into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{CompletedSession, CurrentBreak, CurrentSession};
    use chrono::{TimeZone, Utc};
    use std::time::Duration;

    fn store() -> (tempfile::TempDir, StateStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = StateStore::in_dir(dir.path());
        (dir, store)
    }

    #[test]
    fn missing_file_loads_fresh_state() {
        let (_dir, store) = store();
        let state = store.load().unwrap();
        assert_eq!(state, AppState::new());
        assert_eq!(state.version, STATE_VERSION);
        assert!(state.completed_sessions.is_empty());
    }

    #[test]
    fn save_then_load_round_trips() {
        let (_dir, store) = store();
        let start = Utc.with_ymd_and_hms(2024, 3, 10, 9, 0, 0).unwrap();

        let mut state = AppState::new();
        state.current_session = Some(CurrentSession {
            task: "write tests".into(),
            start_time: start,
        });
        state.current_break = Some(CurrentBreak {
            start_time: start + chrono::Duration::minutes(40),
            suggested_duration: Duration::from_secs(8 * 60),
        });
        state.completed_sessions.push(CompletedSession {
            task: "earlier".into(),
            flow_duration: Duration::from_secs(25 * 60),
            break_duration: None,
            completed_at: start,
        });

        store.save(&mut state).unwrap();
        assert_eq!(store.load().unwrap(), state);
    }

    #[test]
    fn save_leaves_no_temp_file_behind() {
        let (_dir, store) = store();
        store.save(&mut AppState::new()).unwrap();
        assert!(store.path().exists());
        assert!(!store.temp_path().exists());
    }

    #[test]
    fn corrupt_file_is_a_parse_error() {
        let (_dir, store) = store();
        std::fs::write(store.path(), "{not json").unwrap();
        let err = store.load().unwrap_err();
        assert!(matches!(
            err,
            crate::error::CoreError::State(StateError::Parse { .. })
        ));
    }

    #[test]
    fn zero_version_is_normalized_on_load() {
        let (_dir, store) = store();
        std::fs::write(
            store.path(),
            r#"{"version": 0, "completed_sessions": []}"#,
        )
        .unwrap();
        assert_eq!(store.load().unwrap().version, STATE_VERSION);
    }

    #[test]
    fn missing_fields_default_cleanly() {
        let (_dir, store) = store();
        std::fs::write(store.path(), "{}").unwrap();
        let state = store.load().unwrap();
        assert_eq!(state.version, STATE_VERSION);
        assert!(state.current_session.is_none());
        assert!(state.current_break.is_none());
        assert!(state.completed_sessions.is_empty());
    }

    #[test]
    fn save_pins_the_version() {
        let (_dir, store) = store();
        let mut state = AppState {
            version: 0,
            ..AppState::new()
        };
        store.save(&mut state).unwrap();
        assert_eq!(state.version, STATE_VERSION);
        assert_eq!(store.load().unwrap().version, STATE_VERSION);
    }
}
