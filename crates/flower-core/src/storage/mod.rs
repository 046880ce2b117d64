//! Persistence: data directory resolution, configuration, the JSON state
//! store, and the relational task/session repository.

mod config;
pub mod database;
pub mod state;

pub use config::Config;
pub use database::{Database, NewTask, Session, SessionFilter, Task};
pub use state::StateStore;

use std::path::{Path, PathBuf};

use crate::error::{ConfigError, Result};

/// Directory name under the platform data home.
pub const APP_DIR: &str = "flower";

/// Resolve the flower data directory, creating it if needed.
///
/// An explicit override wins; otherwise this is `<data home>/flower/`.
/// Resolution happens once at the edge -- stores are constructed with the
/// resulting paths rather than reading the environment themselves.
///
/// # Errors
/// Returns an error if no data home can be determined or the directory
/// cannot be created.
pub fn data_dir(override_dir: Option<&Path>) -> Result<PathBuf> {
    let dir = match override_dir {
        Some(dir) => dir.to_path_buf(),
        None => dirs::data_dir().ok_or(ConfigError::NoDataDir)?.join(APP_DIR),
    };
    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
