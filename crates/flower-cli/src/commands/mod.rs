//! Command implementations.
//!
//! Every command resolves the data directory once at the edge and hands
//! explicit paths to the core stores.

pub mod flow;
pub mod session;
pub mod task;

use std::error::Error;
use std::path::PathBuf;

use flower_core::storage::{self, Config, Database, StateStore};

pub type CliResult = Result<(), Box<dyn Error>>;

/// Directory the config file is read from: `FLOWER_DATA_DIR` when set
/// (test isolation), the platform default otherwise.
fn config_base_dir() -> Result<PathBuf, Box<dyn Error>> {
    match std::env::var_os("FLOWER_DATA_DIR") {
        Some(dir) => Ok(storage::data_dir(Some(dir.as_ref()))?),
        None => Ok(storage::data_dir(None)?),
    }
}

fn load_config() -> Result<Config, Box<dyn Error>> {
    Ok(Config::load(&config_base_dir()?)?)
}

/// Resolve the directory holding the state and database files, honouring
/// the `data_dir` config override.
fn resolve_data_dir() -> Result<PathBuf, Box<dyn Error>> {
    let base = config_base_dir()?;
    match Config::load(&base)?.data_dir {
        Some(dir) => Ok(storage::data_dir(Some(&dir))?),
        None => Ok(base),
    }
}

fn open_state_store() -> Result<StateStore, Box<dyn Error>> {
    Ok(StateStore::in_dir(&resolve_data_dir()?))
}

fn open_database() -> Result<Database, Box<dyn Error>> {
    Ok(Database::open(&resolve_data_dir()?)?)
}
