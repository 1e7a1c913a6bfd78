//! Remembers the last skill level and slot count the user entered.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Error as SerdeError;

use crate::util::config::project_dirs;

const STATE_FILENAME: &str = "state.json";

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedInputs {
    #[serde(default)]
    pub hotm_level: Option<u32>,
    #[serde(default)]
    pub forge_slots: Option<u32>,
}

/// `state.json` in the platform config directory, if one can be determined.
pub fn state_file() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.config_dir().join(STATE_FILENAME))
}

pub fn load_persisted_inputs(path: &Path) -> Option<PersistedInputs> {
    let data = fs::read_to_string(path).ok()?;
    serde_json::from_str(&data).ok()
}

pub fn save_persisted_inputs(path: &Path, inputs: &PersistedInputs) -> Result<(), PersistSaveError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(inputs)?;
    fs::write(path, json)?;
    Ok(())
}

#[derive(Debug, thiserror::Error)]
pub enum PersistSaveError {
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Serde(#[from] SerdeError),
}
