//! Shared helpers for CLI commands
//!
//! Directory resolution and JSON output.

use guardian_core::{
    error::Result,
    project::{init_state_dir, ProjectLocator, GUARDIAN_DIR},
    StateStore,
};
use serde::Serialize;
use std::path::PathBuf;
use tracing::debug;

/// Directories every command works against
#[derive(Debug, Clone)]
pub struct Context {
    explicit_guardian_dir: Option<PathBuf>,
    explicit_oracle_dir: Option<PathBuf>,
    locator: ProjectLocator,
}

impl Context {
    pub fn new(guardian_dir: Option<PathBuf>, oracle_dir: Option<PathBuf>) -> Self {
        Self {
            explicit_guardian_dir: guardian_dir,
            explicit_oracle_dir: oracle_dir,
            locator: ProjectLocator::new(),
        }
    }

    /// State store for commands that only read
    ///
    /// Without a `.guardian` directory this points at one that does not
    /// exist yet, so every record loads as its default.
    pub fn read_store(&self) -> StateStore {
        let dir = self
            .explicit_guardian_dir
            .clone()
            .or_else(|| self.locator.find_guardian_dir())
            .unwrap_or_else(|| self.locator.base_dir().join(GUARDIAN_DIR));
        debug!("Reading state from {}", dir.display());
        StateStore::new(dir)
    }

    /// State store for commands that write, creating the directory if missing
    pub fn write_store(&self) -> Result<StateStore> {
        let dir = match &self.explicit_guardian_dir {
            Some(dir) => {
                if !dir.is_dir() {
                    init_state_dir(dir)?;
                }
                dir.clone()
            }
            None => self.locator.guardian_dir_or_init()?,
        };
        debug!("Writing state to {}", dir.display());
        Ok(StateStore::new(dir))
    }

    /// Explicit directory to initialize, if one was given
    pub fn explicit_guardian_dir(&self) -> Option<&PathBuf> {
        self.explicit_guardian_dir.as_ref()
    }

    pub fn locator(&self) -> &ProjectLocator {
        &self.locator
    }

    /// Knowledge base directory, if any
    pub fn oracle_dir(&self) -> Option<PathBuf> {
        self.explicit_oracle_dir
            .clone()
            .or_else(|| self.locator.find_oracle_dir())
    }
}

/// Print a value as pretty JSON on stdout
pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
