//! Project directory discovery
//!
//! Guardian keeps its state in a `.guardian` directory and reads knowledge
//! from a `.oracle` directory. Both are found by walking up from the working
//! directory to the nearest ancestor that contains them, so hooks fired from
//! any subdirectory of a project share the same state.

use crate::config::GuardianConfig;
use crate::error::Result;
use crate::session::SessionMetrics;
use crate::storage::StateStore;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Name of the state directory
pub const GUARDIAN_DIR: &str = ".guardian";

/// Name of the knowledge base directory
pub const ORACLE_DIR: &str = ".oracle";

/// Locates Guardian and Oracle directories relative to a base directory
#[derive(Debug, Clone)]
pub struct ProjectLocator {
    base_dir: PathBuf,
}

impl ProjectLocator {
    /// Create a locator starting from the current directory
    pub fn new() -> Self {
        Self::with_base_dir(env::current_dir().unwrap_or_else(|_| PathBuf::from(".")))
    }

    /// Create a locator starting from a specific directory
    pub fn with_base_dir(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    pub fn base_dir(&self) -> &PathBuf {
        &self.base_dir
    }

    /// Walk up from the base directory looking for a directory named `name`
    pub fn find_dir(&self, name: &str) -> Option<PathBuf> {
        let mut current = self.base_dir.clone();

        loop {
            let candidate = current.join(name);
            if candidate.is_dir() {
                return Some(candidate);
            }

            match current.parent() {
                Some(parent) => current = parent.to_path_buf(),
                None => return None, // Reached filesystem root
            }
        }
    }

    /// Nearest `.guardian` directory, if any
    pub fn find_guardian_dir(&self) -> Option<PathBuf> {
        self.find_dir(GUARDIAN_DIR)
    }

    /// Nearest `.oracle` directory, if any
    pub fn find_oracle_dir(&self) -> Option<PathBuf> {
        self.find_dir(ORACLE_DIR)
    }

    /// Nearest `.guardian` directory, creating one in the base directory if
    /// none exists
    pub fn guardian_dir_or_init(&self) -> Result<PathBuf> {
        match self.find_guardian_dir() {
            Some(dir) => {
                debug!("Using Guardian directory {}", dir.display());
                Ok(dir)
            }
            None => self.init_guardian(),
        }
    }

    /// Create `.guardian` in the base directory with default records
    ///
    /// Existing records are left untouched, so this is safe to run again.
    pub fn init_guardian(&self) -> Result<PathBuf> {
        let dir = self.base_dir.join(GUARDIAN_DIR);
        init_state_dir(&dir)?;
        Ok(dir)
    }
}

/// Create a state directory with default config and session records
pub fn init_state_dir(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir)?;

    let store = StateStore::new(dir);
    let created_config = store.ensure::<GuardianConfig>()?;
    let created_metrics = store.ensure::<SessionMetrics>()?;

    if created_config || created_metrics {
        info!("Guardian initialized at {}", dir.display());
    } else {
        debug!("Guardian already initialized at {}", dir.display());
    }
    Ok(())
}

impl Default for ProjectLocator {
    fn default() -> Self {
        Self::new()
    }
}
