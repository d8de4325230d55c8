//! Storage configuration for the user record database

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Path value selecting an in-memory database
pub const MEMORY_PATH: &str = ":memory:";

/// Storage section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct StorageConfig {
    /// SQLite database file, or `:memory:`
    #[serde(default = "default_path")]
    pub path: PathBuf,
}

fn default_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("eula")
        .join("eula.db")
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: default_path(),
        }
    }
}

impl StorageConfig {
    /// Storage that lives only for the process lifetime
    pub fn memory() -> Self {
        Self {
            path: PathBuf::from(MEMORY_PATH),
        }
    }

    /// Whether this selects an in-memory database
    pub fn is_memory(&self) -> bool {
        self.path.to_str() == Some(MEMORY_PATH)
    }
}
