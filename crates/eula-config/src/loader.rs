//! Configuration file loading

use crate::config::Config;
use crate::error::{ConfigError, ConfigResult};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Loads [`Config`] from disk
pub struct ConfigLoader;

impl ConfigLoader {
    /// Default config file location (`~/.config/eula/config.toml`)
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("eula")
            .join("config.toml")
    }

    /// Load and validate a config file
    pub async fn load_from_file(path: impl AsRef<Path>) -> ConfigResult<Config> {
        let path = path.as_ref();
        debug!(path = %path.display(), "Loading configuration");

        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| ConfigError::Io {
                path: path.to_path_buf(),
                source,
            })?;

        let config = Config::from_toml_str(&content)?;
        info!(path = %path.display(), alias = %config.agreement.alias, "Configuration loaded");
        Ok(config)
    }

    /// Load an explicit path, or the default path if it exists, or defaults
    pub async fn load_or_default(path: Option<&Path>) -> ConfigResult<Config> {
        match path {
            Some(path) => Self::load_from_file(path).await,
            None => {
                let default_path = Self::default_path();
                if tokio::fs::try_exists(&default_path).await.unwrap_or(false) {
                    Self::load_from_file(&default_path).await
                } else {
                    debug!("No config file found, using defaults");
                    Ok(Config::default())
                }
            }
        }
    }
}
