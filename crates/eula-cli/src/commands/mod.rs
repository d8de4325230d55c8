pub mod admin;
pub mod config;
pub mod console;

use anyhow::{Context, Result};
use eula_config::Config;
use eula_sqlite::{open_user_store, SqliteUserStore};
use tracing::debug;

/// Open the user database named by the configuration.
pub(crate) fn open_store(config: &Config) -> Result<SqliteUserStore> {
    debug!(path = %config.storage.path.display(), "Opening user store");
    open_user_store(&config.storage).with_context(|| {
        format!(
            "Failed to open user database at {}",
            config.storage.path.display()
        )
    })
}
