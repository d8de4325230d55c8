//! Root configuration type

use crate::components::{AgreementConfig, BotConfig, LoggingConfig, StorageConfig};
use crate::error::{ConfigError, ConfigResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Complete configuration file
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
pub struct Config {
    /// Agreement settings
    #[serde(default)]
    pub agreement: AgreementConfig,

    /// Bot identity
    #[serde(default)]
    pub bot: BotConfig,

    /// User record storage
    #[serde(default)]
    pub storage: StorageConfig,

    /// Logging
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Parse and validate a TOML document
    pub fn from_toml_str(content: &str) -> ConfigResult<Self> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Render as TOML
    pub fn to_toml_string(&self) -> ConfigResult<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Validate every section
    pub fn validate(&self) -> ConfigResult<()> {
        self.agreement.validate()?;

        if self.bot.self_id.trim().is_empty() {
            return Err(ConfigError::validation("bot.self_id", "must not be blank"));
        }

        Ok(())
    }

    /// JSON schema describing the configuration file
    pub fn json_schema() -> serde_json::Value {
        serde_json::to_value(schemars::schema_for!(Config)).unwrap_or_default()
    }
}
