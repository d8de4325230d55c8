//! Bot identity and presentation settings

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Language used for user-facing strings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    /// Simplified Chinese
    #[default]
    Zh,
    /// English
    En,
}

/// Settings describing the bot itself
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct BotConfig {
    /// The bot's own identifier, used to strip self-mentions from replies
    #[serde(default = "default_self_id")]
    pub self_id: String,

    /// Locale for user-facing strings
    #[serde(default)]
    pub locale: Locale,
}

fn default_self_id() -> String {
    "bot".to_string()
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            self_id: default_self_id(),
            locale: Locale::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bot_config_parse() {
        let config: BotConfig = toml::from_str("self_id = \"10001\"\nlocale = \"en\"").unwrap();
        assert_eq!(config.self_id, "10001");
        assert_eq!(config.locale, Locale::En);
    }

    #[test]
    fn test_bot_config_defaults() {
        let config: BotConfig = toml::from_str("").unwrap();
        assert_eq!(config, BotConfig::default());
        assert_eq!(config.locale, Locale::Zh);
    }
}
