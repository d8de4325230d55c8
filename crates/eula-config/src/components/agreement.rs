//! Agreement configuration: the text shown, the accepted keywords, and which
//! users and commands the gate applies to.

use crate::error::{ConfigError, ConfigResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::warn;

/// Lowest permitted reply wait, in seconds
pub const MIN_WAIT_TIME: u64 = 30;
/// Highest permitted reply wait, in seconds
pub const MAX_WAIT_TIME: u64 = 300;
/// Lowest permitted gate authority threshold
pub const MIN_REPLY_AUTHORITY: u32 = 1;
/// Highest permitted gate authority threshold
pub const MAX_REPLY_AUTHORITY: u32 = 5;

/// Agreement presented to users before privileged commands
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct AgreementConfig {
    /// Display name of the agreement
    #[serde(default = "default_alias")]
    pub alias: String,

    /// Agreement text. When empty the localized default text is used.
    #[serde(default)]
    pub body: String,

    /// Accepted confirmation keywords. One is picked at random per prompt.
    #[serde(default = "default_accept")]
    pub accept: Vec<String>,

    /// How long to wait for a reply, in seconds
    #[serde(default = "default_wait_time")]
    #[schemars(range(min = 30, max = 300))]
    pub wait_time: u64,

    /// Send the agreement body and confirmation as one forwarded bundle
    #[serde(default = "default_forward_message")]
    pub forward_message: bool,

    /// Highest user authority still subject to the gate
    #[serde(default = "default_reply_authority")]
    #[schemars(range(min = 1, max = 5))]
    pub reply_authority: u32,

    /// Which commands trigger the gate
    #[serde(default)]
    pub commands: CommandFilter,
}

fn default_alias() -> String {
    "EULA".to_string()
}

fn default_accept() -> Vec<String> {
    vec!["同意".to_string()]
}

fn default_wait_time() -> u64 {
    60
}

fn default_forward_message() -> bool {
    true
}

fn default_reply_authority() -> u32 {
    1
}

impl Default for AgreementConfig {
    fn default() -> Self {
        Self {
            alias: default_alias(),
            body: String::new(),
            accept: default_accept(),
            wait_time: default_wait_time(),
            forward_message: default_forward_message(),
            reply_authority: default_reply_authority(),
            commands: CommandFilter::default(),
        }
    }
}

impl AgreementConfig {
    /// Reply deadline as a [`Duration`]
    pub fn wait_duration(&self) -> Duration {
        Duration::from_secs(self.wait_time)
    }

    /// Check numeric bounds and keyword sanity
    pub fn validate(&self) -> ConfigResult<()> {
        if !(MIN_WAIT_TIME..=MAX_WAIT_TIME).contains(&self.wait_time) {
            return Err(ConfigError::validation(
                "agreement.wait_time",
                format!(
                    "must be between {} and {} seconds, got {}",
                    MIN_WAIT_TIME, MAX_WAIT_TIME, self.wait_time
                ),
            ));
        }

        if !(MIN_REPLY_AUTHORITY..=MAX_REPLY_AUTHORITY).contains(&self.reply_authority) {
            return Err(ConfigError::validation(
                "agreement.reply_authority",
                format!(
                    "must be between {} and {}, got {}",
                    MIN_REPLY_AUTHORITY, MAX_REPLY_AUTHORITY, self.reply_authority
                ),
            ));
        }

        if let Some(index) = self.accept.iter().position(|k| k.trim().is_empty()) {
            return Err(ConfigError::validation(
                format!("agreement.accept[{}]", index),
                "keywords must not be blank",
            ));
        }

        if self.commands.mode != FilterMode::All && self.commands.names.is_empty() {
            warn!(
                mode = ?self.commands.mode,
                "Command filter has no names; allow mode gates nothing, deny mode gates everything"
            );
        }

        Ok(())
    }
}

/// How the command name list is interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum FilterMode {
    /// Every command is subject to the gate
    #[default]
    All,
    /// Only listed commands are subject to the gate
    Allow,
    /// Every command except the listed ones is subject to the gate
    Deny,
}

/// Command filter for the gate
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
pub struct CommandFilter {
    /// Filter mode
    #[serde(default)]
    pub mode: FilterMode,

    /// Command names the mode refers to
    #[serde(default)]
    pub names: Vec<String>,
}

impl CommandFilter {
    /// Filter that includes every command
    pub fn all() -> Self {
        Self::default()
    }

    /// Filter that includes only the given commands
    pub fn allow<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            mode: FilterMode::Allow,
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    /// Filter that includes every command except the given ones
    pub fn deny<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            mode: FilterMode::Deny,
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    /// Whether `command` is subject to the gate under this filter
    pub fn includes(&self, command: &str) -> bool {
        let listed = self.names.iter().any(|name| name == command);
        match self.mode {
            FilterMode::All => true,
            FilterMode::Allow => listed,
            FilterMode::Deny => !listed,
        }
    }
}
