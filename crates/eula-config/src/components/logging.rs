//! Logging configuration

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Log verbosity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// No logging output
    Off,
    /// Errors only
    Error,
    /// Warnings and errors
    Warn,
    /// Informational messages
    #[default]
    Info,
    /// Debug messages
    Debug,
    /// Everything
    Trace,
}

/// Logging section
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
pub struct LoggingConfig {
    /// Default log level
    #[serde(default)]
    pub level: LogLevel,
}
