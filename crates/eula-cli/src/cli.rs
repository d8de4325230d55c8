use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing_subscriber::filter::LevelFilter;

/// Log level options for CLI
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    /// No logging output
    Off,
    /// Error messages only
    Error,
    /// Warnings and errors
    Warn,
    /// Informational messages
    Info,
    /// Debug messages
    Debug,
    /// Trace-level messages (most verbose)
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Off => LevelFilter::OFF,
            LogLevel::Error => LevelFilter::ERROR,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Trace => LevelFilter::TRACE,
        }
    }
}

impl From<eula_config::LogLevel> for LogLevel {
    fn from(level: eula_config::LogLevel) -> Self {
        match level {
            eula_config::LogLevel::Off => LogLevel::Off,
            eula_config::LogLevel::Error => LogLevel::Error,
            eula_config::LogLevel::Warn => LogLevel::Warn,
            eula_config::LogLevel::Info => LogLevel::Info,
            eula_config::LogLevel::Debug => LogLevel::Debug,
            eula_config::LogLevel::Trace => LogLevel::Trace,
        }
    }
}

#[derive(Parser)]
#[command(name = "eula")]
#[command(about = "eula - agreement gate for chat bot commands")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Set log level (off, error, warn, info, debug, trace)
    /// If not specified, uses config file value
    #[arg(short = 'l', long, global = true, value_enum)]
    pub log_level: Option<LogLevel>,

    /// Enable verbose logging (shortcut for --log-level=debug)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Config file path (defaults to ~/.config/eula/config.toml)
    #[arg(short = 'C', long, global = true)]
    pub config: Option<PathBuf>,

    /// User database path (overrides [storage].path)
    #[arg(long = "db", global = true)]
    pub db_path: Option<PathBuf>,
}

impl Cli {
    /// Effective log level: explicit flag, then --verbose, then config
    pub fn effective_log_level(&self, configured: eula_config::LogLevel) -> LogLevel {
        match (self.log_level, self.verbose) {
            (Some(level), _) => level,
            (None, true) => LogLevel::Debug,
            (None, false) => configured.into(),
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Interactive console bot with the agreement gate in front of its commands
    ///
    /// Each input line is either the reply to a pending agreement prompt or a
    /// command: help, eula, echo <text>, whoami.
    Console {
        /// Id of the console user
        #[arg(short, long, default_value_t = 1)]
        user: i64,

        /// Channel the console conversation runs in
        #[arg(long, default_value = "console")]
        channel: String,

        /// Store this authority for the user before starting
        #[arg(short, long)]
        authority: Option<u32>,
    },

    /// Operator overrides on stored agreement records
    #[command(subcommand)]
    Admin(AdminCommands),

    /// Configuration tooling
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(Subcommand)]
pub enum AdminCommands {
    /// Mark a user as having accepted the agreement
    Grant { user: i64 },

    /// Clear a user's acceptance
    Reset { user: i64 },

    /// Show a user's stored record
    Status { user: i64 },

    /// Rewrite legacy authority-encoded agreement records
    Revise,
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show the effective configuration
    Show {
        /// Output format (toml, json)
        #[arg(short, long, default_value = "toml")]
        format: String,
    },

    /// Validate the configuration file
    Validate,

    /// Print the JSON schema of the configuration file
    Schema,
}
