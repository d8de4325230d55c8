//! Tracing setup for the binary

use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

/// Crates whose events are shown at the selected level
const CRATES: [&str; 4] = ["eula_cli", "eula_core", "eula_sqlite", "eula_config"];

/// Filter directives for `level`, e.g. `eula_cli=debug,eula_core=debug,...`
pub fn directives(level: LevelFilter) -> String {
    let level = level.to_string().to_lowercase();
    CRATES
        .iter()
        .map(|name| format!("{}={}", name, level))
        .collect::<Vec<_>>()
        .join(",")
}

/// Install the global subscriber. `RUST_LOG` takes precedence when set.
///
/// Logs go to stderr so they do not interleave with console output.
pub fn init(level: LevelFilter) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directives(level)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
