use anyhow::{bail, Context, Result};
use colored::Colorize;
use eula_config::{Config, ConfigLoader};
use std::path::Path;

use crate::cli::ConfigCommands;

/// Execute config subcommand
pub async fn execute(config: Config, path: Option<&Path>, cmd: ConfigCommands) -> Result<()> {
    match cmd {
        ConfigCommands::Show { format } => show(&config, &format),
        ConfigCommands::Validate => validate(&config, path),
        ConfigCommands::Schema => schema(),
    }
}

/// Show the effective configuration
fn show(config: &Config, format: &str) -> Result<()> {
    match format {
        "json" => println!("{}", serde_json::to_string_pretty(config)?),
        "toml" => println!("{}", config.to_toml_string()?),
        other => bail!("Unknown format '{}', expected toml or json", other),
    }
    Ok(())
}

/// Loading already validated the file; report what was checked
fn validate(config: &Config, path: Option<&Path>) -> Result<()> {
    config.validate().context("Configuration is invalid")?;

    let source = match path {
        Some(path) => path.display().to_string(),
        None => {
            let default_path = ConfigLoader::default_path();
            if default_path.exists() {
                default_path.display().to_string()
            } else {
                "built-in defaults".to_string()
            }
        }
    };
    println!("{} {} is valid", "Success:".green().bold(), source);
    println!(
        "  wait_time {}s, reply_authority {}, {} keyword(s)",
        config.agreement.wait_time,
        config.agreement.reply_authority,
        config.agreement.accept.len()
    );
    Ok(())
}

fn schema() -> Result<()> {
    println!("{}", serde_json::to_string_pretty(&Config::json_schema())?);
    Ok(())
}
