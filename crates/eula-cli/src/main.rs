use anyhow::{Context, Result};
use clap::Parser;
use eula_config::ConfigLoader;

use eula_cli::{
    cli::{Cli, Commands},
    commands, logging,
};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = ConfigLoader::load_or_default(cli.config.as_deref())
        .await
        .context("Failed to load configuration")?;

    logging::init(cli.effective_log_level(config.logging.level).into());

    // Apply database path override if provided
    if let Some(db_path) = cli.db_path.clone() {
        config.storage.path = db_path;
    }

    match cli.command {
        Commands::Console {
            user,
            channel,
            authority,
        } => commands::console::execute(config, user, channel, authority).await?,

        Commands::Admin(cmd) => commands::admin::execute(config, cmd).await?,

        Commands::Config(cmd) => commands::config::execute(config, cli.config.as_deref(), cmd).await?,
    }

    Ok(())
}
