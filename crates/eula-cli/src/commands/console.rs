use anyhow::Result;
use colored::Colorize;
use eula_config::Config;
use eula_core::{Eula, RecordStore, Session, StaticLocalizer, UserId, UserPatch};
use std::sync::Arc;
use tokio::io::BufReader;
use tracing::info;

use crate::console::{ConsoleHost, ConsoleMessenger};

/// Platform name reported for console sessions
const PLATFORM: &str = "console";

/// Run the interactive console bot until stdin closes
pub async fn execute(
    config: Config,
    user: i64,
    channel: String,
    authority: Option<u32>,
) -> Result<()> {
    let store = Arc::new(super::open_store(&config)?);
    let user = UserId(user);

    if let Some(authority) = authority {
        store.set(user, UserPatch::authority(authority)).await?;
        info!(%user, authority, "Console user authority set");
    }

    let messenger = Arc::new(ConsoleMessenger::stdout());
    let gate = Eula::new(
        config.agreement.clone(),
        store,
        messenger.clone(),
        Arc::new(StaticLocalizer::new(config.bot.locale)),
    )?;

    let session = Session::new(user, channel, PLATFORM, config.bot.self_id.clone());
    println!(
        "{} user {} in {}. Type {} for commands, Ctrl-D to quit.",
        "eula console:".cyan().bold(),
        session.user,
        session.channel,
        "help".yellow()
    );

    let host = ConsoleHost::new(Arc::new(gate), messenger, session);
    host.run(BufReader::new(tokio::io::stdin())).await?;
    Ok(())
}
