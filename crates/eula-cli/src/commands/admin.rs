use anyhow::Result;
use colored::Colorize;
use eula_config::Config;
use eula_core::{Admin, ConsentStore, UserId, UserRecord};
use std::sync::Arc;

use crate::cli::AdminCommands;

/// Execute admin subcommand
pub async fn execute(config: Config, cmd: AdminCommands) -> Result<()> {
    let store = Arc::new(super::open_store(&config)?);
    let admin = Admin::new(ConsentStore::new(store));

    match cmd {
        AdminCommands::Grant { user } => {
            let record = admin.grant(UserId(user)).await?;
            println!("{} agreement granted", "Success:".green().bold());
            print_record(&record);
        }
        AdminCommands::Reset { user } => {
            let record = admin.reset(UserId(user)).await?;
            println!("{} agreement reset", "Success:".green().bold());
            print_record(&record);
        }
        AdminCommands::Status { user } => {
            print_record(&admin.status(UserId(user)).await?);
        }
        AdminCommands::Revise => {
            let revised = admin.revise_legacy().await?;
            if revised == 0 {
                println!("{}", "No legacy records to revise.".dimmed());
            } else {
                println!(
                    "{} revised {} legacy record(s)",
                    "Success:".green().bold(),
                    revised
                );
            }
        }
    }

    Ok(())
}

fn print_record(record: &UserRecord) {
    let agreement = if record.eula {
        "accepted".green()
    } else {
        "not accepted".yellow()
    };
    println!("  {:<10} {}", "user".bold(), record.id);
    println!("  {:<10} {}", "authority".bold(), record.authority);
    println!("  {:<10} {}", "agreement".bold(), agreement);
}
