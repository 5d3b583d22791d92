//! OpenWaitlist CLI - Database migration tools.
//!
//! # Usage
//!
//! ```bash
//! # Apply pending migrations
//! ow-cli migrate
//!
//! # List applied and pending migrations
//! ow-cli migrate status
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "ow-cli")]
#[command(author, version, about = "OpenWaitlist CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply pending database migrations
    Migrate {
        #[command(subcommand)]
        action: Option<MigrateAction>,
    },
}

#[derive(Subcommand)]
enum MigrateAction {
    /// List applied and pending migrations
    Status,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate { action } => match action {
            None => commands::migrate::run().await?,
            Some(MigrateAction::Status) => commands::migrate::status().await?,
        },
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parses_migrate_status() {
        let cli = Cli::try_parse_from(["ow-cli", "migrate", "status"]);
        assert!(matches!(
            cli.map(|c| c.command),
            Ok(Commands::Migrate {
                action: Some(MigrateAction::Status)
            })
        ));
    }

    #[test]
    fn test_parses_bare_migrate() {
        let cli = Cli::try_parse_from(["ow-cli", "migrate"]);
        assert!(matches!(
            cli.map(|c| c.command),
            Ok(Commands::Migrate { action: None })
        ));
    }
}
