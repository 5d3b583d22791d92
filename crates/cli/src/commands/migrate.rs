//! Database migration commands.
//!
//! # Usage
//!
//! ```bash
//! # Apply pending migrations
//! ow-cli migrate
//!
//! # Show applied and pending migrations
//! ow-cli migrate status
//! ```
//!
//! # Environment Variables
//!
//! - `DB_DSN` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//!
//! The server applies the same migrations on startup; this command lets an
//! operator run them ahead of a deploy.

use thiserror::Error;

use openwaitlist_server::config::{ConfigError, ServerConfig};
use openwaitlist_server::db::PgStore;
use openwaitlist_server::db::RepositoryError;
use openwaitlist_server::db::migrate::MigrationError;

/// Errors from migration commands.
#[derive(Debug, Error)]
pub enum MigrateCommandError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Database error: {0}")]
    Repository(#[from] RepositoryError),

    #[error("Migration error: {0}")]
    Migration(#[from] MigrationError),
}

async fn connect() -> Result<PgStore, MigrateCommandError> {
    let database_url = ServerConfig::database_url_from_env()?;

    tracing::info!("Connecting to database...");
    let store = PgStore::new();
    store.connect(&database_url).await?;
    Ok(store)
}

/// Apply all pending migrations.
///
/// # Errors
///
/// Returns an error if the database is unreachable or a migration fails.
pub async fn run() -> Result<(), MigrateCommandError> {
    let store = connect().await?;

    tracing::info!("Running migrations...");
    let result = store.migrate().await;
    store.close().await;

    let applied = result?;
    if applied.is_empty() {
        tracing::info!("Schema is already up to date");
    } else {
        for version in &applied {
            tracing::info!(version = %version, "Applied");
        }
        tracing::info!(count = applied.len(), "Migrations complete!");
    }
    Ok(())
}

/// Print every embedded migration and when it was applied.
///
/// # Errors
///
/// Returns an error if the database is unreachable.
pub async fn status() -> Result<(), MigrateCommandError> {
    let store = connect().await?;
    let result = store.migration_status().await;
    store.close().await;

    #[allow(clippy::print_stdout)]
    for migration in result? {
        match migration.applied_at {
            Some(at) => println!("applied  {}  {}", migration.version, at.to_rfc3339()),
            None => println!("pending  {}", migration.version),
        }
    }
    Ok(())
}
