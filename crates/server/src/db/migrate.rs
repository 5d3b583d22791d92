//! Versioned schema migrations.
//!
//! Scripts live in `crates/server/migrations/` as `NNNN_name.up.sql` and are
//! embedded at compile time. Each script runs in its own transaction together
//! with the insert into `schema_migrations`, so a failed script leaves no
//! partial state and no version row behind.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use thiserror::Error;

use super::RepositoryError;

/// A single embedded migration script.
#[derive(Debug, Clone, Copy)]
pub struct Migration {
    /// File name without the `.up.sql` suffix, e.g. `0001_users_and_waitlists`.
    pub version: &'static str,
    pub sql: &'static str,
}

/// All known migrations, in the order they must be applied.
pub const MIGRATIONS: &[Migration] = &[
    Migration {
        version: "0001_users_and_waitlists",
        sql: include_str!("../../migrations/0001_users_and_waitlists.up.sql"),
    },
    Migration {
        version: "0002_waitlists_active_slug_unique",
        sql: include_str!("../../migrations/0002_waitlists_active_slug_unique.up.sql"),
    },
];

const CREATE_TRACKING_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS schema_migrations (
    version VARCHAR(255) PRIMARY KEY,
    applied_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
)
";

/// Errors that can occur while migrating.
#[derive(Debug, Error)]
pub enum MigrationError {
    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A script failed; it was rolled back and later scripts were skipped.
    #[error("migration {version} failed: {source}")]
    Failed {
        version: &'static str,
        #[source]
        source: sqlx::Error,
    },
}

/// Applied state of one migration.
#[derive(Debug, Clone)]
pub struct MigrationStatus {
    pub version: &'static str,
    pub applied_at: Option<DateTime<Utc>>,
}

/// Migrations from `all` not yet recorded in `applied`, in lexical order.
#[must_use]
pub fn pending<'a>(all: &'a [Migration], applied: &[String]) -> Vec<&'a Migration> {
    let mut pending: Vec<&Migration> = all
        .iter()
        .filter(|m| !applied.iter().any(|v| v == m.version))
        .collect();
    pending.sort_by_key(|m| m.version);
    pending
}

async fn ensure_tracking_table(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::raw_sql(CREATE_TRACKING_TABLE).execute(pool).await?;
    Ok(())
}

async fn applied_versions(pool: &PgPool) -> Result<Vec<(String, DateTime<Utc>)>, sqlx::Error> {
    sqlx::query_as::<_, (String, DateTime<Utc>)>(
        "SELECT version, applied_at FROM schema_migrations ORDER BY version",
    )
    .fetch_all(pool)
    .await
}

/// Apply every pending embedded migration, returning the versions applied.
///
/// # Errors
///
/// Returns `MigrationError::Failed` for the first script that fails.
pub async fn run(pool: &PgPool) -> Result<Vec<String>, MigrationError> {
    run_migrations(pool, MIGRATIONS).await
}

/// Apply the pending subset of `migrations` in lexical order.
///
/// Stops at the first failing script; earlier scripts stay applied.
///
/// # Errors
///
/// Returns `MigrationError::Failed` for the first script that fails.
pub async fn run_migrations(
    pool: &PgPool,
    migrations: &[Migration],
) -> Result<Vec<String>, MigrationError> {
    ensure_tracking_table(pool).await?;

    let applied: Vec<String> = applied_versions(pool)
        .await?
        .into_iter()
        .map(|(version, _)| version)
        .collect();

    let mut newly_applied = Vec::new();
    for migration in pending(migrations, &applied) {
        apply(pool, migration).await?;
        tracing::info!(version = migration.version, "Applied migration");
        newly_applied.push(migration.version.to_owned());
    }

    if newly_applied.is_empty() {
        tracing::debug!("Schema is up to date");
    }
    Ok(newly_applied)
}

async fn apply(pool: &PgPool, migration: &Migration) -> Result<(), MigrationError> {
    let failed = |source| MigrationError::Failed {
        version: migration.version,
        source,
    };

    let mut tx = pool.begin().await?;
    sqlx::raw_sql(migration.sql)
        .execute(&mut *tx)
        .await
        .map_err(failed)?;
    sqlx::query("INSERT INTO schema_migrations (version) VALUES ($1)")
        .bind(migration.version)
        .execute(&mut *tx)
        .await
        .map_err(failed)?;
    tx.commit().await.map_err(failed)?;
    Ok(())
}

/// Report applied and pending migrations.
///
/// # Errors
///
/// Returns `MigrationError::Database` if the tracking table cannot be read.
pub async fn status(pool: &PgPool) -> Result<Vec<MigrationStatus>, MigrationError> {
    ensure_tracking_table(pool).await?;
    let applied = applied_versions(pool).await?;

    Ok(MIGRATIONS
        .iter()
        .map(|m| MigrationStatus {
            version: m.version,
            applied_at: applied
                .iter()
                .find(|(version, _)| version == m.version)
                .map(|(_, at)| *at),
        })
        .collect())
}
