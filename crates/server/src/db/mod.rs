//! Persistence gateway for users and waitlists.
//!
//! ## Tables
//!
//! - `users` - Account identities (local password or external provider)
//! - `waitlists` - Owned waitlists, soft-deleted through `archived_at`
//! - `schema_migrations` - Versions applied by [`migrate`]
//! - `tower_sessions.session` - Session storage, created by the session store
//!
//! Handlers and services only see the [`Store`] trait. [`PgStore`] is the
//! production implementation; `MemoryStore` (behind `cfg(test)` or the
//! `test-util` feature) backs unit and integration tests.

pub mod migrate;
pub mod postgres;

#[cfg(any(test, feature = "test-util"))]
pub mod memory;

use std::time::Duration;

use async_trait::async_trait;
use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use openwaitlist_core::{Email, UserId, WaitlistId};

use crate::models::{NewUser, NewWaitlist, User, Waitlist};

#[cfg(any(test, feature = "test-util"))]
pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// An operation ran before `connect` succeeded or after `close`.
    #[error("database connection is not established")]
    NotConnected,

    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Constraint violation (e.g., unique email).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Typed data access for the service layer.
///
/// Lookups return `Ok(None)` for missing rows. Waitlist reads never return
/// archived rows, and writes against archived or missing waitlists are
/// silent no-ops.
#[async_trait]
pub trait Store: Send + Sync {
    /// Health-check the underlying connection.
    async fn ping(&self) -> Result<(), RepositoryError>;

    /// Get a user by their exact email address.
    async fn get_user_by_email(&self, email: &Email) -> Result<Option<User>, RepositoryError>;

    /// Insert a user, assigning its ID and timestamps.
    ///
    /// Returns `RepositoryError::Conflict` if the email is already registered.
    async fn create_user(&self, user: NewUser) -> Result<User, RepositoryError>;

    /// List an owner's active waitlists, newest first.
    ///
    /// `search` filters by case-insensitive substring of the name.
    async fn get_waitlists_by_owner(
        &self,
        owner: UserId,
        search: Option<&str>,
    ) -> Result<Vec<Waitlist>, RepositoryError>;

    /// Insert a waitlist, assigning its ID and `created_at`.
    ///
    /// Returns `RepositoryError::Conflict` if the slug is taken by an active waitlist.
    async fn create_waitlist(&self, waitlist: NewWaitlist) -> Result<Waitlist, RepositoryError>;

    /// Get an active waitlist by ID.
    async fn get_waitlist_by_id(&self, id: WaitlistId)
    -> Result<Option<Waitlist>, RepositoryError>;

    /// Get an active waitlist by slug.
    async fn get_waitlist_by_slug(&self, slug: &str) -> Result<Option<Waitlist>, RepositoryError>;

    /// Overwrite slug, name and flags of an active waitlist.
    ///
    /// Returns `RepositoryError::Conflict` if the new slug is taken.
    async fn update_waitlist(&self, waitlist: &Waitlist) -> Result<(), RepositoryError>;

    /// Soft-delete a waitlist. Archiving twice keeps the first timestamp.
    async fn archive_waitlist(&self, id: WaitlistId) -> Result<(), RepositoryError>;
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(1)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

/// Escape `%`, `_` and `\` so a search term matches literally inside `ILIKE`.
#[must_use]
pub fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
