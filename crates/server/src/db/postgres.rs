//! `PostgreSQL` implementation of [`Store`].
//!
//! Queries are runtime-checked `query_as` calls mapped through row structs,
//! then converted into domain types.

use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use secrecy::{ExposeSecret, SecretString};
use sqlx::PgPool;

use openwaitlist_core::{Email, UserId, WaitlistId};

use super::migrate::{self, MigrationError, MigrationStatus};
use super::{RepositoryError, Store, create_pool, escape_like};
use crate::models::{ArchiveState, AuthProvider, NewUser, NewWaitlist, User, Waitlist};

const USER_COLUMNS: &str =
    "id, email, auth_provider, password_hash, display_name, created_at, updated_at";

const WAITLIST_COLUMNS: &str =
    "id, slug, name, owner_user_id, is_public, show_vendor_branding, created_at, archived_at";

#[derive(sqlx::FromRow)]
struct UserRow {
    id: UserId,
    email: String,
    auth_provider: String,
    password_hash: Option<String>,
    display_name: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = RepositoryError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let email = Email::parse(&row.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;
        let provider = AuthProvider::from_parts(&row.auth_provider, row.password_hash)
            .ok_or_else(|| {
                RepositoryError::DataCorruption(format!(
                    "user {} has provider '{}' with a mismatched password hash",
                    row.id, row.auth_provider
                ))
            })?;

        Ok(Self {
            id: row.id,
            email,
            provider,
            display_name: row.display_name,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct WaitlistRow {
    id: WaitlistId,
    slug: String,
    name: String,
    owner_user_id: UserId,
    is_public: bool,
    show_vendor_branding: bool,
    created_at: DateTime<Utc>,
    archived_at: Option<DateTime<Utc>>,
}

impl From<WaitlistRow> for Waitlist {
    fn from(row: WaitlistRow) -> Self {
        Self {
            id: row.id,
            slug: row.slug,
            name: row.name,
            owner_user_id: row.owner_user_id,
            is_public: row.is_public,
            show_vendor_branding: row.show_vendor_branding,
            created_at: row.created_at,
            state: ArchiveState::from_column(row.archived_at),
        }
    }
}

/// Map a unique-constraint violation to `RepositoryError::Conflict`.
fn conflict_on_unique(err: sqlx::Error, what: &str) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = err
        && db_err.is_unique_violation()
    {
        return RepositoryError::Conflict(format!("{what} already exists"));
    }
    RepositoryError::Database(err)
}

/// Store backed by a `PostgreSQL` pool.
///
/// Created unconnected; every operation fails with
/// `RepositoryError::NotConnected` until [`PgStore::connect`] succeeds.
#[derive(Debug, Default)]
pub struct PgStore {
    pool: RwLock<Option<PgPool>>,
}

impl PgStore {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            pool: RwLock::new(None),
        }
    }

    /// Open the connection pool.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the database is unreachable.
    pub async fn connect(&self, database_url: &SecretString) -> Result<(), RepositoryError> {
        if let Some(target) = describe_target(database_url) {
            tracing::debug!(database = %target, "Connecting to PostgreSQL");
        }

        let pool = create_pool(database_url).await?;
        *self.pool.write().unwrap_or_else(PoisonError::into_inner) = Some(pool);

        tracing::info!("Connected to PostgreSQL");
        Ok(())
    }

    /// Get a handle to the connection pool.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotConnected` before `connect` or after `close`.
    pub fn pool(&self) -> Result<PgPool, RepositoryError> {
        self.pool
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .ok_or(RepositoryError::NotConnected)
    }

    /// Apply pending schema migrations.
    ///
    /// # Errors
    ///
    /// Returns `MigrationError` if any migration fails; later migrations are not attempted.
    pub async fn migrate(&self) -> Result<Vec<String>, MigrationError> {
        let pool = self.pool()?;
        migrate::run(&pool).await
    }

    /// List embedded migrations with their applied timestamps.
    ///
    /// # Errors
    ///
    /// Returns `MigrationError` if the tracking table cannot be read.
    pub async fn migration_status(&self) -> Result<Vec<MigrationStatus>, MigrationError> {
        let pool = self.pool()?;
        migrate::status(&pool).await
    }

    /// Close the pool, waiting for checked-out connections to be returned.
    pub async fn close(&self) {
        let pool = self
            .pool
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(pool) = pool {
            pool.close().await;
            tracing::info!("Database connection closed");
        }
    }
}

/// `host:port/database` of a connection string, without credentials.
fn describe_target(database_url: &SecretString) -> Option<String> {
    let url = url::Url::parse(database_url.expose_secret()).ok()?;
    let host = url.host_str()?;
    let port = url.port().unwrap_or(5432);
    Some(format!("{host}:{port}{}", url.path()))
}

#[async_trait]
impl Store for PgStore {
    async fn ping(&self) -> Result<(), RepositoryError> {
        let pool = self.pool()?;
        sqlx::query("SELECT 1").execute(&pool).await?;
        Ok(())
    }

    async fn get_user_by_email(&self, email: &Email) -> Result<Option<User>, RepositoryError> {
        let pool = self.pool()?;
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email.as_str())
        .fetch_optional(&pool)
        .await?;

        row.map(User::try_from).transpose()
    }

    async fn create_user(&self, user: NewUser) -> Result<User, RepositoryError> {
        let pool = self.pool()?;
        let row = sqlx::query_as::<_, UserRow>(&format!(
            r"
            INSERT INTO users (email, auth_provider, password_hash, display_name)
            VALUES ($1, $2, $3, $4)
            RETURNING {USER_COLUMNS}
            "
        ))
        .bind(user.email.as_str())
        .bind(user.provider.tag())
        .bind(user.provider.password_hash())
        .bind(user.display_name.as_deref())
        .fetch_one(&pool)
        .await
        .map_err(|e| conflict_on_unique(e, "email"))?;

        let user = User::try_from(row)?;
        tracing::debug!(user_id = %user.id, "Created user");
        Ok(user)
    }

    async fn get_waitlists_by_owner(
        &self,
        owner: UserId,
        search: Option<&str>,
    ) -> Result<Vec<Waitlist>, RepositoryError> {
        let pool = self.pool()?;
        let rows = sqlx::query_as::<_, WaitlistRow>(&format!(
            r"
            SELECT {WAITLIST_COLUMNS}
            FROM waitlists
            WHERE owner_user_id = $1
              AND archived_at IS NULL
              AND ($2::TEXT IS NULL OR name ILIKE '%' || $2 || '%' ESCAPE '\')
            ORDER BY created_at DESC, id DESC
            "
        ))
        .bind(owner)
        .bind(search.map(escape_like))
        .fetch_all(&pool)
        .await?;

        Ok(rows.into_iter().map(Waitlist::from).collect())
    }

    async fn create_waitlist(&self, waitlist: NewWaitlist) -> Result<Waitlist, RepositoryError> {
        let pool = self.pool()?;
        let row = sqlx::query_as::<_, WaitlistRow>(&format!(
            r"
            INSERT INTO waitlists (slug, name, owner_user_id, is_public, show_vendor_branding)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {WAITLIST_COLUMNS}
            "
        ))
        .bind(&waitlist.slug)
        .bind(&waitlist.name)
        .bind(waitlist.owner_user_id)
        .bind(waitlist.is_public)
        .bind(waitlist.show_vendor_branding)
        .fetch_one(&pool)
        .await
        .map_err(|e| conflict_on_unique(e, "slug"))?;

        let waitlist = Waitlist::from(row);
        tracing::debug!(waitlist_id = %waitlist.id, slug = %waitlist.slug, "Created waitlist");
        Ok(waitlist)
    }

    async fn get_waitlist_by_id(
        &self,
        id: WaitlistId,
    ) -> Result<Option<Waitlist>, RepositoryError> {
        let pool = self.pool()?;
        let row = sqlx::query_as::<_, WaitlistRow>(&format!(
            "SELECT {WAITLIST_COLUMNS} FROM waitlists WHERE id = $1 AND archived_at IS NULL"
        ))
        .bind(id)
        .fetch_optional(&pool)
        .await?;

        Ok(row.map(Waitlist::from))
    }

    async fn get_waitlist_by_slug(&self, slug: &str) -> Result<Option<Waitlist>, RepositoryError> {
        let pool = self.pool()?;
        let row = sqlx::query_as::<_, WaitlistRow>(&format!(
            "SELECT {WAITLIST_COLUMNS} FROM waitlists WHERE slug = $1 AND archived_at IS NULL"
        ))
        .bind(slug)
        .fetch_optional(&pool)
        .await?;

        Ok(row.map(Waitlist::from))
    }

    async fn update_waitlist(&self, waitlist: &Waitlist) -> Result<(), RepositoryError> {
        let pool = self.pool()?;
        sqlx::query(
            r"
            UPDATE waitlists
            SET slug = $1, name = $2, is_public = $3, show_vendor_branding = $4
            WHERE id = $5 AND archived_at IS NULL
            ",
        )
        .bind(&waitlist.slug)
        .bind(&waitlist.name)
        .bind(waitlist.is_public)
        .bind(waitlist.show_vendor_branding)
        .bind(waitlist.id)
        .execute(&pool)
        .await
        .map_err(|e| conflict_on_unique(e, "slug"))?;

        tracing::debug!(waitlist_id = %waitlist.id, "Updated waitlist");
        Ok(())
    }

    async fn archive_waitlist(&self, id: WaitlistId) -> Result<(), RepositoryError> {
        let pool = self.pool()?;
        sqlx::query("UPDATE waitlists SET archived_at = NOW() WHERE id = $1 AND archived_at IS NULL")
            .bind(id)
            .execute(&pool)
            .await?;

        tracing::debug!(waitlist_id = %id, "Archived waitlist");
        Ok(())
    }
}
