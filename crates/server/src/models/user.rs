//! User domain types.

use chrono::{DateTime, Utc};

use openwaitlist_core::{Email, UserId};

/// Provider tag stored for password-based accounts.
pub const LOCAL_PROVIDER: &str = "local";

/// How a user's identity was established.
///
/// A password hash exists exactly for local accounts; federated accounts
/// never carry one.
#[derive(Clone, PartialEq, Eq)]
pub enum AuthProvider {
    /// Email + password account.
    Local {
        /// Argon2 PHC string.
        password_hash: String,
    },
    /// Account created through an external identity provider.
    External {
        /// Provider tag, e.g. `github`.
        name: String,
    },
}

impl AuthProvider {
    /// The tag persisted in `users.auth_provider`.
    #[must_use]
    pub fn tag(&self) -> &str {
        match self {
            Self::Local { .. } => LOCAL_PROVIDER,
            Self::External { name } => name,
        }
    }

    /// The stored password hash, present only for local accounts.
    #[must_use]
    pub fn password_hash(&self) -> Option<&str> {
        match self {
            Self::Local { password_hash } => Some(password_hash),
            Self::External { .. } => None,
        }
    }

    /// Rebuild a provider from its stored columns.
    ///
    /// Returns `None` when the columns break the local-iff-hash invariant.
    #[must_use]
    pub fn from_parts(tag: &str, password_hash: Option<String>) -> Option<Self> {
        match (tag == LOCAL_PROVIDER, password_hash) {
            (true, Some(password_hash)) => Some(Self::Local { password_hash }),
            (false, None) => Some(Self::External {
                name: tag.to_owned(),
            }),
            _ => None,
        }
    }
}

impl std::fmt::Debug for AuthProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Local { .. } => f
                .debug_struct("Local")
                .field("password_hash", &"[REDACTED]")
                .finish(),
            Self::External { name } => f.debug_struct("External").field("name", name).finish(),
        }
    }
}

/// A registered user (domain type).
#[derive(Debug, Clone)]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// User's email address, unique and case-sensitive as stored.
    pub email: Email,
    /// Identity provider and, for local accounts, the password hash.
    pub provider: AuthProvider,
    /// Optional name shown in the dashboard.
    pub display_name: Option<String>,
    /// When the user was created.
    pub created_at: DateTime<Utc>,
    /// When the user was last updated.
    pub updated_at: DateTime<Utc>,
}

/// Data required to insert a user; the store assigns ID and timestamps.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: Email,
    pub provider: AuthProvider,
    pub display_name: Option<String>,
}
