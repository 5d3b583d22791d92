//! Authentication service.
//!
//! Local signup and credential checks against the [`Store`], plus resolution
//! of token claims into a caller identity.

mod error;
mod token;

pub use error::AuthError;
pub use token::{Claims, TOKEN_ISSUER, TokenIssuer};

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};

use openwaitlist_core::Email;

use crate::db::{RepositoryError, Store};
use crate::models::{AuthProvider, CurrentUser, NewUser, User};

/// Authentication service.
///
/// Handles local signup, password checks and token identity resolution.
pub struct AuthService<'a> {
    store: &'a dyn Store,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(store: &'a dyn Store) -> Self {
        Self { store }
    }

    /// Register a new local user with email and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidEmail` if the email format is invalid.
    /// Returns `AuthError::MissingPassword` if the password is empty.
    /// Returns `AuthError::UserAlreadyExists` if the email is already registered.
    pub async fn signup(
        &self,
        email: &str,
        password: &str,
        display_name: Option<String>,
    ) -> Result<User, AuthError> {
        let email = Email::parse(email)?;

        if password.is_empty() {
            return Err(AuthError::MissingPassword);
        }

        if self.store.get_user_by_email(&email).await?.is_some() {
            return Err(AuthError::UserAlreadyExists);
        }

        let password_hash = hash_password(password)?;

        let display_name = display_name
            .map(|name| name.trim().to_owned())
            .filter(|name| !name.is_empty());

        // A concurrent signup can still slip past the lookup above.
        let user = self
            .store
            .create_user(NewUser {
                email,
                provider: AuthProvider::Local { password_hash },
                display_name,
            })
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => AuthError::UserAlreadyExists,
                other => AuthError::Repository(other),
            })?;

        tracing::info!(user_id = %user.id, "User signed up");
        Ok(user)
    }

    /// Check an email/password pair.
    ///
    /// Unknown users, malformed emails and externally-authenticated accounts
    /// all yield `false`.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Repository` if the lookup fails.
    pub async fn check_credentials(&self, email: &str, password: &str) -> Result<bool, AuthError> {
        Ok(self.authenticate(email, password).await?.is_some())
    }

    /// Login with email and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the email/password is wrong.
    pub async fn login(&self, email: &str, password: &str) -> Result<User, AuthError> {
        self.authenticate(email, password)
            .await?
            .ok_or(AuthError::InvalidCredentials)
    }

    async fn authenticate(&self, email: &str, password: &str) -> Result<Option<User>, AuthError> {
        let Ok(email) = Email::parse(email) else {
            return Ok(None);
        };

        let Some(user) = self.store.get_user_by_email(&email).await? else {
            return Ok(None);
        };

        let Some(password_hash) = user.provider.password_hash() else {
            return Ok(None);
        };

        if verify_password(password, password_hash) {
            Ok(Some(user))
        } else {
            Ok(None)
        }
    }

    /// Resolve verified token claims into the calling user.
    ///
    /// A numeric `user_id` claim is trusted as-is; otherwise the email claim
    /// is looked up.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidToken` if no claim identifies a known user.
    pub async fn resolve_caller(&self, claims: &Claims) -> Result<CurrentUser, AuthError> {
        if let Some(id) = claims.user_id() {
            return Ok(CurrentUser {
                id,
                email: Email::parse(claims.email()).ok(),
            });
        }

        let email = Email::parse(claims.email()).map_err(|_| AuthError::InvalidToken)?;
        let user = self
            .store
            .get_user_by_email(&email)
            .await?
            .ok_or(AuthError::InvalidToken)?;

        Ok(CurrentUser {
            id: user.id,
            email: Some(user.email),
        })
    }
}

/// Hash a password using Argon2id.
fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a stored hash. Unparseable hashes never match.
fn verify_password(password: &str, hash: &str) -> bool {
    let Ok(parsed_hash) = PasswordHash::new(hash) else {
        tracing::warn!("Stored password hash is not a valid PHC string");
        return false;
    };

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}
