//! Authentication error types.

use thiserror::Error;

use crate::db::RepositoryError;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Invalid email format.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] openwaitlist_core::EmailError),

    /// Empty password on signup.
    #[error("password is required")]
    MissingPassword,

    /// Invalid credentials (wrong password or user not found).
    #[error("invalid credentials")]
    InvalidCredentials,

    /// User already exists.
    #[error("user already exists")]
    UserAlreadyExists,

    /// No bearer token or session identity on the request.
    #[error("authentication required")]
    Unauthenticated,

    /// Token failed signature, issuer or expiry checks, or names an unknown user.
    #[error("invalid token")]
    InvalidToken,

    /// Token encoding failed.
    #[error("token error: {0}")]
    Token(#[source] jsonwebtoken::errors::Error),

    /// Session store read or write failed.
    #[error("session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),

    /// Password hashing error.
    #[error("password hashing error")]
    PasswordHash,
}
