//! Waitlist service error types.

use thiserror::Error;

use crate::db::RepositoryError;

/// Errors that can occur during waitlist operations.
#[derive(Debug, Error)]
pub enum WaitlistError {
    /// Request input failed validation; the message is safe to show.
    #[error("{0}")]
    Validation(String),

    /// No active waitlist has the requested slug.
    #[error("waitlist not found")]
    NotFound,

    /// The waitlist belongs to someone else.
    #[error("access denied")]
    Forbidden,

    /// Every generated slug collided with an active waitlist.
    #[error("could not allocate a unique slug after {0} attempts")]
    SlugExhausted(usize),

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}
