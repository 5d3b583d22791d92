//! Domain models for the waitlist service.
//!
//! These types represent validated domain objects, separate from the row
//! types used by the `PostgreSQL` store.

pub mod session;
pub mod user;
pub mod waitlist;

pub use session::{CurrentUser, keys as session_keys};
pub use user::{AuthProvider, LOCAL_PROVIDER, NewUser, User};
pub use waitlist::{ArchiveState, NewWaitlist, Waitlist};
