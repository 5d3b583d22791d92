//! Business logic services.
//!
//! # Services
//!
//! - `auth` - Local signup, credential checks and access tokens
//! - `waitlists` - Ownership-scoped waitlist CRUD
//!
//! Services borrow the [`Store`](crate::db::Store) for the duration of a
//! request and are constructed per call.

pub mod auth;
pub mod waitlists;
