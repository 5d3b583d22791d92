//! OpenWaitlist Core - Shared types library.
//!
//! This crate provides common types used across all OpenWaitlist components:
//! - `server` - The waitlist HTTP API
//! - `cli` - Command-line tools for migrations
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no database
//! access, no HTTP clients. This keeps it lightweight and allows it to be used
//! anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs and emails
//! - [`slug`] - Waitlist slug generation

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod slug;
pub mod types;

pub use slug::{SLUG_SUFFIX_LEN, generate_slug, slugify};
pub use types::*;
