//! OpenWaitlist API server library.
//!
//! The binary in `main.rs` wires configuration, logging, the `PostgreSQL`
//! store and the HTTP listener around [`routes::app`]. Everything else lives
//! here so integration tests can drive the same router in-process.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
