//! Hash run API server library.
//!
//! Exposes the building blocks (config, state, error handling, handlers,
//! router) so integration tests and the binary entrypoint can both access
//! them.

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod router;
pub mod state;
