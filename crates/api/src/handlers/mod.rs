//! HTTP request handlers.

pub mod health;
pub mod newsletter;
pub mod runs;
