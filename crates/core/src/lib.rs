//! Domain logic for the hash-run event API.
//!
//! Turns loosely-typed WordPress Event Manager rows (posts, post meta, and
//! the PHP-serialized form field configuration) into validated [`event::HashEvent`]
//! records and evaluates client-supplied filter parameters against them.
//! Everything here is pure; database and HTTP concerns live in the
//! `hareline-db`, `hareline-listmonk`, and `hareline-api` crates.

pub mod assemble;
pub mod error;
pub mod event;
pub mod fields;
pub mod filter;
pub mod form_schema;
pub mod phpserde;
pub mod settings;
pub mod store;
pub mod text;

pub use error::CoreError;
