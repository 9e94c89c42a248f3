//! Serve i18n translation strings from a single SQL table and provision
//! new languages from a canonical key set.
//!
//! - `keypath`: dotted keys <-> nested trees
//! - `db`: the translation store
//! - `query`: read operations behind the HTTP API
//! - `server`: axum routes
//! - `provision`: add / delete a language

pub mod config;
pub mod db;
pub mod error;
pub mod keypath;
pub mod provision;
pub mod query;
pub mod server;

pub use error::{Error, Result};
