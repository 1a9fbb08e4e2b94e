//! Vitrine Kernel Library
//!
//! Keyset-paginated catalogue listings and transactional review aggregates.
//! The main entry point for running the server is the `vitrine` binary.

pub mod config;
pub mod db;
pub mod error;
pub mod format;
pub mod listing;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
pub mod store;
pub mod validation;

pub use config::Config;
pub use state::AppState;
