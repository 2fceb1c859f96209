//! Data layer module
//!
//! Handles all persistence:
//! - SQLite daily state, profile, and tracked-user storage
//! - Date-keyed daily state lifecycle helpers

mod database;
mod models;

pub use database::Database;
pub use models::*;

#[cfg(test)]
mod database_test;
