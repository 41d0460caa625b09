//! Storage module
//!
//! SQLite-backed persistence for the enrollment schema.

pub mod database;
pub mod migrations;
pub mod seed;

pub use database::{Database, DatabaseConfig};
