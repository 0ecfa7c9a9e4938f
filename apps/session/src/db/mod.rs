//! Local SQLite database operations.

pub mod date_utils;
pub mod repository;
pub mod schema;

pub use repository::SqliteStore;
