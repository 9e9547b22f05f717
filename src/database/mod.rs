/// Database module for PostgreSQL integration
///
/// This module provides:
/// - Connection pooling and embedded migrations
/// - Repository traits and their diesel implementations
/// - Database models, string-backed enums and schema

pub mod connection;
pub mod enums;
pub mod models;
pub mod repositories;
pub mod schema;

pub use connection::{establish_connection_pool, run_migrations, DatabaseError, DatabasePool};
