//! # votegate-database
//!
//! PostgreSQL connection management, migrations, and repositories for
//! students, voting sessions, and the waiting queue.

pub mod connection;
pub mod migration;
pub mod repositories;

pub use connection::{DatabasePool, SchemaHealth};
