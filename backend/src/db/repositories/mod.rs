//! Repository implementations.
//!
//! - `local`: in-memory storage for tests and local development
//! - `postgres`: PostgreSQL storage with Diesel ORM
pub mod local;
#[cfg(feature = "postgres-repo")]
pub mod postgres;

pub use local::LocalRepository;
#[cfg(feature = "postgres-repo")]
pub use postgres::{PoolStats, PostgresConfig, PostgresRepository};
