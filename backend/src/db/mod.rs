//! Storage layer for reservations, time slots and themes.
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │  HTTP handlers (http::handlers)              │
//! └───────────────────┬──────────────────────────┘
//!                     │
//! ┌───────────────────▼──────────────────────────┐
//! │  Services (services) - validation workflow   │
//! └───────────────────┬──────────────────────────┘
//!                     │
//! ┌───────────────────▼──────────────────────────┐
//! │  Repository traits (repository)              │
//! └───────────┬───────────────────────┬──────────┘
//!             │                       │
//!   ┌─────────▼─────────┐   ┌─────────▼─────────┐
//!   │ LocalRepository   │   │ PostgresRepository│
//!   │ (in-memory)       │   │ (diesel + r2d2)   │
//!   └───────────────────┘   └───────────────────┘
//! ```
//!
//! Use [`RepositoryFactory`] or [`RepositoryBuilder`] to construct a backend,
//! or [`init_repository`] to install a process-wide instance.

#[cfg(not(any(feature = "postgres-repo", feature = "local-repo")))]
compile_error!("Enable at least one repository backend feature.");

pub mod factory;
pub mod repositories;
pub mod repository;

// Postgres config is colocated with the repository implementation.
#[cfg(feature = "postgres-repo")]
pub use repositories::postgres::{PoolStats, PostgresConfig};
#[cfg(not(feature = "postgres-repo"))]
#[derive(Debug, Clone)]
pub struct PostgresConfig {
    _private: (),
}
#[cfg(not(feature = "postgres-repo"))]
#[derive(Debug, Clone, Default)]
pub struct PoolStats {
    _private: (),
}

pub use factory::{RepositoryBuilder, RepositoryFactory, RepositoryType};
pub use repositories::LocalRepository;
#[cfg(feature = "postgres-repo")]
pub use repositories::PostgresRepository;
pub use repository::{
    ErrorContext, FullRepository, RepositoryError, RepositoryResult, ReservationRepository,
    ThemeRepository, TimeSlotRepository,
};

use crate::config::AppConfig;
use anyhow::{Context, Result};
use std::sync::{Arc, OnceLock};

/// Global repository instance initialized once per process.
static REPOSITORY: OnceLock<Arc<dyn FullRepository>> = OnceLock::new();

/// Initialize the global repository singleton.
///
/// The backend comes from `config` when one was loaded, unless `REPOSITORY_TYPE`,
/// `DATABASE_URL` or `PG_DATABASE_URL` is set; see
/// [`RepositoryFactory::from_config_or_env`]. Calling this again after a
/// successful initialization is a no-op.
pub async fn init_repository(config: Option<&AppConfig>) -> Result<Arc<dyn FullRepository>> {
    if let Some(repo) = REPOSITORY.get() {
        return Ok(repo.clone());
    }

    let repo = RepositoryFactory::from_config_or_env(config)
        .await
        .context("Failed to initialize repository")?;
    Ok(REPOSITORY.get_or_init(|| repo).clone())
}

/// Get the global repository instance.
pub fn get_repository() -> Result<&'static Arc<dyn FullRepository>> {
    REPOSITORY
        .get()
        .context("Repository not initialized. Call init_repository() first.")
}
