//! Application state for the HTTP server.

use std::sync::Arc;

use crate::clock::Clock;
use crate::db::repository::FullRepository;
use crate::services::{CatalogService, ReservationService};

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Repository instance, used directly by the health probe
    pub repository: Arc<dyn FullRepository>,
    pub reservations: ReservationService,
    pub catalog: CatalogService,
}

impl AppState {
    /// State whose reservation workflow uses the local wall-clock date.
    pub fn new(repository: Arc<dyn FullRepository>) -> Self {
        Self {
            reservations: ReservationService::new(repository.clone()),
            catalog: CatalogService::new(repository.clone()),
            repository,
        }
    }

    /// State whose reservation workflow takes "today" from `clock`.
    pub fn with_clock(repository: Arc<dyn FullRepository>, clock: Arc<dyn Clock>) -> Self {
        Self {
            reservations: ReservationService::with_clock(repository.clone(), clock),
            catalog: CatalogService::new(repository.clone()),
            repository,
        }
    }
}
