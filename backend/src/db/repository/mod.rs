//! Repository traits for reservation storage.
//!
//! The reservation workflow depends only on these traits, so any storage
//! backend (in-memory, Postgres) can be plugged in behind
//! `Arc<dyn FullRepository>`.
//!
//! Single-row lookups return `Option`: an absent row is a normal outcome and
//! the caller decides which error it means.

mod error;

pub use error::{ErrorContext, RepositoryError, RepositoryResult};

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};

use crate::models::{
    NewReservation, NewTheme, Reservation, ReservationId, Theme, ThemeId, TimeSlot, TimeSlotId,
};

/// Storage operations for reservations.
///
/// # Thread Safety
/// Implementations must be `Send + Sync` to be shared across request handlers.
#[async_trait]
pub trait ReservationRepository: Send + Sync {
    /// Check that the backing store is reachable.
    async fn health_check(&self) -> RepositoryResult<bool>;

    /// All reservations joined with their time slot and theme.
    async fn list_reservations(&self) -> RepositoryResult<Vec<Reservation>>;

    async fn find_reservation(&self, id: ReservationId) -> RepositoryResult<Option<Reservation>>;

    /// Number of reservations booked for exactly this `(date, time, theme)` triple.
    async fn count_reservations_matching(
        &self,
        date: NaiveDate,
        time_id: TimeSlotId,
        theme_id: ThemeId,
    ) -> RepositoryResult<u64>;

    /// Persist a reservation and return its newly assigned identifier.
    ///
    /// Fails with [`RepositoryError::ConflictError`] if the triple is already booked.
    async fn save_reservation(&self, reservation: &NewReservation)
        -> RepositoryResult<ReservationId>;

    /// Delete a reservation, returning the number of removed rows (0 or 1).
    async fn delete_reservation(&self, id: ReservationId) -> RepositoryResult<u64>;
}

/// Storage operations for bookable time slots.
#[async_trait]
pub trait TimeSlotRepository: Send + Sync {
    async fn find_time_slot(&self, id: TimeSlotId) -> RepositoryResult<Option<TimeSlot>>;

    async fn list_time_slots(&self) -> RepositoryResult<Vec<TimeSlot>>;

    async fn save_time_slot(&self, start_at: NaiveTime) -> RepositoryResult<TimeSlotId>;
}

/// Storage operations for themes.
#[async_trait]
pub trait ThemeRepository: Send + Sync {
    async fn find_theme(&self, id: ThemeId) -> RepositoryResult<Option<Theme>>;

    async fn list_themes(&self) -> RepositoryResult<Vec<Theme>>;

    async fn save_theme(&self, theme: &NewTheme) -> RepositoryResult<ThemeId>;
}

/// Everything the application needs from a storage backend.
pub trait FullRepository: ReservationRepository + TimeSlotRepository + ThemeRepository {}

impl<T> FullRepository for T where T: ReservationRepository + TimeSlotRepository + ThemeRepository
{}
