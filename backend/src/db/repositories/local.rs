//! In-memory local repository implementation.
//!
//! Stores everything in ordered maps behind a single lock, which makes it
//! deterministic and isolated for unit tests and local development. The
//! duplicate check in [`ReservationRepository::save_reservation`] runs under
//! the write lock, so concurrent saves of the same triple cannot both succeed.

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

use crate::db::repository::*;
use crate::models::{
    NewReservation, NewTheme, Reservation, ReservationId, Theme, ThemeId, TimeSlot, TimeSlotId,
};

/// In-memory local repository.
///
/// # Example
/// ```
/// use escape_reservation::db::repositories::LocalRepository;
/// use escape_reservation::db::repository::TimeSlotRepository;
///
/// # tokio_test_block(async {
/// let repo = LocalRepository::new();
/// let id = repo
///     .save_time_slot(chrono::NaiveTime::from_hms_opt(10, 0, 0).unwrap())
///     .await
///     .unwrap();
/// assert!(repo.find_time_slot(id).await.unwrap().is_some());
/// # });
/// # fn tokio_test_block<F: std::future::Future>(f: F) -> F::Output {
/// #     tokio::runtime::Runtime::new().unwrap().block_on(f)
/// # }
/// ```
#[derive(Clone)]
pub struct LocalRepository {
    data: Arc<RwLock<LocalData>>,
}

#[derive(Debug, Clone)]
struct StoredReservation {
    name: String,
    date: NaiveDate,
    time_id: TimeSlotId,
    theme_id: ThemeId,
}

struct LocalData {
    reservations: BTreeMap<ReservationId, StoredReservation>,
    time_slots: BTreeMap<TimeSlotId, TimeSlot>,
    themes: BTreeMap<ThemeId, Theme>,

    // ID counters
    next_reservation_id: i64,
    next_time_slot_id: i64,
    next_theme_id: i64,

    // Connection health
    is_healthy: bool,
}

impl Default for LocalData {
    fn default() -> Self {
        Self {
            reservations: BTreeMap::new(),
            time_slots: BTreeMap::new(),
            themes: BTreeMap::new(),
            next_reservation_id: 1,
            next_time_slot_id: 1,
            next_theme_id: 1,
            is_healthy: true,
        }
    }
}

impl LocalData {
    fn join(&self, id: ReservationId, stored: &StoredReservation) -> RepositoryResult<Reservation> {
        let time = self.time_slots.get(&stored.time_id).cloned().ok_or_else(|| {
            RepositoryError::internal_with_context(
                "reservation references a missing time slot",
                ErrorContext::new("join_reservation")
                    .with_entity("reservation")
                    .with_entity_id(id),
            )
        })?;
        let theme = self.themes.get(&stored.theme_id).cloned().ok_or_else(|| {
            RepositoryError::internal_with_context(
                "reservation references a missing theme",
                ErrorContext::new("join_reservation")
                    .with_entity("reservation")
                    .with_entity_id(id),
            )
        })?;

        Ok(Reservation {
            id,
            name: stored.name.clone(),
            date: stored.date,
            time,
            theme,
        })
    }

    fn count_matching(&self, date: NaiveDate, time_id: TimeSlotId, theme_id: ThemeId) -> u64 {
        self.reservations
            .values()
            .filter(|r| r.date == date && r.time_id == time_id && r.theme_id == theme_id)
            .count() as u64
    }
}

impl LocalRepository {
    /// Create a new empty local repository.
    pub fn new() -> Self {
        Self {
            data: Arc::new(RwLock::new(LocalData::default())),
        }
    }

    /// Set the health status for testing connection failures.
    pub fn set_healthy(&self, healthy: bool) {
        self.data.write().is_healthy = healthy;
    }

    /// Clear all data from the repository. Identifier counters restart at 1.
    pub fn clear(&self) {
        let mut data = self.data.write();
        *data = LocalData {
            is_healthy: data.is_healthy,
            ..Default::default()
        };
    }

    /// Get the number of reservations stored.
    pub fn reservation_count(&self) -> usize {
        self.data.read().reservations.len()
    }

    fn check_health(&self, operation: &str) -> RepositoryResult<()> {
        if !self.data.read().is_healthy {
            return Err(RepositoryError::connection_with_context(
                "Database is not healthy",
                ErrorContext::new(operation),
            ));
        }
        Ok(())
    }
}

impl Default for LocalRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ReservationRepository for LocalRepository {
    async fn health_check(&self) -> RepositoryResult<bool> {
        Ok(self.data.read().is_healthy)
    }

    async fn list_reservations(&self) -> RepositoryResult<Vec<Reservation>> {
        self.check_health("list_reservations")?;
        let data = self.data.read();
        data.reservations
            .iter()
            .map(|(id, stored)| data.join(*id, stored))
            .collect()
    }

    async fn find_reservation(&self, id: ReservationId) -> RepositoryResult<Option<Reservation>> {
        self.check_health("find_reservation")?;
        let data = self.data.read();
        data.reservations
            .get(&id)
            .map(|stored| data.join(id, stored))
            .transpose()
    }

    async fn count_reservations_matching(
        &self,
        date: NaiveDate,
        time_id: TimeSlotId,
        theme_id: ThemeId,
    ) -> RepositoryResult<u64> {
        self.check_health("count_reservations_matching")?;
        Ok(self.data.read().count_matching(date, time_id, theme_id))
    }

    async fn save_reservation(
        &self,
        reservation: &NewReservation,
    ) -> RepositoryResult<ReservationId> {
        self.check_health("save_reservation")?;
        let mut data = self.data.write();

        if !data.time_slots.contains_key(&reservation.time_id) {
            return Err(RepositoryError::validation_with_context(
                "time slot foreign key violated",
                ErrorContext::new("save_reservation")
                    .with_entity("time_slot")
                    .with_entity_id(reservation.time_id),
            ));
        }
        if !data.themes.contains_key(&reservation.theme_id) {
            return Err(RepositoryError::validation_with_context(
                "theme foreign key violated",
                ErrorContext::new("save_reservation")
                    .with_entity("theme")
                    .with_entity_id(reservation.theme_id),
            ));
        }
        if data.count_matching(reservation.date, reservation.time_id, reservation.theme_id) > 0 {
            return Err(RepositoryError::conflict_with_context(
                "reservation triple already booked",
                ErrorContext::new("save_reservation")
                    .with_entity("reservation")
                    .with_details(format!(
                        "date={}, time_id={}, theme_id={}",
                        reservation.date, reservation.time_id, reservation.theme_id
                    )),
            ));
        }

        let id = ReservationId::new(data.next_reservation_id);
        data.next_reservation_id += 1;
        data.reservations.insert(
            id,
            StoredReservation {
                name: reservation.name.clone(),
                date: reservation.date,
                time_id: reservation.time_id,
                theme_id: reservation.theme_id,
            },
        );
        debug!(reservation_id = %id, "stored reservation in memory");

        Ok(id)
    }

    async fn delete_reservation(&self, id: ReservationId) -> RepositoryResult<u64> {
        self.check_health("delete_reservation")?;
        let removed = self.data.write().reservations.remove(&id).is_some();
        Ok(u64::from(removed))
    }
}

#[async_trait]
impl TimeSlotRepository for LocalRepository {
    async fn find_time_slot(&self, id: TimeSlotId) -> RepositoryResult<Option<TimeSlot>> {
        self.check_health("find_time_slot")?;
        Ok(self.data.read().time_slots.get(&id).cloned())
    }

    async fn list_time_slots(&self) -> RepositoryResult<Vec<TimeSlot>> {
        self.check_health("list_time_slots")?;
        Ok(self.data.read().time_slots.values().cloned().collect())
    }

    async fn save_time_slot(&self, start_at: NaiveTime) -> RepositoryResult<TimeSlotId> {
        self.check_health("save_time_slot")?;
        let mut data = self.data.write();
        let id = TimeSlotId::new(data.next_time_slot_id);
        data.next_time_slot_id += 1;
        data.time_slots.insert(id, TimeSlot { id, start_at });
        Ok(id)
    }
}

#[async_trait]
impl ThemeRepository for LocalRepository {
    async fn find_theme(&self, id: ThemeId) -> RepositoryResult<Option<Theme>> {
        self.check_health("find_theme")?;
        Ok(self.data.read().themes.get(&id).cloned())
    }

    async fn list_themes(&self) -> RepositoryResult<Vec<Theme>> {
        self.check_health("list_themes")?;
        Ok(self.data.read().themes.values().cloned().collect())
    }

    async fn save_theme(&self, theme: &NewTheme) -> RepositoryResult<ThemeId> {
        self.check_health("save_theme")?;
        let mut data = self.data.write();
        let id = ThemeId::new(data.next_theme_id);
        data.next_theme_id += 1;
        data.themes.insert(
            id,
            Theme {
                id,
                name: theme.name.clone(),
                description: theme.description.clone(),
                thumbnail: theme.thumbnail.clone(),
            },
        );
        Ok(id)
    }
}
