//! Time slots and themes that reservations refer to.

use std::sync::Arc;

use chrono::NaiveTime;
use tracing::info;

use super::error::{ServiceError, ServiceResult};
use crate::api::{ThemeRequest, ThemeResponse, TimeSlotRequest, TimeSlotResponse, START_AT_FORMAT};
use crate::db::repository::{FullRepository, RepositoryError, ThemeRepository, TimeSlotRepository};
use crate::models::{NewTheme, ThemeId, TimeSlotId};

pub const INVALID_TIME_FORMAT: &str = "invalid time format";
pub const THEME_NAME_REQUIRED: &str = "theme name is required";

#[derive(Clone)]
pub struct CatalogService {
    repository: Arc<dyn FullRepository>,
}

impl CatalogService {
    pub fn new(repository: Arc<dyn FullRepository>) -> Self {
        Self { repository }
    }

    pub async fn list_time_slots(&self) -> ServiceResult<Vec<TimeSlotResponse>> {
        let slots = self.repository.list_time_slots().await?;
        Ok(slots.into_iter().map(TimeSlotResponse::from).collect())
    }

    /// Register a bookable start time given as `HH:MM`.
    pub async fn add_time_slot(&self, request: TimeSlotRequest) -> ServiceResult<TimeSlotId> {
        let start_at = NaiveTime::parse_from_str(request.start_at.trim(), START_AT_FORMAT)
            .map_err(|_| ServiceError::bad_request(INVALID_TIME_FORMAT))?;

        let id = self.repository.save_time_slot(start_at).await?;
        info!(%id, %start_at, "time slot added");
        Ok(id)
    }

    pub async fn list_themes(&self) -> ServiceResult<Vec<ThemeResponse>> {
        let themes = self.repository.list_themes().await?;
        Ok(themes.into_iter().map(ThemeResponse::from).collect())
    }

    pub async fn add_theme(&self, request: ThemeRequest) -> ServiceResult<ThemeId> {
        let name = request.name.trim();
        if name.is_empty() {
            return Err(ServiceError::bad_request(THEME_NAME_REQUIRED));
        }

        let theme = NewTheme {
            name: name.to_string(),
            description: request.description,
            thumbnail: request.thumbnail,
        };
        let id = self.repository.save_theme(&theme).await?;
        info!(%id, name = %theme.name, "theme added");
        Ok(id)
    }
}

/// Insert one time slot and one theme so a fresh store can take bookings.
///
/// Does nothing when the store already holds either kind of entry.
pub async fn seed_demo_catalog(repository: &dyn FullRepository) -> ServiceResult<bool> {
    if !repository.list_time_slots().await?.is_empty()
        || !repository.list_themes().await?.is_empty()
    {
        return Ok(false);
    }

    let ten = NaiveTime::from_hms_opt(10, 0, 0)
        .ok_or_else(|| RepositoryError::internal("invalid demo start time"))?;
    let time_id = repository.save_time_slot(ten).await?;
    let theme_id = repository
        .save_theme(&NewTheme {
            name: "Lost Laboratory".to_string(),
            description: "Escape the sealed lab before the timer runs out.".to_string(),
            thumbnail: "https://example.com/themes/lost-laboratory.png".to_string(),
        })
        .await?;

    info!(%time_id, %theme_id, "demo catalog seeded");
    Ok(true)
}
