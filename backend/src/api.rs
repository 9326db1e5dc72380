//! Request and response DTOs for the reservation API.
//!
//! Field names follow the JSON wire format (`timeId`, `startAt`, ...).

use serde::{Deserialize, Serialize};

use crate::models::{Reservation, ReservationId, Theme, ThemeId, TimeSlot, TimeSlotId};

/// Wire format for a time slot's start time.
pub const START_AT_FORMAT: &str = "%H:%M";

/// Wire format for reservation dates.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Body of a reservation creation request.
///
/// `date` is kept as raw text so that an unparseable date is reported by the
/// workflow as a validation failure rather than a deserialization error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReservationRequest {
    pub name: String,
    pub date: String,
    pub time_id: TimeSlotId,
    pub theme_id: ThemeId,
}

impl ReservationRequest {
    pub fn new(
        name: impl Into<String>,
        date: impl Into<String>,
        time_id: impl Into<TimeSlotId>,
        theme_id: impl Into<ThemeId>,
    ) -> Self {
        Self {
            name: name.into(),
            date: date.into(),
            time_id: time_id.into(),
            theme_id: theme_id.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeSlotResponse {
    pub id: TimeSlotId,
    pub start_at: String,
}

impl From<TimeSlot> for TimeSlotResponse {
    fn from(slot: TimeSlot) -> Self {
        Self {
            id: slot.id,
            start_at: slot.start_at.format(START_AT_FORMAT).to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThemeResponse {
    pub id: ThemeId,
    pub name: String,
    pub description: String,
    pub thumbnail: String,
}

impl From<Theme> for ThemeResponse {
    fn from(theme: Theme) -> Self {
        Self {
            id: theme.id,
            name: theme.name,
            description: theme.description,
            thumbnail: theme.thumbnail,
        }
    }
}

/// A reservation as listed or fetched by clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReservationResponse {
    pub id: ReservationId,
    pub name: String,
    /// Calendar date as `YYYY-MM-DD`.
    pub date: String,
    pub time: TimeSlotResponse,
    pub theme: ThemeResponse,
}

impl From<Reservation> for ReservationResponse {
    fn from(reservation: Reservation) -> Self {
        Self {
            id: reservation.id,
            name: reservation.name,
            date: reservation.date.format(DATE_FORMAT).to_string(),
            time: reservation.time.into(),
            theme: reservation.theme.into(),
        }
    }
}

impl ReservationResponse {
    pub fn from_reservations(reservations: Vec<Reservation>) -> Vec<Self> {
        reservations.into_iter().map(Into::into).collect()
    }
}

/// Body of a time slot creation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeSlotRequest {
    /// Start time as `HH:MM`.
    pub start_at: String,
}

/// Body of a theme creation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThemeRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub thumbnail: String,
}

/// Identifier returned by creation endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedResponse<Id> {
    pub id: Id,
}
