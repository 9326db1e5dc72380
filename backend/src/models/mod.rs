//! Domain types shared by the repositories and the reservation workflow.

pub mod macros;

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

crate::define_id_type!(i64, ReservationId);
crate::define_id_type!(i64, TimeSlotId);
crate::define_id_type!(i64, ThemeId);

/// A bookable time of day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSlot {
    pub id: TimeSlotId,
    pub start_at: NaiveTime,
}

/// An escape-room theme that can be booked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Theme {
    pub id: ThemeId,
    pub name: String,
    pub description: String,
    pub thumbnail: String,
}

/// Theme fields before the store assigns an identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTheme {
    pub name: String,
    pub description: String,
    pub thumbnail: String,
}

/// A stored reservation joined with the time slot and theme it references.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reservation {
    pub id: ReservationId,
    pub name: String,
    pub date: NaiveDate,
    pub time: TimeSlot,
    pub theme: Theme,
}

/// A validated reservation ready to be persisted.
///
/// The tuple `(date, time_id, theme_id)` identifies the booked room-slot and
/// must be unique across stored reservations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewReservation {
    pub name: String,
    pub date: NaiveDate,
    pub time_id: TimeSlotId,
    pub theme_id: ThemeId,
}
