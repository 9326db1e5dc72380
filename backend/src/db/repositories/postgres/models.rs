use chrono::{NaiveDate, NaiveTime};
use diesel::prelude::*;

use super::schema::{reservation, reservation_time, theme};
use crate::models::{
    NewReservation, NewTheme, Reservation, ReservationId, Theme, ThemeId, TimeSlot, TimeSlotId,
};

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = reservation)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[allow(dead_code)] // foreign keys are read through the joined rows
pub struct ReservationRow {
    pub id: i64,
    pub name: String,
    pub date: NaiveDate,
    pub time_id: i64,
    pub theme_id: i64,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = reservation)]
pub struct NewReservationRow {
    pub name: String,
    pub date: NaiveDate,
    pub time_id: i64,
    pub theme_id: i64,
}

impl From<&NewReservation> for NewReservationRow {
    fn from(r: &NewReservation) -> Self {
        Self {
            name: r.name.clone(),
            date: r.date,
            time_id: r.time_id.value(),
            theme_id: r.theme_id.value(),
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = reservation_time)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct TimeSlotRow {
    pub id: i64,
    pub start_at: NaiveTime,
}

impl From<TimeSlotRow> for TimeSlot {
    fn from(row: TimeSlotRow) -> Self {
        TimeSlot {
            id: TimeSlotId(row.id),
            start_at: row.start_at,
        }
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = reservation_time)]
pub struct NewTimeSlotRow {
    pub start_at: NaiveTime,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = theme)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ThemeRow {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub thumbnail: String,
}

impl From<ThemeRow> for Theme {
    fn from(row: ThemeRow) -> Self {
        Theme {
            id: ThemeId(row.id),
            name: row.name,
            description: row.description,
            thumbnail: row.thumbnail,
        }
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = theme)]
pub struct NewThemeRow {
    pub name: String,
    pub description: String,
    pub thumbnail: String,
}

impl From<&NewTheme> for NewThemeRow {
    fn from(t: &NewTheme) -> Self {
        Self {
            name: t.name.clone(),
            description: t.description.clone(),
            thumbnail: t.thumbnail.clone(),
        }
    }
}

/// Result shape of the reservation ⋈ time ⋈ theme join.
pub type JoinedReservationRow = (ReservationRow, TimeSlotRow, ThemeRow);

pub fn joined_to_reservation((r, time, theme): JoinedReservationRow) -> Reservation {
    Reservation {
        id: ReservationId(r.id),
        name: r.name,
        date: r.date,
        time: time.into(),
        theme: theme.into(),
    }
}
