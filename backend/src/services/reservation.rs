//! Reservation workflow: listing, lookup, validated creation and cancellation.

use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{debug, info};

use super::error::{ServiceError, ServiceResult};
use crate::api::{ReservationRequest, ReservationResponse, DATE_FORMAT};
use crate::clock::{Clock, SystemClock};
use crate::db::repository::{
    FullRepository, ReservationRepository, ThemeRepository, TimeSlotRepository,
};
use crate::models::{NewReservation, ReservationId};

pub const INVALID_DATE_FORMAT: &str = "invalid date format";
pub const DATE_NOT_RESERVABLE: &str = "date not reservable";
pub const TIME_SLOT_NOT_FOUND: &str = "time slot does not exist";
pub const THEME_NOT_FOUND: &str = "theme does not exist";
pub const ALREADY_RESERVED: &str = "already reserved";
pub const RESERVATION_NOT_FOUND: &str = "no reservation matches the id";

/// `true` only for exactly four digits, a dash, two digits, a dash, two digits.
fn is_iso_date_shape(raw: &str) -> bool {
    let bytes = raw.as_bytes();
    bytes.len() == 10
        && bytes.iter().enumerate().all(|(i, b)| match i {
            4 | 7 => *b == b'-',
            _ => b.is_ascii_digit(),
        })
}

/// Parse `raw` as `YYYY-MM-DD` and require it to fall strictly after `today`.
///
/// # Errors
/// `BadRequest` with [`INVALID_DATE_FORMAT`] if the text is not a calendar
/// date, or with [`DATE_NOT_RESERVABLE`] if it is today or earlier.
pub fn parse_reservable_date(raw: &str, today: NaiveDate) -> ServiceResult<NaiveDate> {
    if !is_iso_date_shape(raw) {
        return Err(ServiceError::bad_request(INVALID_DATE_FORMAT));
    }
    let date = NaiveDate::parse_from_str(raw, DATE_FORMAT)
        .map_err(|_| ServiceError::bad_request(INVALID_DATE_FORMAT))?;

    if date <= today {
        return Err(ServiceError::bad_request(DATE_NOT_RESERVABLE));
    }

    Ok(date)
}

/// Validates and persists reservations.
#[derive(Clone)]
pub struct ReservationService {
    repository: Arc<dyn FullRepository>,
    clock: Arc<dyn Clock>,
}

impl ReservationService {
    /// Workflow backed by `repository`, using the local wall-clock date.
    pub fn new(repository: Arc<dyn FullRepository>) -> Self {
        Self::with_clock(repository, Arc::new(SystemClock))
    }

    pub fn with_clock(repository: Arc<dyn FullRepository>, clock: Arc<dyn Clock>) -> Self {
        Self { repository, clock }
    }

    /// All reservations, in ascending id order.
    pub async fn find_all(&self) -> ServiceResult<Vec<ReservationResponse>> {
        let reservations = self.repository.list_reservations().await?;
        Ok(ReservationResponse::from_reservations(reservations))
    }

    pub async fn find_one(&self, id: ReservationId) -> ServiceResult<ReservationResponse> {
        self.repository
            .find_reservation(id)
            .await?
            .map(ReservationResponse::from)
            .ok_or_else(|| ServiceError::not_found(RESERVATION_NOT_FOUND))
    }

    /// Validate `request` and store it, returning the new identifier.
    ///
    /// Checks run in order and the first failure wins:
    /// 1. the date parses and lies strictly after today (`BadRequest`)
    /// 2. the time slot exists (`NotFound`)
    /// 3. the theme exists (`NotFound`)
    /// 4. no reservation holds the same date, time slot and theme (`BadRequest`)
    ///
    /// Nothing is written unless all four pass.
    pub async fn make(&self, request: ReservationRequest) -> ServiceResult<ReservationId> {
        let date = parse_reservable_date(&request.date, self.clock.today())?;

        if self
            .repository
            .find_time_slot(request.time_id)
            .await?
            .is_none()
        {
            return Err(ServiceError::not_found(TIME_SLOT_NOT_FOUND));
        }

        if self.repository.find_theme(request.theme_id).await?.is_none() {
            return Err(ServiceError::not_found(THEME_NOT_FOUND));
        }

        let existing = self
            .repository
            .count_reservations_matching(date, request.time_id, request.theme_id)
            .await?;
        if existing > 0 {
            debug!(%date, time_id = %request.time_id, theme_id = %request.theme_id, "slot taken");
            return Err(ServiceError::bad_request(ALREADY_RESERVED));
        }

        let new_reservation = NewReservation {
            name: request.name,
            date,
            time_id: request.time_id,
            theme_id: request.theme_id,
        };

        let id = self
            .repository
            .save_reservation(&new_reservation)
            .await
            .map_err(|e| {
                // Lost a race with a concurrent request for the same slot.
                if e.is_conflict() {
                    ServiceError::bad_request(ALREADY_RESERVED)
                } else {
                    ServiceError::from(e)
                }
            })?;

        info!(%id, %date, "reservation created");
        Ok(id)
    }

    /// Delete a reservation; `NotFound` if nothing was removed.
    pub async fn cancel(&self, id: ReservationId) -> ServiceResult<()> {
        let removed = self.repository.delete_reservation(id).await?;
        if removed == 0 {
            return Err(ServiceError::not_found(RESERVATION_NOT_FOUND));
        }

        info!(%id, "reservation cancelled");
        Ok(())
    }
}
