//! HTTP handlers for the REST API.
//!
//! Handlers only extract, delegate to the services and shape the response.
//! Malformed bodies and paths are reported through [`AppError`] so every
//! failure shares the `{message}` body.

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};

use super::dto::{
    CreatedResponse, HealthResponse, ReservationRequest, ReservationResponse, ThemeRequest,
    ThemeResponse, TimeSlotRequest, TimeSlotResponse,
};
use super::error::AppError;
use super::state::AppState;
use crate::db::repository::ReservationRepository;
use crate::models::ReservationId;

/// Result type for handlers.
pub type HandlerResult<T> = Result<Json<T>, AppError>;

// =============================================================================
// Health Check
// =============================================================================

/// GET /health
pub async fn health_check(State(state): State<AppState>) -> HandlerResult<HealthResponse> {
    let db_status = match state.repository.health_check().await {
        Ok(true) => "connected".to_string(),
        Ok(false) => "disconnected".to_string(),
        Err(e) => format!("error: {}", e),
    };

    Ok(Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        database: db_status,
    }))
}

// =============================================================================
// Reservations
// =============================================================================

/// GET /reservations
pub async fn list_reservations(
    State(state): State<AppState>,
) -> HandlerResult<Vec<ReservationResponse>> {
    Ok(Json(state.reservations.find_all().await?))
}

/// GET /reservations/{id}
pub async fn get_reservation(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> HandlerResult<ReservationResponse> {
    let Path(id) = id?;
    Ok(Json(state.reservations.find_one(ReservationId::new(id)).await?))
}

/// POST /reservations
///
/// Responds `201 Created` with the new id and a `Location` header.
pub async fn create_reservation(
    State(state): State<AppState>,
    payload: Result<Json<ReservationRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(request) = payload?;
    let id = state.reservations.make(request).await?;

    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, format!("/reservations/{}", id))],
        Json(CreatedResponse { id }),
    ))
}

/// DELETE /reservations/{id}
pub async fn cancel_reservation(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<StatusCode, AppError> {
    let Path(id) = id?;
    state.reservations.cancel(ReservationId::new(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// Catalog
// =============================================================================

/// GET /times
pub async fn list_time_slots(
    State(state): State<AppState>,
) -> HandlerResult<Vec<TimeSlotResponse>> {
    Ok(Json(state.catalog.list_time_slots().await?))
}

/// POST /times
pub async fn create_time_slot(
    State(state): State<AppState>,
    payload: Result<Json<TimeSlotRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(request) = payload?;
    let id = state.catalog.add_time_slot(request).await?;
    Ok((StatusCode::CREATED, Json(CreatedResponse { id })))
}

/// GET /themes
pub async fn list_themes(State(state): State<AppState>) -> HandlerResult<Vec<ThemeResponse>> {
    Ok(Json(state.catalog.list_themes().await?))
}

/// POST /themes
pub async fn create_theme(
    State(state): State<AppState>,
    payload: Result<Json<ThemeRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(request) = payload?;
    let id = state.catalog.add_theme(request).await?;
    Ok((StatusCode::CREATED, Json(CreatedResponse { id })))
}
