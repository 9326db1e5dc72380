//! Data Transfer Objects for the HTTP API.
//!
//! Request and response bodies live in [`crate::api`]; they are re-exported
//! here next to the few types that only exist at the HTTP layer.

use serde::{Deserialize, Serialize};

pub use super::error::ErrorResponse;
pub use crate::api::{
    CreatedResponse, ReservationRequest, ReservationResponse, ThemeRequest, ThemeResponse,
    TimeSlotRequest, TimeSlotResponse,
};

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Status of the service
    pub status: String,
    /// Crate version
    pub version: String,
    /// Repository connection status
    pub database: String,
}
