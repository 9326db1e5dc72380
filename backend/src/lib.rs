//! # Escape Room Reservation Backend
//!
//! Reservation management for escape-room sessions. Clients book a theme
//! at a time slot on a future date, list and fetch bookings, and cancel
//! them. The backend exposes a REST API via Axum.
//!
//! ## Features
//!
//! - **Reservation workflow**: date, time slot, theme and duplicate checks
//!   before anything is stored
//! - **Catalog**: time slots and themes that reservations refer to
//! - **Storage**: in-memory repository, or Postgres via Diesel
//! - **HTTP API**: JSON endpoints with uniform `{message}` error bodies
//!
//! ## Architecture
//!
//! - [`api`]: request and response bodies
//! - [`models`]: domain types and identifiers
//! - [`db`]: repository traits, implementations and factory
//! - [`services`]: reservation workflow and catalog
//! - [`http`]: Axum router, handlers and error translation
//! - [`config`]: `reservation.toml` settings
//! - [`clock`]: source of "today" for date validation

// Allow large error types - RepositoryError contains rich context for debugging
#![allow(clippy::result_large_err)]

pub mod api;
pub mod clock;
pub mod config;
pub mod db;
pub mod models;
pub mod services;

#[cfg(feature = "http-server")]
pub mod http;
