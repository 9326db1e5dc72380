//! Service layer between the HTTP handlers and the repositories.
//!
//! Services own the validation rules and raise [`ServiceError`]s; translation
//! into HTTP responses happens only in `http::error`.

pub mod catalog;
pub mod error;
pub mod reservation;

pub use catalog::{seed_demo_catalog, CatalogService};
pub use error::{ServiceError, ServiceResult};
pub use reservation::{parse_reservable_date, ReservationService};
