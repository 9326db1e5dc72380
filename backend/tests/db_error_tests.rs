//! Tests for db::repository::error module.

use escape_reservation::db::repository::{ErrorContext, RepositoryError, RepositoryResult};

#[test]
fn test_error_context_new() {
    let ctx = ErrorContext::new("find_theme");
    assert_eq!(ctx.operation, Some("find_theme".to_string()));
    assert!(ctx.entity.is_none());
    assert!(ctx.entity_id.is_none());
    assert!(ctx.details.is_none());
    assert!(!ctx.retryable);
}

#[test]
fn test_error_context_chaining() {
    let ctx = ErrorContext::new("save_reservation")
        .with_entity("reservation")
        .with_entity_id(42)
        .with_details("date=2999-01-01")
        .retryable();

    assert_eq!(ctx.operation, Some("save_reservation".to_string()));
    assert_eq!(ctx.entity, Some("reservation".to_string()));
    assert_eq!(ctx.entity_id, Some("42".to_string()));
    assert_eq!(ctx.details, Some("date=2999-01-01".to_string()));
    assert!(ctx.retryable);
}

#[test]
fn test_error_context_display() {
    let ctx = ErrorContext::new("find_time_slot")
        .with_entity("time_slot")
        .with_entity_id("7")
        .retryable();

    let display = format!("{}", ctx);
    assert!(display.contains("operation=find_time_slot"));
    assert!(display.contains("entity=time_slot"));
    assert!(display.contains("id=7"));
    assert!(display.contains("retryable=true"));
}

#[test]
fn test_error_context_default_is_empty() {
    assert_eq!(format!("{}", ErrorContext::default()), "[]");
}

#[test]
fn test_repository_error_display_prefixes() {
    let cases = [
        (RepositoryError::connection("refused"), "Connection error"),
        (RepositoryError::query("bad column"), "Query error"),
        (RepositoryError::not_found("no row"), "Not found"),
        (RepositoryError::configuration("missing url"), "Configuration error"),
        (RepositoryError::internal("unexpected state"), "Internal error"),
    ];

    for (err, prefix) in cases {
        let text = err.to_string();
        assert!(text.starts_with(prefix), "{text} should start with {prefix}");
        assert!(text.contains(err.message()));
    }
}

#[test]
fn test_conflict_is_not_retryable() {
    let err = RepositoryError::conflict_with_context(
        "reservation triple already booked",
        ErrorContext::new("save_reservation").with_entity("reservation"),
    );
    assert!(err.is_conflict());
    assert!(!err.is_retryable());
    assert!(err.to_string().contains("Conflict"));
}

#[test]
fn test_connection_errors_are_retryable() {
    assert!(RepositoryError::connection("temp failure").is_retryable());
    let err = RepositoryError::connection_with_context("pool", ErrorContext::new("get"));
    assert!(err.is_retryable());
}

#[test]
fn test_not_found_and_validation_are_not_retryable() {
    assert!(!RepositoryError::not_found("missing").is_retryable());
    assert!(!RepositoryError::validation_with_context(
        "theme foreign key violated",
        ErrorContext::new("save_reservation")
    )
    .is_retryable());
}

#[test]
fn test_repository_error_with_operation() {
    let err = RepositoryError::query("error").with_operation("list_reservations");
    assert_eq!(
        err.context().operation.as_deref(),
        Some("list_reservations")
    );
    assert!(err.to_string().contains("operation=list_reservations"));
}

#[test]
fn test_repository_result_err() {
    let result: RepositoryResult<i32> = Err(RepositoryError::not_found("test"));
    assert!(matches!(result, Err(RepositoryError::NotFound { .. })));
}
