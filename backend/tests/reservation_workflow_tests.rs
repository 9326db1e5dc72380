//! Tests for the reservation workflow: validation order, persistence and
//! cancellation, driven against the in-memory repository.

mod support;

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, NaiveDate, NaiveTime};
use escape_reservation::api::ReservationRequest;
use escape_reservation::db::{
    LocalRepository, RepositoryResult, ReservationRepository, ThemeRepository, TimeSlotRepository,
};
use escape_reservation::models::{
    NewReservation, NewTheme, Reservation, ReservationId, Theme, ThemeId, TimeSlot, TimeSlotId,
};
use escape_reservation::services::reservation::{
    ALREADY_RESERVED, DATE_NOT_RESERVABLE, INVALID_DATE_FORMAT, RESERVATION_NOT_FOUND,
    THEME_NOT_FOUND, TIME_SLOT_NOT_FOUND,
};
use escape_reservation::services::{ReservationService, ServiceError};

fn request(name: &str, date: &str, time_id: i64, theme_id: i64) -> ReservationRequest {
    ReservationRequest::new(name, date, TimeSlotId(time_id), ThemeId(theme_id))
}

fn days_from_today(days: i64) -> String {
    (support::fixed_today() + Duration::days(days))
        .format("%Y-%m-%d")
        .to_string()
}

fn assert_bad_request(err: ServiceError, expected: &str) {
    match err {
        ServiceError::BadRequest(msg) => assert_eq!(msg, expected),
        other => panic!("expected BadRequest({expected}), got {other:?}"),
    }
}

fn assert_not_found(err: ServiceError, expected: &str) {
    match err {
        ServiceError::NotFound(msg) => assert_eq!(msg, expected),
        other => panic!("expected NotFound({expected}), got {other:?}"),
    }
}

#[tokio::test]
async fn test_ann_scenario_succeeds_then_duplicates_fail() {
    let (repo, service) = support::seeded_service().await;

    let id = service
        .make(request("Ann", "2999-01-01", 1, 1))
        .await
        .unwrap();
    assert!(id.value() > 0);
    assert_eq!(repo.reservation_count(), 1);

    let err = service
        .make(request("Ann", "2999-01-01", 1, 1))
        .await
        .unwrap_err();
    assert_bad_request(err, ALREADY_RESERVED);
    assert_eq!(repo.reservation_count(), 1);
}

#[tokio::test]
async fn test_valid_requests_receive_unused_positive_ids() {
    let (_, service) = support::seeded_service().await;

    let mut seen = HashSet::new();
    for day in 1..=5 {
        let id = service
            .make(request("Bo", &days_from_today(day), 1, 1))
            .await
            .unwrap();
        assert!(id.value() > 0);
        assert!(seen.insert(id), "id {id} was handed out twice");
    }
}

#[tokio::test]
async fn test_date_equal_to_today_is_rejected() {
    let (repo, service) = support::seeded_service().await;
    let err = service
        .make(request("Cy", &days_from_today(0), 1, 1))
        .await
        .unwrap_err();
    assert_bad_request(err, DATE_NOT_RESERVABLE);
    assert_eq!(repo.reservation_count(), 0);
}

#[tokio::test]
async fn test_past_date_is_rejected() {
    let (_, service) = support::seeded_service().await;
    let err = service
        .make(request("Cy", &days_from_today(-30), 1, 1))
        .await
        .unwrap_err();
    assert_bad_request(err, DATE_NOT_RESERVABLE);
}

#[tokio::test]
async fn test_tomorrow_is_accepted() {
    let (_, service) = support::seeded_service().await;
    assert!(service
        .make(request("Cy", &days_from_today(1), 1, 1))
        .await
        .is_ok());
}

#[tokio::test]
async fn test_unparseable_date_is_rejected() {
    let (_, service) = support::seeded_service().await;
    for raw in ["2024-13-40", "not-a-date", "", "2999-02-30"] {
        let err = service
            .make(request("Di", raw, 1, 1))
            .await
            .unwrap_err();
        assert_bad_request(err, INVALID_DATE_FORMAT);
    }
}

#[tokio::test]
async fn test_unknown_time_slot_is_not_found_even_with_unknown_theme() {
    let (_, service) = support::seeded_service().await;

    let err = service
        .make(request("Ed", "2999-01-01", 99, 1))
        .await
        .unwrap_err();
    assert_not_found(err, TIME_SLOT_NOT_FOUND);

    let err = service
        .make(request("Ed", "2999-01-01", 99, 42))
        .await
        .unwrap_err();
    assert_not_found(err, TIME_SLOT_NOT_FOUND);
}

#[tokio::test]
async fn test_unknown_theme_is_not_found() {
    let (repo, service) = support::seeded_service().await;
    let err = service
        .make(request("Flo", "2999-01-01", 1, 42))
        .await
        .unwrap_err();
    assert_not_found(err, THEME_NOT_FOUND);
    assert_eq!(repo.reservation_count(), 0);
}

#[tokio::test]
async fn test_date_check_runs_before_reference_checks() {
    let (_, service) = support::seeded_service().await;
    let err = service
        .make(request("Gus", "2024-13-40", 99, 99))
        .await
        .unwrap_err();
    assert_bad_request(err, INVALID_DATE_FORMAT);
}

#[tokio::test]
async fn test_same_slot_on_other_date_is_allowed() {
    let (_, service) = support::seeded_service().await;
    service
        .make(request("Hal", "2999-01-01", 1, 1))
        .await
        .unwrap();
    service
        .make(request("Hal", "2999-01-02", 1, 1))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_find_all_returns_joined_reservations_in_id_order() {
    let (_, service) = support::seeded_service().await;
    let first = service
        .make(request("Ivy", "2999-01-02", 1, 1))
        .await
        .unwrap();
    let second = service
        .make(request("Jo", "2999-01-01", 1, 1))
        .await
        .unwrap();

    let all = service.find_all().await.unwrap();
    assert_eq!(
        all.iter().map(|r| r.id).collect::<Vec<_>>(),
        vec![first, second]
    );
    assert_eq!(all[0].name, "Ivy");
    assert_eq!(all[0].date, "2999-01-02");
    assert_eq!(all[0].time.start_at, "10:00");
    assert_eq!(all[0].theme.name, "Haunted Library");
}

#[tokio::test]
async fn test_find_one_unknown_id_is_not_found() {
    let (_, service) = support::seeded_service().await;
    let err = service.find_one(ReservationId(7)).await.unwrap_err();
    assert_not_found(err, RESERVATION_NOT_FOUND);
}

#[tokio::test]
async fn test_cancel_removes_exactly_one_record() {
    let (repo, service) = support::seeded_service().await;
    let keep = service
        .make(request("Kim", "2999-01-01", 1, 1))
        .await
        .unwrap();
    let gone = service
        .make(request("Lu", "2999-01-02", 1, 1))
        .await
        .unwrap();

    service.cancel(gone).await.unwrap();

    assert_eq!(repo.reservation_count(), 1);
    assert!(service.find_one(keep).await.is_ok());
    assert_not_found(
        service.find_one(gone).await.unwrap_err(),
        RESERVATION_NOT_FOUND,
    );
}

#[tokio::test]
async fn test_cancel_unknown_id_leaves_store_unchanged() {
    let (repo, service) = support::seeded_service().await;
    service
        .make(request("Mo", "2999-01-01", 1, 1))
        .await
        .unwrap();

    let err = service.cancel(ReservationId(999)).await.unwrap_err();
    assert_not_found(err, RESERVATION_NOT_FOUND);
    assert_eq!(repo.reservation_count(), 1);
}

#[tokio::test]
async fn test_slot_is_bookable_again_after_cancel() {
    let (_, service) = support::seeded_service().await;
    let id = service
        .make(request("Ned", "2999-01-01", 1, 1))
        .await
        .unwrap();
    service.cancel(id).await.unwrap();

    let again = service
        .make(request("Ned", "2999-01-01", 1, 1))
        .await
        .unwrap();
    assert_ne!(again, id);
}

#[tokio::test]
async fn test_concurrent_duplicates_store_one_reservation() {
    let (repo, service) = support::seeded_service().await;

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let service = service.clone();
            tokio::spawn(async move {
                service
                    .make(request(&format!("racer-{i}"), "2999-05-05", 1, 1))
                    .await
            })
        })
        .collect();

    let mut created = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => created += 1,
            Err(err) => assert_bad_request(err, ALREADY_RESERVED),
        }
    }

    assert_eq!(created, 1);
    assert_eq!(repo.reservation_count(), 1);
}

/// Reports every slot as free, so duplicates are caught only when saving.
struct StaleCountRepository(Arc<LocalRepository>);

#[async_trait]
impl ReservationRepository for StaleCountRepository {
    async fn health_check(&self) -> RepositoryResult<bool> {
        self.0.health_check().await
    }

    async fn list_reservations(&self) -> RepositoryResult<Vec<Reservation>> {
        self.0.list_reservations().await
    }

    async fn find_reservation(&self, id: ReservationId) -> RepositoryResult<Option<Reservation>> {
        self.0.find_reservation(id).await
    }

    async fn count_reservations_matching(
        &self,
        _date: NaiveDate,
        _time_id: TimeSlotId,
        _theme_id: ThemeId,
    ) -> RepositoryResult<u64> {
        Ok(0)
    }

    async fn save_reservation(
        &self,
        reservation: &NewReservation,
    ) -> RepositoryResult<ReservationId> {
        self.0.save_reservation(reservation).await
    }

    async fn delete_reservation(&self, id: ReservationId) -> RepositoryResult<u64> {
        self.0.delete_reservation(id).await
    }
}

#[async_trait]
impl TimeSlotRepository for StaleCountRepository {
    async fn find_time_slot(&self, id: TimeSlotId) -> RepositoryResult<Option<TimeSlot>> {
        self.0.find_time_slot(id).await
    }

    async fn list_time_slots(&self) -> RepositoryResult<Vec<TimeSlot>> {
        self.0.list_time_slots().await
    }

    async fn save_time_slot(&self, start_at: NaiveTime) -> RepositoryResult<TimeSlotId> {
        self.0.save_time_slot(start_at).await
    }
}

#[async_trait]
impl ThemeRepository for StaleCountRepository {
    async fn find_theme(&self, id: ThemeId) -> RepositoryResult<Option<Theme>> {
        self.0.find_theme(id).await
    }

    async fn list_themes(&self) -> RepositoryResult<Vec<Theme>> {
        self.0.list_themes().await
    }

    async fn save_theme(&self, theme: &NewTheme) -> RepositoryResult<ThemeId> {
        self.0.save_theme(theme).await
    }
}

#[tokio::test]
async fn test_conflict_on_save_is_reported_as_already_reserved() {
    let (local, time_id, theme_id) = support::seeded_repository().await;
    let date = NaiveDate::from_ymd_opt(2999, 5, 5).unwrap();
    local
        .save_reservation(&NewReservation {
            name: "first".to_string(),
            date,
            time_id,
            theme_id,
        })
        .await
        .unwrap();

    let repo = Arc::new(StaleCountRepository(local.clone()));
    let service = ReservationService::with_clock(repo, support::fixed_clock());

    let err = service
        .make(request("second", "2999-05-05", time_id.0, theme_id.0))
        .await
        .unwrap_err();
    assert_bad_request(err, ALREADY_RESERVED);
    assert_eq!(local.reservation_count(), 1);
}

#[tokio::test]
async fn test_repository_failures_surface_as_repository_errors() {
    let (repo, service) = support::seeded_service().await;
    repo.set_healthy(false);

    let err = service
        .make(request("Ola", "2999-01-01", 1, 1))
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Repository(_)));
}

#[tokio::test]
async fn test_default_clock_rejects_yesterday() {
    let repo = Arc::new(LocalRepository::new());
    let service = ReservationService::new(repo.clone());
    let yesterday: NaiveDate = chrono::Local::now().date_naive() - Duration::days(1);

    let err = service
        .make(request("Pia", &yesterday.format("%Y-%m-%d").to_string(), 1, 1))
        .await
        .unwrap_err();
    assert_bad_request(err, DATE_NOT_RESERVABLE);
    assert!(repo.list_reservations().await.unwrap().is_empty());
}
