//! Postgres repository implementation using Diesel.
//!
//! ## Features
//!
//! - Connection pooling with r2d2
//! - Automatic retry for transient failures
//! - Pool statistics for monitoring
//! - Embedded migrations, run once at start-up
//!
//! ## Configuration
//!
//! Environment variables:
//! - `DATABASE_URL` or `PG_DATABASE_URL`: Connection string (required)
//! - `PG_POOL_MAX`: Maximum pool size (default: 10)
//! - `PG_POOL_MIN`: Minimum pool size (default: 1)
//! - `PG_CONN_TIMEOUT_SEC`: Connection timeout in seconds (default: 30)
//! - `PG_IDLE_TIMEOUT_SEC`: Idle connection timeout in seconds (default: 600)
//! - `PG_MAX_RETRIES`: Maximum retry attempts for transient failures (default: 3)
//! - `PG_RETRY_DELAY_MS`: Initial retry delay in milliseconds (default: 100)

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::sql_query;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task;
use tracing::{info, warn};

use crate::db::repository::{
    ErrorContext, RepositoryError, RepositoryResult, ReservationRepository, ThemeRepository,
    TimeSlotRepository,
};
use crate::models::{
    NewReservation, NewTheme, Reservation, ReservationId, Theme, ThemeId, TimeSlot, TimeSlotId,
};

mod models;
mod schema;

use models::*;
use schema::*;

type PgPool = Pool<ConnectionManager<PgConnection>>;

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("src/db/repositories/postgres/migrations");

/// Configuration for connecting to Postgres.
#[derive(Debug, Clone)]
pub struct PostgresConfig {
    /// Database connection URL
    pub database_url: String,
    /// Maximum number of connections in the pool
    pub max_pool_size: u32,
    /// Minimum number of connections in the pool
    pub min_pool_size: u32,
    /// Connection timeout in seconds
    pub connection_timeout_sec: u64,
    /// Idle connection timeout in seconds
    pub idle_timeout_sec: u64,
    /// Maximum number of retry attempts for transient failures
    pub max_retries: u32,
    /// Initial retry delay in milliseconds (doubles with each retry)
    pub retry_delay_ms: u64,
}

impl Default for PostgresConfig {
    fn default() -> Self {
        Self {
            database_url: String::new(),
            max_pool_size: 10,
            min_pool_size: 1,
            connection_timeout_sec: 30,
            idle_timeout_sec: 600,
            max_retries: 3,
            retry_delay_ms: 100,
        }
    }
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}

impl PostgresConfig {
    /// Create configuration from environment variables.
    ///
    /// See the module documentation for the recognised variables.
    pub fn from_env() -> Result<Self, RepositoryError> {
        let database_url = std::env::var("DATABASE_URL")
            .or_else(|_| std::env::var("PG_DATABASE_URL"))
            .map_err(|_| {
                RepositoryError::configuration("DATABASE_URL or PG_DATABASE_URL must be set")
            })?;

        let defaults = Self::default();
        Ok(Self {
            database_url,
            max_pool_size: env_or("PG_POOL_MAX", defaults.max_pool_size),
            min_pool_size: env_or("PG_POOL_MIN", defaults.min_pool_size),
            connection_timeout_sec: env_or("PG_CONN_TIMEOUT_SEC", defaults.connection_timeout_sec),
            idle_timeout_sec: env_or("PG_IDLE_TIMEOUT_SEC", defaults.idle_timeout_sec),
            max_retries: env_or("PG_MAX_RETRIES", defaults.max_retries),
            retry_delay_ms: env_or("PG_RETRY_DELAY_MS", defaults.retry_delay_ms),
        })
    }

    /// Create a new configuration with a database URL.
    pub fn with_url(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            ..Default::default()
        }
    }
}

/// Pool health statistics.
#[derive(Debug, Clone, Default)]
pub struct PoolStats {
    pub connections_in_use: u32,
    pub idle_connections: u32,
    pub total_connections: u32,
    pub max_size: u32,
    pub total_queries: u64,
    pub failed_queries: u64,
    pub retried_operations: u64,
}

/// Diesel-backed repository for Postgres.
///
/// The `reservation_slot_unique` constraint makes the duplicate check atomic:
/// a racing insert of an already booked triple fails with
/// [`RepositoryError::ConflictError`].
#[derive(Clone, Debug)]
pub struct PostgresRepository {
    pool: PgPool,
    config: PostgresConfig,
    total_queries: Arc<AtomicU64>,
    failed_queries: Arc<AtomicU64>,
    retried_operations: Arc<AtomicU64>,
}

impl PostgresRepository {
    /// Create a new repository and run pending migrations.
    pub fn new(config: PostgresConfig) -> RepositoryResult<Self> {
        let manager = ConnectionManager::<PgConnection>::new(&config.database_url);

        let pool = Pool::builder()
            .max_size(config.max_pool_size)
            .min_idle(Some(config.min_pool_size))
            .connection_timeout(Duration::from_secs(config.connection_timeout_sec))
            .idle_timeout(Some(Duration::from_secs(config.idle_timeout_sec)))
            .test_on_check_out(true)
            .build(manager)
            .map_err(|e| {
                RepositoryError::connection_with_context(
                    e.to_string(),
                    ErrorContext::new("create_pool")
                        .with_details(format!("max_size={}", config.max_pool_size)),
                )
            })?;

        {
            let mut conn = pool.get().map_err(|e| {
                RepositoryError::connection_with_context(
                    e.to_string(),
                    ErrorContext::new("get_connection_for_migrations"),
                )
            })?;
            Self::run_migrations(&mut conn)?;
        }
        info!(max_pool_size = config.max_pool_size, "postgres repository ready");

        Ok(Self {
            pool,
            config,
            total_queries: Arc::new(AtomicU64::new(0)),
            failed_queries: Arc::new(AtomicU64::new(0)),
            retried_operations: Arc::new(AtomicU64::new(0)),
        })
    }

    fn run_migrations(conn: &mut PgConnection) -> RepositoryResult<()> {
        conn.run_pending_migrations(MIGRATIONS).map_err(|e| {
            RepositoryError::internal_with_context(
                format!("Migration failed: {}", e),
                ErrorContext::new("run_migrations"),
            )
        })?;

        Ok(())
    }

    /// Run `f` on a pooled connection inside `spawn_blocking`, retrying
    /// retryable failures with exponential backoff up to `max_retries` times.
    async fn with_conn<T, F>(&self, operation: &'static str, f: F) -> RepositoryResult<T>
    where
        T: Send + 'static,
        F: Fn(&mut PgConnection) -> RepositoryResult<T> + Send + 'static,
    {
        let pool = self.pool.clone();
        let max_retries = self.config.max_retries;
        let retry_delay_ms = self.config.retry_delay_ms;
        let total_queries = self.total_queries.clone();
        let failed_queries = self.failed_queries.clone();
        let retried_operations = self.retried_operations.clone();

        task::spawn_blocking(move || {
            let mut last_error = None;
            let mut retry_delay = Duration::from_millis(retry_delay_ms);

            for attempt in 0..=max_retries {
                if attempt > 0 {
                    retried_operations.fetch_add(1, Ordering::Relaxed);
                    std::thread::sleep(retry_delay);
                    retry_delay *= 2;
                }

                let mut conn = match pool.get() {
                    Ok(c) => c,
                    Err(e) => {
                        let err = RepositoryError::connection_with_context(
                            e.to_string(),
                            ErrorContext::new(operation)
                                .with_details(format!("attempt={}", attempt + 1)),
                        );
                        if attempt < max_retries {
                            last_error = Some(err);
                            continue;
                        }
                        failed_queries.fetch_add(1, Ordering::Relaxed);
                        return Err(err);
                    }
                };

                total_queries.fetch_add(1, Ordering::Relaxed);
                match f(&mut conn) {
                    Ok(result) => return Ok(result),
                    Err(e) if e.is_retryable() && attempt < max_retries => {
                        warn!(operation, attempt, error = %e, "retrying postgres operation");
                        last_error = Some(e);
                        continue;
                    }
                    Err(e) => {
                        failed_queries.fetch_add(1, Ordering::Relaxed);
                        return Err(e.with_operation(operation));
                    }
                }
            }

            failed_queries.fetch_add(1, Ordering::Relaxed);
            Err(last_error.unwrap_or_else(|| {
                RepositoryError::internal("Max retries exceeded with no error captured")
            }))
        })
        .await
        .map_err(|e| {
            RepositoryError::internal_with_context(
                format!("Task join error: {}", e),
                ErrorContext::new("spawn_blocking"),
            )
        })?
    }

    /// Current pool state and query counters.
    pub fn get_pool_stats(&self) -> PoolStats {
        let state = self.pool.state();
        PoolStats {
            connections_in_use: state.connections - state.idle_connections,
            idle_connections: state.idle_connections,
            total_connections: state.connections,
            max_size: self.config.max_pool_size,
            total_queries: self.total_queries.load(Ordering::Relaxed),
            failed_queries: self.failed_queries.load(Ordering::Relaxed),
            retried_operations: self.retried_operations.load(Ordering::Relaxed),
        }
    }
}

fn map_diesel_error(err: diesel::result::Error) -> RepositoryError {
    RepositoryError::from(err)
}

#[async_trait]
impl ReservationRepository for PostgresRepository {
    async fn health_check(&self) -> RepositoryResult<bool> {
        self.with_conn("health_check", |conn| {
            sql_query("SELECT 1")
                .execute(conn)
                .map(|_| true)
                .map_err(map_diesel_error)
        })
        .await
    }

    async fn list_reservations(&self) -> RepositoryResult<Vec<Reservation>> {
        self.with_conn("list_reservations", |conn| {
            let rows: Vec<JoinedReservationRow> = reservation::table
                .inner_join(reservation_time::table)
                .inner_join(theme::table)
                .select((
                    ReservationRow::as_select(),
                    TimeSlotRow::as_select(),
                    ThemeRow::as_select(),
                ))
                .order(reservation::id.asc())
                .load(conn)
                .map_err(map_diesel_error)?;

            Ok(rows.into_iter().map(joined_to_reservation).collect())
        })
        .await
    }

    async fn find_reservation(&self, id: ReservationId) -> RepositoryResult<Option<Reservation>> {
        self.with_conn("find_reservation", move |conn| {
            let row: Option<JoinedReservationRow> = reservation::table
                .inner_join(reservation_time::table)
                .inner_join(theme::table)
                .filter(reservation::id.eq(id.0))
                .select((
                    ReservationRow::as_select(),
                    TimeSlotRow::as_select(),
                    ThemeRow::as_select(),
                ))
                .first(conn)
                .optional()
                .map_err(map_diesel_error)?;

            Ok(row.map(joined_to_reservation))
        })
        .await
    }

    async fn count_reservations_matching(
        &self,
        date: NaiveDate,
        time_id: TimeSlotId,
        theme_id: ThemeId,
    ) -> RepositoryResult<u64> {
        self.with_conn("count_reservations_matching", move |conn| {
            let count: i64 = reservation::table
                .filter(reservation::date.eq(date))
                .filter(reservation::time_id.eq(time_id.0))
                .filter(reservation::theme_id.eq(theme_id.0))
                .count()
                .get_result(conn)
                .map_err(map_diesel_error)?;

            Ok(count.max(0) as u64)
        })
        .await
    }

    async fn save_reservation(
        &self,
        new_reservation: &NewReservation,
    ) -> RepositoryResult<ReservationId> {
        let row = NewReservationRow::from(new_reservation);
        self.with_conn("save_reservation", move |conn| {
            diesel::insert_into(reservation::table)
                .values(&row)
                .returning(reservation::id)
                .get_result::<i64>(conn)
                .map(ReservationId)
                .map_err(map_diesel_error)
        })
        .await
    }

    async fn delete_reservation(&self, id: ReservationId) -> RepositoryResult<u64> {
        self.with_conn("delete_reservation", move |conn| {
            diesel::delete(reservation::table.filter(reservation::id.eq(id.0)))
                .execute(conn)
                .map(|n| n as u64)
                .map_err(map_diesel_error)
        })
        .await
    }
}

#[async_trait]
impl TimeSlotRepository for PostgresRepository {
    async fn find_time_slot(&self, id: TimeSlotId) -> RepositoryResult<Option<TimeSlot>> {
        self.with_conn("find_time_slot", move |conn| {
            reservation_time::table
                .filter(reservation_time::id.eq(id.0))
                .select(TimeSlotRow::as_select())
                .first(conn)
                .optional()
                .map(|row| row.map(TimeSlot::from))
                .map_err(map_diesel_error)
        })
        .await
    }

    async fn list_time_slots(&self) -> RepositoryResult<Vec<TimeSlot>> {
        self.with_conn("list_time_slots", |conn| {
            let rows: Vec<TimeSlotRow> = reservation_time::table
                .select(TimeSlotRow::as_select())
                .order(reservation_time::id.asc())
                .load(conn)
                .map_err(map_diesel_error)?;
            Ok(rows.into_iter().map(TimeSlot::from).collect())
        })
        .await
    }

    async fn save_time_slot(&self, start_at: NaiveTime) -> RepositoryResult<TimeSlotId> {
        self.with_conn("save_time_slot", move |conn| {
            diesel::insert_into(reservation_time::table)
                .values(&NewTimeSlotRow { start_at })
                .returning(reservation_time::id)
                .get_result::<i64>(conn)
                .map(TimeSlotId)
                .map_err(map_diesel_error)
        })
        .await
    }
}

#[async_trait]
impl ThemeRepository for PostgresRepository {
    async fn find_theme(&self, id: ThemeId) -> RepositoryResult<Option<Theme>> {
        self.with_conn("find_theme", move |conn| {
            theme::table
                .filter(theme::id.eq(id.0))
                .select(ThemeRow::as_select())
                .first(conn)
                .optional()
                .map(|row| row.map(Theme::from))
                .map_err(map_diesel_error)
        })
        .await
    }

    async fn list_themes(&self) -> RepositoryResult<Vec<Theme>> {
        self.with_conn("list_themes", |conn| {
            let rows: Vec<ThemeRow> = theme::table
                .select(ThemeRow::as_select())
                .order(theme::id.asc())
                .load(conn)
                .map_err(map_diesel_error)?;
            Ok(rows.into_iter().map(Theme::from).collect())
        })
        .await
    }

    async fn save_theme(&self, new_theme: &NewTheme) -> RepositoryResult<ThemeId> {
        let row = NewThemeRow::from(new_theme);
        self.with_conn("save_theme", move |conn| {
            diesel::insert_into(theme::table)
                .values(&row)
                .returning(theme::id)
                .get_result::<i64>(conn)
                .map(ThemeId)
                .map_err(map_diesel_error)
        })
        .await
    }
}
