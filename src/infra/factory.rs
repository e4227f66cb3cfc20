use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use sqlx::{postgres::{PgPoolOptions, PgConnectOptions}, sqlite::{SqlitePoolOptions, SqliteJournalMode, SqliteConnectOptions}};
use sqlx::{PgPool, SqlitePool, ConnectOptions};
use tracing::info;
use tracing::log::LevelFilter;

use crate::config::Config;
use crate::state::AppState;
use crate::domain::services::scheduler::SchedulingService;
use crate::infra::notify::http_reminder_service::HttpReminderService;
use crate::infra::repositories::{
    postgres_station_repo::PostgresStationRepo, postgres_constraint_repo::PostgresConstraintRepo,
    postgres_customer_repo::PostgresCustomerRepo, postgres_category_repo::PostgresCategoryRepo,
    postgres_appointment_repo::PostgresAppointmentRepo, postgres_job_repo::PostgresJobRepo,
    sqlite_station_repo::SqliteStationRepo, sqlite_constraint_repo::SqliteConstraintRepo,
    sqlite_customer_repo::SqliteCustomerRepo, sqlite_category_repo::SqliteCategoryRepo,
    sqlite_appointment_repo::SqliteAppointmentRepo, sqlite_job_repo::SqliteJobRepo,
};

pub async fn bootstrap_state(config: &Config) -> AppState {
    let database_url = &config.database_url;
    let reminder_service = Arc::new(HttpReminderService::new(
        config.reminder_service_url.clone(),
        config.reminder_service_token.clone(),
    ));

    if database_url.starts_with("postgres://") || database_url.starts_with("postgresql://") {
        info!("Initializing PostgreSQL connection...");

        let mut opts: PgConnectOptions = database_url.parse().expect("Invalid Postgres URL");
        opts = opts.log_statements(LevelFilter::Debug)
            .log_slow_statements(LevelFilter::Warn, Duration::from_millis(500));

        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect_with(opts)
            .await
            .expect("Failed to connect to Postgres");

        run_postgres_migrations(&pool).await;

        let station_repo = Arc::new(PostgresStationRepo::new(pool.clone()));
        let constraint_repo = Arc::new(PostgresConstraintRepo::new(pool.clone()));
        let customer_repo = Arc::new(PostgresCustomerRepo::new(pool.clone()));
        let category_repo = Arc::new(PostgresCategoryRepo::new(pool.clone()));
        let appointment_repo = Arc::new(PostgresAppointmentRepo::new(pool.clone()));

        let scheduler = Arc::new(SchedulingService::new(
            station_repo.clone(),
            constraint_repo.clone(),
            customer_repo.clone(),
            category_repo.clone(),
            appointment_repo.clone(),
            config.timezone(),
            config.reminder_lead_minutes,
        ));

        AppState {
            config: config.clone(),
            station_repo,
            constraint_repo,
            customer_repo,
            category_repo,
            appointment_repo,
            job_repo: Arc::new(PostgresJobRepo::new(pool.clone())),
            reminder_service,
            scheduler,
        }
    } else {
        info!("Initializing SQLite connection with WAL Mode...");

        let opts = SqliteConnectOptions::from_str(database_url)
            .expect("Invalid SQLite connection string")
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(5))
            .foreign_keys(true)
            .log_statements(LevelFilter::Debug)
            .log_slow_statements(LevelFilter::Warn, Duration::from_millis(500));

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(opts)
            .await
            .expect("Failed to connect to SQLite");

        run_sqlite_migrations(&pool).await;

        let station_repo = Arc::new(SqliteStationRepo::new(pool.clone()));
        let constraint_repo = Arc::new(SqliteConstraintRepo::new(pool.clone()));
        let customer_repo = Arc::new(SqliteCustomerRepo::new(pool.clone()));
        let category_repo = Arc::new(SqliteCategoryRepo::new(pool.clone()));
        let appointment_repo = Arc::new(SqliteAppointmentRepo::new(pool.clone()));

        let scheduler = Arc::new(SchedulingService::new(
            station_repo.clone(),
            constraint_repo.clone(),
            customer_repo.clone(),
            category_repo.clone(),
            appointment_repo.clone(),
            config.timezone(),
            config.reminder_lead_minutes,
        ));

        AppState {
            config: config.clone(),
            station_repo,
            constraint_repo,
            customer_repo,
            category_repo,
            appointment_repo,
            job_repo: Arc::new(SqliteJobRepo::new(pool.clone())),
            reminder_service,
            scheduler,
        }
    }
}

async fn run_postgres_migrations(pool: &PgPool) {
    sqlx::migrate!("./migrations/postgres")
        .run(pool)
        .await
        .expect("Failed to run Postgres migrations");
}

async fn run_sqlite_migrations(pool: &SqlitePool) {
    sqlx::migrate!("./migrations/sqlite")
        .run(pool)
        .await
        .expect("Failed to run SQLite migrations");
}
