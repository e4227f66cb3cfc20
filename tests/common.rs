use grooming_backend::{
    api::router::create_router,
    state::AppState,
    config::Config,
    infra::repositories::{
        sqlite_station_repo::SqliteStationRepo,
        sqlite_constraint_repo::SqliteConstraintRepo,
        sqlite_customer_repo::SqliteCustomerRepo,
        sqlite_category_repo::SqliteCategoryRepo,
        sqlite_appointment_repo::SqliteAppointmentRepo,
        sqlite_job_repo::SqliteJobRepo,
    },
    domain::services::scheduler::SchedulingService,
    domain::ports::ReminderService,
    background::start_background_worker,
    error::AppError,
};
use sqlx::{sqlite::{SqliteConnectOptions, SqlitePoolOptions}, Pool, Sqlite};
use std::sync::{Arc, Mutex};
use uuid::Uuid;
use axum::Router;
use std::str::FromStr;
use async_trait::async_trait;

/// Captures outgoing messages instead of talking to the SMS gateway, so
/// tests can assert on recipients and rendered text.
pub struct RecordingReminderService {
    pub sent: Mutex<Vec<(String, String)>>,
}

#[async_trait]
impl ReminderService for RecordingReminderService {
    async fn send(&self, recipient: &str, message: &str) -> Result<(), AppError> {
        self.sent
            .lock()
            .unwrap()
            .push((recipient.to_string(), message.to_string()));
        Ok(())
    }
}

#[allow(dead_code)]
pub struct TestApp {
    pub router: Router,
    pub pool: Pool<Sqlite>,
    pub db_filename: String,
    pub state: Arc<AppState>,
    pub reminders: Arc<RecordingReminderService>,
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_timezone("UTC").await
    }

    pub async fn with_timezone(timezone: &str) -> Self {
        let db_filename = format!("test_{}.db", Uuid::new_v4());
        let db_url = format!("sqlite://{}?mode=rwc", db_filename);

        let connection_options = SqliteConnectOptions::from_str(&db_url)
            .unwrap()
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .connect_with(connection_options)
            .await
            .expect("Failed to connect to test db");

        sqlx::migrate!("./migrations/sqlite")
            .run(&pool)
            .await
            .expect("Failed to migrate test db");

        let config = Config {
            database_url: db_url.clone(),
            port: 0,
            business_timezone: timezone.to_string(),
            reminder_service_url: "http://localhost".to_string(),
            reminder_service_token: "token".to_string(),
            reminder_lead_minutes: 1440,
        };

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

        let reminders = Arc::new(RecordingReminderService {
            sent: Mutex::new(Vec::new()),
        });

        let state = Arc::new(AppState {
            config,
            station_repo,
            constraint_repo,
            customer_repo,
            category_repo,
            appointment_repo,
            job_repo: Arc::new(SqliteJobRepo::new(pool.clone())),
            reminder_service: reminders.clone(),
            scheduler,
        });

        // Start Background Worker
        let worker_state = state.clone();
        tokio::spawn(async move {
            start_background_worker(worker_state).await;
        });

        let router = create_router(state.clone());

        Self {
            router,
            pool,
            db_filename,
            state,
            reminders,
        }
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.db_filename);
    }
}
