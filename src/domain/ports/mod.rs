use crate::domain::models::{
    appointment::Appointment, category::Category, constraint::Constraint,
    customer::Customer, job::Job, meeting::SupersedeDirective, station::Station,
};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};

#[async_trait]
pub trait StationRepository: Send + Sync {
    async fn create(&self, station: &Station) -> Result<Station, AppError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<Station>, AppError>;
    /// Ordered by `sort_order`, then name. This ordering is the default
    /// station preference when a meeting does not carry its own.
    async fn list(&self) -> Result<Vec<Station>, AppError>;
    async fn update(&self, station: &Station) -> Result<Station, AppError>;
    async fn delete(&self, id: &str) -> Result<(), AppError>;
}

#[async_trait]
pub trait ConstraintRepository: Send + Sync {
    async fn create(&self, constraint: &Constraint) -> Result<Constraint, AppError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<Constraint>, AppError>;
    async fn list_by_station_date(&self, station_id: &str, date: NaiveDate) -> Result<Vec<Constraint>, AppError>;
    async fn list_by_date(&self, date: NaiveDate) -> Result<Vec<Constraint>, AppError>;
    async fn list_by_station_range(&self, station_id: &str, start: NaiveDate, end: NaiveDate) -> Result<Vec<Constraint>, AppError>;
    async fn update(&self, constraint: &Constraint) -> Result<Constraint, AppError>;
    async fn delete(&self, id: &str) -> Result<(), AppError>;
}

#[async_trait]
pub trait CustomerRepository: Send + Sync {
    async fn create(&self, customer: &Customer) -> Result<Customer, AppError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<Customer>, AppError>;
    /// Preserves the order of `ids`; missing ids are simply absent from the
    /// result, callers detect them by comparing lengths.
    async fn find_by_ids(&self, ids: &[String]) -> Result<Vec<Customer>, AppError>;
    async fn list(&self) -> Result<Vec<Customer>, AppError>;
    async fn update(&self, customer: &Customer) -> Result<Customer, AppError>;
    async fn delete(&self, id: &str) -> Result<(), AppError>;
}

#[async_trait]
pub trait CategoryRepository: Send + Sync {
    async fn create(&self, category: &Category) -> Result<Category, AppError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<Category>, AppError>;
    async fn list(&self) -> Result<Vec<Category>, AppError>;
    async fn delete(&self, id: &str) -> Result<(), AppError>;
    async fn add_member(&self, category_id: &str, customer_id: &str) -> Result<(), AppError>;
    async fn remove_member(&self, category_id: &str, customer_id: &str) -> Result<(), AppError>;
    /// Ordered by when each customer joined the category, so expansion is
    /// deterministic across calls.
    async fn list_members(&self, category_id: &str) -> Result<Vec<Customer>, AppError>;
}

#[async_trait]
pub trait AppointmentRepository: Send + Sync {
    async fn find_by_id(&self, id: &str) -> Result<Option<Appointment>, AppError>;
    /// Non-cancelled appointments touching `[start, end)` on one station.
    async fn list_overlapping(&self, station_id: &str, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Vec<Appointment>, AppError>;
    async fn list_by_station_range(&self, station_id: &str, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Vec<Appointment>, AppError>;
    async fn list_by_range(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Vec<Appointment>, AppError>;
    async fn list_by_customer(&self, customer_id: &str) -> Result<Vec<Appointment>, AppError>;
    async fn set_status(&self, id: &str, status: &str) -> Result<Appointment, AppError>;
    /// All-or-nothing commit gate. Inside one transaction: retire the
    /// superseded original (if any) with a version check, re-verify the
    /// drafts' window is still free of outside appointments, insert every
    /// draft, enqueue the jobs. Returns the inserted ids in draft order.
    ///
    /// Fails with `ScheduleError::OriginalAlreadyResolved` when the original
    /// was cancelled or completed since validation, and with
    /// `ScheduleError::ConcurrentBookingConflict` when a competing commit won
    /// the window first.
    async fn commit(&self, drafts: &[Appointment], supersede: Option<&SupersedeDirective>, jobs: Vec<Job>) -> Result<Vec<String>, AppError>;
}

#[async_trait]
pub trait JobRepository: Send + Sync {
    async fn create(&self, job: &Job) -> Result<Job, AppError>;
    async fn find_pending(&self, limit: i32) -> Result<Vec<Job>, AppError>;
    async fn list_jobs(&self) -> Result<Vec<Job>, AppError>;
    async fn update_status(&self, id: &str, status: &str, error_message: Option<String>) -> Result<(), AppError>;
    async fn cancel_jobs_for_appointment(&self, appointment_id: &str) -> Result<(), AppError>;
}

#[async_trait]
pub trait ReminderService: Send + Sync {
    async fn send(&self, recipient: &str, message: &str) -> Result<(), AppError>;
}
