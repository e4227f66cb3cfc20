use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;

#[derive(Deserialize)]
pub struct CreateStationRequest {
    pub name: String,
    pub sort_order: Option<i32>,
}

#[derive(Deserialize)]
pub struct UpdateStationRequest {
    pub name: Option<String>,
    pub sort_order: Option<i32>,
}

/// Constraint windows arrive as local wall-clock times on a business date
/// and are converted through the configured timezone before storage.
#[derive(Deserialize)]
pub struct CreateConstraintRequest {
    pub date: NaiveDate,
    pub start_time: String,
    pub end_time: String,
    pub kind: String,
    pub capacity: Option<i32>,
    pub note: Option<String>,
}

#[derive(Deserialize)]
pub struct UpdateConstraintRequest {
    pub date: Option<NaiveDate>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub kind: Option<String>,
    pub capacity: Option<i32>,
    pub note: Option<String>,
}

#[derive(Deserialize)]
pub struct CreateCustomerRequest {
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub pet_name: String,
    pub breed: Option<String>,
}

#[derive(Deserialize)]
pub struct UpdateCustomerRequest {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub pet_name: Option<String>,
    pub breed: Option<String>,
}

#[derive(Deserialize)]
pub struct CreateCategoryRequest {
    pub name: String,
}

/// Appointment windows are absolute instants; only constraints use local
/// wall-clock entry.
#[derive(Deserialize)]
pub struct ProposeMeetingRequest {
    pub service_type: String,
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
    pub station_id: Option<String>,
    pub station_preference: Option<Vec<String>>,
    pub invites: Option<Vec<String>>,
    pub categories: Option<Vec<String>>,
    pub reschedule_of: Option<String>,
}

#[derive(Deserialize)]
pub struct AvailabilityQuery {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub exclude: Option<String>,
}

#[derive(Deserialize)]
pub struct ConstraintListQuery {
    pub date: Option<NaiveDate>,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

#[derive(Deserialize)]
pub struct DayScheduleQuery {
    pub date: NaiveDate,
}

#[derive(Deserialize)]
pub struct AppointmentListQuery {
    pub date: Option<NaiveDate>,
    pub station_id: Option<String>,
    pub customer_id: Option<String>,
}
