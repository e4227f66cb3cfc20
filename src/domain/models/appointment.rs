use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use rand::{distributions::Alphanumeric, Rng};

pub const STATUS_SCHEDULED: &str = "SCHEDULED";
pub const STATUS_COMPLETED: &str = "COMPLETED";
pub const STATUS_CANCELLED: &str = "CANCELLED";

/// A committed, station-assigned booking. Appointments are never deleted,
/// only cancelled, so reschedule lineage and audit history stay intact.
/// `version` backs the optimistic check used when a reschedule supersedes
/// this record.
#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct Appointment {
    pub id: String,
    pub customer_id: String,
    pub station_id: String,
    pub service_type: String,
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
    pub status: String, // SCHEDULED, COMPLETED, CANCELLED
    pub confirmation_code: String,
    pub superseded_appointment_id: Option<String>,
    pub reschedule_original_start_at: Option<DateTime<Utc>>,
    pub reschedule_original_end_at: Option<DateTime<Utc>>,
    pub version: i64,
    pub created_at: DateTime<Utc>,
}

pub struct NewAppointmentParams {
    pub customer_id: String,
    pub station_id: String,
    pub service_type: String,
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
    pub superseded_appointment_id: Option<String>,
    pub reschedule_original_start_at: Option<DateTime<Utc>>,
    pub reschedule_original_end_at: Option<DateTime<Utc>>,
}

impl Appointment {
    pub fn new(params: NewAppointmentParams) -> Self {
        let code: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(10)
            .map(char::from)
            .collect();

        Self {
            id: Uuid::new_v4().to_string(),
            customer_id: params.customer_id,
            station_id: params.station_id,
            service_type: params.service_type,
            start_at: params.start_at,
            end_at: params.end_at,
            status: STATUS_SCHEDULED.to_string(),
            confirmation_code: code,
            superseded_appointment_id: params.superseded_appointment_id,
            reschedule_original_start_at: params.reschedule_original_start_at,
            reschedule_original_end_at: params.reschedule_original_end_at,
            version: 1,
            created_at: Utc::now(),
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.status == STATUS_CANCELLED
    }

    pub fn is_scheduled(&self) -> bool {
        self.status == STATUS_SCHEDULED
    }
}
