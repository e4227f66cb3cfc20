use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

pub const JOB_TYPE_CONFIRMATION: &str = "CONFIRMATION";
pub const JOB_TYPE_REMINDER: &str = "REMINDER";

pub const JOB_STATUS_PENDING: &str = "PENDING";
pub const JOB_STATUS_PROCESSING: &str = "PROCESSING";
pub const JOB_STATUS_COMPLETED: &str = "COMPLETED";
pub const JOB_STATUS_FAILED: &str = "FAILED";
pub const JOB_STATUS_CANCELLED: &str = "CANCELLED";

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct JobPayload {
    pub appointment_id: String,
}

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct Job {
    pub id: String,
    pub job_type: String, // "CONFIRMATION" or "REMINDER"
    pub payload: Json<JobPayload>,
    pub execute_at: DateTime<Utc>,
    pub status: String,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Job {
    pub fn new(job_type: &str, appointment_id: String, execute_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            job_type: job_type.to_string(),
            payload: Json(JobPayload { appointment_id }),
            execute_at,
            status: JOB_STATUS_PENDING.to_string(),
            error_message: None,
            created_at: Utc::now(),
        }
    }
}
