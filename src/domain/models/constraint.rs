use serde::{Deserialize, Serialize};
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::FromRow;
use uuid::Uuid;

pub const KIND_FULL_BLOCK: &str = "FULL_BLOCK";
pub const KIND_CAPACITY_LIMIT: &str = "CAPACITY_LIMIT";

/// A manager-defined unavailability window on one station for one business
/// date. Managers enter local wall-clock times; the API boundary converts
/// them through the configured business timezone, so `start_at`/`end_at`
/// are absolute instants and the scheduler never does timezone arithmetic.
///
/// FULL_BLOCK windows reject any intersecting booking. CAPACITY_LIMIT
/// windows are stored (with their `capacity`) but take no part in conflict
/// detection; the admission policy for them is pending.
#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct Constraint {
    pub id: String,
    pub station_id: String,
    pub date: NaiveDate,
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
    pub kind: String, // FULL_BLOCK, CAPACITY_LIMIT
    pub capacity: Option<i32>,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
}

pub struct NewConstraintParams {
    pub station_id: String,
    pub date: NaiveDate,
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
    pub kind: String,
    pub capacity: Option<i32>,
    pub note: Option<String>,
}

impl Constraint {
    pub fn new(params: NewConstraintParams) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            station_id: params.station_id,
            date: params.date,
            start_at: params.start_at,
            end_at: params.end_at,
            kind: params.kind,
            capacity: params.capacity,
            note: params.note,
            created_at: Utc::now(),
        }
    }

    pub fn is_full_block(&self) -> bool {
        self.kind == KIND_FULL_BLOCK
    }
}
