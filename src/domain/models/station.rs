use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// A physical grooming resource (table/bay) appointments are assigned to.
/// `sort_order` doubles as the auto-selection priority when a proposed
/// meeting names no station.
#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct Station {
    pub id: String,
    pub name: String,
    pub sort_order: i32,
    pub created_at: DateTime<Utc>,
}

impl Station {
    pub fn new(name: String, sort_order: i32) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name,
            sort_order,
            created_at: Utc::now(),
        }
    }
}
