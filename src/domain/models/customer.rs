use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct Customer {
    pub id: String,
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub pet_name: String,
    pub breed: Option<String>,
    pub created_at: DateTime<Utc>,
}

pub struct NewCustomerParams {
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub pet_name: String,
    pub breed: Option<String>,
}

impl Customer {
    pub fn new(params: NewCustomerParams) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: params.name,
            phone: params.phone,
            email: params.email,
            pet_name: params.pet_name,
            breed: params.breed,
            created_at: Utc::now(),
        }
    }
}
