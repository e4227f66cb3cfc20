use std::env;

use chrono_tz::Tz;
use tracing::warn;

#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub business_timezone: String,
    pub reminder_service_url: String,
    pub reminder_service_token: String,
    pub reminder_lead_minutes: i64,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            database_url: env::var("DATABASE_URL").expect("DATABASE_URL must be set"),
            port: env::var("PORT").unwrap_or_else(|_| "3000".to_string()).parse().expect("PORT must be a number"),
            business_timezone: env::var("BUSINESS_TIMEZONE").unwrap_or_else(|_| "UTC".to_string()),
            reminder_service_url: env::var("REMINDER_SERVICE_URL").unwrap_or_else(|_| "http://localhost:8000/api/v1/notify".to_string()),
            reminder_service_token: env::var("REMINDER_SERVICE_TOKEN").unwrap_or_else(|_| "test-token-1".to_string()),
            reminder_lead_minutes: env::var("REMINDER_LEAD_MINUTES").unwrap_or_else(|_| "1440".to_string()).parse().expect("REMINDER_LEAD_MINUTES must be a number"),
        }
    }

    /// Parsed business timezone; an unknown IANA name falls back to UTC.
    pub fn timezone(&self) -> Tz {
        self.business_timezone.parse().unwrap_or_else(|_| {
            warn!("Unknown BUSINESS_TIMEZONE '{}', falling back to UTC", self.business_timezone);
            chrono_tz::UTC
        })
    }
}
