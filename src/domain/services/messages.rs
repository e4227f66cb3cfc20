use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde_json::json;
use tera::{Context, Tera};

use crate::error::AppError;

pub const CONFIRMATION_TEMPLATE: &str = "Hi {{ customer_name }}! {{ pet_name }}'s {{ service_type }} appointment is booked for {{ start_local }} at {{ station_name }}. Your confirmation code is {{ confirmation_code }}.";

pub const REMINDER_TEMPLATE: &str = "Hi {{ customer_name }}! Reminder: {{ pet_name }} is booked for {{ service_type }} on {{ start_local }} at {{ station_name }}. See you soon!";

pub struct MessageParams<'a> {
    pub customer_name: &'a str,
    pub pet_name: &'a str,
    pub service_type: &'a str,
    pub start_local: &'a str,
    pub station_name: &'a str,
    pub confirmation_code: &'a str,
}

/// Local wall-clock spelling of an instant for customer-facing text. The
/// stored UTC value never leaves the backend unformatted.
pub fn format_local(tz: Tz, instant: DateTime<Utc>) -> String {
    instant.with_timezone(&tz).format("%a %d %b, %H:%M").to_string()
}

pub fn render_confirmation(params: &MessageParams) -> Result<String, AppError> {
    render(CONFIRMATION_TEMPLATE, params)
}

pub fn render_reminder(params: &MessageParams) -> Result<String, AppError> {
    render(REMINDER_TEMPLATE, params)
}

fn render(template: &str, params: &MessageParams) -> Result<String, AppError> {
    let context_data = json!({
        "customer_name": params.customer_name,
        "pet_name": params.pet_name,
        "service_type": params.service_type,
        "start_local": params.start_local,
        "station_name": params.station_name,
        "confirmation_code": params.confirmation_code,
    });
    let context = Context::from_value(context_data).map_err(|_| AppError::Internal)?;
    Tera::one_off(template, &context, false).map_err(|_| AppError::Internal)
}
