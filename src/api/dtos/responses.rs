use serde::Serialize;

use crate::domain::models::appointment::Appointment;
use crate::domain::models::constraint::Constraint;
use crate::domain::models::meeting::Resolution;
use crate::domain::models::station::Station;
use crate::domain::services::conflict::Availability;

#[derive(Serialize)]
pub struct MeetingResolutionResponse {
    pub status: String,
    pub appointment_ids: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl From<&Resolution> for MeetingResolutionResponse {
    fn from(resolution: &Resolution) -> Self {
        match resolution {
            Resolution::Committed { appointment_ids } => Self {
                status: "committed".to_string(),
                appointment_ids: appointment_ids.clone(),
                reason: None,
                detail: None,
            },
            Resolution::Rejected(rejection) => Self {
                status: "rejected".to_string(),
                appointment_ids: Vec::new(),
                reason: Some(rejection.code().to_string()),
                detail: Some(rejection.to_string()),
            },
        }
    }
}

#[derive(Serialize)]
pub struct ConflictDetail {
    pub source: String,
    pub entity_id: String,
}

#[derive(Serialize)]
pub struct AvailabilityResponse {
    pub available: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conflict: Option<ConflictDetail>,
}

impl From<Availability> for AvailabilityResponse {
    fn from(availability: Availability) -> Self {
        match availability {
            Availability::Available => Self {
                available: true,
                conflict: None,
            },
            Availability::Conflict { source, entity_id } => Self {
                available: false,
                conflict: Some(ConflictDetail {
                    source: source.to_string(),
                    entity_id,
                }),
            },
        }
    }
}

/// One station's slice of the manager calendar for a day.
#[derive(Serialize)]
pub struct StationDaySchedule {
    pub station: Station,
    pub appointments: Vec<Appointment>,
    pub constraints: Vec<Constraint>,
}

#[derive(Serialize)]
pub struct DayScheduleResponse {
    pub date: String,
    pub stations: Vec<StationDaySchedule>,
}
