use axum::{extract::{State, Path, Query}, http::StatusCode, response::IntoResponse, Json};
use crate::state::AppState;
use crate::api::dtos::requests::{AvailabilityQuery, DayScheduleQuery, ProposeMeetingRequest};
use crate::api::dtos::responses::{
    AvailabilityResponse, DayScheduleResponse, MeetingResolutionResponse, StationDaySchedule,
};
use crate::domain::models::meeting::{
    ProposedMeeting, ProposedMeetingParams, RescheduleLinkage, Resolution, TimeWindow,
};
use crate::domain::services::normalize;
use crate::error::AppError;
use std::sync::Arc;

/// Single entry point for booking. The outcome is always the resolution
/// envelope: 201 with the committed appointment ids, or the rejection code
/// under its taxonomy status. Infrastructure failures are the only 5xx path.
pub async fn propose_meeting(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<ProposeMeetingRequest>,
) -> Result<impl IntoResponse, AppError> {
    let params = ProposedMeetingParams {
        service_type: payload.service_type,
        window: TimeWindow::new(payload.start_at, payload.end_at),
        station_id: payload.station_id,
        station_preference: payload.station_preference.unwrap_or_default(),
        invites: payload.invites.unwrap_or_default(),
        categories: payload.categories.unwrap_or_default(),
        reschedule_of: payload
            .reschedule_of
            .map(|appointment_id| RescheduleLinkage { appointment_id }),
    };

    // A proposal that fails structural validation gets the same rejection
    // envelope as one the resolver turns down.
    let resolution = match ProposedMeeting::new(params) {
        Ok(meeting) => state.scheduler.submit(meeting).await?,
        Err(rejection) => Resolution::Rejected(rejection),
    };

    let status = match &resolution {
        Resolution::Committed { .. } => StatusCode::CREATED,
        Resolution::Rejected(rejection) => rejection.status(),
    };
    Ok((status, Json(MeetingResolutionResponse::from(&resolution))))
}

pub async fn check_availability(
    State(state): State<Arc<AppState>>,
    Path(station_id): Path<String>,
    Query(params): Query<AvailabilityQuery>,
) -> Result<impl IntoResponse, AppError> {
    let window = TimeWindow::new(params.start, params.end);
    let availability = state
        .scheduler
        .check_station_availability(&station_id, &window, params.exclude.as_deref())
        .await?;
    Ok(Json(AvailabilityResponse::from(availability)))
}

/// Manager calendar: every station's appointments and constraints for one
/// business day, grouped per station in display order.
pub async fn day_schedule(
    State(state): State<Arc<AppState>>,
    Query(params): Query<DayScheduleQuery>,
) -> Result<impl IntoResponse, AppError> {
    let (day_start, day_end) = normalize::day_bounds_utc(state.config.timezone(), params.date);

    let stations = state.station_repo.list().await?;
    let appointments = state.appointment_repo.list_by_range(day_start, day_end).await?;
    let constraints = state.constraint_repo.list_by_date(params.date).await?;

    let mut schedule: Vec<StationDaySchedule> = stations
        .into_iter()
        .map(|station| StationDaySchedule {
            station,
            appointments: Vec::new(),
            constraints: Vec::new(),
        })
        .collect();

    for appointment in appointments {
        if let Some(entry) = schedule.iter_mut().find(|e| e.station.id == appointment.station_id) {
            entry.appointments.push(appointment);
        }
    }
    for constraint in constraints {
        if let Some(entry) = schedule.iter_mut().find(|e| e.station.id == constraint.station_id) {
            entry.constraints.push(constraint);
        }
    }

    Ok(Json(DayScheduleResponse {
        date: params.date.to_string(),
        stations: schedule,
    }))
}
