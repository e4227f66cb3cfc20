use axum::{extract::{State, Path, Query}, response::IntoResponse, Json};
use crate::state::AppState;
use crate::api::dtos::requests::AppointmentListQuery;
use crate::domain::models::appointment::{STATUS_CANCELLED, STATUS_COMPLETED};
use crate::domain::services::normalize;
use crate::error::AppError;
use std::sync::Arc;
use tracing::info;

pub async fn get_appointment(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let appointment = state.appointment_repo.find_by_id(&id).await?
        .ok_or(AppError::NotFound("Appointment not found".into()))?;
    Ok(Json(appointment))
}

pub async fn list_appointments(
    State(state): State<Arc<AppState>>,
    Query(params): Query<AppointmentListQuery>,
) -> Result<impl IntoResponse, AppError> {
    if let Some(customer_id) = &params.customer_id {
        let appointments = state.appointment_repo.list_by_customer(customer_id).await?;
        return Ok(Json(appointments));
    }

    let date = params.date.ok_or(AppError::Validation("date or customer_id required".into()))?;
    let (day_start, day_end) = normalize::day_bounds_utc(state.config.timezone(), date);

    let appointments = match &params.station_id {
        Some(station_id) => {
            state.appointment_repo.list_by_station_range(station_id, day_start, day_end).await?
        }
        None => state.appointment_repo.list_by_range(day_start, day_end).await?,
    };
    Ok(Json(appointments))
}

pub async fn cancel_appointment(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let appointment = state.appointment_repo.find_by_id(&id).await?
        .ok_or(AppError::NotFound("Appointment not found".into()))?;

    if appointment.is_cancelled() {
        return Ok(Json(appointment));
    }

    let cancelled = state.appointment_repo.set_status(&id, STATUS_CANCELLED).await?;
    info!("Cancelled appointment {}", id);

    state.job_repo.cancel_jobs_for_appointment(&id).await?;

    Ok(Json(cancelled))
}

pub async fn complete_appointment(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let appointment = state.appointment_repo.find_by_id(&id).await?
        .ok_or(AppError::NotFound("Appointment not found".into()))?;

    if appointment.status == STATUS_COMPLETED {
        return Ok(Json(appointment));
    }
    if appointment.is_cancelled() {
        return Err(AppError::Validation("Cannot complete a cancelled appointment".into()));
    }

    let completed = state.appointment_repo.set_status(&id, STATUS_COMPLETED).await?;
    info!("Completed appointment {}", id);

    Ok(Json(completed))
}
