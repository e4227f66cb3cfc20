use axum::{extract::{State, Path, Query}, response::IntoResponse, Json};
use crate::state::AppState;
use crate::api::dtos::requests::{ConstraintListQuery, CreateConstraintRequest, UpdateConstraintRequest};
use crate::domain::models::constraint::{Constraint, NewConstraintParams, KIND_CAPACITY_LIMIT, KIND_FULL_BLOCK};
use crate::domain::models::meeting::TimeWindow;
use crate::domain::services::normalize;
use crate::error::{AppError, ScheduleError};
use std::sync::Arc;
use chrono::{NaiveDate, NaiveTime};
use tracing::info;

pub async fn create_constraint(
    State(state): State<Arc<AppState>>,
    Path(station_id): Path<String>,
    Json(payload): Json<CreateConstraintRequest>,
) -> Result<impl IntoResponse, AppError> {
    state.station_repo.find_by_id(&station_id).await?
        .ok_or(AppError::NotFound("Station not found".into()))?;

    validate_kind(&payload.kind)?;
    let capacity = validate_capacity(&payload.kind, payload.capacity)?;

    let start_time = NaiveTime::parse_from_str(&payload.start_time, "%H:%M")
        .map_err(|_| AppError::Validation("Invalid start time".into()))?;
    let end_time = NaiveTime::parse_from_str(&payload.end_time, "%H:%M")
        .map_err(|_| AppError::Validation("Invalid end time".into()))?;

    let window = normalize::local_window_to_utc(state.config.timezone(), payload.date, start_time, end_time)?;

    if payload.kind == KIND_FULL_BLOCK {
        ensure_no_full_block_overlap(&state, &station_id, payload.date, &window, None).await?;
    }

    let constraint = Constraint::new(NewConstraintParams {
        station_id: station_id.clone(),
        date: payload.date,
        start_at: window.start_at,
        end_at: window.end_at,
        kind: payload.kind,
        capacity,
        note: payload.note,
    });

    let created = state.constraint_repo.create(&constraint).await?;
    info!("Created {} constraint on station {} for {}", created.kind, station_id, created.date);
    Ok(Json(created))
}

pub async fn list_constraints(
    State(state): State<Arc<AppState>>,
    Path(station_id): Path<String>,
    Query(params): Query<ConstraintListQuery>,
) -> Result<impl IntoResponse, AppError> {
    state.station_repo.find_by_id(&station_id).await?
        .ok_or(AppError::NotFound("Station not found".into()))?;

    if let Some(date) = params.date {
        let constraints = state.constraint_repo.list_by_station_date(&station_id, date).await?;
        return Ok(Json(constraints));
    }

    let start = params.start.ok_or(AppError::Validation("date or start/end range required".into()))?;
    let end = params.end.ok_or(AppError::Validation("end required with start".into()))?;
    if start > end {
        return Err(AppError::Validation("start must not be after end".into()));
    }

    let constraints = state.constraint_repo.list_by_station_range(&station_id, start, end).await?;
    Ok(Json(constraints))
}

pub async fn update_constraint(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateConstraintRequest>,
) -> Result<impl IntoResponse, AppError> {
    let mut constraint = state.constraint_repo.find_by_id(&id).await?
        .ok_or(AppError::NotFound("Constraint not found".into()))?;

    let tz = state.config.timezone();

    if let Some(kind) = payload.kind {
        validate_kind(&kind)?;
        constraint.kind = kind;
    }

    // Unchanged endpoints keep their stored wall-clock reading so a date
    // move re-derives the same local window on the new day.
    let date = payload.date.unwrap_or(constraint.date);
    let start_time = match payload.start_time {
        Some(raw) => NaiveTime::parse_from_str(&raw, "%H:%M")
            .map_err(|_| AppError::Validation("Invalid start time".into()))?,
        None => constraint.start_at.with_timezone(&tz).time(),
    };
    let end_time = match payload.end_time {
        Some(raw) => NaiveTime::parse_from_str(&raw, "%H:%M")
            .map_err(|_| AppError::Validation("Invalid end time".into()))?,
        None => constraint.end_at.with_timezone(&tz).time(),
    };

    let window = normalize::local_window_to_utc(tz, date, start_time, end_time)?;

    constraint.date = date;
    constraint.start_at = window.start_at;
    constraint.end_at = window.end_at;
    constraint.capacity = validate_capacity(&constraint.kind, payload.capacity.or(constraint.capacity))?;
    if let Some(note) = payload.note {
        constraint.note = Some(note);
    }

    if constraint.is_full_block() {
        ensure_no_full_block_overlap(&state, &constraint.station_id, date, &window, Some(&constraint.id)).await?;
    }

    let updated = state.constraint_repo.update(&constraint).await?;
    info!("Updated constraint {} on station {}", updated.id, updated.station_id);
    Ok(Json(updated))
}

pub async fn delete_constraint(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    state.constraint_repo.delete(&id).await?;
    info!("Deleted constraint {}", id);
    Ok(Json(serde_json::json!({"status": "deleted"})))
}

fn validate_kind(kind: &str) -> Result<(), AppError> {
    if kind != KIND_FULL_BLOCK && kind != KIND_CAPACITY_LIMIT {
        return Err(AppError::Validation(format!("Unknown constraint kind '{}'", kind)));
    }
    Ok(())
}

/// A capacity only makes sense on CAPACITY_LIMIT; FULL_BLOCK admits nothing,
/// so any supplied value is dropped.
fn validate_capacity(kind: &str, capacity: Option<i32>) -> Result<Option<i32>, AppError> {
    if kind != KIND_CAPACITY_LIMIT {
        return Ok(None);
    }
    match capacity {
        Some(n) if n >= 0 => Ok(Some(n)),
        Some(_) => Err(AppError::Validation("capacity must not be negative".into())),
        None => Err(AppError::Validation("capacity is required for CAPACITY_LIMIT constraints".into())),
    }
}

/// Two FULL_BLOCK windows on the same station and date may not intersect;
/// CAPACITY_LIMIT windows layer freely over anything.
async fn ensure_no_full_block_overlap(
    state: &AppState,
    station_id: &str,
    date: NaiveDate,
    window: &TimeWindow,
    exclude_id: Option<&str>,
) -> Result<(), AppError> {
    let existing = state.constraint_repo.list_by_station_date(station_id, date).await?;
    for other in &existing {
        if !other.is_full_block() || exclude_id == Some(other.id.as_str()) {
            continue;
        }
        let other_window = TimeWindow::new(other.start_at, other.end_at);
        if window.overlaps(&other_window) {
            return Err(ScheduleError::OverlappingConstraint(other.id.clone()).into());
        }
    }
    Ok(())
}
