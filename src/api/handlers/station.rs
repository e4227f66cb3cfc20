use axum::{extract::{State, Path}, response::IntoResponse, Json};
use crate::state::AppState;
use crate::api::dtos::requests::{CreateStationRequest, UpdateStationRequest};
use crate::domain::models::station::Station;
use crate::error::AppError;
use std::sync::Arc;
use tracing::info;

pub async fn create_station(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateStationRequest>,
) -> Result<impl IntoResponse, AppError> {
    if payload.name.trim().is_empty() {
        return Err(AppError::Validation("Station name must not be empty".into()));
    }

    let station = Station::new(payload.name.trim().to_string(), payload.sort_order.unwrap_or(0));
    let created = state.station_repo.create(&station).await?;
    info!("Created station {} ({})", created.name, created.id);
    Ok(Json(created))
}

pub async fn list_stations(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, AppError> {
    let stations = state.station_repo.list().await?;
    Ok(Json(stations))
}

pub async fn get_station(
    State(state): State<Arc<AppState>>,
    Path(station_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let station = state.station_repo.find_by_id(&station_id).await?
        .ok_or(AppError::NotFound("Station not found".into()))?;
    Ok(Json(station))
}

pub async fn update_station(
    State(state): State<Arc<AppState>>,
    Path(station_id): Path<String>,
    Json(payload): Json<UpdateStationRequest>,
) -> Result<impl IntoResponse, AppError> {
    let mut station = state.station_repo.find_by_id(&station_id).await?
        .ok_or(AppError::NotFound("Station not found".into()))?;

    if let Some(name) = payload.name {
        if name.trim().is_empty() {
            return Err(AppError::Validation("Station name must not be empty".into()));
        }
        station.name = name.trim().to_string();
    }
    if let Some(sort_order) = payload.sort_order {
        station.sort_order = sort_order;
    }

    let updated = state.station_repo.update(&station).await?;
    info!("Updated station {}", updated.id);
    Ok(Json(updated))
}

pub async fn delete_station(
    State(state): State<Arc<AppState>>,
    Path(station_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    state.station_repo.delete(&station_id).await?;
    info!("Deleted station {}", station_id);
    Ok(Json(serde_json::json!({"status": "deleted"})))
}
