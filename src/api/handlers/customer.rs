use axum::{extract::{State, Path}, response::IntoResponse, Json};
use crate::state::AppState;
use crate::api::dtos::requests::{CreateCustomerRequest, UpdateCustomerRequest};
use crate::domain::models::customer::{Customer, NewCustomerParams};
use crate::domain::services::normalize;
use crate::error::AppError;
use std::sync::Arc;
use tracing::info;

fn normalized_phone(raw: Option<String>) -> Result<Option<String>, AppError> {
    match raw {
        Some(value) if !value.trim().is_empty() => normalize::normalize_phone(&value)
            .map(Some)
            .ok_or_else(|| AppError::Validation("Invalid phone number".into())),
        _ => Ok(None),
    }
}

pub async fn create_customer(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateCustomerRequest>,
) -> Result<impl IntoResponse, AppError> {
    if payload.name.trim().is_empty() || payload.pet_name.trim().is_empty() {
        return Err(AppError::Validation("Customer and pet name must not be empty".into()));
    }

    let customer = Customer::new(NewCustomerParams {
        name: payload.name.trim().to_string(),
        phone: normalized_phone(payload.phone)?,
        email: payload.email,
        pet_name: payload.pet_name.trim().to_string(),
        breed: payload.breed,
    });
    let created = state.customer_repo.create(&customer).await?;
    info!("Created customer {} ({})", created.name, created.id);
    Ok(Json(created))
}

pub async fn list_customers(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, AppError> {
    let customers = state.customer_repo.list().await?;
    Ok(Json(customers))
}

pub async fn get_customer(
    State(state): State<Arc<AppState>>,
    Path(customer_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let customer = state.customer_repo.find_by_id(&customer_id).await?
        .ok_or(AppError::NotFound("Customer not found".into()))?;
    Ok(Json(customer))
}

pub async fn update_customer(
    State(state): State<Arc<AppState>>,
    Path(customer_id): Path<String>,
    Json(payload): Json<UpdateCustomerRequest>,
) -> Result<impl IntoResponse, AppError> {
    let mut customer = state.customer_repo.find_by_id(&customer_id).await?
        .ok_or(AppError::NotFound("Customer not found".into()))?;

    if let Some(name) = payload.name {
        customer.name = name;
    }
    if payload.phone.is_some() {
        customer.phone = normalized_phone(payload.phone)?;
    }
    if payload.email.is_some() {
        customer.email = payload.email;
    }
    if let Some(pet_name) = payload.pet_name {
        customer.pet_name = pet_name;
    }
    if payload.breed.is_some() {
        customer.breed = payload.breed;
    }

    let updated = state.customer_repo.update(&customer).await?;
    info!("Updated customer {}", updated.id);
    Ok(Json(updated))
}

pub async fn delete_customer(
    State(state): State<Arc<AppState>>,
    Path(customer_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    // Appointment rows are kept forever for audit, so a customer with any
    // booking history cannot be removed.
    let history = state.appointment_repo.list_by_customer(&customer_id).await?;
    if !history.is_empty() {
        return Err(AppError::Conflict("Customer has appointment history".into()));
    }

    state.customer_repo.delete(&customer_id).await?;
    info!("Deleted customer {}", customer_id);
    Ok(Json(serde_json::json!({"status": "deleted"})))
}
