use axum::{extract::{State, Path}, response::IntoResponse, Json};
use crate::state::AppState;
use crate::api::dtos::requests::CreateCategoryRequest;
use crate::domain::models::category::Category;
use crate::error::AppError;
use std::sync::Arc;
use tracing::info;

pub async fn create_category(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateCategoryRequest>,
) -> Result<impl IntoResponse, AppError> {
    if payload.name.trim().is_empty() {
        return Err(AppError::Validation("Category name must not be empty".into()));
    }

    let category = Category::new(payload.name.trim().to_string());
    let created = state.category_repo.create(&category).await?;
    info!("Created category {} ({})", created.name, created.id);
    Ok(Json(created))
}

pub async fn list_categories(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, AppError> {
    let categories = state.category_repo.list().await?;
    Ok(Json(categories))
}

/// Returns the category together with its current membership in the order
/// customers were added, the same order expansion uses.
pub async fn get_category(
    State(state): State<Arc<AppState>>,
    Path(category_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let category = state.category_repo.find_by_id(&category_id).await?
        .ok_or(AppError::NotFound("Category not found".into()))?;
    let members = state.category_repo.list_members(&category.id).await?;

    Ok(Json(serde_json::json!({
        "category": category,
        "members": members,
    })))
}

pub async fn delete_category(
    State(state): State<Arc<AppState>>,
    Path(category_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    state.category_repo.delete(&category_id).await?;
    info!("Deleted category {}", category_id);
    Ok(Json(serde_json::json!({"status": "deleted"})))
}

pub async fn add_member(
    State(state): State<Arc<AppState>>,
    Path((category_id, customer_id)): Path<(String, String)>,
) -> Result<impl IntoResponse, AppError> {
    state.category_repo.find_by_id(&category_id).await?
        .ok_or(AppError::NotFound("Category not found".into()))?;
    state.customer_repo.find_by_id(&customer_id).await?
        .ok_or(AppError::NotFound("Customer not found".into()))?;

    state.category_repo.add_member(&category_id, &customer_id).await?;
    info!("Added customer {} to category {}", customer_id, category_id);
    Ok(Json(serde_json::json!({"status": "added"})))
}

pub async fn remove_member(
    State(state): State<Arc<AppState>>,
    Path((category_id, customer_id)): Path<(String, String)>,
) -> Result<impl IntoResponse, AppError> {
    state.category_repo.remove_member(&category_id, &customer_id).await?;
    info!("Removed customer {} from category {}", customer_id, category_id);
    Ok(Json(serde_json::json!({"status": "removed"})))
}
