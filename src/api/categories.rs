use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde::Deserialize;

use crate::api::types::{CategoryResponse, MessageResponse};
use crate::app::AppState;
use crate::auth::models::AuthenticatedAdmin;
use crate::db::category_repository::CategoryUpdate;
use crate::db::models::{parse_object_id, Category};
use crate::error::AppError;

/// JSON body for creating or updating a category.
#[derive(Debug, Deserialize)]
pub struct CategoryRequest {
    pub name: Option<String>,
    pub order: Option<i32>,
}

/// `GET /api/categories`
pub async fn list_handler(
    State(state): State<AppState>,
) -> Result<Json<Vec<CategoryResponse>>, AppError> {
    let categories = state.category_repo.list().await?;
    Ok(Json(categories.into_iter().map(CategoryResponse::from).collect()))
}

/// `POST /api/categories`
pub async fn create_handler(
    _admin: AuthenticatedAdmin,
    State(state): State<AppState>,
    Json(request): Json<CategoryRequest>,
) -> Result<(StatusCode, Json<CategoryResponse>), AppError> {
    let name = request
        .name
        .filter(|n| !n.trim().is_empty())
        .ok_or_else(|| AppError::BadRequest("Field 'name' is required".into()))?;

    let category = state
        .category_repo
        .create(Category {
            id: None,
            name,
            order: request.order.unwrap_or(0),
            created_at: Utc::now(),
        })
        .await?;

    Ok((StatusCode::CREATED, Json(category.into())))
}

/// `PUT /api/categories/{id}`
pub async fn update_handler(
    _admin: AuthenticatedAdmin,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<CategoryRequest>,
) -> Result<Json<CategoryResponse>, AppError> {
    let id = parse_object_id(&id)?;
    let update = CategoryUpdate {
        name: request.name.filter(|n| !n.trim().is_empty()),
        order: request.order,
    };

    let category = state.category_repo.update(id, update).await?;
    Ok(Json(category.into()))
}

/// `DELETE /api/categories/{id}`
pub async fn delete_handler(
    _admin: AuthenticatedAdmin,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    let id = parse_object_id(&id)?;
    state.category_repo.delete(id).await?;
    Ok(Json(MessageResponse::new("Category deleted")))
}
