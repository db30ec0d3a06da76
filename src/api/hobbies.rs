use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;

use crate::api::types::{HobbyResponse, MessageResponse};
use crate::api::upload::{UploadForm, HOBBY_IMAGE};
use crate::app::AppState;
use crate::auth::models::AuthenticatedAdmin;
use crate::db::hobby_repository::{hobby_not_found, HobbyUpdate};
use crate::db::models::{parse_object_id, Hobby};
use crate::error::AppError;

/// `GET /api/hobbies`
pub async fn list_handler(
    State(state): State<AppState>,
) -> Result<Json<Vec<HobbyResponse>>, AppError> {
    let hobbies = state.hobby_repo.list().await?;
    Ok(Json(hobbies.into_iter().map(HobbyResponse::from).collect()))
}

/// `POST /api/hobbies`: an image is mandatory.
pub async fn create_handler(
    _admin: AuthenticatedAdmin,
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<HobbyResponse>), AppError> {
    let mut form = UploadForm::read(multipart, &HOBBY_IMAGE).await?;

    let category = form.required_text("category")?;
    let headline = form.required_text("headline")?;
    let order = form.int("order")?.unwrap_or(0);
    if !form.has_file() {
        return Err(AppError::BadRequest("Image is required".into()));
    }

    let image = form
        .store_file(state.storage_client.as_ref())
        .await?
        .map(|f| f.public_path)
        .unwrap_or_default();

    let hobby = state
        .hobby_repo
        .create(Hobby {
            id: None,
            category,
            headline,
            image,
            order,
            created_at: Utc::now(),
        })
        .await?;

    Ok((StatusCode::CREATED, Json(hobby.into())))
}

/// `PUT /api/hobbies/{id}`
pub async fn update_handler(
    _admin: AuthenticatedAdmin,
    State(state): State<AppState>,
    Path(id): Path<String>,
    multipart: Multipart,
) -> Result<Json<HobbyResponse>, AppError> {
    let id = parse_object_id(&id)?;
    let mut form = UploadForm::read(multipart, &HOBBY_IMAGE).await?;

    let mut update = HobbyUpdate {
        category: form.text("category").filter(|v| !v.trim().is_empty()),
        headline: form.text("headline").filter(|v| !v.trim().is_empty()),
        image: None,
        order: form.int("order")?,
    };

    if state.hobby_repo.find_by_id(id).await?.is_none() {
        return Err(hobby_not_found(&id));
    }
    update.image = form
        .store_file(state.storage_client.as_ref())
        .await?
        .map(|f| f.public_path);

    let hobby = state.hobby_repo.update(id, update).await?;
    Ok(Json(hobby.into()))
}

/// `DELETE /api/hobbies/{id}`
pub async fn delete_handler(
    _admin: AuthenticatedAdmin,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    let id = parse_object_id(&id)?;
    state.hobby_repo.delete(id).await?;
    Ok(Json(MessageResponse::new("Hobby deleted")))
}
