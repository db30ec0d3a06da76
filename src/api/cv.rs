use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::Json;

use crate::api::types::{CvResponse, MessageResponse};
use crate::api::upload::{UploadForm, CV_DOCUMENT};
use crate::app::AppState;
use crate::auth::models::AuthenticatedAdmin;
use crate::db::models::{parse_object_id, Cv};
use crate::error::AppError;

/// `GET /api/cv/active`
pub async fn get_active_handler(
    State(state): State<AppState>,
) -> Result<Json<CvResponse>, AppError> {
    let cv = state
        .cv_repo
        .get_active()
        .await?
        .ok_or_else(|| AppError::NotFound("No CV available".into()))?;
    Ok(Json(cv.into()))
}

/// `GET /api/cv/all`
pub async fn list_all_handler(
    _admin: AuthenticatedAdmin,
    State(state): State<AppState>,
) -> Result<Json<Vec<CvResponse>>, AppError> {
    let cvs = state.cv_repo.list_all().await?;
    Ok(Json(cvs.into_iter().map(CvResponse::from).collect()))
}

/// `POST /api/cv/upload`: store a PDF and make it the active CV.
pub async fn upload_handler(
    _admin: AuthenticatedAdmin,
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<CvResponse>), AppError> {
    let mut form = UploadForm::read(multipart, &CV_DOCUMENT).await?;
    let version = form.text("version");

    let stored = form
        .store_file(state.storage_client.as_ref())
        .await?
        .ok_or_else(|| AppError::BadRequest("No file uploaded".into()))?;

    let cv = state
        .cv_repo
        .upload(Cv::new(stored.original_name, stored.public_path, version))
        .await?;

    tracing::info!("Uploaded CV '{}' version {}", cv.filename, cv.version);
    Ok((StatusCode::CREATED, Json(cv.into())))
}

/// `PATCH /api/cv/{id}/activate`
pub async fn activate_handler(
    _admin: AuthenticatedAdmin,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<CvResponse>, AppError> {
    let id = parse_object_id(&id)?;
    let cv = state.cv_repo.activate(id).await?;
    tracing::info!("Activated CV {}", id.to_hex());
    Ok(Json(cv.into()))
}

/// `DELETE /api/cv/{id}`
pub async fn delete_handler(
    _admin: AuthenticatedAdmin,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    let id = parse_object_id(&id)?;
    state.cv_repo.delete(id).await?;
    Ok(Json(MessageResponse::new("CV deleted")))
}
