use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;

use crate::api::types::{MessageResponse, QuoteResponse};
use crate::api::upload::{UploadForm, QUOTE_PROFILE_IMAGE};
use crate::app::AppState;
use crate::auth::models::AuthenticatedAdmin;
use crate::db::models::{parse_object_id, Counter, Quote};
use crate::db::quote_repository::{quote_not_found, QuoteRepository, QuoteUpdate};
use crate::error::AppError;

/// Bump one of a quote's public counters.
///
/// Separated from the HTTP layer so the counter semantics can be tested
/// against any repository.
pub async fn process_increment(
    repo: &dyn QuoteRepository,
    raw_id: &str,
    counter: Counter,
) -> Result<Quote, AppError> {
    let id = parse_object_id(raw_id)?;
    let quote = repo.increment(id, counter).await?;
    tracing::debug!(
        likes = quote.likes,
        shares = quote.shares,
        "Incremented {} on quote {}",
        counter.field(),
        raw_id
    );
    Ok(quote)
}

/// `GET /api/quotes`: active quotes in display order.
pub async fn list_active_handler(
    State(state): State<AppState>,
) -> Result<Json<Vec<QuoteResponse>>, AppError> {
    let quotes = state.quote_repo.list(true).await?;
    Ok(Json(quotes.into_iter().map(QuoteResponse::from).collect()))
}

/// `GET /api/quotes/all`
pub async fn list_all_handler(
    _admin: AuthenticatedAdmin,
    State(state): State<AppState>,
) -> Result<Json<Vec<QuoteResponse>>, AppError> {
    let quotes = state.quote_repo.list(false).await?;
    Ok(Json(quotes.into_iter().map(QuoteResponse::from).collect()))
}

/// `POST /api/quotes`
pub async fn create_handler(
    _admin: AuthenticatedAdmin,
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<QuoteResponse>), AppError> {
    let mut form = UploadForm::read(multipart, &QUOTE_PROFILE_IMAGE).await?;

    let text = form.required_text("text")?;
    let active = form.bool("active")?.unwrap_or(true);
    let order = form.int("order")?.unwrap_or(0);

    let profile_image = form
        .store_file(state.storage_client.as_ref())
        .await?
        .map(|f| f.public_path);

    let quote = state
        .quote_repo
        .create(Quote {
            id: None,
            text,
            profile_image,
            likes: 0,
            shares: 0,
            active,
            order,
            created_at: Utc::now(),
        })
        .await?;

    Ok((StatusCode::CREATED, Json(quote.into())))
}

/// `PUT /api/quotes/{id}`
pub async fn update_handler(
    _admin: AuthenticatedAdmin,
    State(state): State<AppState>,
    Path(id): Path<String>,
    multipart: Multipart,
) -> Result<Json<QuoteResponse>, AppError> {
    let id = parse_object_id(&id)?;
    let mut form = UploadForm::read(multipart, &QUOTE_PROFILE_IMAGE).await?;

    let mut update = QuoteUpdate {
        text: form.text("text").filter(|v| !v.trim().is_empty()),
        profile_image: None,
        active: form.bool("active")?,
        order: form.int("order")?,
    };

    if state.quote_repo.find_by_id(id).await?.is_none() {
        return Err(quote_not_found(&id));
    }
    update.profile_image = form
        .store_file(state.storage_client.as_ref())
        .await?
        .map(|f| f.public_path);

    let quote = state.quote_repo.update(id, update).await?;
    Ok(Json(quote.into()))
}

/// `DELETE /api/quotes/{id}`
pub async fn delete_handler(
    _admin: AuthenticatedAdmin,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    let id = parse_object_id(&id)?;
    state.quote_repo.delete(id).await?;
    Ok(Json(MessageResponse::new("Quote deleted")))
}

/// `POST /api/quotes/{id}/like`: public.
pub async fn like_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<QuoteResponse>, AppError> {
    let quote = process_increment(state.quote_repo.as_ref(), &id, Counter::Likes).await?;
    Ok(Json(quote.into()))
}

/// `POST /api/quotes/{id}/share`: public.
pub async fn share_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<QuoteResponse>, AppError> {
    let quote = process_increment(state.quote_repo.as_ref(), &id, Counter::Shares).await?;
    Ok(Json(quote.into()))
}
