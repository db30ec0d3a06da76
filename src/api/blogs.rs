use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;

use crate::api::types::{BlogResponse, MessageResponse};
use crate::api::upload::{UploadForm, BLOG_IMAGE};
use crate::app::AppState;
use crate::auth::models::AuthenticatedAdmin;
use crate::db::blog_repository::{blog_not_found, BlogUpdate};
use crate::db::models::{parse_object_id, Blog, DEFAULT_BLOG_CATEGORY};
use crate::error::AppError;
use crate::rendering::markdown::render_markdown;

/// `GET /api/blogs`: published posts, newest first.
pub async fn list_published_handler(
    State(state): State<AppState>,
) -> Result<Json<Vec<BlogResponse>>, AppError> {
    let blogs = state.blog_repo.list(false).await?;
    Ok(Json(blogs.into_iter().map(BlogResponse::from).collect()))
}

/// `GET /api/blogs/admin/all`: every post including drafts.
pub async fn list_all_handler(
    _admin: AuthenticatedAdmin,
    State(state): State<AppState>,
) -> Result<Json<Vec<BlogResponse>>, AppError> {
    let blogs = state.blog_repo.list(true).await?;
    Ok(Json(blogs.into_iter().map(BlogResponse::from).collect()))
}

/// `GET /api/blogs/{id}`: a single post with its rendered body.
pub async fn get_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<BlogResponse>, AppError> {
    let id = parse_object_id(&id)?;
    let blog = state
        .blog_repo
        .find_by_id(id)
        .await?
        .ok_or_else(|| blog_not_found(&id))?;

    let html = render_markdown(&blog.content);
    let mut response = BlogResponse::from(blog);
    response.content_html = Some(html);
    Ok(Json(response))
}

/// `POST /api/blogs`
pub async fn create_handler(
    _admin: AuthenticatedAdmin,
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<BlogResponse>), AppError> {
    let mut form = UploadForm::read(multipart, &BLOG_IMAGE).await?;

    let title = form.required_text("title")?;
    let content = form.required_text("content")?;
    let category = form
        .text("category")
        .filter(|c| !c.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_BLOG_CATEGORY.to_string());
    let tags = form.string_list("tags")?.unwrap_or_default();
    let published = form.bool("published")?.unwrap_or(false);
    let excerpt = form.text("excerpt");

    let image = form
        .store_file(state.storage_client.as_ref())
        .await?
        .map(|f| f.public_path);

    let now = Utc::now();
    let blog = state
        .blog_repo
        .create(Blog {
            id: None,
            title,
            content,
            excerpt,
            image,
            category,
            tags,
            published,
            created_at: now,
            updated_at: now,
        })
        .await?;

    tracing::info!("Created blog '{}'", blog.title);
    Ok((StatusCode::CREATED, Json(blog.into())))
}

/// `PUT /api/blogs/{id}`: partial update, absent fields keep their value.
pub async fn update_handler(
    _admin: AuthenticatedAdmin,
    State(state): State<AppState>,
    Path(id): Path<String>,
    multipart: Multipart,
) -> Result<Json<BlogResponse>, AppError> {
    let id = parse_object_id(&id)?;
    let mut form = UploadForm::read(multipart, &BLOG_IMAGE).await?;

    let mut update = BlogUpdate {
        title: form.text("title"),
        content: form.text("content"),
        excerpt: form.text("excerpt"),
        image: None,
        category: form.text("category").filter(|c| !c.trim().is_empty()),
        tags: form.string_list("tags")?,
        published: form.bool("published")?,
    };
    for (name, value) in [("title", &update.title), ("content", &update.content)] {
        if value.as_deref().is_some_and(|v| v.trim().is_empty()) {
            return Err(AppError::BadRequest(format!("Field '{name}' must not be empty")));
        }
    }

    if state.blog_repo.find_by_id(id).await?.is_none() {
        return Err(blog_not_found(&id));
    }
    update.image = form
        .store_file(state.storage_client.as_ref())
        .await?
        .map(|f| f.public_path);

    let blog = state.blog_repo.update(id, update).await?;
    Ok(Json(blog.into()))
}

/// `DELETE /api/blogs/{id}`
pub async fn delete_handler(
    _admin: AuthenticatedAdmin,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    let id = parse_object_id(&id)?;
    state.blog_repo.delete(id).await?;
    Ok(Json(MessageResponse::new("Blog deleted")))
}
