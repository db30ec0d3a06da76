use std::path::Path;
use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::http::header::{ACCESS_CONTROL_ALLOW_ORIGIN, AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderName, HeaderValue, Method};
use axum::routing::{get, patch, post};
use axum::{Json, Router};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

use crate::api::upload::{BLOG_IMAGE, CV_DOCUMENT, HOBBY_IMAGE, PUBLIC_PREFIX, QUOTE_PROFILE_IMAGE};
use crate::api::{auth, blogs, categories, cv, hobbies, quotes};
use crate::auth::token::TokenService;
use crate::db::admin_repository::AdminRepository;
use crate::db::blog_repository::BlogRepository;
use crate::db::category_repository::CategoryRepository;
use crate::db::cv_repository::CvRepository;
use crate::db::hobby_repository::HobbyRepository;
use crate::db::memory::{
    MemoryAdminRepository, MemoryBlogRepository, MemoryCategoryRepository, MemoryCvRepository,
    MemoryHobbyRepository, MemoryQuoteRepository,
};
use crate::db::quote_repository::QuoteRepository;
use crate::error::AppError;
use crate::storage::client::StorageClient;

const CROSS_ORIGIN_RESOURCE_POLICY: HeaderName =
    HeaderName::from_static("cross-origin-resource-policy");

/// One repository per collection.
#[derive(Clone)]
pub struct Repositories {
    pub blog_repo: Arc<dyn BlogRepository>,
    pub cv_repo: Arc<dyn CvRepository>,
    pub hobby_repo: Arc<dyn HobbyRepository>,
    pub category_repo: Arc<dyn CategoryRepository>,
    pub quote_repo: Arc<dyn QuoteRepository>,
    pub admin_repo: Arc<dyn AdminRepository>,
}

impl Repositories {
    /// Process-local repositories; nothing survives a restart.
    pub fn in_memory() -> Self {
        Self {
            blog_repo: Arc::new(MemoryBlogRepository::new()),
            cv_repo: Arc::new(MemoryCvRepository::new()),
            hobby_repo: Arc::new(MemoryHobbyRepository::new()),
            category_repo: Arc::new(MemoryCategoryRepository::new()),
            quote_repo: Arc::new(MemoryQuoteRepository::new()),
            admin_repo: Arc::new(MemoryAdminRepository::new()),
        }
    }
}

/// Shared application state passed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub blog_repo: Arc<dyn BlogRepository>,
    pub cv_repo: Arc<dyn CvRepository>,
    pub hobby_repo: Arc<dyn HobbyRepository>,
    pub category_repo: Arc<dyn CategoryRepository>,
    pub quote_repo: Arc<dyn QuoteRepository>,
    pub admin_repo: Arc<dyn AdminRepository>,
    pub storage_client: Arc<dyn StorageClient>,
    pub tokens: Arc<TokenService>,
}

impl AppState {
    pub fn new(
        repos: Repositories,
        storage_client: Arc<dyn StorageClient>,
        tokens: TokenService,
    ) -> Self {
        Self {
            blog_repo: repos.blog_repo,
            cv_repo: repos.cv_repo,
            hobby_repo: repos.hobby_repo,
            category_repo: repos.category_repo,
            quote_repo: repos.quote_repo,
            admin_repo: repos.admin_repo,
            storage_client,
            tokens: Arc::new(tokens),
        }
    }
}

async fn health_handler() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn fallback_handler() -> AppError {
    AppError::NotFound("Route not found".into())
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin '{}'", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_credentials(true)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE])
}

fn api_routes() -> Router<AppState> {
    let blog_routes = Router::new()
        .route(
            "/api/blogs",
            get(blogs::list_published_handler).post(blogs::create_handler),
        )
        .route("/api/blogs/admin/all", get(blogs::list_all_handler))
        .route(
            "/api/blogs/{id}",
            get(blogs::get_handler)
                .put(blogs::update_handler)
                .delete(blogs::delete_handler),
        )
        .layer(DefaultBodyLimit::max(BLOG_IMAGE.body_limit()));

    let cv_routes = Router::new()
        .route("/api/cv/active", get(cv::get_active_handler))
        .route("/api/cv/all", get(cv::list_all_handler))
        .route("/api/cv/upload", post(cv::upload_handler))
        .route("/api/cv/{id}/activate", patch(cv::activate_handler))
        .route("/api/cv/{id}", axum::routing::delete(cv::delete_handler))
        .layer(DefaultBodyLimit::max(CV_DOCUMENT.body_limit()));

    let hobby_routes = Router::new()
        .route(
            "/api/hobbies",
            get(hobbies::list_handler).post(hobbies::create_handler),
        )
        .route(
            "/api/hobbies/{id}",
            axum::routing::put(hobbies::update_handler).delete(hobbies::delete_handler),
        )
        .layer(DefaultBodyLimit::max(HOBBY_IMAGE.body_limit()));

    let quote_routes = Router::new()
        .route(
            "/api/quotes",
            get(quotes::list_active_handler).post(quotes::create_handler),
        )
        .route("/api/quotes/all", get(quotes::list_all_handler))
        .route(
            "/api/quotes/{id}",
            axum::routing::put(quotes::update_handler).delete(quotes::delete_handler),
        )
        .route("/api/quotes/{id}/like", post(quotes::like_handler))
        .route("/api/quotes/{id}/share", post(quotes::share_handler))
        .layer(DefaultBodyLimit::max(QUOTE_PROFILE_IMAGE.body_limit()));

    Router::new()
        .route(
            "/api/categories",
            get(categories::list_handler).post(categories::create_handler),
        )
        .route(
            "/api/categories/{id}",
            axum::routing::put(categories::update_handler).delete(categories::delete_handler),
        )
        .route("/api/auth/login", post(auth::login_handler))
        .route("/api/health", get(health_handler))
        .merge(blog_routes)
        .merge(cv_routes)
        .merge(hobby_routes)
        .merge(quote_routes)
}

/// Build the full HTTP router.
///
/// API routes get the credentialed CORS policy. Files under `upload_dir`
/// are served read-only at `/uploads` to any origin. Every response carries
/// `Cross-Origin-Resource-Policy: cross-origin`.
pub fn build_router(state: AppState, cors_origins: &[String], upload_dir: &Path) -> Router {
    let api = api_routes()
        .fallback(fallback_handler)
        .layer(cors_layer(cors_origins));

    let uploads = Router::new()
        .nest_service(PUBLIC_PREFIX, ServeDir::new(upload_dir))
        .layer(SetResponseHeaderLayer::overriding(
            ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderValue::from_static("*"),
        ));

    api.merge(uploads)
        .layer(SetResponseHeaderLayer::overriding(
            CROSS_ORIGIN_RESOURCE_POLICY,
            HeaderValue::from_static("cross-origin"),
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
