#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;

use axum::Router;
use axum_test::multipart::{MultipartForm, Part};
use tempfile::TempDir;

use portfolio_api::app::{build_router, AppState, Repositories};
use portfolio_api::auth::bootstrap::ensure_admin;
use portfolio_api::auth::token::TokenService;
use portfolio_api::storage::client::{LocalDiskStorage, StorageClient};

pub const ADMIN_EMAIL: &str = "admin@example.com";
pub const ADMIN_PASSWORD: &str = "correct horse battery";
pub const JWT_SECRET: &str = "integration-test-secret";
pub const FRONTEND_ORIGIN: &str = "http://localhost:5173";

/// In-memory repositories, a temporary upload root and the full router.
///
/// The upload directory is removed when this struct is dropped.
pub struct TestEnv {
    _uploads: TempDir,
    pub upload_dir: PathBuf,
    pub router: Router,
    pub repos: Repositories,
    pub storage: Arc<dyn StorageClient>,
}

impl TestEnv {
    /// Build the router over fresh in-memory state with the admin provisioned.
    pub async fn start() -> Self {
        let uploads = tempfile::tempdir().expect("Failed to create upload dir");
        let upload_dir = uploads.path().to_path_buf();

        let repos = Repositories::in_memory();
        ensure_admin(repos.admin_repo.as_ref(), ADMIN_EMAIL, ADMIN_PASSWORD)
            .await
            .expect("Failed to bootstrap admin");

        let storage: Arc<dyn StorageClient> = Arc::new(LocalDiskStorage::new(&upload_dir));
        let state = AppState::new(repos.clone(), storage.clone(), TokenService::new(JWT_SECRET));
        let router = build_router(state, &[FRONTEND_ORIGIN.to_string()], &upload_dir);

        Self {
            _uploads: uploads,
            upload_dir,
            router,
            repos,
            storage,
        }
    }

    /// Build an `axum_test::TestServer` from this environment's router.
    pub fn server(&self) -> axum_test::TestServer {
        axum_test::TestServer::builder()
            .expect_success_by_default()
            .build(self.router.clone())
    }

    /// Build a `TestServer` that does NOT expect success by default (for error tests).
    pub fn server_permissive(&self) -> axum_test::TestServer {
        axum_test::TestServer::builder()
            .build(self.router.clone())
    }

    /// Helper: log in as the bootstrapped admin and return the bearer token.
    pub async fn admin_token(&self, server: &axum_test::TestServer) -> String {
        let response = server
            .post("/api/auth/login")
            .json(&serde_json::json!({
                "email": ADMIN_EMAIL,
                "password": ADMIN_PASSWORD
            }))
            .await;
        response.assert_status_ok();

        let body: serde_json::Value = response.json();
        body["token"]
            .as_str()
            .expect("Login response should contain a token")
            .to_string()
    }
}

/// A small PDF-looking payload.
pub fn pdf_bytes() -> Vec<u8> {
    b"%PDF-1.4\n1 0 obj << /Type /Catalog >> endobj\n%%EOF\n".to_vec()
}

/// A minimal 1x1 PNG.
pub fn png_bytes() -> Vec<u8> {
    vec![
        0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, // PNG signature
        0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44, 0x52, // IHDR chunk
        0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, // 1x1
        0x08, 0x02, 0x00, 0x00, 0x00, 0x90, 0x77, 0x53, 0xDE, // bit depth, color type, CRC
        0x00, 0x00, 0x00, 0x0C, 0x49, 0x44, 0x41, 0x54, // IDAT chunk
        0x08, 0xD7, 0x63, 0xF8, 0xCF, 0xC0, 0x00, 0x00, // compressed data
        0x00, 0x02, 0x00, 0x01, 0xE2, 0x21, 0xBC, 0x33, // CRC
        0x00, 0x00, 0x00, 0x00, 0x49, 0x45, 0x4E, 0x44, // IEND chunk
        0xAE, 0x42, 0x60, 0x82,
    ]
}

/// Multipart form carrying a CV upload.
pub fn cv_form(file_name: &str, version: &str) -> MultipartForm {
    MultipartForm::new().add_text("version", version.to_string()).add_part(
        "cv",
        Part::bytes(pdf_bytes())
            .file_name(file_name.to_string())
            .mime_type("application/pdf"),
    )
}

/// Helper: upload a CV and return the response body.
pub async fn upload_cv(
    server: &axum_test::TestServer,
    token: &str,
    file_name: &str,
    version: &str,
) -> serde_json::Value {
    let response = server
        .post("/api/cv/upload")
        .authorization_bearer(token)
        .multipart(cv_form(file_name, version))
        .await;
    response.assert_status(axum::http::StatusCode::CREATED);
    response.json()
}

/// Helper: create a quote and return its id.
pub async fn create_quote(server: &axum_test::TestServer, token: &str, text: &str) -> String {
    let response = server
        .post("/api/quotes")
        .authorization_bearer(token)
        .multipart(MultipartForm::new().add_text("text", text.to_string()))
        .await;
    response.assert_status(axum::http::StatusCode::CREATED);

    let body: serde_json::Value = response.json();
    body["_id"].as_str().expect("Quote should have an id").to_string()
}
