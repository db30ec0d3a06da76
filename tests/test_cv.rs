mod common;

use axum::http::StatusCode;
use axum_test::multipart::{MultipartForm, Part};

fn id_of(body: &serde_json::Value) -> String {
    body["_id"].as_str().expect("Record should have an id").to_string()
}

#[tokio::test]
async fn upload_activate_delete_scenario() {
    let env = common::TestEnv::start().await;
    let server = env.server();
    let token = env.admin_token(&server).await;

    let a = common::upload_cv(&server, &token, "a.pdf", "1.0").await;
    assert_eq!(a["active"], true);
    let b = common::upload_cv(&server, &token, "b.pdf", "2.0").await;
    assert_eq!(b["active"], true);
    let (a_id, b_id) = (id_of(&a), id_of(&b));

    let active: serde_json::Value = server.get("/api/cv/active").await.json();
    assert_eq!(id_of(&active), b_id);

    let activated: serde_json::Value = server
        .patch(&format!("/api/cv/{}/activate", a_id))
        .authorization_bearer(&token)
        .await
        .json();
    assert_eq!(id_of(&activated), a_id);
    assert_eq!(activated["active"], true);

    let all: Vec<serde_json::Value> = server
        .get("/api/cv/all")
        .authorization_bearer(&token)
        .await
        .json();
    assert_eq!(all.len(), 2);
    // Newest upload first.
    assert_eq!(id_of(&all[0]), b_id);
    assert_eq!(all[0]["active"], false);
    assert_eq!(all[1]["active"], true);

    let deleted: serde_json::Value = server
        .delete(&format!("/api/cv/{}", a_id))
        .authorization_bearer(&token)
        .await
        .json();
    assert_eq!(deleted["message"].as_str(), Some("CV deleted"));

    let permissive = env.server_permissive();
    let response = permissive.get("/api/cv/active").await;
    response.assert_status_not_found();
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"].as_str(), Some("No CV available"));
}

#[tokio::test]
async fn upload_records_metadata_and_serves_file() {
    let env = common::TestEnv::start().await;
    let server = env.server();
    let token = env.admin_token(&server).await;

    let cv = common::upload_cv(&server, &token, "Resume.pdf", "3.1").await;
    assert_eq!(cv["filename"].as_str(), Some("Resume.pdf"));
    assert_eq!(cv["version"].as_str(), Some("3.1"));
    assert!(cv["uploadedAt"].is_string());

    let filepath = cv["filepath"].as_str().unwrap();
    assert!(filepath.starts_with("/uploads/cvs/CV_"), "got {}", filepath);
    assert!(filepath.ends_with(".pdf"));

    let file = server.get(filepath).await;
    assert_eq!(file.as_bytes().to_vec(), common::pdf_bytes());
}

#[tokio::test]
async fn upload_defaults_version() {
    let env = common::TestEnv::start().await;
    let server = env.server();
    let token = env.admin_token(&server).await;

    let form = MultipartForm::new().add_part(
        "cv",
        Part::bytes(common::pdf_bytes())
            .file_name("cv.pdf")
            .mime_type("application/pdf"),
    );
    let response = server
        .post("/api/cv/upload")
        .authorization_bearer(&token)
        .multipart(form)
        .await;

    response.assert_status(StatusCode::CREATED);
    let body: serde_json::Value = response.json();
    assert_eq!(body["version"].as_str(), Some("1.0"));
}

#[tokio::test]
async fn upload_rejects_non_pdf() {
    let env = common::TestEnv::start().await;
    let server = env.server_permissive();
    let token = env.admin_token(&server).await;

    let form = MultipartForm::new().add_part(
        "cv",
        Part::bytes(common::png_bytes())
            .file_name("cv.png")
            .mime_type("image/png"),
    );
    let response = server
        .post("/api/cv/upload")
        .authorization_bearer(&token)
        .multipart(form)
        .await;

    response.assert_status_bad_request();
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"].as_str(), Some("Only PDF files allowed"));
    assert!(env.repos.cv_repo.list_all().await.unwrap().is_empty());
    assert!(!env.upload_dir.join("cvs").exists());
}

#[tokio::test]
async fn upload_without_file_is_bad_request() {
    let env = common::TestEnv::start().await;
    let server = env.server_permissive();
    let token = env.admin_token(&server).await;

    server
        .post("/api/cv/upload")
        .authorization_bearer(&token)
        .multipart(MultipartForm::new().add_text("version", "1.0"))
        .await
        .assert_status_bad_request();
}

#[tokio::test]
async fn upload_requires_admin() {
    let env = common::TestEnv::start().await;
    let server = env.server_permissive();

    server
        .post("/api/cv/upload")
        .multipart(common::cv_form("a.pdf", "1.0"))
        .await
        .assert_status_unauthorized();
    assert!(env.repos.cv_repo.list_all().await.unwrap().is_empty());
}

#[tokio::test]
async fn activating_unknown_id_leaves_no_active_cv() {
    let env = common::TestEnv::start().await;
    let server = env.server_permissive();
    let token = env.admin_token(&server).await;

    common::upload_cv(&server, &token, "a.pdf", "1.0").await;

    server
        .patch(&format!("/api/cv/{}/activate", bson::oid::ObjectId::new().to_hex()))
        .authorization_bearer(&token)
        .await
        .assert_status_not_found();

    // The deactivation step still took effect.
    server.get("/api/cv/active").await.assert_status_not_found();
}

#[tokio::test]
async fn malformed_and_unknown_ids() {
    let env = common::TestEnv::start().await;
    let server = env.server_permissive();
    let token = env.admin_token(&server).await;

    server
        .patch("/api/cv/not-an-id/activate")
        .authorization_bearer(&token)
        .await
        .assert_status_bad_request();

    server
        .delete(&format!("/api/cv/{}", bson::oid::ObjectId::new().to_hex()))
        .authorization_bearer(&token)
        .await
        .assert_status_not_found();
}

#[tokio::test]
async fn oversized_cv_is_rejected() {
    let env = common::TestEnv::start().await;
    let server = env.server_permissive();
    let token = env.admin_token(&server).await;

    let form = MultipartForm::new().add_part(
        "cv",
        Part::bytes(vec![b'x'; 10 * 1024 * 1024 + 1])
            .file_name("huge.pdf")
            .mime_type("application/pdf"),
    );
    server
        .post("/api/cv/upload")
        .authorization_bearer(&token)
        .multipart(form)
        .await
        .assert_status(StatusCode::PAYLOAD_TOO_LARGE);

    assert!(env.repos.cv_repo.list_all().await.unwrap().is_empty());
}
