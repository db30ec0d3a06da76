mod common;

use axum::http::StatusCode;
use axum_test::multipart::{MultipartForm, Part};

fn blog_form() -> MultipartForm {
    MultipartForm::new()
        .add_text("title", "Zero-downtime deploys")
        .add_text("content", "# Rolling updates\nwith **readiness** probes")
        .add_text("excerpt", "How we ship")
        .add_text("category", "Kubernetes")
        .add_text("tags", r#"["k8s","ci"]"#)
        .add_text("published", "true")
}

async fn create_blog(
    server: &axum_test::TestServer,
    token: &str,
    form: MultipartForm,
) -> serde_json::Value {
    let response = server
        .post("/api/blogs")
        .authorization_bearer(token)
        .multipart(form)
        .await;
    response.assert_status(StatusCode::CREATED);
    response.json()
}

#[tokio::test]
async fn created_fields_round_trip() {
    let env = common::TestEnv::start().await;
    let server = env.server();
    let token = env.admin_token(&server).await;

    let created = create_blog(&server, &token, blog_form()).await;
    let id = created["_id"].as_str().unwrap();

    let read: serde_json::Value = server.get(&format!("/api/blogs/{}", id)).await.json();
    assert_eq!(read["title"].as_str(), Some("Zero-downtime deploys"));
    assert_eq!(
        read["content"].as_str(),
        Some("# Rolling updates\nwith **readiness** probes")
    );
    assert_eq!(read["excerpt"].as_str(), Some("How we ship"));
    assert_eq!(read["category"].as_str(), Some("Kubernetes"));
    assert_eq!(read["tags"], serde_json::json!(["k8s", "ci"]));
    assert_eq!(read["published"], true);
    assert_eq!(read["createdAt"], created["createdAt"]);

    let html = read["contentHtml"].as_str().unwrap();
    assert!(html.contains("<h1>Rolling updates</h1>"));
    assert!(html.contains("<strong>readiness</strong>"));
}

#[tokio::test]
async fn defaults_apply_when_fields_are_omitted() {
    let env = common::TestEnv::start().await;
    let server = env.server();
    let token = env.admin_token(&server).await;

    let form = MultipartForm::new()
        .add_text("title", "Draft")
        .add_text("content", "tbd");
    let created = create_blog(&server, &token, form).await;

    assert_eq!(created["category"].as_str(), Some("DevOps"));
    assert_eq!(created["tags"], serde_json::json!([]));
    assert_eq!(created["published"], false);
    assert!(created["image"].is_null());
}

#[tokio::test]
async fn drafts_are_hidden_from_public_list() {
    let env = common::TestEnv::start().await;
    let server = env.server();
    let token = env.admin_token(&server).await;

    create_blog(&server, &token, blog_form()).await;
    create_blog(
        &server,
        &token,
        MultipartForm::new()
            .add_text("title", "Unfinished")
            .add_text("content", "..."),
    )
    .await;

    let public: Vec<serde_json::Value> = server.get("/api/blogs").await.json();
    assert_eq!(public.len(), 1);
    assert_eq!(public[0]["title"].as_str(), Some("Zero-downtime deploys"));
    assert!(public[0].get("contentHtml").is_none());

    let all: Vec<serde_json::Value> = server
        .get("/api/blogs/admin/all")
        .authorization_bearer(&token)
        .await
        .json();
    assert_eq!(all.len(), 2);
    // Newest first.
    assert_eq!(all[0]["title"].as_str(), Some("Unfinished"));
}

#[tokio::test]
async fn image_is_stored_and_served() {
    let env = common::TestEnv::start().await;
    let server = env.server();
    let token = env.admin_token(&server).await;

    let form = blog_form().add_part(
        "image",
        Part::bytes(common::png_bytes())
            .file_name("cover.png")
            .mime_type("image/png"),
    );
    let created = create_blog(&server, &token, form).await;

    let image = created["image"].as_str().unwrap();
    assert!(image.starts_with("/uploads/blogs/"), "got {}", image);
    assert!(image.ends_with(".png"));

    let file = server.get(image).await;
    assert_eq!(file.as_bytes().to_vec(), common::png_bytes());
}

#[tokio::test]
async fn update_is_partial() {
    let env = common::TestEnv::start().await;
    let server = env.server();
    let token = env.admin_token(&server).await;

    let created = create_blog(&server, &token, blog_form()).await;
    let id = created["_id"].as_str().unwrap();

    let updated: serde_json::Value = server
        .put(&format!("/api/blogs/{}", id))
        .authorization_bearer(&token)
        .multipart(
            MultipartForm::new()
                .add_text("title", "Renamed")
                .add_text("published", "false"),
        )
        .await
        .json();

    assert_eq!(updated["title"].as_str(), Some("Renamed"));
    assert_eq!(updated["published"], false);
    assert_eq!(updated["category"].as_str(), Some("Kubernetes"));
    assert_eq!(updated["tags"], serde_json::json!(["k8s", "ci"]));
    assert_eq!(updated["createdAt"], created["createdAt"]);
}

#[tokio::test]
async fn delete_then_not_found() {
    let env = common::TestEnv::start().await;
    let server = env.server_permissive();
    let token = env.admin_token(&server).await;

    let created = create_blog(&server, &token, blog_form()).await;
    let path = format!("/api/blogs/{}", created["_id"].as_str().unwrap());

    let deleted: serde_json::Value = server
        .delete(&path)
        .authorization_bearer(&token)
        .await
        .json();
    assert_eq!(deleted["message"].as_str(), Some("Blog deleted"));

    server.get(&path).await.assert_status_not_found();
    server
        .delete(&path)
        .authorization_bearer(&token)
        .await
        .assert_status_not_found();
}

#[tokio::test]
async fn validation_errors() {
    let env = common::TestEnv::start().await;
    let server = env.server_permissive();
    let token = env.admin_token(&server).await;

    server
        .post("/api/blogs")
        .authorization_bearer(&token)
        .multipart(MultipartForm::new().add_text("content", "no title"))
        .await
        .assert_status_bad_request();

    server
        .post("/api/blogs")
        .authorization_bearer(&token)
        .multipart(blog_form().add_text("published", "sometimes"))
        .await
        .assert_status_bad_request();

    server.get("/api/blogs/xyz").await.assert_status_bad_request();

    let created = create_blog(&server, &token, blog_form()).await;
    let path = format!("/api/blogs/{}", created["_id"].as_str().unwrap());
    for field in ["title", "content"] {
        let response = server
            .put(&path)
            .authorization_bearer(&token)
            .multipart(MultipartForm::new().add_text(field, "   "))
            .await;
        response.assert_status_bad_request();
    }
    let stored: serde_json::Value = server.get(&path).await.json();
    assert_eq!(stored["title"], created["title"]);
    assert_eq!(stored["content"], created["content"]);

    server
        .put(&format!("/api/blogs/{}", bson::oid::ObjectId::new().to_hex()))
        .authorization_bearer(&token)
        .multipart(MultipartForm::new().add_text("title", "Ghost"))
        .await
        .assert_status_not_found();
}

#[tokio::test]
async fn mutations_require_admin() {
    let env = common::TestEnv::start().await;
    let server = env.server_permissive();

    server
        .post("/api/blogs")
        .multipart(blog_form())
        .await
        .assert_status_unauthorized();
    server
        .get("/api/blogs/admin/all")
        .await
        .assert_status_unauthorized();
}
