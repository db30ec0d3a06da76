mod common;

use axum::http::StatusCode;
use axum_test::multipart::{MultipartForm, Part};

#[tokio::test]
async fn three_likes_leave_shares_untouched() {
    let env = common::TestEnv::start().await;
    let server = env.server();
    let token = env.admin_token(&server).await;
    let id = common::create_quote(&server, &token, "Automate yourself out of a job").await;

    for _ in 0..3 {
        // Public: no bearer token.
        server.post(&format!("/api/quotes/{}/like", id)).await;
    }

    let quotes: Vec<serde_json::Value> = server.get("/api/quotes").await.json();
    assert_eq!(quotes.len(), 1);
    assert_eq!(quotes[0]["likes"], 3);
    assert_eq!(quotes[0]["shares"], 0);
}

#[tokio::test]
async fn share_returns_updated_quote() {
    let env = common::TestEnv::start().await;
    let server = env.server();
    let token = env.admin_token(&server).await;
    let id = common::create_quote(&server, &token, "Measure twice").await;

    let shared: serde_json::Value = server
        .post(&format!("/api/quotes/{}/share", id))
        .await
        .json();
    assert_eq!(shared["_id"].as_str(), Some(id.as_str()));
    assert_eq!(shared["shares"], 1);
    assert_eq!(shared["likes"], 0);
}

#[tokio::test]
async fn counters_on_bad_ids() {
    let env = common::TestEnv::start().await;
    let server = env.server_permissive();

    server
        .post(&format!("/api/quotes/{}/like", bson::oid::ObjectId::new().to_hex()))
        .await
        .assert_status_not_found();
    server
        .post("/api/quotes/123/share")
        .await
        .assert_status_bad_request();
}

#[tokio::test]
async fn inactive_quotes_only_in_admin_list() {
    let env = common::TestEnv::start().await;
    let server = env.server();
    let token = env.admin_token(&server).await;

    common::create_quote(&server, &token, "Visible").await;
    server
        .post("/api/quotes")
        .authorization_bearer(&token)
        .multipart(
            MultipartForm::new()
                .add_text("text", "Hidden")
                .add_text("active", "false"),
        )
        .await;

    let public: Vec<serde_json::Value> = server.get("/api/quotes").await.json();
    assert_eq!(public.len(), 1);
    assert_eq!(public[0]["text"].as_str(), Some("Visible"));

    let all: Vec<serde_json::Value> = server
        .get("/api/quotes/all")
        .authorization_bearer(&token)
        .await
        .json();
    assert_eq!(all.len(), 2);
    assert_eq!(all[0]["text"].as_str(), Some("Hidden"));
}

#[tokio::test]
async fn public_list_follows_order() {
    let env = common::TestEnv::start().await;
    let server = env.server();
    let token = env.admin_token(&server).await;

    for (text, order) in [("second", "2"), ("first", "1")] {
        server
            .post("/api/quotes")
            .authorization_bearer(&token)
            .multipart(
                MultipartForm::new()
                    .add_text("text", text)
                    .add_text("order", order),
            )
            .await;
    }

    let public: Vec<serde_json::Value> = server.get("/api/quotes").await.json();
    assert_eq!(public[0]["text"].as_str(), Some("first"));
    assert_eq!(public[1]["text"].as_str(), Some("second"));
}

#[tokio::test]
async fn update_keeps_counters() {
    let env = common::TestEnv::start().await;
    let server = env.server();
    let token = env.admin_token(&server).await;
    let id = common::create_quote(&server, &token, "Before").await;
    server.post(&format!("/api/quotes/{}/like", id)).await;

    let form = MultipartForm::new().add_text("text", "After").add_part(
        "profileImage",
        Part::bytes(common::png_bytes())
            .file_name("me.png")
            .mime_type("image/png"),
    );
    let updated: serde_json::Value = server
        .put(&format!("/api/quotes/{}", id))
        .authorization_bearer(&token)
        .multipart(form)
        .await
        .json();

    assert_eq!(updated["text"].as_str(), Some("After"));
    assert_eq!(updated["likes"], 1);
    assert!(updated["profileImage"]
        .as_str()
        .unwrap()
        .starts_with("/uploads/quotes/"));
}

#[tokio::test]
async fn delete_quote() {
    let env = common::TestEnv::start().await;
    let server = env.server();
    let token = env.admin_token(&server).await;
    let id = common::create_quote(&server, &token, "Short-lived").await;

    let deleted: serde_json::Value = server
        .delete(&format!("/api/quotes/{}", id))
        .authorization_bearer(&token)
        .await
        .json();
    assert_eq!(deleted["message"].as_str(), Some("Quote deleted"));

    let public: Vec<serde_json::Value> = server.get("/api/quotes").await.json();
    assert!(public.is_empty());
}

#[tokio::test]
async fn oversized_profile_image_is_rejected() {
    let env = common::TestEnv::start().await;
    let server = env.server_permissive();
    let token = env.admin_token(&server).await;

    let form = MultipartForm::new().add_text("text", "Too big").add_part(
        "profileImage",
        Part::bytes(vec![0u8; 2 * 1024 * 1024 + 1])
            .file_name("huge.png")
            .mime_type("image/png"),
    );
    server
        .post("/api/quotes")
        .authorization_bearer(&token)
        .multipart(form)
        .await
        .assert_status(StatusCode::PAYLOAD_TOO_LARGE);

    assert!(env.repos.quote_repo.list(false).await.unwrap().is_empty());
}

#[tokio::test]
async fn create_requires_text() {
    let env = common::TestEnv::start().await;
    let server = env.server_permissive();
    let token = env.admin_token(&server).await;

    server
        .post("/api/quotes")
        .authorization_bearer(&token)
        .multipart(MultipartForm::new().add_text("order", "1"))
        .await
        .assert_status_bad_request();
}
