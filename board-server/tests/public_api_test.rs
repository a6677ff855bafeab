//! Public board API integration tests
//!
//! Covers listing, viewing, writing posts and comments, the password gate
//! and address masking, against an in-memory database.

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
};
use serde_json::json;

mod common;
use common::{test_config, TestApp};

#[tokio::test]
async fn test_health_is_always_open() {
    let app = TestApp::with_config(test_config("s3cret")).await;

    let response = app.get("/health", "1.2.3.4").await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.text, "OK");
}

#[tokio::test]
async fn test_password_gate_challenges_without_credentials() {
    let app = TestApp::with_config(test_config("s3cret")).await;

    let response = app.get("/api/public/posts", "1.2.3.4").await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(
        response.header(header::WWW_AUTHENTICATE),
        Some("Basic realm=\"Protected Area\"")
    );
}

#[tokio::test]
async fn test_password_gate_accepts_any_user_name() {
    use base64::{engine::general_purpose::STANDARD, Engine as _};

    let app = TestApp::with_config(test_config("s3cret")).await;
    let request = axum::http::Request::builder()
        .uri("/api/public/posts")
        .header(header::AUTHORIZATION, format!("Basic {}", STANDARD.encode("whoever:s3cret")))
        .body(axum::body::Body::empty())
        .unwrap();

    let response = app.send(request).await;
    assert_eq!(response.status, StatusCode::OK);

    let wrong = axum::http::Request::builder()
        .uri("/api/public/posts")
        .header(header::AUTHORIZATION, format!("Basic {}", STANDARD.encode("whoever:nope")))
        .body(axum::body::Body::empty())
        .unwrap();
    assert_eq!(app.send(wrong).await.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_create_and_list_posts() {
    let app = TestApp::new().await;
    let first = app.create_post("203.0.113.5", "first").await;
    let second = app.create_post("::ffff:198.51.100.7", "second").await;

    let response = app.get("/api/public/posts", "192.0.2.1").await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["success"], true);
    let data = response.body["data"].as_array().unwrap();
    assert_eq!(data.len(), 2);
    // newest first
    assert_eq!(data[0]["id"], second);
    assert_eq!(data[1]["id"], first);
    assert_eq!(data[0]["author_ip"], "198.51");
    assert_eq!(data[1]["author_ip"], "203.0");
    assert!(data[0].get("ip").is_none(), "full address must not leak");
    assert_eq!(data[0]["user_vote"], serde_json::Value::Null);
    assert_eq!(data[0]["promoted_at"], serde_json::Value::Null);
    assert_eq!(response.body["pagination"]["page"], 1);
    assert_eq!(response.body["pagination"]["limit"], 15);
    assert_eq!(response.body["pagination"]["hasNext"], false);
}

#[tokio::test]
async fn test_listing_pages_and_clamps_limit() {
    let app = TestApp::new().await;
    for i in 0..5 {
        app.create_post("10.0.0.1", &format!("post {}", i)).await;
    }

    let page1 = app.get("/api/public/posts?page=1&limit=2", "10.0.0.2").await;
    assert_eq!(page1.body["data"].as_array().unwrap().len(), 2);
    assert_eq!(page1.body["pagination"]["hasNext"], true);

    let page3 = app.get("/api/public/posts?page=3&limit=2", "10.0.0.2").await;
    assert_eq!(page3.body["data"].as_array().unwrap().len(), 1);
    assert_eq!(page3.body["pagination"]["hasNext"], false);

    let huge = app.get("/api/public/posts?limit=1000", "10.0.0.2").await;
    assert_eq!(huge.body["pagination"]["limit"], 100);
}

#[tokio::test]
async fn test_notices_are_pinned_first() {
    let app = TestApp::new().await;
    let old = app.create_post("10.0.0.1", "old").await;
    let middle = app.create_post("10.0.0.1", "middle").await;
    let newest = app.create_post("10.0.0.1", "newest").await;

    let response = app
        .admin(Method::POST, &format!("/api/admin/notice/{}", old), Some(json!({ "is_notice": 1 })))
        .await;
    assert_eq!(response.status, StatusCode::OK, "{}", response.text);

    let listing = app.get("/api/public/posts", "10.0.0.9").await;
    let ids: Vec<i64> = listing.body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["id"].as_i64().unwrap())
        .collect();
    assert_eq!(ids, vec![old, newest, middle]);
    assert_eq!(listing.body["data"][0]["is_notice"], true);
}

#[tokio::test]
async fn test_viewing_a_post_counts_views() {
    let app = TestApp::new().await;
    let id = app.create_post("10.0.0.1", "viewed").await;

    let first = app.get(&format!("/api/public/post/{}", id), "10.0.0.2").await;
    assert_eq!(first.status, StatusCode::OK);
    assert_eq!(first.body["data"]["views"], 1);
    assert_eq!(first.body["data"]["content"], "body text");
    assert_eq!(first.body["data"]["author_ip"], "10.0");

    let second = app.get(&format!("/api/public/post/{}", id), "10.0.0.3").await;
    assert_eq!(second.body["data"]["views"], 2);
}

#[tokio::test]
async fn test_view_reports_callers_vote() {
    let app = TestApp::new().await;
    let id = app.create_post("10.0.0.1", "voted").await;
    app.vote("10.0.0.2", id, "dislike").await;

    let voter = app.get(&format!("/api/public/post/{}", id), "10.0.0.2").await;
    assert_eq!(voter.body["data"]["user_vote"], "dislike");

    let other = app.get(&format!("/api/public/post/{}", id), "10.0.0.3").await;
    assert_eq!(other.body["data"]["user_vote"], serde_json::Value::Null);
}

#[tokio::test]
async fn test_get_post_rejects_bad_and_missing_ids() {
    let app = TestApp::new().await;

    let bad = app.get("/api/public/post/abc", "10.0.0.1").await;
    assert_eq!(bad.status, StatusCode::BAD_REQUEST);
    assert_eq!(bad.body["success"], false);
    assert_eq!(bad.body["code"], "BAD_REQUEST");

    let zero = app.get("/api/public/post/0", "10.0.0.1").await;
    assert_eq!(zero.status, StatusCode::BAD_REQUEST);

    let missing = app.get("/api/public/post/999", "10.0.0.1").await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
    assert_eq!(missing.body["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_unparseable_paging_falls_back_to_defaults() {
    let app = TestApp::new().await;
    app.create_post("10.0.0.1", "only post").await;

    for query in ["page=abc", "page=-1&limit=0", "limit=lots", "page=&limit="] {
        let response = app.get(&format!("/api/public/posts?{}", query), "10.0.0.2").await;
        assert_eq!(response.status, StatusCode::OK, "{}: {}", query, response.text);
        assert_eq!(response.body["pagination"]["page"], 1);
        assert_eq!(response.body["pagination"]["limit"], 15);
        assert_eq!(response.body["data"].as_array().unwrap().len(), 1);
    }

    let trailing = app.get("/api/public/recommended-posts?page=2x&limit=5abc", "10.0.0.2").await;
    assert_eq!(trailing.status, StatusCode::OK);
    assert_eq!(trailing.body["pagination"]["page"], 2);
    assert_eq!(trailing.body["pagination"]["limit"], 5);
}

#[tokio::test]
async fn test_malformed_bodies_get_error_envelope() {
    let app = TestApp::new().await;

    let wrong_type = app
        .post_json(
            "/api/public/post/",
            "10.0.0.1",
            json!({ "author": 5, "title": "t", "content": "x" }),
        )
        .await;
    assert_eq!(wrong_type.status, StatusCode::BAD_REQUEST);
    assert_eq!(wrong_type.body["success"], false);
    assert_eq!(wrong_type.body["code"], "BAD_REQUEST");

    let broken = app
        .send(
            Request::builder()
                .method(Method::POST)
                .uri("/api/public/comment/")
                .header("x-forwarded-for", "10.0.0.1")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from("{not json"))
                .unwrap(),
        )
        .await;
    assert_eq!(broken.status, StatusCode::BAD_REQUEST);
    assert_eq!(broken.body["success"], false);
    assert!(broken.body["message"].is_string());

    let no_content_type = app
        .send(
            Request::builder()
                .method(Method::POST)
                .uri("/api/public/post/")
                .header("x-forwarded-for", "10.0.0.1")
                .body(Body::from(r#"{"author":"a","title":"t","content":"x"}"#))
                .unwrap(),
        )
        .await;
    assert_eq!(no_content_type.status, StatusCode::BAD_REQUEST);
    assert_eq!(no_content_type.body["success"], false);
}

#[tokio::test]
async fn test_create_post_validates_fields() {
    let app = TestApp::new().await;

    let blank_title = app
        .post_json(
            "/api/public/post/",
            "10.0.0.1",
            json!({ "author": "anon", "title": "   ", "content": "x" }),
        )
        .await;
    assert_eq!(blank_title.status, StatusCode::BAD_REQUEST);

    let missing_content = app
        .post_json("/api/public/post/", "10.0.0.1", json!({ "author": "anon", "title": "t" }))
        .await;
    assert_eq!(missing_content.status, StatusCode::BAD_REQUEST);

    let long_author = app
        .post_json(
            "/api/public/post/",
            "10.0.0.1",
            json!({ "author": "a".repeat(51), "title": "t", "content": "x" }),
        )
        .await;
    assert_eq!(long_author.status, StatusCode::BAD_REQUEST);

    let listing = app.get("/api/public/posts", "10.0.0.1").await;
    assert!(listing.body["data"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_comment_tree_nests_replies() {
    let app = TestApp::new().await;
    let post_id = app.create_post("10.0.0.1", "threaded").await;

    let root_a = app.create_comment("10.0.0.2", post_id, None).await;
    let root_b = app.create_comment("10.0.0.3", post_id, None).await;
    let reply = app.create_comment("10.0.0.4", post_id, Some(root_a)).await;
    let nested = app.create_comment("10.0.0.5", post_id, Some(reply)).await;

    let response = app.get(&format!("/api/public/comments/{}", post_id), "10.0.0.9").await;

    assert_eq!(response.status, StatusCode::OK);
    let data = &response.body["data"];
    assert_eq!(data["post_id"], post_id);
    assert_eq!(data["total_count"], 4);

    let roots = data["comments"].as_array().unwrap();
    assert_eq!(roots.len(), 2);
    assert_eq!(roots[0]["id"], root_a);
    assert_eq!(roots[1]["id"], root_b);
    assert_eq!(roots[0]["replies"][0]["id"], reply);
    assert_eq!(roots[0]["replies"][0]["replies"][0]["id"], nested);
    assert_eq!(roots[0]["replies"][0]["author_ip"], "10.0");
    assert!(roots[1]["replies"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_comment_ids_accept_numeric_strings() {
    let app = TestApp::new().await;
    let post_id = app.create_post("10.0.0.1", "strings").await;
    let parent = app.create_comment("10.0.0.2", post_id, None).await;

    let response = app
        .post_json(
            "/api/public/comment/",
            "10.0.0.3",
            json!({
                "post_id": post_id.to_string(),
                "parent_id": parent.to_string(),
                "author": "anon",
                "content": "reply",
            }),
        )
        .await;
    assert_eq!(response.status, StatusCode::CREATED, "{}", response.text);
    assert_eq!(response.body["data"]["parent_id"], parent);

    let empty_parent = app
        .post_json(
            "/api/public/comment/",
            "10.0.0.3",
            json!({ "post_id": post_id, "parent_id": "", "author": "anon", "content": "root" }),
        )
        .await;
    assert_eq!(empty_parent.status, StatusCode::CREATED);
    assert_eq!(empty_parent.body["data"]["parent_id"], serde_json::Value::Null);
}

#[tokio::test]
async fn test_comment_validation() {
    let app = TestApp::new().await;
    let post_id = app.create_post("10.0.0.1", "rules").await;
    let other_post = app.create_post("10.0.0.1", "other").await;
    let foreign_parent = app.create_comment("10.0.0.2", other_post, None).await;

    let bad_post_id = app
        .post_json(
            "/api/public/comment/",
            "10.0.0.3",
            json!({ "post_id": "abc", "author": "anon", "content": "x" }),
        )
        .await;
    assert_eq!(bad_post_id.status, StatusCode::BAD_REQUEST);

    let negative_parent = app
        .post_json(
            "/api/public/comment/",
            "10.0.0.3",
            json!({ "post_id": post_id, "parent_id": -4, "author": "anon", "content": "x" }),
        )
        .await;
    assert_eq!(negative_parent.status, StatusCode::BAD_REQUEST);

    let missing_post = app
        .post_json(
            "/api/public/comment/",
            "10.0.0.3",
            json!({ "post_id": 9999, "author": "anon", "content": "x" }),
        )
        .await;
    assert_eq!(missing_post.status, StatusCode::NOT_FOUND);

    let wrong_thread = app
        .post_json(
            "/api/public/comment/",
            "10.0.0.3",
            json!({ "post_id": post_id, "parent_id": foreign_parent, "author": "anon", "content": "x" }),
        )
        .await;
    assert_eq!(wrong_thread.status, StatusCode::NOT_FOUND);

    let blank = app
        .post_json(
            "/api/public/comment/",
            "10.0.0.3",
            json!({ "post_id": post_id, "author": "anon", "content": "  " }),
        )
        .await;
    assert_eq!(blank.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_reply_to_deleted_comment_is_rejected() {
    let app = TestApp::new().await;
    let post_id = app.create_post("10.0.0.1", "thread").await;
    let parent = app.create_comment("10.0.0.2", post_id, None).await;

    let deleted = app
        .admin(Method::DELETE, &format!("/api/admin/comment/{}", parent), None)
        .await;
    assert_eq!(deleted.status, StatusCode::OK);

    let reply = app
        .post_json(
            "/api/public/comment/",
            "10.0.0.3",
            json!({ "post_id": post_id, "parent_id": parent, "author": "anon", "content": "late" }),
        )
        .await;
    assert_eq!(reply.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_comments_of_missing_post_is_404() {
    let app = TestApp::new().await;

    let response = app.get("/api/public/comments/42", "10.0.0.1").await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);

    let invalid = app.get("/api/public/comments/x", "10.0.0.1").await;
    assert_eq!(invalid.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_pages_are_served_from_static_dir() {
    let dir = std::env::temp_dir().join(format!("board-pages-{}", uuid::Uuid::new_v4()));
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("index.html"), "<h1>index</h1>").unwrap();
    std::fs::write(dir.join("post.html"), "<h1>post</h1>").unwrap();
    std::fs::write(dir.join("404.html"), "<h1>missing</h1>").unwrap();
    std::fs::write(dir.join("style.css"), "body {}").unwrap();

    let mut config = test_config("");
    config.server.static_dir = dir.to_string_lossy().into_owned();
    let app = TestApp::with_config(config).await;

    let index = app.get("/", "10.0.0.1").await;
    assert_eq!(index.status, StatusCode::OK);
    assert_eq!(index.text, "<h1>index</h1>");

    let post = app.get("/board/17", "10.0.0.1").await;
    assert_eq!(post.text, "<h1>post</h1>");

    let asset = app.get("/style.css", "10.0.0.1").await;
    assert_eq!(asset.status, StatusCode::OK);

    let missing = app.get("/no/such/page", "10.0.0.1").await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
    assert_eq!(missing.text, "<h1>missing</h1>");

    std::fs::remove_dir_all(&dir).ok();
}
