mod common;

use axum::http::StatusCode;
use common::{TestApp, spawn_app};
use gallery_portal::repository::Repository;
use serde_json::{Value, json};
use uuid::Uuid;

fn post_body(title: &str, published: bool) -> Value {
    json!({
        "title": title,
        "excerpt": "A short teaser",
        "content": "Brush strokes and the patience they take.",
        "coverImage": "https://img.example.com/cover.png",
        "categories": ["Technique"],
        "published": published
    })
}

async fn create_post(app: &TestApp, token: &str, body: Value) -> Value {
    let (status, created) = app.post("/api/blogs", Some(token), body).await;
    assert_eq!(status, StatusCode::CREATED, "{created}");
    created
}

#[tokio::test]
async fn slug_is_derived_from_the_title_and_unique() {
    let app = spawn_app();
    let (_, token) = app.seed_admin().await;

    let created = create_post(&app, &token, post_body("Hello, World! 2024", true)).await;
    assert_eq!(created["slug"], "hello-world-2024");
    assert_eq!(created["readTime"], 1);
    assert!(created["publishedAt"].is_string());

    let (status, body) = app
        .post("/api/blogs", Some(&token), post_body("hello world 2024", false))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["message"], "A blog post with this slug already exists");
}

#[tokio::test]
async fn listing_filters_and_latest_shows_only_published() {
    let app = spawn_app();
    let (_, token) = app.seed_admin().await;

    create_post(&app, &token, post_body("Published Piece", true)).await;
    create_post(&app, &token, post_body("Draft Piece", false)).await;

    let (status, body) = app.get("/api/blogs", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().map(Vec::len), Some(2));

    let (_, body) = app.get("/api/blogs?search=draft", None).await;
    let items = body.as_array().expect("array");
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["title"], "Draft Piece");

    let (_, body) = app.get("/api/blogs?category=technique", None).await;
    assert_eq!(body.as_array().map(Vec::len), Some(2));

    let (_, body) = app.get("/api/blogs/latest", None).await;
    let items = body.as_array().expect("array");
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["title"], "Published Piece");
}

#[tokio::test]
async fn detail_counts_views() {
    let app = spawn_app();
    let (_, token) = app.seed_admin().await;
    let created = create_post(&app, &token, post_body("Viewed", true)).await;
    let uri = format!("/api/blogs/{}", created["_id"].as_str().expect("id"));

    let (_, first) = app.get(&uri, None).await;
    let (_, second) = app.get(&uri, None).await;
    assert_eq!(first["views"], 1);
    assert_eq!(second["views"], 2);
}

#[tokio::test]
async fn update_publishes_and_rederives_a_blank_slug() {
    let app = spawn_app();
    let (_, token) = app.seed_admin().await;
    let created = create_post(&app, &token, post_body("Original Title", false)).await;
    let uri = format!("/api/blogs/{}", created["_id"].as_str().expect("id"));

    let (status, body) = app
        .put(
            &uri,
            Some(&token),
            json!({ "title": "Renamed Title", "slug": "", "published": true }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["slug"], "renamed-title");
    assert_eq!(body["published"], true);
    assert!(body["publishedAt"].is_string());
}

#[tokio::test]
async fn comments_and_replies_are_persisted() {
    let app = spawn_app();
    let (_, token) = app.seed_admin().await;
    let created = create_post(&app, &token, post_body("Discussed", true)).await;
    let blog_id = created["_id"].as_str().expect("id").to_string();

    let (status, body) = app
        .post(
            &format!("/api/blogs/{blog_id}/comments"),
            None,
            json!({ "text": "   " }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Comment text is required");

    let (status, body) = app
        .post(
            &format!("/api/blogs/{blog_id}/comments"),
            None,
            json!({ "text": "Lovely light" }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let comment = &body["comments"][0];
    assert_eq!(comment["author"], "Anonymous");
    let comment_id = comment["_id"].as_str().expect("comment id").to_string();

    let (status, body) = app
        .post(
            &format!("/api/blogs/{blog_id}/comments/{comment_id}/replies"),
            Some(&token),
            json!({ "text": "Thank you!" }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let reply = &body["comments"][0]["replies"][0];
    assert_eq!(reply["author"], "Gallery Admin");
    let reply_id = reply["_id"].as_str().expect("reply id").to_string();

    // A fresh read sees the stored thread.
    let (_, fetched) = app.get(&format!("/api/blogs/{blog_id}"), None).await;
    assert_eq!(fetched["comments"][0]["replies"][0]["text"], "Thank you!");

    let (status, body) = app
        .delete(
            &format!("/api/blogs/{blog_id}/comments/{comment_id}/replies/{reply_id}"),
            Some(&token),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["comments"][0]["replies"], json!([]));

    let (status, body) = app
        .delete(
            &format!("/api/blogs/{blog_id}/comments/{comment_id}/replies/{reply_id}"),
            Some(&token),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Reply not found");

    let (status, body) = app
        .delete(
            &format!("/api/blogs/{blog_id}/comments/{comment_id}"),
            Some(&token),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["comments"], json!([]));
}

#[tokio::test]
async fn stale_post_edit_keeps_newer_comments() {
    let app = spawn_app();
    let (_, token) = app.seed_admin().await;
    let created = create_post(&app, &token, post_body("Contended", true)).await;
    let blog_id = created["_id"].as_str().expect("id").to_string();
    let id = Uuid::parse_str(&blog_id).expect("uuid");

    // An editor holds a copy loaded before the comment arrives.
    let mut stale = app.repo.get_blog(id).await.expect("load").expect("present");

    let (status, _) = app
        .post(
            &format!("/api/blogs/{blog_id}/comments"),
            None,
            json!({ "author": "Visitor", "text": "First!" }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let (_, viewed) = app.get(&format!("/api/blogs/{blog_id}"), None).await;
    assert_eq!(viewed["views"], 1);

    stale.title = "Contended, Revised".to_string();
    let saved = app
        .repo
        .replace_blog(&stale)
        .await
        .expect("replace")
        .expect("present");
    assert_eq!(saved.title, "Contended, Revised");
    assert_eq!(saved.comments.len(), 1);
    assert_eq!(saved.comments[0].author, "Visitor");
    assert_eq!(saved.views, 1);

    let (status, body) = app
        .put(
            &format!("/api/blogs/{blog_id}"),
            Some(&token),
            json!({ "excerpt": "Edited over HTTP" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["comments"][0]["text"], "First!");
}

#[tokio::test]
async fn thread_edits_report_what_is_missing() {
    let app = spawn_app();
    let (_, token) = app.seed_admin().await;
    let created = create_post(&app, &token, post_body("Sparse", true)).await;
    let blog_id = created["_id"].as_str().expect("id");
    let ghost = Uuid::new_v4();

    let (status, body) = app
        .post(
            &format!("/api/blogs/{ghost}/comments"),
            None,
            json!({ "text": "Hello?" }),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Blog not found");

    let (status, body) = app
        .post(
            &format!("/api/blogs/{blog_id}/comments/{ghost}/replies"),
            Some(&token),
            json!({ "text": "To nobody" }),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Comment not found");

    let (status, body) = app
        .delete(
            &format!("/api/blogs/{blog_id}/comments/{ghost}/replies/{ghost}"),
            Some(&token),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Comment not found");

    let (status, body) = app
        .delete(&format!("/api/blogs/{blog_id}/comments/{ghost}"), Some(&token))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Comment not found");
}

#[tokio::test]
async fn replies_require_an_admin() {
    let app = spawn_app();
    let (_, token) = app.seed_admin().await;
    let created = create_post(&app, &token, post_body("Guarded", true)).await;
    let blog_id = created["_id"].as_str().expect("id");

    let (status, _) = app
        .post(
            &format!("/api/blogs/{blog_id}/comments/{blog_id}/replies"),
            None,
            json!({ "text": "sneaky" }),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn blogs_are_unavailable_without_the_store() {
    let app = spawn_app();
    app.probe.set(false);

    let (status, body) = app.get("/api/blogs", None).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["success"], false);
}
