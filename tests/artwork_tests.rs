mod common;

use axum::http::{Method, StatusCode};
use chrono::Utc;
use common::{Part, multipart_request, spawn_app, spawn_demo_app};
use gallery_portal::{
    mock_data::demo_id,
    models::{Artwork, ArtworkCategory, Role},
    repository::Repository,
};
use serde_json::json;
use uuid::Uuid;

fn stored_artwork(title: &str, category: ArtworkCategory) -> Artwork {
    Artwork {
        id: Uuid::new_v4(),
        title: title.to_string(),
        description: "stored".to_string(),
        artist_name: "The Artist".to_string(),
        image_url: "https://img.example.com/a.png".to_string(),
        category,
        tags: Vec::new(),
        dimensions: None,
        year_created: None,
        featured: false,
        views: 0,
        created_at: Utc::now(),
    }
}

#[tokio::test]
async fn demo_listing_filters_case_insensitively_without_touching_the_store() {
    let app = spawn_demo_app();
    app.repo
        .create_artwork(&stored_artwork("Live Only", ArtworkCategory::Abstract))
        .await
        .expect("seed");

    let (status, body) = app.get("/api/artworks?category=Abstract&limit=2", None).await;
    assert_eq!(status, StatusCode::OK);

    let items = body.as_array().expect("array");
    assert!(!items.is_empty() && items.len() <= 2);
    assert!(items.iter().all(|a| a["category"] == "abstract"));
    assert!(items.iter().all(|a| a["title"] != "Live Only"));
}

#[tokio::test]
async fn demo_detail_and_latest_come_from_the_mock_set() {
    let app = spawn_demo_app();

    let (status, body) = app
        .get(&format!("/api/artworks/{}", demo_id(1)), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "Starlight Symphony");
    assert_eq!(body["views"], 234);

    // No view is counted against the demo record.
    let (_, again) = app
        .get(&format!("/api/artworks/{}", demo_id(1)), None)
        .await;
    assert_eq!(again["views"], 234);

    let (status, body) = app.get("/api/artworks/latest", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().map(Vec::len), Some(6));

    let (status, body) = app.get("/api/artworks/categories/all", None).await;
    assert_eq!(status, StatusCode::OK);
    let categories = body.as_array().expect("array");
    assert_eq!(categories.len(), 5);
    assert!(categories.iter().any(|c| c == "abstract"));

    let (status, _) = app
        .get(&format!("/api/artworks/{}", Uuid::new_v4()), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn live_detail_counts_each_view() {
    let app = spawn_app();
    let artwork = app
        .repo
        .create_artwork(&stored_artwork("Counted", ArtworkCategory::Painting))
        .await
        .expect("seed");

    for expected in 1..=3 {
        let (status, body) = app
            .get(&format!("/api/artworks/{}", artwork.id), None)
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["views"], expected);
    }
}

#[tokio::test]
async fn live_listing_sorts_and_limits() {
    let app = spawn_app();
    let mut popular = stored_artwork("Popular", ArtworkCategory::Digital);
    popular.views = 50;
    let quiet = stored_artwork("Quiet", ArtworkCategory::Digital);
    app.repo.create_artwork(&quiet).await.expect("seed");
    app.repo.create_artwork(&popular).await.expect("seed");

    let (status, body) = app.get("/api/artworks?sort=popular&limit=1", None).await;
    assert_eq!(status, StatusCode::OK);
    let items = body.as_array().expect("array");
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["title"], "Popular");
}

#[tokio::test]
async fn create_requires_an_image_url() {
    let app = spawn_app();
    let (_, token) = app.seed_admin().await;

    let (status, body) = app
        .post(
            "/api/artworks",
            Some(&token),
            json!({ "title": "No Image", "description": "missing", "category": "painting" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Image URL is required.");
    assert!(
        app.repo
            .list_artworks(&Default::default())
            .await
            .expect("list")
            .is_empty()
    );
}

#[tokio::test]
async fn create_accepts_url_alias_and_defaults_artist() {
    let app = spawn_app();
    let (_, token) = app.seed_admin().await;

    let (status, body) = app
        .post(
            "/api/artworks",
            Some(&token),
            json!({
                "title": "Aliased",
                "description": "uses imgUrl",
                "imgUrl": "https://img.example.com/aliased.png",
                "category": "Still-Life",
                "tags": ["oil", " ", "still"]
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["imageUrl"], "https://img.example.com/aliased.png");
    assert_eq!(body["artistName"], "The Artist");
    assert_eq!(body["category"], "still-life");
    assert_eq!(body["tags"], json!(["oil", "still"]));
    assert_eq!(body["views"], 0);
}

#[tokio::test]
async fn create_rejects_unknown_category_and_future_year() {
    let app = spawn_app();
    let (_, token) = app.seed_admin().await;

    let (status, body) = app
        .post(
            "/api/artworks",
            Some(&token),
            json!({
                "title": "Bad",
                "description": "bad",
                "imageUrl": "https://img.example.com/bad.png",
                "category": "graffiti",
                "yearCreated": 3000
            }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Artwork validation failed");
    let fields: Vec<&str> = body["errors"]
        .as_array()
        .expect("errors")
        .iter()
        .filter_map(|e| e["field"].as_str())
        .collect();
    assert!(fields.contains(&"category"));
    assert!(fields.contains(&"yearCreated"));
}

#[tokio::test]
async fn multipart_upload_stores_the_image() {
    let app = spawn_app();
    let (_, token) = app.seed_admin().await;

    let request = multipart_request(
        Method::POST,
        "/api/artworks",
        &token,
        &[
            Part::Text("title", "Uploaded"),
            Part::Text("description", "from a form"),
            Part::Text("category", "photography"),
            Part::Text("tags", "film, grain"),
            Part::Text("height", "40"),
            Part::Text("width", "30"),
            Part::Text("featured", "true"),
            Part::File {
                name: "image",
                filename: "photo.png",
                content_type: "image/png",
                bytes: b"\x89PNG fake bytes",
            },
        ],
    );
    let (status, body) = app.send(request).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(app.storage.upload_count(), 1);

    let url = body["imageUrl"].as_str().expect("url");
    assert!(url.starts_with("http://localhost:9000/mock-bucket/artworks/"));
    assert!(url.ends_with(".png"));
    assert_eq!(body["tags"], json!(["film", "grain"]));
    assert_eq!(body["dimensions"]["unit"], "cm");
    assert_eq!(body["featured"], true);
}

#[tokio::test]
async fn multipart_rejects_non_image_files() {
    let app = spawn_app();
    let (_, token) = app.seed_admin().await;

    let request = multipart_request(
        Method::POST,
        "/api/artworks",
        &token,
        &[
            Part::Text("title", "Script"),
            Part::Text("description", "not an image"),
            Part::File {
                name: "image",
                filename: "run.sh",
                content_type: "text/plain",
                bytes: b"echo hi",
            },
        ],
    );
    let (status, _) = app.send(request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn invalid_multipart_create_uploads_nothing() {
    let app = spawn_app();
    let (_, token) = app.seed_admin().await;

    let request = multipart_request(
        Method::POST,
        "/api/artworks",
        &token,
        &[
            Part::Text("description", "no title"),
            Part::Text("category", "graffiti"),
            Part::File {
                name: "image",
                filename: "photo.png",
                content_type: "image/png",
                bytes: b"\x89PNG fake bytes",
            },
        ],
    );
    let (status, body) = app.send(request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Artwork validation failed");
    assert_eq!(app.storage.upload_count(), 0);
    assert!(app.repo.list_artworks(&Default::default()).await.expect("list").is_empty());
}

#[tokio::test]
async fn invalid_multipart_update_uploads_nothing() {
    let app = spawn_app();
    let (_, token) = app.seed_admin().await;
    let stored = stored_artwork("Kept", ArtworkCategory::Digital);
    app.repo.create_artwork(&stored).await.expect("seed");

    let request = multipart_request(
        Method::PUT,
        &format!("/api/artworks/{}", stored.id),
        &token,
        &[
            Part::Text("yearCreated", "1850"),
            Part::File {
                name: "image",
                filename: "photo.png",
                content_type: "image/png",
                bytes: b"\x89PNG fake bytes",
            },
        ],
    );
    let (status, _) = app.send(request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(app.storage.upload_count(), 0);
}

#[tokio::test]
async fn writes_need_an_admin_and_a_live_store() {
    let app = spawn_app();
    let (_, user_token) = app
        .seed_user("Reader", "reader@gallery.test", Role::User)
        .await;
    let (_, admin_token) = app.seed_admin().await;
    let body = json!({ "title": "T", "description": "D", "imageUrl": "https://img.example.com/t.png" });

    let (status, _) = app.post("/api/artworks", None, body.clone()).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app.post("/api/artworks", Some(&user_token), body.clone()).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    app.probe.set(false);
    let (status, _) = app.post("/api/artworks", Some(&admin_token), body).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn update_and_delete_round_trip() {
    let app = spawn_app();
    let (_, token) = app.seed_admin().await;
    let artwork = app
        .repo
        .create_artwork(&stored_artwork("Before", ArtworkCategory::Painting))
        .await
        .expect("seed");

    let (status, body) = app
        .put(
            &format!("/api/artworks/{}", artwork.id),
            Some(&token),
            json!({ "title": "After", "featured": true }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "After");
    assert_eq!(body["featured"], true);
    assert_eq!(body["imageUrl"], "https://img.example.com/a.png");

    let (status, body) = app
        .delete(&format!("/api/artworks/{}", artwork.id), Some(&token))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Artwork deleted successfully");

    let (status, _) = app
        .delete(&format!("/api/artworks/{}", artwork.id), Some(&token))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
