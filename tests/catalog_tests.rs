mod common;

use axum::http::StatusCode;
use chrono::Utc;
use common::spawn_app;
use gallery_portal::{
    models::{Artwork, ArtworkCategory},
    repository::Repository,
};
use serde_json::json;
use uuid::Uuid;

fn course_body(title: &str, level: &str, featured: bool) -> serde_json::Value {
    json!({
        "title": title,
        "description": "Learn to see colour",
        "price": 49.0,
        "duration": "6 weeks",
        "level": level,
        "category": "Painting",
        "thumbnail": "https://img.example.com/course.png",
        "featured": featured,
        "curriculum": [{ "week": 1, "title": "Warm and cool", "topics": ["temperature"] }]
    })
}

#[tokio::test]
async fn course_lifecycle_and_filters() {
    let app = spawn_app();
    let (_, token) = app.seed_admin().await;

    let (status, beginner) = app
        .post("/api/courses", Some(&token), course_body("Colour Basics", "Beginner", true))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(beginner["level"], "beginner");
    assert_eq!(beginner["studentsEnrolled"], 0);

    let (status, _) = app
        .post("/api/courses", Some(&token), course_body("Glazing", "advanced", false))
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, body) = app.get("/api/courses?level=advanced", None).await;
    let items = body.as_array().expect("array");
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["title"], "Glazing");

    let (_, body) = app.get("/api/courses/featured", None).await;
    let items = body.as_array().expect("array");
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["title"], "Colour Basics");

    let id = beginner["_id"].as_str().expect("id");
    let (status, body) = app
        .put(&format!("/api/courses/{id}"), Some(&token), json!({ "price": 59.5 }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["price"], 59.5);
    assert_eq!(body["title"], "Colour Basics");

    let (status, _) = app.delete(&format!("/api/courses/{id}"), Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    let (status, body) = app.get(&format!("/api/courses/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Course not found");
}

#[tokio::test]
async fn course_validation_lists_missing_fields() {
    let app = spawn_app();
    let (_, token) = app.seed_admin().await;

    let (status, body) = app
        .post(
            "/api/courses",
            Some(&token),
            json!({ "title": "Half", "level": "expert", "price": -1 }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Course validation failed");
    let fields: Vec<&str> = body["errors"]
        .as_array()
        .expect("errors")
        .iter()
        .filter_map(|e| e["field"].as_str())
        .collect();
    for expected in ["description", "duration", "category", "thumbnail", "price", "level"] {
        assert!(fields.contains(&expected), "missing {expected} in {fields:?}");
    }
}

#[tokio::test]
async fn shop_items_must_reference_an_existing_artwork() {
    let app = spawn_app();
    let (_, token) = app.seed_admin().await;

    let (status, body) = app
        .post(
            "/api/shop",
            Some(&token),
            json!({ "artwork": Uuid::new_v4(), "price": 120.0, "availableQuantity": 1 }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Shop item validation failed");
    assert_eq!(body["errors"][0]["field"], "artwork");
}

#[tokio::test]
async fn shop_listing_filters_and_sorts_by_price() {
    let app = spawn_app();
    let (_, token) = app.seed_admin().await;
    let artwork = app
        .repo
        .create_artwork(&Artwork {
            id: Uuid::new_v4(),
            title: "For Sale".to_string(),
            description: "listed".to_string(),
            artist_name: "The Artist".to_string(),
            image_url: "https://img.example.com/sale.png".to_string(),
            category: ArtworkCategory::Painting,
            tags: Vec::new(),
            dimensions: None,
            year_created: None,
            featured: false,
            views: 0,
            created_at: Utc::now(),
        })
        .await
        .expect("seed");

    let (status, original) = app
        .post(
            "/api/shop",
            Some(&token),
            json!({ "artwork": artwork.id, "price": 900.0, "availableQuantity": 1, "currency": "eur" }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(original["currency"], "EUR");
    assert_eq!(original["isOriginal"], true);
    assert_eq!(original["artwork"], artwork.id.to_string());

    let (status, _) = app
        .post(
            "/api/shop",
            Some(&token),
            json!({ "artwork": artwork.id, "price": 40.0, "availableQuantity": 0, "isOriginal": false }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, body) = app.get("/api/shop?sort=price-asc", None).await;
    let prices: Vec<f64> = body
        .as_array()
        .expect("array")
        .iter()
        .filter_map(|i| i["price"].as_f64())
        .collect();
    assert_eq!(prices, vec![40.0, 900.0]);

    let (_, body) = app.get("/api/shop?available=true", None).await;
    let items = body.as_array().expect("array");
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["price"], 900.0);

    let id = original["_id"].as_str().expect("id");
    let (status, body) = app
        .put(
            &format!("/api/shop/{id}"),
            Some(&token),
            json!({ "artwork": Uuid::new_v4() }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errors"][0]["field"], "artwork");

    let (status, body) = app.delete(&format!("/api/shop/{id}"), Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Shop item deleted successfully");
}
