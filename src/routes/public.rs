use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post},
};

/// Public Router Module
///
/// Unauthenticated endpoints. Artwork reads keep working in demo mode; every
/// other store-backed route answers 503 while the store is down.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // --- Auth ---
        .route("/auth/register", post(handlers::auth::register))
        .route("/auth/login", post(handlers::auth::login))
        .route("/auth/logout", post(handlers::auth::logout))
        // --- Artworks ---
        .route("/artworks", get(handlers::artworks::list_artworks))
        .route("/artworks/latest", get(handlers::artworks::latest_artworks))
        .route(
            "/artworks/categories/all",
            get(handlers::artworks::artwork_categories),
        )
        .route("/artworks/{id}", get(handlers::artworks::get_artwork))
        // --- Blogs ---
        .route("/blogs", get(handlers::blogs::list_blogs))
        .route("/blogs/latest", get(handlers::blogs::latest_blogs))
        .route("/blogs/{id}", get(handlers::blogs::get_blog))
        .route("/blogs/{id}/comments", post(handlers::blogs::add_comment))
        // --- Courses ---
        .route("/courses", get(handlers::courses::list_courses))
        .route("/courses/featured", get(handlers::courses::featured_courses))
        .route("/courses/{id}", get(handlers::courses::get_course))
        // --- Shop ---
        .route("/shop", get(handlers::shop::list_shop_items))
        .route("/shop/{id}", get(handlers::shop::get_shop_item))
        // --- Contact & newsletter ---
        .route("/contact", post(handlers::contact::submit_contact))
        .route("/newsletter", post(handlers::newsletter::subscribe))
}
