use crate::{AppState, handlers};
use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{delete, get, patch, post, put},
};

/// Largest accepted artwork submission, image included.
pub const MAX_ARTWORK_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Admin Router Module
///
/// Content writes and the `/admin` namespace. `create_router` wraps this router
/// in the auth gate and then the admin role gate: a missing or bad token is
/// 401, a valid non-admin token is 403.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        // --- Artworks ---
        .route(
            "/artworks",
            post(handlers::artworks::create_artwork)
                .layer(DefaultBodyLimit::max(MAX_ARTWORK_UPLOAD_BYTES)),
        )
        .route(
            "/artworks/{id}",
            put(handlers::artworks::update_artwork)
                .layer(DefaultBodyLimit::max(MAX_ARTWORK_UPLOAD_BYTES))
                .delete(handlers::artworks::delete_artwork),
        )
        // --- Blogs ---
        .route("/blogs", post(handlers::blogs::create_blog))
        .route(
            "/blogs/{id}",
            put(handlers::blogs::update_blog).delete(handlers::blogs::delete_blog),
        )
        .route(
            "/blogs/{id}/comments/{comment_id}",
            delete(handlers::blogs::delete_comment),
        )
        .route(
            "/blogs/{id}/comments/{comment_id}/replies",
            post(handlers::blogs::add_reply),
        )
        .route(
            "/blogs/{id}/comments/{comment_id}/replies/{reply_id}",
            delete(handlers::blogs::delete_reply),
        )
        // --- Courses ---
        .route("/courses", post(handlers::courses::create_course))
        .route(
            "/courses/{id}",
            put(handlers::courses::update_course).delete(handlers::courses::delete_course),
        )
        // --- Shop ---
        .route("/shop", post(handlers::shop::create_shop_item))
        .route(
            "/shop/{id}",
            put(handlers::shop::update_shop_item).delete(handlers::shop::delete_shop_item),
        )
        // --- Admin namespace ---
        .route("/admin/dashboard/stats", get(handlers::admin::dashboard_stats))
        .route("/admin/users", get(handlers::admin::list_users))
        .route("/admin/users/{id}/role", put(handlers::admin::update_user_role))
        .route("/admin/users/{id}", delete(handlers::admin::delete_user))
        .route("/admin/contacts", get(handlers::admin::list_contacts))
        .route("/admin/contacts/{id}", delete(handlers::admin::delete_contact))
        .route(
            "/admin/contacts/{id}/status",
            patch(handlers::admin::update_contact_status),
        )
        .route("/admin/subscribers", get(handlers::admin::list_subscribers))
        .route(
            "/admin/subscribers/{id}",
            delete(handlers::admin::delete_subscriber),
        )
        .route("/admin/bulk-delete", post(handlers::admin::bulk_delete))
}
