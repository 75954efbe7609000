use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, put},
};

/// Authenticated Router Module
///
/// Routes for any signed-in user. `auth_middleware` is layered on by
/// `create_router`, so handlers here always receive a verified `AuthUser`.
pub fn authenticated_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/me", get(handlers::auth::me))
        .route("/auth/profile", put(handlers::auth::update_profile))
}
