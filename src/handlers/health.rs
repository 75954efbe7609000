use axum::{Json, extract::State};
use serde_json::{Value, json};

use crate::{AppState, models::HealthResponse};

/// root
///
/// Service banner with the endpoint groups.
#[utoipa::path(
    get,
    path = "/",
    responses((status = 200, description = "Service banner"))
)]
pub async fn root() -> Json<Value> {
    Json(json!({
        "message": "Gallery portal API",
        "endpoints": {
            "auth": "/api/auth",
            "artworks": "/api/artworks",
            "blogs": "/api/blogs",
            "courses": "/api/courses",
            "shop": "/api/shop",
            "contact": "/api/contact",
            "newsletter": "/api/newsletter",
            "admin": "/api/admin",
            "health": "/health",
            "docs": "/swagger-ui",
        }
    }))
}

/// health
///
/// Liveness plus the current store connectivity. Not rate limited.
#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Service is up", body = HealthResponse))
)]
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let db_connected = state.is_connected();
    Json(HealthResponse {
        status: "ok".to_string(),
        message: if db_connected {
            "Server is running".to_string()
        } else {
            "Server is running in demo mode".to_string()
        },
        db_connected,
    })
}
