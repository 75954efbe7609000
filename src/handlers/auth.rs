use axum::{Json, extract::State, http::StatusCode};

use super::mode_suffix;
use crate::{
    AppState,
    auth::AuthUser,
    error::AppError,
    extract::ApiJson,
    models::{
        AuthResponse, LoginRequest, MessageResponse, ProfileUpdate, RegisterRequest, User,
        UserResponse,
    },
};

fn auth_response(
    state: &AppState,
    user: User,
    message: &str,
    demo: bool,
) -> Result<AuthResponse, AppError> {
    let token = if demo {
        state.jwt.issue_demo(user.id, user.role)?
    } else {
        state.jwt.issue(user.id, user.role)?
    };
    Ok(AuthResponse {
        success: true,
        message: mode_suffix(message, demo),
        token,
        user,
    })
}

/// register
///
/// [Public Route] Creates an account and signs the caller in. While the store is
/// unreachable the identity is minted for the response only.
#[utoipa::path(
    post,
    path = "/api/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Registered", body = AuthResponse),
        (status = 400, description = "Validation failed"),
        (status = 409, description = "Email already registered")
    )
)]
pub async fn register(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), AppError> {
    let registration = payload.validate()?;
    let accounts = state.accounts();
    let user = accounts.register(registration).await?;
    let body = auth_response(&state, user, "User registered successfully", accounts.is_demo())?;
    Ok((StatusCode::CREATED, Json(body)))
}

/// login
///
/// [Public Route] Exchanges email and password for a token. The failure message
/// is the same whether or not the email exists.
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Signed in", body = AuthResponse),
        (status = 400, description = "Missing email or password"),
        (status = 401, description = "Invalid email or password")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<LoginRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    let (Some(email), Some(password)) = (
        payload.email.filter(|e| !e.trim().is_empty()),
        payload.password.filter(|p| !p.is_empty()),
    ) else {
        return Err(AppError::validation("Please provide email and password"));
    };

    let accounts = state.accounts();
    let user = accounts.authenticate(&email, &password).await?;
    tracing::info!(user_id = %user.id, demo = accounts.is_demo(), "login succeeded");
    Ok(Json(auth_response(
        &state,
        user,
        "Login successful",
        accounts.is_demo(),
    )?))
}

/// logout
///
/// [Public Route] Tokens are stateless; the client simply discards its copy.
#[utoipa::path(
    post,
    path = "/api/auth/logout",
    responses((status = 200, description = "Signed out", body = MessageResponse))
)]
pub async fn logout() -> Json<MessageResponse> {
    Json(MessageResponse::ok("Logged out successfully"))
}

/// me
///
/// [Authenticated Route] The profile behind the presented token.
#[utoipa::path(
    get,
    path = "/api/auth/me",
    responses(
        (status = 200, description = "Current user", body = UserResponse),
        (status = 401, description = "Missing or invalid token"),
        (status = 404, description = "User no longer exists")
    )
)]
pub async fn me(
    AuthUser { id, .. }: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<UserResponse>, AppError> {
    let user = state.accounts().current_user(id).await?;
    Ok(Json(UserResponse {
        success: true,
        message: None,
        data: user,
    }))
}

/// update_profile
///
/// [Authenticated Route] Updates name and bio. Refused while the store is down.
#[utoipa::path(
    put,
    path = "/api/auth/profile",
    request_body = ProfileUpdate,
    responses(
        (status = 200, description = "Profile updated", body = UserResponse),
        (status = 503, description = "Store unreachable")
    )
)]
pub async fn update_profile(
    AuthUser { id, .. }: AuthUser,
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<ProfileUpdate>,
) -> Result<Json<UserResponse>, AppError> {
    let user = state.accounts().update_profile(id, payload).await?;
    Ok(Json(UserResponse {
        success: true,
        message: Some("Profile updated successfully".to_string()),
        data: user,
    }))
}
