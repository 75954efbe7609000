//! Admin namespace. Every route here sits behind the auth gate and the admin
//! role gate, and every one needs the live store.

use axum::{Json, extract::State};
use uuid::Uuid;

use crate::{
    AppState,
    auth::AuthUser,
    error::AppError,
    extract::{ApiJson, ApiPath},
    models::{
        BulkDeleteRequest, BulkDeleteResponse, ContactListResponse, ContactResponse,
        ContactStatus, ContactStatusUpdate, DashboardData, DashboardResponse, EntityKind,
        MessageResponse, Role, RoleUpdate, SubscriberListResponse, UserListResponse,
        UserResponse,
    },
};

/// How many recent users and contacts the dashboard shows.
pub const DASHBOARD_RECENT: usize = 5;

/// dashboard_stats
///
/// Per-collection counts plus the newest users and contact messages.
#[utoipa::path(
    get,
    path = "/api/admin/dashboard/stats",
    responses(
        (status = 200, description = "Dashboard", body = DashboardResponse),
        (status = 403, description = "Not an admin")
    )
)]
pub async fn dashboard_stats(
    State(state): State<AppState>,
) -> Result<Json<DashboardResponse>, AppError> {
    let repo = state.store()?;
    let (stats, recent_users, recent_contacts) = tokio::try_join!(
        repo.entity_counts(),
        repo.recent_users(DASHBOARD_RECENT),
        repo.recent_contacts(DASHBOARD_RECENT),
    )?;

    Ok(Json(DashboardResponse {
        success: true,
        data: DashboardData {
            stats,
            recent_users,
            recent_contacts,
        },
    }))
}

/// list_users
///
/// Newest first. Password material never leaves the store layer.
#[utoipa::path(
    get,
    path = "/api/admin/users",
    responses((status = 200, description = "Users", body = UserListResponse))
)]
pub async fn list_users(State(state): State<AppState>) -> Result<Json<UserListResponse>, AppError> {
    let users = state.store()?.list_users().await?;
    Ok(Json(UserListResponse {
        success: true,
        count: users.len(),
        data: users,
    }))
}

/// update_user_role
///
/// Role must be exactly `user` or `admin`.
#[utoipa::path(
    put,
    path = "/api/admin/users/{id}/role",
    params(("id" = Uuid, Path, description = "User ID")),
    request_body = RoleUpdate,
    responses(
        (status = 200, description = "Role updated", body = UserResponse),
        (status = 400, description = "Invalid role"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn update_user_role(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(payload): ApiJson<RoleUpdate>,
) -> Result<Json<UserResponse>, AppError> {
    let role = Role::ALL
        .iter()
        .copied()
        .find(|r| r.as_str() == payload.role)
        .ok_or_else(|| AppError::validation(r#"Invalid role. Must be "user" or "admin""#))?;

    let user = state
        .store()?
        .set_user_role(id, role)
        .await?
        .ok_or(AppError::NotFound("User"))?;
    tracing::info!(user_id = %user.id, role = %role, "user role changed");

    Ok(Json(UserResponse {
        success: true,
        message: Some("User role updated successfully".to_string()),
        data: user,
    }))
}

/// delete_user
///
/// An administrator can never delete their own account through this route.
#[utoipa::path(
    delete,
    path = "/api/admin/users/{id}",
    params(("id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 200, description = "Deleted", body = MessageResponse),
        (status = 400, description = "Attempted self-delete"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn delete_user(
    AuthUser { id: caller, .. }: AuthUser,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<MessageResponse>, AppError> {
    if id == caller {
        return Err(AppError::validation("You cannot delete your own account"));
    }
    if state.store()?.delete_user(id).await? {
        tracing::info!(user_id = %id, deleted_by = %caller, "user deleted");
        Ok(Json(MessageResponse::ok("User deleted successfully")))
    } else {
        Err(AppError::NotFound("User"))
    }
}

/// list_contacts
///
/// Newest first.
#[utoipa::path(
    get,
    path = "/api/admin/contacts",
    responses((status = 200, description = "Contact messages", body = ContactListResponse))
)]
pub async fn list_contacts(
    State(state): State<AppState>,
) -> Result<Json<ContactListResponse>, AppError> {
    let contacts = state.store()?.list_contacts().await?;
    Ok(Json(ContactListResponse {
        success: true,
        count: contacts.len(),
        data: contacts,
    }))
}

/// update_contact_status
///
/// Moves a message between new, read and replied.
#[utoipa::path(
    patch,
    path = "/api/admin/contacts/{id}/status",
    params(("id" = Uuid, Path, description = "Contact ID")),
    request_body = ContactStatusUpdate,
    responses(
        (status = 200, description = "Status updated", body = ContactResponse),
        (status = 400, description = "Invalid status"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn update_contact_status(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(payload): ApiJson<ContactStatusUpdate>,
) -> Result<Json<ContactResponse>, AppError> {
    let status = payload
        .status
        .parse::<ContactStatus>()
        .map_err(|e| AppError::validation(e.to_string()))?;

    let contact = state
        .store()?
        .set_contact_status(id, status)
        .await?
        .ok_or(AppError::NotFound("Contact"))?;

    Ok(Json(ContactResponse {
        success: true,
        message: "Contact status updated successfully".to_string(),
        data: contact,
    }))
}

/// delete_contact
#[utoipa::path(
    delete,
    path = "/api/admin/contacts/{id}",
    params(("id" = Uuid, Path, description = "Contact ID")),
    responses(
        (status = 200, description = "Deleted", body = MessageResponse),
        (status = 404, description = "Not Found")
    )
)]
pub async fn delete_contact(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<MessageResponse>, AppError> {
    if state.store()?.delete_contact(id).await? {
        Ok(Json(MessageResponse::ok("Contact deleted successfully")))
    } else {
        Err(AppError::NotFound("Contact"))
    }
}

/// list_subscribers
#[utoipa::path(
    get,
    path = "/api/admin/subscribers",
    responses((status = 200, description = "Newsletter subscribers", body = SubscriberListResponse))
)]
pub async fn list_subscribers(
    State(state): State<AppState>,
) -> Result<Json<SubscriberListResponse>, AppError> {
    let subscribers = state.store()?.list_subscribers().await?;
    Ok(Json(SubscriberListResponse {
        success: true,
        count: subscribers.len(),
        data: subscribers,
    }))
}

/// delete_subscriber
#[utoipa::path(
    delete,
    path = "/api/admin/subscribers/{id}",
    params(("id" = Uuid, Path, description = "Subscriber ID")),
    responses(
        (status = 200, description = "Deleted", body = MessageResponse),
        (status = 404, description = "Not Found")
    )
)]
pub async fn delete_subscriber(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<MessageResponse>, AppError> {
    if state.store()?.delete_subscriber(id).await? {
        Ok(Json(MessageResponse::ok("Subscriber removed successfully")))
    } else {
        Err(AppError::NotFound("Subscriber"))
    }
}

/// bulk_delete
///
/// The model selector is checked against the allow-list before the store is
/// touched; an unknown selector deletes nothing.
#[utoipa::path(
    post,
    path = "/api/admin/bulk-delete",
    request_body = BulkDeleteRequest,
    responses(
        (status = 200, description = "Deleted", body = BulkDeleteResponse),
        (status = 400, description = "Invalid model type")
    )
)]
pub async fn bulk_delete(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<BulkDeleteRequest>,
) -> Result<Json<BulkDeleteResponse>, AppError> {
    let kind: EntityKind = payload
        .model
        .parse()
        .map_err(|_| AppError::validation("Invalid model type"))?;

    let deleted_count = state.store()?.bulk_delete(kind, &payload.ids).await?;
    tracing::info!(table = kind.table(), deleted_count, "bulk delete");

    Ok(Json(BulkDeleteResponse {
        success: true,
        message: format!("{deleted_count} items deleted successfully"),
        deleted_count,
    }))
}
