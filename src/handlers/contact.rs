use axum::{Json, extract::State};
use chrono::Utc;

use crate::{
    AppState,
    error::AppError,
    extract::ApiJson,
    models::{ContactRequest, MessageResponse},
};

/// submit_contact
///
/// [Public Route] Persists the message, then notifies the site owner by mail.
/// Refused with 503 while the store is unreachable; a mail failure after the
/// message is stored is only logged.
#[utoipa::path(
    post,
    path = "/api/contact",
    request_body = ContactRequest,
    responses(
        (status = 200, description = "Message received", body = MessageResponse),
        (status = 400, description = "Missing fields"),
        (status = 503, description = "Store unreachable")
    )
)]
pub async fn submit_contact(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<ContactRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    let repo = state.store()?;
    let contact = payload.into_contact(Utc::now())?;
    let saved = repo.create_contact(&contact).await?;
    tracing::info!(contact_id = %saved.id, "contact message stored");

    if let Err(err) = state.mailer.notify_contact(&saved).await {
        tracing::warn!(contact_id = %saved.id, error = %err, "contact notification not sent");
    }

    Ok(Json(MessageResponse::ok(
        "Your message has been sent successfully!",
    )))
}
