use axum::{Json, extract::State, http::StatusCode};
use chrono::Utc;

use crate::{
    AppState,
    error::AppError,
    extract::ApiJson,
    models::{SubscribeRequest, Subscriber, SubscriberResponse},
    repository::RepoError,
};

fn already_subscribed(subscriber: Subscriber) -> (StatusCode, Json<SubscriberResponse>) {
    (
        StatusCode::OK,
        Json(SubscriberResponse {
            success: true,
            message: "You are already subscribed.".to_string(),
            data: subscriber,
        }),
    )
}

/// subscribe
///
/// [Public Route] Idempotent on email: the first call creates the subscriber
/// (201), repeats return the existing record (200).
#[utoipa::path(
    post,
    path = "/api/newsletter",
    request_body = SubscribeRequest,
    responses(
        (status = 201, description = "Subscribed", body = SubscriberResponse),
        (status = 200, description = "Already subscribed", body = SubscriberResponse),
        (status = 400, description = "Missing or invalid email")
    )
)]
pub async fn subscribe(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<SubscribeRequest>,
) -> Result<(StatusCode, Json<SubscriberResponse>), AppError> {
    let repo = state.store()?;
    let subscriber = payload.into_subscriber(Utc::now())?;

    if let Some(existing) = repo.find_subscriber(&subscriber.email).await? {
        return Ok(already_subscribed(existing));
    }

    match repo.create_subscriber(&subscriber).await {
        Ok(created) => {
            tracing::info!(subscriber_id = %created.id, source = %created.source, "new subscriber");
            Ok((
                StatusCode::CREATED,
                Json(SubscriberResponse {
                    success: true,
                    message: "Subscribed successfully!".to_string(),
                    data: created,
                }),
            ))
        }
        // Lost a race with a concurrent subscription for the same email.
        Err(RepoError::Conflict(_)) => repo
            .find_subscriber(&subscriber.email)
            .await?
            .map(already_subscribed)
            .ok_or_else(|| AppError::Internal("subscriber vanished after conflict".to_string())),
        Err(err) => Err(err.into()),
    }
}
