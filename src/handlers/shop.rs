use axum::{Json, extract::State, http::StatusCode};
use chrono::Utc;
use uuid::Uuid;

use crate::{
    AppState,
    error::{AppError, FieldErrors},
    extract::{ApiJson, ApiPath, ApiQuery},
    models::{MessageResponse, ShopItem, ShopItemInput, ShopListParams, ShopQuery},
    repository::RepositoryState,
};

/// A listing may only point at an artwork that exists.
async fn ensure_artwork_exists(repo: &RepositoryState, artwork_id: Uuid) -> Result<(), AppError> {
    if repo.get_artwork(artwork_id).await?.is_some() {
        return Ok(());
    }
    let mut errors = FieldErrors::new();
    errors.push("artwork", "artwork does not exist");
    errors.finish("Shop item validation failed")
}

/// list_shop_items
///
/// [Public Route] Filter by stock and originality; sort by date or price.
#[utoipa::path(
    get,
    path = "/api/shop",
    params(ShopListParams),
    responses((status = 200, description = "Shop items", body = [ShopItem]))
)]
pub async fn list_shop_items(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<ShopListParams>,
) -> Result<Json<Vec<ShopItem>>, AppError> {
    let query = ShopQuery::from(params);
    Ok(Json(state.store()?.list_shop_items(&query).await?))
}

/// get_shop_item
///
/// [Public Route]
#[utoipa::path(
    get,
    path = "/api/shop/{id}",
    params(("id" = Uuid, Path, description = "Shop item ID")),
    responses(
        (status = 200, description = "Found", body = ShopItem),
        (status = 404, description = "Not Found")
    )
)]
pub async fn get_shop_item(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<ShopItem>, AppError> {
    let item = state
        .store()?
        .get_shop_item(id)
        .await?
        .ok_or(AppError::NotFound("Shop item"))?;
    Ok(Json(item))
}

/// create_shop_item
///
/// [Admin Route] Lists an existing artwork for sale.
#[utoipa::path(
    post,
    path = "/api/shop",
    request_body = ShopItemInput,
    responses(
        (status = 201, description = "Created", body = ShopItem),
        (status = 400, description = "Validation failed")
    )
)]
pub async fn create_shop_item(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<ShopItemInput>,
) -> Result<(StatusCode, Json<ShopItem>), AppError> {
    let repo = state.store()?;
    let item = payload.into_item(Utc::now())?;
    ensure_artwork_exists(repo, item.artwork_id).await?;
    let created = repo.create_shop_item(&item).await?;
    tracing::info!(item_id = %created.id, artwork_id = %created.artwork_id, "shop item created");
    Ok((StatusCode::CREATED, Json(created)))
}

/// update_shop_item
///
/// [Admin Route] Partial update; re-pointing at another artwork re-checks it.
#[utoipa::path(
    put,
    path = "/api/shop/{id}",
    params(("id" = Uuid, Path, description = "Shop item ID")),
    request_body = ShopItemInput,
    responses(
        (status = 200, description = "Updated", body = ShopItem),
        (status = 404, description = "Not Found")
    )
)]
pub async fn update_shop_item(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(payload): ApiJson<ShopItemInput>,
) -> Result<Json<ShopItem>, AppError> {
    let repo = state.store()?;
    let mut item = repo
        .get_shop_item(id)
        .await?
        .ok_or(AppError::NotFound("Shop item"))?;
    if let Some(artwork_id) = payload.artwork.filter(|a| *a != item.artwork_id) {
        ensure_artwork_exists(repo, artwork_id).await?;
    }
    payload.apply(&mut item)?;
    let updated = repo
        .replace_shop_item(&item)
        .await?
        .ok_or(AppError::NotFound("Shop item"))?;
    Ok(Json(updated))
}

/// delete_shop_item
///
/// [Admin Route]
#[utoipa::path(
    delete,
    path = "/api/shop/{id}",
    params(("id" = Uuid, Path, description = "Shop item ID")),
    responses(
        (status = 200, description = "Deleted", body = MessageResponse),
        (status = 404, description = "Not Found")
    )
)]
pub async fn delete_shop_item(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<MessageResponse>, AppError> {
    if state.store()?.delete_shop_item(id).await? {
        Ok(Json(MessageResponse::ok("Shop item deleted successfully")))
    } else {
        Err(AppError::NotFound("Shop item"))
    }
}
