use axum::{
    Json,
    extract::{FromRequest, Multipart, Request, State},
    http::{StatusCode, header},
};
use chrono::Utc;
use uuid::Uuid;

use crate::{
    AppState,
    error::AppError,
    extract::{ApiJson, ApiPath, ApiQuery, parse_flag, parse_limit},
    gallery::DEFAULT_LATEST_ARTWORKS,
    models::{
        Artwork, ArtworkCategory, ArtworkInput, ArtworkListParams, ArtworkQuery, Dimensions,
        LimitParams, MessageResponse,
    },
};

/// An image file received in a multipart submission.
#[derive(Debug)]
pub struct UploadedImage {
    pub content_type: String,
    pub extension: String,
    pub bytes: Vec<u8>,
}

impl UploadedImage {
    /// Object key under the artworks prefix.
    pub fn object_key(&self) -> String {
        format!("artworks/{}.{}", Uuid::new_v4(), self.extension)
    }
}

/// ArtworkForm
///
/// Artwork body accepted either as JSON or as `multipart/form-data`. Multipart
/// text fields mirror the JSON keys; the file part is named `image`.
#[derive(Debug, Default)]
pub struct ArtworkForm {
    pub input: ArtworkInput,
    pub image: Option<UploadedImage>,
}

impl<S> FromRequest<S> for ArtworkForm
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_multipart = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v.starts_with("multipart/form-data"));

        if is_multipart {
            let multipart = Multipart::from_request(req, state)
                .await
                .map_err(|e| AppError::validation(e.body_text()))?;
            read_multipart(multipart).await
        } else {
            let ApiJson(input) = ApiJson::<ArtworkInput>::from_request(req, state).await?;
            Ok(Self { input, image: None })
        }
    }
}

fn parse_number<T: std::str::FromStr>(field: &str, raw: &str) -> Result<Option<T>, AppError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    raw.parse()
        .map(Some)
        .map_err(|_| AppError::validation(format!("{field} must be a number")))
}

/// `tags` arrives either as a JSON array or as a comma separated string.
fn parse_tags(raw: &str) -> Vec<String> {
    if let Ok(tags) = serde_json::from_str::<Vec<String>>(raw) {
        return tags;
    }
    raw.split(',').map(str::to_string).collect()
}

fn image_extension(file_name: Option<&str>, content_type: &str) -> String {
    file_name
        .and_then(|name| name.rsplit_once('.'))
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .or_else(|| content_type.strip_prefix("image/").map(str::to_string))
        .unwrap_or_else(|| "jpg".to_string())
}

async fn read_multipart(mut multipart: Multipart) -> Result<ArtworkForm, AppError> {
    let mut form = ArtworkForm::default();
    let (mut height, mut width, mut unit) = (None, None, None);

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::validation(e.body_text()))?
    {
        let name = field.name().unwrap_or_default().to_string();
        let file_name = field.file_name().map(str::to_string);

        if name == "image" && file_name.is_some() {
            let content_type = field
                .content_type()
                .unwrap_or("application/octet-stream")
                .to_string();
            if !content_type.starts_with("image/") {
                return Err(AppError::validation("Only image files are allowed"));
            }
            let bytes = field
                .bytes()
                .await
                .map_err(|e| AppError::validation(e.body_text()))?;
            if bytes.is_empty() {
                continue;
            }
            form.image = Some(UploadedImage {
                extension: image_extension(file_name.as_deref(), &content_type),
                content_type,
                bytes: bytes.to_vec(),
            });
            continue;
        }

        let text = field
            .text()
            .await
            .map_err(|e| AppError::validation(e.body_text()))?;
        let input = &mut form.input;
        match name.as_str() {
            "title" => input.title = Some(text),
            "description" => input.description = Some(text),
            "artistName" => input.artist_name = Some(text),
            "category" => input.category = Some(text),
            "imageUrl" => input.image_url = Some(text),
            "imgUrl" => input.img_url = Some(text),
            "image" => input.image = Some(text),
            "tags" => input.tags = Some(parse_tags(&text)),
            "featured" => input.featured = parse_flag(Some(text.as_str())),
            "yearCreated" => input.year_created = parse_number("yearCreated", &text)?,
            "dimensions" => {
                let dimensions = serde_json::from_str::<Dimensions>(&text)
                    .map_err(|_| AppError::validation("dimensions must be a JSON object"))?;
                input.dimensions = Some(dimensions);
            }
            "height" => height = parse_number("height", &text)?,
            "width" => width = parse_number("width", &text)?,
            "unit" => unit = Some(text),
            other => tracing::debug!(field = other, "ignoring unknown artwork form field"),
        }
    }

    if form.input.dimensions.is_none() && (height.is_some() || width.is_some()) {
        form.input.dimensions = Some(Dimensions::new(height, width, unit));
    }
    Ok(form)
}

/// Uploads the file part if present, otherwise falls back to a URL alias in the body.
async fn resolve_image_url(
    state: &AppState,
    form: &mut ArtworkForm,
) -> Result<Option<String>, AppError> {
    match form.image.take() {
        Some(image) => {
            let url = state
                .storage
                .upload_image(&image.object_key(), &image.content_type, image.bytes)
                .await?;
            Ok(Some(url))
        }
        None => Ok(form.input.provided_image_url()),
    }
}

/// list_artworks
///
/// [Public Route] Filtered, sorted listing. Served from the demo dataset while
/// the store is unreachable.
#[utoipa::path(
    get,
    path = "/api/artworks",
    params(ArtworkListParams),
    responses((status = 200, description = "Artworks", body = [Artwork]))
)]
pub async fn list_artworks(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<ArtworkListParams>,
) -> Result<Json<Vec<Artwork>>, AppError> {
    let query = ArtworkQuery::from(params);
    Ok(Json(state.artworks().list(&query).await?))
}

/// latest_artworks
///
/// [Public Route] Newest pieces, six unless `limit` says otherwise.
#[utoipa::path(
    get,
    path = "/api/artworks/latest",
    params(LimitParams),
    responses((status = 200, description = "Latest artworks", body = [Artwork]))
)]
pub async fn latest_artworks(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<LimitParams>,
) -> Result<Json<Vec<Artwork>>, AppError> {
    let limit = parse_limit(params.limit.as_deref()).unwrap_or(DEFAULT_LATEST_ARTWORKS);
    Ok(Json(state.artworks().latest(limit).await?))
}

/// artwork_categories
///
/// [Public Route] Categories that currently have at least one artwork.
#[utoipa::path(
    get,
    path = "/api/artworks/categories/all",
    responses((status = 200, description = "Categories in use", body = [ArtworkCategory]))
)]
pub async fn artwork_categories(
    State(state): State<AppState>,
) -> Result<Json<Vec<ArtworkCategory>>, AppError> {
    Ok(Json(state.artworks().categories().await?))
}

/// get_artwork
///
/// [Public Route] Single artwork. Each live fetch counts one view.
#[utoipa::path(
    get,
    path = "/api/artworks/{id}",
    params(("id" = Uuid, Path, description = "Artwork ID")),
    responses(
        (status = 200, description = "Found", body = Artwork),
        (status = 404, description = "Not Found")
    )
)]
pub async fn get_artwork(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<Artwork>, AppError> {
    Ok(Json(state.artworks().detail(id).await?))
}

/// create_artwork
///
/// [Admin Route] Creates an artwork from JSON or a multipart upload. An image
/// URL must resolve from the uploaded file or one of the URL aliases.
#[utoipa::path(
    post,
    path = "/api/artworks",
    request_body = ArtworkInput,
    responses(
        (status = 201, description = "Created", body = Artwork),
        (status = 400, description = "Validation failed"),
        (status = 503, description = "Store unreachable")
    )
)]
pub async fn create_artwork(
    State(state): State<AppState>,
    mut form: ArtworkForm,
) -> Result<(StatusCode, Json<Artwork>), AppError> {
    let repo = state.store()?;
    let now = Utc::now();
    // Reject bad fields before anything reaches the image host.
    form.input.validate_new(now)?;
    let image_url = resolve_image_url(&state, &mut form)
        .await?
        .ok_or_else(|| AppError::validation("Image URL is required."))?;

    let artwork = form.input.into_artwork(image_url, now)?;
    let created = repo.create_artwork(&artwork).await?;
    tracing::info!(artwork_id = %created.id, "artwork created");
    Ok((StatusCode::CREATED, Json(created)))
}

/// update_artwork
///
/// [Admin Route] Partial update; a new image may be uploaded or linked.
#[utoipa::path(
    put,
    path = "/api/artworks/{id}",
    params(("id" = Uuid, Path, description = "Artwork ID")),
    request_body = ArtworkInput,
    responses(
        (status = 200, description = "Updated", body = Artwork),
        (status = 404, description = "Not Found")
    )
)]
pub async fn update_artwork(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    mut form: ArtworkForm,
) -> Result<Json<Artwork>, AppError> {
    let repo = state.store()?;
    let mut artwork = repo
        .get_artwork(id)
        .await?
        .ok_or(AppError::NotFound("Artwork"))?;

    let now = Utc::now();
    form.input.validate_patch(now)?;
    if let Some(url) = resolve_image_url(&state, &mut form).await? {
        form.input.image_url = Some(url);
    }
    form.input.apply(&mut artwork, now)?;

    let updated = repo
        .replace_artwork(&artwork)
        .await?
        .ok_or(AppError::NotFound("Artwork"))?;
    Ok(Json(updated))
}

/// delete_artwork
///
/// [Admin Route]
#[utoipa::path(
    delete,
    path = "/api/artworks/{id}",
    params(("id" = Uuid, Path, description = "Artwork ID")),
    responses(
        (status = 200, description = "Deleted", body = MessageResponse),
        (status = 404, description = "Not Found")
    )
)]
pub async fn delete_artwork(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<MessageResponse>, AppError> {
    if state.store()?.delete_artwork(id).await? {
        Ok(Json(MessageResponse::ok("Artwork deleted successfully")))
    } else {
        Err(AppError::NotFound("Artwork"))
    }
}
