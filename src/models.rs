use std::{fmt, str::FromStr};

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use thiserror::Error;
use ts_rs::TS;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::{
    error::{AppError, FieldErrors},
    slug::slugify,
};

/// Raised when a stored or submitted string does not name a known variant.
#[derive(Debug, Error)]
#[error("unknown {kind} `{value}`")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

/// Declares a closed string-backed enum. Variants serialise to their wire text,
/// parse case-insensitively and can be decoded straight from a TEXT column.
/// Exactly one variant carries `#[default]`.
macro_rules! string_enum {
    (
        $(#[$meta:meta])* $name:ident, $kind:literal {
            $($(#[$vmeta:meta])* $variant:ident => $text:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, TS, ToSchema,
        )]
        #[ts(export)]
        pub enum $name {
            $($(#[$vmeta])* #[serde(rename = $text)] $variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub const fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = UnknownVariant;

            fn from_str(raw: &str) -> Result<Self, Self::Err> {
                let wanted = raw.trim();
                Self::ALL
                    .iter()
                    .copied()
                    .find(|v| v.as_str().eq_ignore_ascii_case(wanted))
                    .ok_or_else(|| UnknownVariant { kind: $kind, value: raw.to_string() })
            }
        }

        impl TryFrom<String> for $name {
            type Error = UnknownVariant;

            fn try_from(raw: String) -> Result<Self, Self::Error> {
                raw.parse()
            }
        }
    };
}

string_enum!(
    /// The RBAC field. Exactly one value per user.
    Role, "role" {
        #[default]
        User => "user",
        Admin => "admin",
    }
);

string_enum!(
    /// Fixed artwork category set.
    ArtworkCategory, "category" {
        #[default]
        Painting => "painting",
        Digital => "digital",
        Sculpture => "sculpture",
        Photography => "photography",
        MixedMedia => "mixed-media",
        Drawing => "drawing",
        StillLife => "still-life",
        FigurePainting => "figure-painting",
        Landscape => "landscape",
        Portrait => "portrait",
        Abstract => "abstract",
    }
);

string_enum!(
    CourseLevel, "level" {
        #[default]
        Beginner => "beginner",
        Intermediate => "intermediate",
        Advanced => "advanced",
    }
);

string_enum!(
    /// Admin triage state of a contact message.
    ContactStatus, "status" {
        #[default]
        New => "new",
        Read => "read",
        Replied => "replied",
    }
);

/// Trims and lowercases an email so lookups and uniqueness are case-insensitive.
pub fn normalize_email(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Minimal shape check: something on both sides of a single `@`, and a dot in the domain.
pub fn is_plausible_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
        }
        None => false,
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn clean_list(values: Vec<String>) -> Vec<String> {
    values
        .into_iter()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .collect()
}

// --- Users ---

/// User
///
/// Canonical identity record from the `users` table. Password material lives only
/// in `UserCredentials` and is never serialised.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema, FromRow)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct User {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[sqlx(try_from = "String")]
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
}

/// Login-time view of a user: the public record plus its argon2 hash.
#[derive(Debug, Clone, FromRow)]
pub struct UserCredentials {
    #[sqlx(flatten)]
    pub user: User,
    pub password_hash: String,
}

/// Everything needed to persist a new account.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub bio: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct RegisterRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub confirm_password: Option<String>,
}

/// A registration that passed validation.
#[derive(Debug, Clone)]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub password: String,
}

impl RegisterRequest {
    pub fn validate(self) -> Result<Registration, AppError> {
        let mut errors = FieldErrors::new();
        errors.require("name", self.name.as_deref());
        errors.require("email", self.email.as_deref());
        errors.require("password", self.password.as_deref());
        errors.require("confirmPassword", self.confirm_password.as_deref());
        errors.finish("Please provide all required fields")?;

        let name = self.name.unwrap_or_default().trim().to_string();
        let email = normalize_email(&self.email.unwrap_or_default());
        let password = self.password.unwrap_or_default();

        if !is_plausible_email(&email) {
            return Err(AppError::Validation {
                message: "Please provide a valid email".to_string(),
                fields: vec![crate::error::FieldError {
                    field: "email".to_string(),
                    message: "email is not a valid address".to_string(),
                }],
            });
        }
        if self.confirm_password.as_deref() != Some(password.as_str()) {
            return Err(AppError::validation("Passwords do not match"));
        }
        if password.chars().count() < 6 {
            return Err(AppError::validation(
                "Password must be at least 6 characters",
            ));
        }

        Ok(Registration {
            name,
            email,
            password,
        })
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub bio: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RoleUpdate {
    pub role: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct AuthResponse {
    pub success: bool,
    pub message: String,
    pub token: String,
    pub user: User,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub data: User,
}

// --- Artworks ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct Dimensions {
    pub height: Option<f64>,
    pub width: Option<f64>,
    #[serde(default = "Dimensions::default_unit")]
    pub unit: String,
}

impl Dimensions {
    fn default_unit() -> String {
        "cm".to_string()
    }

    /// A blank or missing unit falls back to centimetres.
    pub fn new(height: Option<f64>, width: Option<f64>, unit: Option<String>) -> Self {
        Self {
            height,
            width,
            unit: non_blank(unit).unwrap_or_else(Self::default_unit),
        }
    }
}

/// Artwork
///
/// A gallery piece. `views` only ever grows, one step per detail fetch against
/// the live store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema, FromRow)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Artwork {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub artist_name: String,
    pub image_url: String,
    #[sqlx(try_from = "String")]
    pub category: ArtworkCategory,
    #[sqlx(json)]
    pub tags: Vec<String>,
    #[sqlx(json)]
    pub dimensions: Option<Dimensions>,
    pub year_created: Option<i32>,
    pub featured: bool,
    pub views: i64,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
}

pub const DEFAULT_ARTIST_NAME: &str = "The Artist";

/// Body for creating or editing an artwork. On create, the missing required
/// fields are reported; on edit, only the supplied fields change.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ArtworkInput {
    pub title: Option<String>,
    pub description: Option<String>,
    pub artist_name: Option<String>,
    pub image_url: Option<String>,
    pub img_url: Option<String>,
    pub image: Option<String>,
    pub category: Option<String>,
    pub tags: Option<Vec<String>>,
    pub dimensions: Option<Dimensions>,
    pub year_created: Option<i32>,
    pub featured: Option<bool>,
}

impl ArtworkInput {
    /// First non-blank URL among the accepted aliases.
    pub fn provided_image_url(&self) -> Option<String> {
        [&self.image_url, &self.img_url, &self.image]
            .into_iter()
            .find_map(|candidate| non_blank(candidate.clone()))
    }

    fn check_common(&self, errors: &mut FieldErrors, now: DateTime<Utc>) -> Option<ArtworkCategory> {
        if let Some(year) = self.year_created {
            if !(1900..=now.year()).contains(&year) {
                errors.push(
                    "yearCreated",
                    format!("yearCreated must be between 1900 and {}", now.year()),
                );
            }
        }
        match self.category.as_deref().map(str::parse::<ArtworkCategory>) {
            Some(Ok(category)) => Some(category),
            Some(Err(err)) => {
                errors.push("category", err.to_string());
                None
            }
            None => None,
        }
    }

    /// Field checks for a new artwork. The image URL is resolved separately.
    pub fn validate_new(&self, now: DateTime<Utc>) -> Result<Option<ArtworkCategory>, AppError> {
        let mut errors = FieldErrors::new();
        errors.require("title", self.title.as_deref());
        errors.require("description", self.description.as_deref());
        let category = self.check_common(&mut errors, now);
        errors.finish("Artwork validation failed")?;
        Ok(category)
    }

    /// Field checks for a partial update.
    pub fn validate_patch(&self, now: DateTime<Utc>) -> Result<Option<ArtworkCategory>, AppError> {
        let mut errors = FieldErrors::new();
        let category = self.check_common(&mut errors, now);
        if self.title.as_deref().is_some_and(|t| t.trim().is_empty()) {
            errors.push("title", "title cannot be blank");
        }
        errors.finish("Artwork validation failed")?;
        Ok(category)
    }

    pub fn into_artwork(self, image_url: String, now: DateTime<Utc>) -> Result<Artwork, AppError> {
        let category = self.validate_new(now)?;

        Ok(Artwork {
            id: Uuid::new_v4(),
            title: non_blank(self.title).unwrap_or_default(),
            description: self.description.unwrap_or_default(),
            artist_name: non_blank(self.artist_name)
                .unwrap_or_else(|| DEFAULT_ARTIST_NAME.to_string()),
            image_url,
            category: category.unwrap_or_default(),
            tags: clean_list(self.tags.unwrap_or_default()),
            dimensions: self.dimensions,
            year_created: self.year_created,
            featured: self.featured.unwrap_or(false),
            views: 0,
            created_at: now,
        })
    }

    pub fn apply(self, artwork: &mut Artwork, now: DateTime<Utc>) -> Result<(), AppError> {
        let category = self.validate_patch(now)?;

        if let Some(url) = self.provided_image_url() {
            artwork.image_url = url;
        }
        if let Some(title) = non_blank(self.title) {
            artwork.title = title;
        }
        if let Some(description) = self.description {
            artwork.description = description;
        }
        if let Some(artist) = non_blank(self.artist_name) {
            artwork.artist_name = artist;
        }
        if let Some(category) = category {
            artwork.category = category;
        }
        if let Some(tags) = self.tags {
            artwork.tags = clean_list(tags);
        }
        if self.dimensions.is_some() {
            artwork.dimensions = self.dimensions;
        }
        if self.year_created.is_some() {
            artwork.year_created = self.year_created;
        }
        if let Some(featured) = self.featured {
            artwork.featured = featured;
        }
        Ok(())
    }
}

/// Ordering for artwork listings. Unknown values fall back to newest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ArtworkSort {
    #[default]
    Newest,
    Oldest,
    Popular,
}

impl ArtworkSort {
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            Some("oldest") => Self::Oldest,
            Some("popular") => Self::Popular,
            _ => Self::Newest,
        }
    }
}

/// Query string for `GET /api/artworks`.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct ArtworkListParams {
    /// Category name, matched case-insensitively.
    pub category: Option<String>,
    /// `true` or `false`.
    pub featured: Option<String>,
    pub limit: Option<String>,
    /// newest | oldest | popular
    pub sort: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct LimitParams {
    pub limit: Option<String>,
}

/// Resolved artwork filter, shared by the store and the demo dataset so both
/// modes apply identical semantics.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ArtworkQuery {
    pub category: Option<String>,
    pub featured: Option<bool>,
    pub sort: ArtworkSort,
    pub limit: Option<usize>,
}

impl From<ArtworkListParams> for ArtworkQuery {
    fn from(params: ArtworkListParams) -> Self {
        Self {
            category: non_blank(params.category),
            featured: crate::extract::parse_flag(params.featured.as_deref()),
            sort: ArtworkSort::parse(params.sort.as_deref()),
            limit: crate::extract::parse_limit(params.limit.as_deref()),
        }
    }
}

impl ArtworkQuery {
    pub fn latest(limit: usize) -> Self {
        Self {
            limit: Some(limit),
            ..Self::default()
        }
    }

    pub fn matches(&self, artwork: &Artwork) -> bool {
        let category_ok = self
            .category
            .as_deref()
            .is_none_or(|c| artwork.category.as_str().eq_ignore_ascii_case(c.trim()));
        let featured_ok = self.featured.is_none_or(|f| artwork.featured == f);
        category_ok && featured_ok
    }

    /// Filters, sorts and truncates an in-memory collection.
    pub fn apply(&self, artworks: impl IntoIterator<Item = Artwork>) -> Vec<Artwork> {
        let mut selected: Vec<Artwork> = artworks
            .into_iter()
            .filter(|a| self.matches(a))
            .collect();
        match self.sort {
            ArtworkSort::Newest => selected.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
            ArtworkSort::Oldest => selected.sort_by(|a, b| a.created_at.cmp(&b.created_at)),
            ArtworkSort::Popular => selected.sort_by(|a, b| {
                b.views
                    .cmp(&a.views)
                    .then_with(|| b.created_at.cmp(&a.created_at))
            }),
        }
        if let Some(limit) = self.limit {
            selected.truncate(limit);
        }
        selected
    }
}

// --- Blog posts ---

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct BlogAuthor {
    pub name: Option<String>,
    pub avatar: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Reply {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub author: String,
    pub text: String,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
}

/// A reader comment, stored inside its blog document together with its replies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Comment {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub author: String,
    pub text: String,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub replies: Vec<Reply>,
}

/// Blog
///
/// Blog post document. `slug` is unique; `updated_at` is refreshed on every save.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema, FromRow)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Blog {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub excerpt: String,
    pub content: String,
    #[sqlx(json)]
    pub author: Option<BlogAuthor>,
    pub cover_image: String,
    #[sqlx(json)]
    pub categories: Vec<String>,
    #[sqlx(json)]
    pub tags: Vec<String>,
    pub read_time: i32,
    pub featured: bool,
    pub views: i64,
    #[sqlx(json)]
    pub comments: Vec<Comment>,
    pub published: bool,
    #[ts(type = "string | null")]
    pub published_at: Option<DateTime<Utc>>,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "string")]
    pub updated_at: DateTime<Utc>,
}

/// Whole minutes at 200 words per minute, never less than one.
pub fn estimate_read_time(content: &str) -> i32 {
    let minutes = content.split_whitespace().count().div_ceil(200).max(1);
    i32::try_from(minutes).unwrap_or(i32::MAX)
}

/// Picks the slug for a post: an explicit slug is normalised, otherwise one is
/// derived from the title.
pub fn resolve_slug(slug: Option<&str>, title: Option<&str>) -> Result<String, AppError> {
    let explicit = slug.map(str::trim).filter(|s| !s.is_empty());
    let source = match (explicit, title.map(str::trim).filter(|t| !t.is_empty())) {
        (Some(s), _) => s,
        (None, Some(t)) => t,
        (None, None) => {
            return Err(AppError::Validation {
                message: "Title is required".to_string(),
                fields: vec![crate::error::FieldError {
                    field: "title".to_string(),
                    message: "title is required to derive a slug".to_string(),
                }],
            });
        }
    };
    let slug = slugify(source);
    if slug.is_empty() {
        return Err(AppError::Validation {
            message: "Could not derive a slug".to_string(),
            fields: vec![crate::error::FieldError {
                field: "slug".to_string(),
                message: "slug must contain at least one letter or digit".to_string(),
            }],
        });
    }
    Ok(slug)
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct BlogInput {
    pub title: Option<String>,
    pub slug: Option<String>,
    pub excerpt: Option<String>,
    pub content: Option<String>,
    pub author: Option<BlogAuthor>,
    pub cover_image: Option<String>,
    pub categories: Option<Vec<String>>,
    pub tags: Option<Vec<String>>,
    pub read_time: Option<i32>,
    pub featured: Option<bool>,
    pub published: Option<bool>,
}

impl BlogInput {
    pub fn into_blog(self, now: DateTime<Utc>) -> Result<Blog, AppError> {
        let slug = resolve_slug(self.slug.as_deref(), self.title.as_deref())?;

        let mut errors = FieldErrors::new();
        errors.require("title", self.title.as_deref());
        errors.require("excerpt", self.excerpt.as_deref());
        errors.require("content", self.content.as_deref());
        errors.require("coverImage", self.cover_image.as_deref());
        if self.read_time.is_some_and(|r| r < 1) {
            errors.push("readTime", "readTime must be at least 1");
        }
        errors.finish("Blog validation failed")?;

        let content = self.content.unwrap_or_default();
        let published = self.published.unwrap_or(false);
        Ok(Blog {
            id: Uuid::new_v4(),
            title: non_blank(self.title).unwrap_or_default(),
            slug,
            excerpt: self.excerpt.unwrap_or_default(),
            read_time: self
                .read_time
                .unwrap_or_else(|| estimate_read_time(&content)),
            content,
            author: self.author,
            cover_image: non_blank(self.cover_image).unwrap_or_default(),
            categories: clean_list(self.categories.unwrap_or_default()),
            tags: clean_list(self.tags.unwrap_or_default()),
            featured: self.featured.unwrap_or(false),
            views: 0,
            comments: Vec::new(),
            published,
            published_at: published.then_some(now),
            created_at: now,
            updated_at: now,
        })
    }

    pub fn apply(self, blog: &mut Blog, now: DateTime<Utc>) -> Result<(), AppError> {
        let mut errors = FieldErrors::new();
        for (field, value) in [
            ("title", &self.title),
            ("excerpt", &self.excerpt),
            ("content", &self.content),
            ("coverImage", &self.cover_image),
        ] {
            if value.as_deref().is_some_and(|v| v.trim().is_empty()) {
                errors.push(field, format!("{field} cannot be blank"));
            }
        }
        if self.read_time.is_some_and(|r| r < 1) {
            errors.push("readTime", "readTime must be at least 1");
        }
        errors.finish("Blog validation failed")?;

        if let Some(title) = non_blank(self.title) {
            blog.title = title;
        }
        // An explicitly blank slug asks for a fresh derivation from the title.
        if let Some(slug) = self.slug {
            blog.slug = resolve_slug(Some(&slug), Some(&blog.title))?;
        }
        if let Some(excerpt) = self.excerpt {
            blog.excerpt = excerpt;
        }
        if let Some(content) = self.content {
            blog.content = content;
        }
        if let Some(author) = self.author {
            blog.author = Some(author);
        }
        if let Some(cover) = non_blank(self.cover_image) {
            blog.cover_image = cover;
        }
        if let Some(categories) = self.categories {
            blog.categories = clean_list(categories);
        }
        if let Some(tags) = self.tags {
            blog.tags = clean_list(tags);
        }
        if let Some(read_time) = self.read_time {
            blog.read_time = read_time;
        }
        if let Some(featured) = self.featured {
            blog.featured = featured;
        }
        if let Some(published) = self.published {
            blog.published = published;
            if published && blog.published_at.is_none() {
                blog.published_at = Some(now);
            }
        }
        blog.updated_at = now;
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct BlogListParams {
    /// Matches any entry of the post's categories, case-insensitively.
    pub category: Option<String>,
    /// Case-insensitive substring over title and content.
    pub search: Option<String>,
    pub published: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BlogQuery {
    pub category: Option<String>,
    pub search: Option<String>,
    pub published: Option<bool>,
    pub limit: Option<usize>,
}

impl From<BlogListParams> for BlogQuery {
    fn from(params: BlogListParams) -> Self {
        Self {
            category: non_blank(params.category),
            search: non_blank(params.search),
            published: crate::extract::parse_flag(params.published.as_deref()),
            limit: None,
        }
    }
}

impl BlogQuery {
    pub fn latest(limit: usize) -> Self {
        Self {
            limit: Some(limit),
            ..Self::default()
        }
    }

    pub fn matches(&self, blog: &Blog) -> bool {
        let category_ok = self.category.as_deref().is_none_or(|wanted| {
            blog.categories
                .iter()
                .any(|c| c.eq_ignore_ascii_case(wanted))
        });
        let search_ok = self.search.as_deref().is_none_or(|needle| {
            let needle = needle.to_lowercase();
            blog.title.to_lowercase().contains(&needle)
                || blog.content.to_lowercase().contains(&needle)
        });
        let published_ok = self.published.is_none_or(|p| blog.published == p);
        category_ok && search_ok && published_ok
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct CommentRequest {
    pub author: Option<String>,
    pub text: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct ReplyRequest {
    pub text: Option<String>,
}

// --- Courses ---

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct Instructor {
    pub name: Option<String>,
    pub bio: Option<String>,
    pub avatar: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct CurriculumEntry {
    pub week: Option<i32>,
    pub title: String,
    #[serde(default)]
    pub topics: Vec<String>,
    pub duration: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema, FromRow)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Course {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub title: String,
    pub description: String,
    #[sqlx(json)]
    pub instructor: Option<Instructor>,
    pub price: f64,
    pub duration: String,
    #[sqlx(try_from = "String")]
    pub level: CourseLevel,
    pub category: String,
    #[sqlx(json)]
    pub curriculum: Vec<CurriculumEntry>,
    pub featured: bool,
    pub students_enrolled: i64,
    pub thumbnail: String,
    pub preview_video: Option<String>,
    #[sqlx(json)]
    pub requirements: Vec<String>,
    #[sqlx(json)]
    pub learning_outcomes: Vec<String>,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CourseInput {
    pub title: Option<String>,
    pub description: Option<String>,
    pub instructor: Option<Instructor>,
    pub price: Option<f64>,
    pub duration: Option<String>,
    pub level: Option<String>,
    pub category: Option<String>,
    pub curriculum: Option<Vec<CurriculumEntry>>,
    pub featured: Option<bool>,
    pub thumbnail: Option<String>,
    pub preview_video: Option<String>,
    pub requirements: Option<Vec<String>>,
    pub learning_outcomes: Option<Vec<String>>,
}

impl CourseInput {
    fn check_common(&self, errors: &mut FieldErrors) -> Option<CourseLevel> {
        if self.price.is_some_and(|p| !p.is_finite() || p < 0.0) {
            errors.push("price", "price must be zero or more");
        }
        match self.level.as_deref().map(str::parse::<CourseLevel>) {
            Some(Ok(level)) => Some(level),
            Some(Err(err)) => {
                errors.push("level", err.to_string());
                None
            }
            None => None,
        }
    }

    pub fn into_course(self, now: DateTime<Utc>) -> Result<Course, AppError> {
        let mut errors = FieldErrors::new();
        errors.require("title", self.title.as_deref());
        errors.require("description", self.description.as_deref());
        errors.require("duration", self.duration.as_deref());
        errors.require("category", self.category.as_deref());
        errors.require("thumbnail", self.thumbnail.as_deref());
        if self.price.is_none() {
            errors.push("price", "price is required");
        }
        let level = self.check_common(&mut errors);
        errors.finish("Course validation failed")?;

        Ok(Course {
            id: Uuid::new_v4(),
            title: non_blank(self.title).unwrap_or_default(),
            description: self.description.unwrap_or_default(),
            instructor: self.instructor,
            price: self.price.unwrap_or_default(),
            duration: non_blank(self.duration).unwrap_or_default(),
            level: level.unwrap_or_default(),
            category: non_blank(self.category).unwrap_or_default(),
            curriculum: self.curriculum.unwrap_or_default(),
            featured: self.featured.unwrap_or(false),
            students_enrolled: 0,
            thumbnail: non_blank(self.thumbnail).unwrap_or_default(),
            preview_video: non_blank(self.preview_video),
            requirements: clean_list(self.requirements.unwrap_or_default()),
            learning_outcomes: clean_list(self.learning_outcomes.unwrap_or_default()),
            created_at: now,
        })
    }

    pub fn apply(self, course: &mut Course) -> Result<(), AppError> {
        let mut errors = FieldErrors::new();
        let level = self.check_common(&mut errors);
        errors.finish("Course validation failed")?;

        if let Some(title) = non_blank(self.title) {
            course.title = title;
        }
        if let Some(description) = self.description {
            course.description = description;
        }
        if self.instructor.is_some() {
            course.instructor = self.instructor;
        }
        if let Some(price) = self.price {
            course.price = price;
        }
        if let Some(duration) = non_blank(self.duration) {
            course.duration = duration;
        }
        if let Some(level) = level {
            course.level = level;
        }
        if let Some(category) = non_blank(self.category) {
            course.category = category;
        }
        if let Some(curriculum) = self.curriculum {
            course.curriculum = curriculum;
        }
        if let Some(featured) = self.featured {
            course.featured = featured;
        }
        if let Some(thumbnail) = non_blank(self.thumbnail) {
            course.thumbnail = thumbnail;
        }
        if self.preview_video.is_some() {
            course.preview_video = non_blank(self.preview_video);
        }
        if let Some(requirements) = self.requirements {
            course.requirements = clean_list(requirements);
        }
        if let Some(outcomes) = self.learning_outcomes {
            course.learning_outcomes = clean_list(outcomes);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct CourseListParams {
    pub level: Option<String>,
    pub category: Option<String>,
    pub featured: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CourseQuery {
    pub level: Option<String>,
    pub category: Option<String>,
    pub featured: Option<bool>,
}

impl From<CourseListParams> for CourseQuery {
    fn from(params: CourseListParams) -> Self {
        Self {
            level: non_blank(params.level),
            category: non_blank(params.category),
            featured: crate::extract::parse_flag(params.featured.as_deref()),
        }
    }
}

impl CourseQuery {
    pub fn featured() -> Self {
        Self {
            featured: Some(true),
            ..Self::default()
        }
    }

    pub fn matches(&self, course: &Course) -> bool {
        self.level
            .as_deref()
            .is_none_or(|l| course.level.as_str().eq_ignore_ascii_case(l))
            && self
                .category
                .as_deref()
                .is_none_or(|c| course.category.eq_ignore_ascii_case(c))
            && self.featured.is_none_or(|f| course.featured == f)
    }
}

// --- Shop ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct PrintSize {
    pub size: String,
    pub price: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct FramingOption {
    #[serde(rename = "type")]
    pub kind: String,
    pub price: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ShippingInfo {
    pub domestic: Option<f64>,
    pub international: Option<f64>,
    pub estimated_delivery: Option<String>,
}

/// ShopItem
///
/// A purchasable listing for an existing artwork. The listing references the
/// artwork but never owns its lifecycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema, FromRow)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ShopItem {
    #[serde(rename = "_id")]
    pub id: Uuid,
    #[serde(rename = "artwork")]
    pub artwork_id: Uuid,
    pub price: f64,
    pub currency: String,
    pub available_quantity: i32,
    pub is_original: bool,
    #[sqlx(json)]
    pub print_sizes: Vec<PrintSize>,
    #[sqlx(json)]
    pub framing_options: Vec<FramingOption>,
    #[sqlx(json)]
    pub shipping_info: Option<ShippingInfo>,
    pub sold: i64,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
}

pub const DEFAULT_CURRENCY: &str = "USD";

#[derive(Debug, Clone, Default, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ShopItemInput {
    pub artwork: Option<Uuid>,
    pub price: Option<f64>,
    pub currency: Option<String>,
    pub available_quantity: Option<i32>,
    pub is_original: Option<bool>,
    pub print_sizes: Option<Vec<PrintSize>>,
    pub framing_options: Option<Vec<FramingOption>>,
    pub shipping_info: Option<ShippingInfo>,
}

impl ShopItemInput {
    fn check_common(&self, errors: &mut FieldErrors) {
        if self.price.is_some_and(|p| !p.is_finite() || p < 0.0) {
            errors.push("price", "price must be zero or more");
        }
        if self.available_quantity.is_some_and(|q| q < 0) {
            errors.push("availableQuantity", "availableQuantity must be zero or more");
        }
    }

    pub fn into_item(self, now: DateTime<Utc>) -> Result<ShopItem, AppError> {
        let mut errors = FieldErrors::new();
        if self.artwork.is_none() {
            errors.push("artwork", "artwork is required");
        }
        if self.price.is_none() {
            errors.push("price", "price is required");
        }
        if self.available_quantity.is_none() {
            errors.push("availableQuantity", "availableQuantity is required");
        }
        self.check_common(&mut errors);
        errors.finish("Shop item validation failed")?;

        Ok(ShopItem {
            id: Uuid::new_v4(),
            artwork_id: self.artwork.unwrap_or_default(),
            price: self.price.unwrap_or_default(),
            currency: non_blank(self.currency)
                .map(|c| c.to_uppercase())
                .unwrap_or_else(|| DEFAULT_CURRENCY.to_string()),
            available_quantity: self.available_quantity.unwrap_or_default(),
            is_original: self.is_original.unwrap_or(true),
            print_sizes: self.print_sizes.unwrap_or_default(),
            framing_options: self.framing_options.unwrap_or_default(),
            shipping_info: self.shipping_info,
            sold: 0,
            created_at: now,
        })
    }

    pub fn apply(self, item: &mut ShopItem) -> Result<(), AppError> {
        let mut errors = FieldErrors::new();
        self.check_common(&mut errors);
        errors.finish("Shop item validation failed")?;

        if let Some(artwork) = self.artwork {
            item.artwork_id = artwork;
        }
        if let Some(price) = self.price {
            item.price = price;
        }
        if let Some(currency) = non_blank(self.currency) {
            item.currency = currency.to_uppercase();
        }
        if let Some(quantity) = self.available_quantity {
            item.available_quantity = quantity;
        }
        if let Some(original) = self.is_original {
            item.is_original = original;
        }
        if let Some(sizes) = self.print_sizes {
            item.print_sizes = sizes;
        }
        if let Some(options) = self.framing_options {
            item.framing_options = options;
        }
        if self.shipping_info.is_some() {
            item.shipping_info = self.shipping_info;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ShopSort {
    #[default]
    Newest,
    PriceAsc,
    PriceDesc,
}

impl ShopSort {
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            Some("price-asc") => Self::PriceAsc,
            Some("price-desc") => Self::PriceDesc,
            _ => Self::Newest,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct ShopListParams {
    /// `true` keeps only listings with stock left.
    pub available: Option<String>,
    pub original: Option<String>,
    /// newest | price-asc | price-desc
    pub sort: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShopQuery {
    pub available: Option<bool>,
    pub original: Option<bool>,
    pub sort: ShopSort,
}

impl From<ShopListParams> for ShopQuery {
    fn from(params: ShopListParams) -> Self {
        Self {
            available: crate::extract::parse_flag(params.available.as_deref()),
            original: crate::extract::parse_flag(params.original.as_deref()),
            sort: ShopSort::parse(params.sort.as_deref()),
        }
    }
}

impl ShopQuery {
    pub fn matches(&self, item: &ShopItem) -> bool {
        self.available
            .is_none_or(|a| (item.available_quantity > 0) == a)
            && self.original.is_none_or(|o| item.is_original == o)
    }

    pub fn apply(&self, items: impl IntoIterator<Item = ShopItem>) -> Vec<ShopItem> {
        let mut selected: Vec<ShopItem> = items.into_iter().filter(|i| self.matches(i)).collect();
        match self.sort {
            ShopSort::Newest => selected.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
            ShopSort::PriceAsc => selected.sort_by(|a, b| a.price.total_cmp(&b.price)),
            ShopSort::PriceDesc => selected.sort_by(|a, b| b.price.total_cmp(&a.price)),
        }
        selected
    }
}

// --- Contacts & subscribers ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema, FromRow)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Contact {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
    #[sqlx(try_from = "String")]
    pub status: ContactStatus,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct ContactRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub subject: Option<String>,
    pub message: Option<String>,
}

impl ContactRequest {
    pub fn into_contact(self, now: DateTime<Utc>) -> Result<Contact, AppError> {
        let mut errors = FieldErrors::new();
        errors.require("name", self.name.as_deref());
        errors.require("email", self.email.as_deref());
        errors.require("subject", self.subject.as_deref());
        errors.require("message", self.message.as_deref());
        let email = normalize_email(self.email.as_deref().unwrap_or_default());
        if !email.is_empty() && !is_plausible_email(&email) {
            errors.push("email", "email is not a valid address");
        }
        errors.finish("Please fill in all fields")?;

        Ok(Contact {
            id: Uuid::new_v4(),
            name: non_blank(self.name).unwrap_or_default(),
            email,
            subject: non_blank(self.subject).unwrap_or_default(),
            message: self.message.unwrap_or_default(),
            status: ContactStatus::New,
            created_at: now,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ContactStatusUpdate {
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema, FromRow)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Subscriber {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub email: String,
    pub source: String,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
}

pub const DEFAULT_SUBSCRIBER_SOURCE: &str = "unknown";

#[derive(Debug, Clone, Default, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct SubscribeRequest {
    pub email: Option<String>,
    pub source: Option<String>,
}

impl SubscribeRequest {
    pub fn into_subscriber(self, now: DateTime<Utc>) -> Result<Subscriber, AppError> {
        let email = normalize_email(self.email.as_deref().unwrap_or_default());
        if email.is_empty() {
            return Err(AppError::validation("Email is required."));
        }
        if !is_plausible_email(&email) {
            return Err(AppError::validation("Please provide a valid email."));
        }
        Ok(Subscriber {
            id: Uuid::new_v4(),
            email,
            source: non_blank(self.source)
                .unwrap_or_else(|| DEFAULT_SUBSCRIBER_SOURCE.to_string()),
            created_at: now,
        })
    }
}

// --- Admin ---

/// EntityKind
///
/// Lookup table for the content collections an administrator may bulk-delete
/// from. Anything outside this allow-list is rejected before the store is touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Artworks,
    Blogs,
    Courses,
    ShopItems,
}

impl EntityKind {
    /// Backing table for the kind.
    pub const fn table(self) -> &'static str {
        match self {
            Self::Artworks => "artworks",
            Self::Blogs => "blogs",
            Self::Courses => "courses",
            Self::ShopItems => "shop_items",
        }
    }
}

impl FromStr for EntityKind {
    type Err = UnknownVariant;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim() {
            "artworks" => Ok(Self::Artworks),
            "blogs" => Ok(Self::Blogs),
            "courses" => Ok(Self::Courses),
            "shop" | "shop-items" => Ok(Self::ShopItems),
            other => Err(UnknownVariant {
                kind: "model type",
                value: other.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BulkDeleteRequest {
    pub model: String,
    #[serde(default)]
    pub ids: Vec<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BulkDeleteResponse {
    pub success: bool,
    pub message: String,
    pub deleted_count: u64,
}

/// Per-collection document counts for the admin dashboard.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct EntityCounts {
    pub users: i64,
    pub artworks: i64,
    pub blogs: i64,
    pub courses: i64,
    pub shop_items: i64,
    pub contacts: i64,
    pub subscribers: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct DashboardData {
    pub stats: EntityCounts,
    pub recent_users: Vec<User>,
    pub recent_contacts: Vec<Contact>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DashboardResponse {
    pub success: bool,
    pub data: DashboardData,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserListResponse {
    pub success: bool,
    pub count: usize,
    pub data: Vec<User>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ContactListResponse {
    pub success: bool,
    pub count: usize,
    pub data: Vec<Contact>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ContactResponse {
    pub success: bool,
    pub message: String,
    pub data: Contact,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SubscriberListResponse {
    pub success: bool,
    pub count: usize,
    pub data: Vec<Subscriber>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SubscriberResponse {
    pub success: bool,
    pub message: String,
    pub data: Subscriber,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

impl MessageResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub message: String,
    pub db_connected: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn at(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, day, 12, 0, 0)
            .single()
            .expect("valid date")
    }

    fn artwork(title: &str, category: ArtworkCategory, views: i64, day: u32) -> Artwork {
        Artwork {
            id: Uuid::new_v4(),
            title: title.to_string(),
            description: String::new(),
            artist_name: DEFAULT_ARTIST_NAME.to_string(),
            image_url: "https://img.example/a.jpg".to_string(),
            category,
            tags: vec![],
            dimensions: None,
            year_created: None,
            featured: false,
            views,
            created_at: at(day),
        }
    }

    #[test]
    fn enums_parse_case_insensitively() {
        assert_eq!("Abstract".parse::<ArtworkCategory>().ok(), Some(ArtworkCategory::Abstract));
        assert_eq!("MIXED-MEDIA".parse::<ArtworkCategory>().ok(), Some(ArtworkCategory::MixedMedia));
        assert_eq!("admin".parse::<Role>().ok(), Some(Role::Admin));
        assert!("superuser".parse::<Role>().is_err());
    }

    #[test]
    fn enum_defaults() {
        assert_eq!(Role::default(), Role::User);
        assert_eq!(ArtworkCategory::default(), ArtworkCategory::Painting);
        assert_eq!(CourseLevel::default(), CourseLevel::Beginner);
        assert_eq!(ContactStatus::default(), ContactStatus::New);
    }

    #[test]
    fn artwork_validation_runs_without_consuming_input() {
        let input = ArtworkInput {
            title: Some("Untitled".into()),
            description: Some("d".into()),
            category: Some("sculpture".into()),
            ..ArtworkInput::default()
        };
        assert_eq!(
            input.validate_new(at(1)).expect("valid"),
            Some(ArtworkCategory::Sculpture)
        );

        let patch = ArtworkInput {
            title: Some("  ".into()),
            ..ArtworkInput::default()
        };
        assert!(patch.validate_patch(at(1)).is_err());
    }

    #[test]
    fn artwork_query_filters_sorts_and_limits() {
        let items = vec![
            artwork("a", ArtworkCategory::Abstract, 5, 1),
            artwork("b", ArtworkCategory::Abstract, 50, 2),
            artwork("c", ArtworkCategory::Portrait, 500, 3),
            artwork("d", ArtworkCategory::Abstract, 10, 4),
        ];
        let query = ArtworkQuery {
            category: Some("ABSTRACT".to_string()),
            sort: ArtworkSort::Popular,
            limit: Some(2),
            ..ArtworkQuery::default()
        };
        let titles: Vec<_> = query.apply(items.clone()).into_iter().map(|a| a.title).collect();
        assert_eq!(titles, vec!["b", "d"]);

        let oldest = ArtworkQuery {
            sort: ArtworkSort::Oldest,
            ..ArtworkQuery::default()
        };
        assert_eq!(oldest.apply(items)[0].title, "a");
    }

    #[test]
    fn unknown_sort_falls_back_to_newest() {
        assert_eq!(ArtworkSort::parse(Some("random")), ArtworkSort::Newest);
        assert_eq!(ArtworkSort::parse(Some("popular")), ArtworkSort::Popular);
    }

    #[test]
    fn artwork_input_defaults() {
        let input = ArtworkInput {
            title: Some("Dusk".into()),
            description: Some("Warm light".into()),
            tags: Some(vec![" oil ".into(), "".into()]),
            ..ArtworkInput::default()
        };
        let art = input
            .into_artwork("https://img.example/dusk.jpg".into(), at(1))
            .expect("valid artwork");
        assert_eq!(art.artist_name, DEFAULT_ARTIST_NAME);
        assert_eq!(art.category, ArtworkCategory::Painting);
        assert_eq!(art.tags, vec!["oil"]);
        assert_eq!(art.views, 0);
    }

    #[test]
    fn artwork_input_rejects_future_year() {
        let input = ArtworkInput {
            title: Some("Later".into()),
            description: Some("x".into()),
            year_created: Some(at(1).year() + 1),
            ..ArtworkInput::default()
        };
        assert!(input.into_artwork("u".into(), at(1)).is_err());
    }

    #[test]
    fn image_url_aliases_in_order() {
        let input = ArtworkInput {
            img_url: Some("second".into()),
            image: Some("third".into()),
            ..ArtworkInput::default()
        };
        assert_eq!(input.provided_image_url().as_deref(), Some("second"));
        let blank = ArtworkInput {
            image_url: Some("  ".into()),
            ..ArtworkInput::default()
        };
        assert_eq!(blank.provided_image_url(), None);
    }

    #[test]
    fn slug_resolution() {
        assert_eq!(
            resolve_slug(None, Some("Hello, World! 2024")).ok().as_deref(),
            Some("hello-world-2024")
        );
        assert_eq!(
            resolve_slug(Some("My Custom Slug"), Some("ignored")).ok().as_deref(),
            Some("my-custom-slug")
        );
        assert!(resolve_slug(Some("   "), None).is_err());
        assert!(resolve_slug(None, Some("???")).is_err());
    }

    #[test]
    fn blog_publish_stamps_once() {
        let mut blog = BlogInput {
            title: Some("First".into()),
            excerpt: Some("e".into()),
            content: Some("word ".repeat(450)),
            cover_image: Some("c.jpg".into()),
            ..BlogInput::default()
        }
        .into_blog(at(1))
        .expect("valid blog");
        assert_eq!(blog.read_time, 3);
        assert!(blog.published_at.is_none());

        let publish = BlogInput {
            published: Some(true),
            ..BlogInput::default()
        };
        publish.apply(&mut blog, at(2)).expect("apply");
        assert_eq!(blog.published_at, Some(at(2)));
        assert_eq!(blog.updated_at, at(2));

        let again = BlogInput {
            published: Some(true),
            ..BlogInput::default()
        };
        again.apply(&mut blog, at(3)).expect("apply");
        assert_eq!(blog.published_at, Some(at(2)));
        assert_eq!(blog.updated_at, at(3));
    }

    #[test]
    fn blog_query_search_is_case_insensitive() {
        let blog = BlogInput {
            title: Some("Color Theory".into()),
            excerpt: Some("e".into()),
            content: Some("The wheel of COMPLEMENTARY hues".into()),
            cover_image: Some("c.jpg".into()),
            categories: Some(vec!["Technique".into()]),
            ..BlogInput::default()
        }
        .into_blog(at(1) + Duration::hours(1))
        .expect("valid blog");

        let by_content = BlogQuery {
            search: Some("complementary".into()),
            ..BlogQuery::default()
        };
        assert!(by_content.matches(&blog));
        let by_category = BlogQuery {
            category: Some("technique".into()),
            ..BlogQuery::default()
        };
        assert!(by_category.matches(&blog));
        let miss = BlogQuery {
            search: Some("sculpture".into()),
            ..BlogQuery::default()
        };
        assert!(!miss.matches(&blog));
    }

    #[test]
    fn entity_kind_allow_list() {
        assert_eq!("shop".parse::<EntityKind>().ok(), Some(EntityKind::ShopItems));
        assert_eq!(EntityKind::ShopItems.table(), "shop_items");
        assert!("widgets".parse::<EntityKind>().is_err());
        assert!("users".parse::<EntityKind>().is_err());
    }

    #[test]
    fn register_request_validation() {
        let ok = RegisterRequest {
            name: Some("Ada".into()),
            email: Some("  Ada@Example.COM ".into()),
            password: Some("secret1".into()),
            confirm_password: Some("secret1".into()),
        }
        .validate()
        .expect("valid registration");
        assert_eq!(ok.email, "ada@example.com");

        let short = RegisterRequest {
            name: Some("Ada".into()),
            email: Some("ada@example.com".into()),
            password: Some("12345".into()),
            confirm_password: Some("12345".into()),
        };
        assert!(short.validate().is_err());
    }

    #[test]
    fn user_serialisation_uses_wire_names() {
        let user = User {
            id: Uuid::nil(),
            name: "Ada".into(),
            email: "ada@example.com".into(),
            role: Role::Admin,
            bio: None,
            created_at: at(1),
        };
        let json = serde_json::to_value(&user).expect("serialise");
        assert_eq!(json["_id"], Uuid::nil().to_string());
        assert_eq!(json["role"], "admin");
        assert!(json.get("createdAt").is_some());
        assert!(json.get("bio").is_none());
        assert!(json.get("password").is_none());
    }
}
