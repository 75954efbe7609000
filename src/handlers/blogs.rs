use axum::{Json, extract::State, http::StatusCode};
use chrono::Utc;
use uuid::Uuid;

use crate::{
    AppState,
    auth::AuthUser,
    error::AppError,
    extract::{ApiJson, ApiPath, ApiQuery, parse_limit},
    models::{
        Blog, BlogInput, BlogListParams, BlogQuery, Comment, CommentRequest, LimitParams,
        MessageResponse, Reply, ReplyRequest,
    },
    repository::RepositoryState,
};

pub const DEFAULT_LATEST_BLOGS: usize = 3;
const ANONYMOUS_AUTHOR: &str = "Anonymous";
const FALLBACK_ADMIN_AUTHOR: &str = "Admin";

async fn load_blog(repo: &RepositoryState, id: Uuid) -> Result<Blog, AppError> {
    repo.get_blog(id).await?.ok_or(AppError::NotFound("Blog"))
}

async fn save_blog(repo: &RepositoryState, blog: &Blog) -> Result<Blog, AppError> {
    repo.replace_blog(blog)
        .await?
        .ok_or(AppError::NotFound("Blog"))
}

/// Thread edits that matched nothing: reports the blog when it is gone, else `target`.
async fn edited_thread(
    repo: &RepositoryState,
    id: Uuid,
    edited: Option<Blog>,
    target: &'static str,
) -> Result<Blog, AppError> {
    match edited {
        Some(blog) => Ok(blog),
        None => {
            load_blog(repo, id).await?;
            Err(AppError::NotFound(target))
        }
    }
}

fn comment_text(text: Option<String>) -> Result<String, AppError> {
    text.map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .ok_or_else(|| AppError::validation("Comment text is required"))
}

/// list_blogs
///
/// [Public Route] Newest first, filtered by category, free-text search and
/// publication state.
#[utoipa::path(
    get,
    path = "/api/blogs",
    params(BlogListParams),
    responses(
        (status = 200, description = "Blog posts", body = [Blog]),
        (status = 503, description = "Store unreachable")
    )
)]
pub async fn list_blogs(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<BlogListParams>,
) -> Result<Json<Vec<Blog>>, AppError> {
    let query = BlogQuery::from(params);
    Ok(Json(state.store()?.list_blogs(&query).await?))
}

/// latest_blogs
///
/// [Public Route] Newest published posts, three unless `limit` says otherwise.
#[utoipa::path(
    get,
    path = "/api/blogs/latest",
    params(LimitParams),
    responses((status = 200, description = "Latest posts", body = [Blog]))
)]
pub async fn latest_blogs(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<LimitParams>,
) -> Result<Json<Vec<Blog>>, AppError> {
    let limit = parse_limit(params.limit.as_deref()).unwrap_or(DEFAULT_LATEST_BLOGS);
    let query = BlogQuery {
        published: Some(true),
        ..BlogQuery::latest(limit)
    };
    Ok(Json(state.store()?.list_blogs(&query).await?))
}

/// get_blog
///
/// [Public Route] Single post; each fetch counts one view.
#[utoipa::path(
    get,
    path = "/api/blogs/{id}",
    params(("id" = Uuid, Path, description = "Blog ID")),
    responses(
        (status = 200, description = "Found", body = Blog),
        (status = 404, description = "Not Found")
    )
)]
pub async fn get_blog(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<Blog>, AppError> {
    let blog = state
        .store()?
        .view_blog(id)
        .await?
        .ok_or(AppError::NotFound("Blog"))?;
    Ok(Json(blog))
}

/// create_blog
///
/// [Admin Route] The slug is derived from the title when not supplied.
#[utoipa::path(
    post,
    path = "/api/blogs",
    request_body = BlogInput,
    responses(
        (status = 201, description = "Created", body = Blog),
        (status = 400, description = "Validation failed"),
        (status = 409, description = "Slug already taken")
    )
)]
pub async fn create_blog(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<BlogInput>,
) -> Result<(StatusCode, Json<Blog>), AppError> {
    let repo = state.store()?;
    let blog = payload.into_blog(Utc::now())?;
    let created = repo.create_blog(&blog).await?;
    tracing::info!(blog_id = %created.id, slug = %created.slug, "blog created");
    Ok((StatusCode::CREATED, Json(created)))
}

/// update_blog
///
/// [Admin Route] Partial update. `updatedAt` is refreshed on every save.
#[utoipa::path(
    put,
    path = "/api/blogs/{id}",
    params(("id" = Uuid, Path, description = "Blog ID")),
    request_body = BlogInput,
    responses(
        (status = 200, description = "Updated", body = Blog),
        (status = 404, description = "Not Found"),
        (status = 409, description = "Slug already taken")
    )
)]
pub async fn update_blog(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(payload): ApiJson<BlogInput>,
) -> Result<Json<Blog>, AppError> {
    let repo = state.store()?;
    let mut blog = load_blog(repo, id).await?;
    payload.apply(&mut blog, Utc::now())?;
    Ok(Json(save_blog(repo, &blog).await?))
}

/// delete_blog
///
/// [Admin Route]
#[utoipa::path(
    delete,
    path = "/api/blogs/{id}",
    params(("id" = Uuid, Path, description = "Blog ID")),
    responses(
        (status = 200, description = "Deleted", body = MessageResponse),
        (status = 404, description = "Not Found")
    )
)]
pub async fn delete_blog(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<MessageResponse>, AppError> {
    if state.store()?.delete_blog(id).await? {
        Ok(Json(MessageResponse::ok("Blog deleted successfully")))
    } else {
        Err(AppError::NotFound("Blog"))
    }
}

/// add_comment
///
/// [Public Route] Appends a comment to the post and persists it.
#[utoipa::path(
    post,
    path = "/api/blogs/{id}/comments",
    params(("id" = Uuid, Path, description = "Blog ID")),
    request_body = CommentRequest,
    responses(
        (status = 201, description = "Comment added", body = Blog),
        (status = 400, description = "Empty comment"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn add_comment(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(payload): ApiJson<CommentRequest>,
) -> Result<(StatusCode, Json<Blog>), AppError> {
    let repo = state.store()?;
    let text = comment_text(payload.text)?;

    let comment = Comment {
        id: Uuid::new_v4(),
        author: payload
            .author
            .map(|a| a.trim().to_string())
            .filter(|a| !a.is_empty())
            .unwrap_or_else(|| ANONYMOUS_AUTHOR.to_string()),
        text,
        created_at: Utc::now(),
        replies: Vec::new(),
    };
    let blog = repo
        .push_comment(id, &comment)
        .await?
        .ok_or(AppError::NotFound("Blog"))?;

    Ok((StatusCode::CREATED, Json(blog)))
}

/// delete_comment
///
/// [Admin Route] Removes a comment together with its replies.
#[utoipa::path(
    delete,
    path = "/api/blogs/{id}/comments/{comment_id}",
    params(
        ("id" = Uuid, Path, description = "Blog ID"),
        ("comment_id" = Uuid, Path, description = "Comment ID")
    ),
    responses(
        (status = 200, description = "Comment removed", body = Blog),
        (status = 404, description = "Not Found")
    )
)]
pub async fn delete_comment(
    State(state): State<AppState>,
    ApiPath((id, comment_id)): ApiPath<(Uuid, Uuid)>,
) -> Result<Json<Blog>, AppError> {
    let repo = state.store()?;
    let edited = repo.remove_comment(id, comment_id, Utc::now()).await?;
    Ok(Json(edited_thread(repo, id, edited, "Comment").await?))
}

/// add_reply
///
/// [Admin Route] Replies are signed with the replying administrator's name.
#[utoipa::path(
    post,
    path = "/api/blogs/{id}/comments/{comment_id}/replies",
    params(
        ("id" = Uuid, Path, description = "Blog ID"),
        ("comment_id" = Uuid, Path, description = "Comment ID")
    ),
    request_body = ReplyRequest,
    responses(
        (status = 201, description = "Reply added", body = Blog),
        (status = 404, description = "Not Found")
    )
)]
pub async fn add_reply(
    AuthUser { id: admin_id, .. }: AuthUser,
    State(state): State<AppState>,
    ApiPath((id, comment_id)): ApiPath<(Uuid, Uuid)>,
    ApiJson(payload): ApiJson<ReplyRequest>,
) -> Result<(StatusCode, Json<Blog>), AppError> {
    let repo = state.store()?;
    let text = comment_text(payload.text)?;

    let author = repo
        .get_user(admin_id)
        .await?
        .map(|u| u.name)
        .unwrap_or_else(|| FALLBACK_ADMIN_AUTHOR.to_string());

    let reply = Reply {
        id: Uuid::new_v4(),
        author,
        text,
        created_at: Utc::now(),
    };
    let edited = repo.push_reply(id, comment_id, &reply).await?;
    let blog = edited_thread(repo, id, edited, "Comment").await?;

    Ok((StatusCode::CREATED, Json(blog)))
}

/// delete_reply
///
/// [Admin Route]
#[utoipa::path(
    delete,
    path = "/api/blogs/{id}/comments/{comment_id}/replies/{reply_id}",
    params(
        ("id" = Uuid, Path, description = "Blog ID"),
        ("comment_id" = Uuid, Path, description = "Comment ID"),
        ("reply_id" = Uuid, Path, description = "Reply ID")
    ),
    responses(
        (status = 200, description = "Reply removed", body = Blog),
        (status = 404, description = "Not Found")
    )
)]
pub async fn delete_reply(
    State(state): State<AppState>,
    ApiPath((id, comment_id, reply_id)): ApiPath<(Uuid, Uuid, Uuid)>,
) -> Result<Json<Blog>, AppError> {
    let repo = state.store()?;
    match repo
        .remove_reply(id, comment_id, reply_id, Utc::now())
        .await?
    {
        Some(blog) => Ok(Json(blog)),
        None => {
            let blog = load_blog(repo, id).await?;
            let target = if blog.comments.iter().any(|c| c.id == comment_id) {
                "Reply"
            } else {
                "Comment"
            };
            Err(AppError::NotFound(target))
        }
    }
}
