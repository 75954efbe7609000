use axum::{Json, extract::State, http::StatusCode};
use chrono::Utc;
use uuid::Uuid;

use crate::{
    AppState,
    error::AppError,
    extract::{ApiJson, ApiPath, ApiQuery},
    models::{Course, CourseInput, CourseListParams, CourseQuery, MessageResponse},
};

/// list_courses
///
/// [Public Route] Filter by level, category and featured flag.
#[utoipa::path(
    get,
    path = "/api/courses",
    params(CourseListParams),
    responses((status = 200, description = "Courses", body = [Course]))
)]
pub async fn list_courses(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<CourseListParams>,
) -> Result<Json<Vec<Course>>, AppError> {
    let query = CourseQuery::from(params);
    Ok(Json(state.store()?.list_courses(&query).await?))
}

/// featured_courses
///
/// [Public Route]
#[utoipa::path(
    get,
    path = "/api/courses/featured",
    responses((status = 200, description = "Featured courses", body = [Course]))
)]
pub async fn featured_courses(State(state): State<AppState>) -> Result<Json<Vec<Course>>, AppError> {
    Ok(Json(
        state.store()?.list_courses(&CourseQuery::featured()).await?,
    ))
}

/// get_course
///
/// [Public Route]
#[utoipa::path(
    get,
    path = "/api/courses/{id}",
    params(("id" = Uuid, Path, description = "Course ID")),
    responses(
        (status = 200, description = "Found", body = Course),
        (status = 404, description = "Not Found")
    )
)]
pub async fn get_course(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<Course>, AppError> {
    let course = state
        .store()?
        .get_course(id)
        .await?
        .ok_or(AppError::NotFound("Course"))?;
    Ok(Json(course))
}

/// create_course
///
/// [Admin Route]
#[utoipa::path(
    post,
    path = "/api/courses",
    request_body = CourseInput,
    responses(
        (status = 201, description = "Created", body = Course),
        (status = 400, description = "Validation failed")
    )
)]
pub async fn create_course(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<CourseInput>,
) -> Result<(StatusCode, Json<Course>), AppError> {
    let repo = state.store()?;
    let course = payload.into_course(Utc::now())?;
    let created = repo.create_course(&course).await?;
    tracing::info!(course_id = %created.id, "course created");
    Ok((StatusCode::CREATED, Json(created)))
}

/// update_course
///
/// [Admin Route] Partial update.
#[utoipa::path(
    put,
    path = "/api/courses/{id}",
    params(("id" = Uuid, Path, description = "Course ID")),
    request_body = CourseInput,
    responses(
        (status = 200, description = "Updated", body = Course),
        (status = 404, description = "Not Found")
    )
)]
pub async fn update_course(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(payload): ApiJson<CourseInput>,
) -> Result<Json<Course>, AppError> {
    let repo = state.store()?;
    let mut course = repo
        .get_course(id)
        .await?
        .ok_or(AppError::NotFound("Course"))?;
    payload.apply(&mut course)?;
    let updated = repo
        .replace_course(&course)
        .await?
        .ok_or(AppError::NotFound("Course"))?;
    Ok(Json(updated))
}

/// delete_course
///
/// [Admin Route]
#[utoipa::path(
    delete,
    path = "/api/courses/{id}",
    params(("id" = Uuid, Path, description = "Course ID")),
    responses(
        (status = 200, description = "Deleted", body = MessageResponse),
        (status = 404, description = "Not Found")
    )
)]
pub async fn delete_course(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<MessageResponse>, AppError> {
    if state.store()?.delete_course(id).await? {
        Ok(Json(MessageResponse::ok("Course deleted successfully")))
    } else {
        Err(AppError::NotFound("Course"))
    }
}
