use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::auth::RequireAdmin;
use crate::database::models::{Content, Course, CourseQuiz, NewCourse};
use crate::error::AppError;
use crate::services::learning::{AdminAnalyticsView, ContentDraft, CourseQuizDraft};

use super::responses::ErrorResponse;
use super::state::AppState;

/// Site-wide clickstream and progress statistics
#[utoipa::path(
    get,
    path = "/api/admin/analytics",
    tag = "Admin",
    responses(
        (status = 200, description = "Recent events and totals", body = AdminAnalyticsView),
        (status = 401, description = "Admin login required", body = ErrorResponse)
    )
)]
pub async fn admin_analytics(
    State(state): State<AppState>,
    _admin: RequireAdmin,
) -> Result<Json<AdminAnalyticsView>, AppError> {
    state.learning.admin_analytics().map(Json)
}

// ============================================================================
// Course authoring
// ============================================================================

#[utoipa::path(
    post,
    path = "/api/admin/courses",
    tag = "Admin",
    request_body = NewCourse,
    responses(
        (status = 201, description = "Course created", body = Course),
        (status = 400, description = "Invalid course", body = ErrorResponse),
        (status = 401, description = "Admin login required", body = ErrorResponse)
    )
)]
pub async fn create_course(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    Json(course): Json<NewCourse>,
) -> Result<(StatusCode, Json<Course>), AppError> {
    let course = state.learning.create_course(course)?;
    Ok((StatusCode::CREATED, Json(course)))
}

/// Append a content item to a course
#[utoipa::path(
    post,
    path = "/api/admin/courses/{course_id}/contents",
    tag = "Admin",
    params(
        ("course_id" = i64, Path, description = "Course ID")
    ),
    request_body = ContentDraft,
    responses(
        (status = 201, description = "Content created", body = Content),
        (status = 400, description = "Missing video URL or text", body = ErrorResponse),
        (status = 401, description = "Admin login required", body = ErrorResponse),
        (status = 404, description = "Course not found", body = ErrorResponse)
    )
)]
pub async fn create_content(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    Path(course_id): Path<i64>,
    Json(draft): Json<ContentDraft>,
) -> Result<(StatusCode, Json<Content>), AppError> {
    let content = state.learning.create_content(course_id, draft)?;
    Ok((StatusCode::CREATED, Json(content)))
}

/// Attach the multiple choice question of a quiz content item
#[utoipa::path(
    post,
    path = "/api/admin/contents/{content_id}/quiz",
    tag = "Admin",
    params(
        ("content_id" = i64, Path, description = "Content ID")
    ),
    request_body = CourseQuizDraft,
    responses(
        (status = 201, description = "Quiz attached", body = CourseQuiz),
        (status = 400, description = "Content is not a quiz", body = ErrorResponse),
        (status = 401, description = "Admin login required", body = ErrorResponse),
        (status = 404, description = "Content not found", body = ErrorResponse),
        (status = 409, description = "Content already has a quiz", body = ErrorResponse)
    )
)]
pub async fn attach_quiz(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    Path(content_id): Path<i64>,
    Json(draft): Json<CourseQuizDraft>,
) -> Result<(StatusCode, Json<CourseQuiz>), AppError> {
    let quiz = state.learning.attach_quiz(content_id, draft)?;
    Ok((StatusCode::CREATED, Json(quiz)))
}
