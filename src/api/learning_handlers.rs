use axum::{
    body::Bytes,
    extract::{Path, State},
    response::{IntoResponse, Response},
    Json,
};

use crate::auth::RequireUser;
use crate::clickstream::RequestContext;
use crate::error::AppError;
use crate::services::learning::{
    ActionResponse, ContentView, CourseDetailView, DashboardView, HomeView, QuizSubmitResult,
};

use super::responses::*;
use super::state::AppState;

/// Landing page data
#[utoipa::path(
    get,
    path = "/api/home",
    tag = "Learning",
    responses(
        (status = 200, description = "Courses on offer", body = HomeView)
    )
)]
pub async fn home(State(state): State<AppState>, ctx: RequestContext) -> Result<Json<HomeView>, AppError> {
    state.learning.home(&ctx).map(Json)
}

/// Courses and progress of the logged-in learner
#[utoipa::path(
    get,
    path = "/api/dashboard",
    tag = "Learning",
    responses(
        (status = 200, description = "Learner dashboard", body = DashboardView),
        (status = 401, description = "Login required", body = ErrorResponse)
    )
)]
pub async fn dashboard(
    State(state): State<AppState>,
    user: RequireUser,
    ctx: RequestContext,
) -> Result<Json<DashboardView>, AppError> {
    state.learning.dashboard(user.user_id, &ctx).map(Json)
}

#[utoipa::path(
    get,
    path = "/api/courses/{course_id}",
    tag = "Learning",
    params(
        ("course_id" = i64, Path, description = "Course ID")
    ),
    responses(
        (status = 200, description = "Course with its ordered contents", body = CourseDetailView),
        (status = 401, description = "Login required", body = ErrorResponse),
        (status = 404, description = "Course not found", body = ErrorResponse)
    )
)]
pub async fn course_detail(
    State(state): State<AppState>,
    user: RequireUser,
    ctx: RequestContext,
    Path(course_id): Path<i64>,
) -> Result<Json<CourseDetailView>, AppError> {
    state.learning.course_detail(user.user_id, course_id, &ctx).map(Json)
}

#[utoipa::path(
    get,
    path = "/api/contents/{content_id}",
    tag = "Learning",
    params(
        ("content_id" = i64, Path, description = "Content ID")
    ),
    responses(
        (status = 200, description = "Content with the learner's progress", body = ContentView),
        (status = 401, description = "Login required", body = ErrorResponse),
        (status = 404, description = "Content or its quiz not found", body = ErrorResponse)
    )
)]
pub async fn content_detail(
    State(state): State<AppState>,
    user: RequireUser,
    ctx: RequestContext,
    Path(content_id): Path<i64>,
) -> Result<Json<ContentView>, AppError> {
    state.learning.content_view(user.user_id, content_id, &ctx).map(Json)
}

/// Answer the quiz attached to a content item.
///
/// The body is parsed by hand so malformed JSON gets the
/// `{success: false, error: "Invalid JSON data"}` reply.
#[utoipa::path(
    post,
    path = "/api/contents/{content_id}/submit-quiz",
    tag = "Learning",
    params(
        ("content_id" = i64, Path, description = "Content ID")
    ),
    request_body = SubmitQuizRequest,
    responses(
        (status = 200, description = "Graded answer", body = QuizSubmitResult),
        (status = 401, description = "Login required", body = ErrorResponse),
        (status = 404, description = "Content or quiz not found", body = ErrorResponse)
    )
)]
pub async fn submit_quiz(
    State(state): State<AppState>,
    user: RequireUser,
    ctx: RequestContext,
    Path(content_id): Path<i64>,
    body: Bytes,
) -> Result<Response, AppError> {
    let request: SubmitQuizRequest = match serde_json::from_slice(&body) {
        Ok(request) => request,
        Err(e) => {
            tracing::debug!(content_id, error = %e, "Rejected quiz submission body");
            return Ok(Json(ActionResponse::failed("Invalid JSON data")).into_response());
        }
    };

    let result = state
        .learning
        .submit_quiz(user.user_id, content_id, &request.answer, &ctx)?;

    Ok(Json(result).into_response())
}

/// Video player events (play, pause, complete).
///
/// Malformed bodies get the same `Invalid JSON data` reply as quiz submissions.
#[utoipa::path(
    post,
    path = "/api/track-video",
    tag = "Learning",
    request_body = TrackVideoRequest,
    responses(
        (status = 200, description = "Event recorded", body = ActionResponse),
        (status = 400, description = "Unknown event type", body = ErrorResponse),
        (status = 401, description = "Login required", body = ErrorResponse),
        (status = 404, description = "Content not found", body = ErrorResponse)
    )
)]
pub async fn track_video(
    State(state): State<AppState>,
    user: RequireUser,
    ctx: RequestContext,
    body: Bytes,
) -> Result<Response, AppError> {
    let request = match parse_track_video(&body) {
        Some(request) => request,
        None => return Ok(Json(ActionResponse::failed("Invalid JSON data")).into_response()),
    };

    let result = state.learning.track_video(
        user.user_id,
        request.content_id,
        &request.event_type,
        request.position_seconds(),
        &ctx,
    )?;

    Ok(Json(result).into_response())
}

fn parse_track_video(body: &[u8]) -> Option<TrackVideoRequest> {
    serde_json::from_slice(body)
        .map_err(|e| tracing::debug!(error = %e, "Rejected video event body"))
        .ok()
}

#[utoipa::path(
    post,
    path = "/api/contents/{content_id}/mark-read",
    tag = "Learning",
    params(
        ("content_id" = i64, Path, description = "Content ID")
    ),
    responses(
        (status = 200, description = "Text content marked as read", body = ActionResponse),
        (status = 401, description = "Login required", body = ErrorResponse),
        (status = 404, description = "Content not found", body = ErrorResponse)
    )
)]
pub async fn mark_content_read(
    State(state): State<AppState>,
    user: RequireUser,
    ctx: RequestContext,
    Path(content_id): Path<i64>,
) -> Result<Json<ActionResponse>, AppError> {
    state
        .learning
        .mark_content_read(user.user_id, content_id, &ctx)
        .map(Json)
}
