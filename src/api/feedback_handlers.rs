use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::auth::CurrentSession;
use crate::database::models::{Doubt, Feedback};
use crate::error::AppError;
use crate::services::feedback::{CourseFeedback, DoubtRequest, DoubtUpdate, FeedbackRequest};

use super::responses::ErrorResponse;
use super::state::AppState;

/// Query parameters for listing doubts
#[derive(Debug, Deserialize, IntoParams)]
pub struct DoubtQuery {
    /// `unanswered`, `in_progress` or `answered`
    pub status: Option<String>,
}

// ============================================================================
// Feedback
// ============================================================================

#[utoipa::path(
    post,
    path = "/api/feedback",
    tag = "Feedback",
    request_body = FeedbackRequest,
    responses(
        (status = 201, description = "Feedback stored", body = Feedback),
        (status = 400, description = "Rating out of range", body = ErrorResponse),
        (status = 404, description = "Course or content not found", body = ErrorResponse)
    )
)]
pub async fn submit_feedback(
    State(state): State<AppState>,
    session: CurrentSession,
    Json(request): Json<FeedbackRequest>,
) -> Result<(StatusCode, Json<Feedback>), AppError> {
    let feedback = state.feedback.submit_feedback(session.data.user_id, request)?;
    Ok((StatusCode::CREATED, Json(feedback)))
}

#[utoipa::path(
    get,
    path = "/api/courses/{course_id}/feedback",
    tag = "Feedback",
    params(
        ("course_id" = i64, Path, description = "Course ID")
    ),
    responses(
        (status = 200, description = "Feedback with rating summary", body = CourseFeedback),
        (status = 404, description = "Course not found", body = ErrorResponse)
    )
)]
pub async fn course_feedback(
    State(state): State<AppState>,
    Path(course_id): Path<i64>,
) -> Result<Json<CourseFeedback>, AppError> {
    state.feedback.course_feedback(course_id).map(Json)
}

// ============================================================================
// Doubts
// ============================================================================

#[utoipa::path(
    post,
    path = "/api/doubts",
    tag = "Feedback",
    request_body = DoubtRequest,
    responses(
        (status = 201, description = "Doubt raised", body = Doubt),
        (status = 400, description = "Empty doubt", body = ErrorResponse),
        (status = 404, description = "Course or content not found", body = ErrorResponse)
    )
)]
pub async fn raise_doubt(
    State(state): State<AppState>,
    session: CurrentSession,
    Json(request): Json<DoubtRequest>,
) -> Result<(StatusCode, Json<Doubt>), AppError> {
    let doubt = state.feedback.raise_doubt(session.data.user_id, request)?;
    Ok((StatusCode::CREATED, Json(doubt)))
}

#[utoipa::path(
    get,
    path = "/api/courses/{course_id}/doubts",
    tag = "Feedback",
    params(
        ("course_id" = i64, Path, description = "Course ID"),
        DoubtQuery
    ),
    responses(
        (status = 200, description = "Doubts, newest first", body = Vec<Doubt>),
        (status = 400, description = "Unknown status filter", body = ErrorResponse)
    )
)]
pub async fn course_doubts(
    State(state): State<AppState>,
    Path(course_id): Path<i64>,
    Query(query): Query<DoubtQuery>,
) -> Result<Json<Vec<Doubt>>, AppError> {
    state
        .feedback
        .course_doubts(course_id, query.status.as_deref())
        .map(Json)
}

/// Change a doubt's status; teachers and the admin only
#[utoipa::path(
    patch,
    path = "/api/doubts/{doubt_id}",
    tag = "Feedback",
    params(
        ("doubt_id" = i64, Path, description = "Doubt ID")
    ),
    request_body = DoubtUpdate,
    responses(
        (status = 200, description = "Doubt updated", body = Doubt),
        (status = 401, description = "Teacher or admin login required", body = ErrorResponse),
        (status = 404, description = "Doubt not found", body = ErrorResponse)
    )
)]
pub async fn update_doubt(
    State(state): State<AppState>,
    session: CurrentSession,
    Path(doubt_id): Path<i64>,
    Json(update): Json<DoubtUpdate>,
) -> Result<Json<Doubt>, AppError> {
    if session.data.teacher_id.is_none() && !session.data.admin_authenticated {
        return Err(AppError::Unauthorized(
            "Teacher or admin login required".to_string(),
        ));
    }

    state
        .feedback
        .update_doubt(doubt_id, session.data.user_id, update)
        .map(Json)
}
