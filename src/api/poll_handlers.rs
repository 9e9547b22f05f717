use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};

use crate::auth::{session_cookie, CurrentSession, RequireTeacher};
use crate::database::models::Poll;
use crate::error::AppError;
use crate::services::polls::{CreatePollRequest, PollAnswerRequest, PollResults, PollTally, PollView};

use super::responses::{ErrorResponse, MessageResponse};
use super::state::AppState;

// ============================================================================
// Teacher endpoints
// ============================================================================

#[utoipa::path(
    get,
    path = "/api/teacher/polls",
    tag = "Polls",
    responses(
        (status = 200, description = "Teacher's polls, newest first", body = Vec<Poll>),
        (status = 401, description = "Teacher login required", body = ErrorResponse)
    )
)]
pub async fn list_polls(
    State(state): State<AppState>,
    teacher: RequireTeacher,
) -> Result<Json<Vec<Poll>>, AppError> {
    state.polls.list_polls(teacher.teacher_id).map(Json)
}

#[utoipa::path(
    post,
    path = "/api/teacher/polls",
    tag = "Polls",
    request_body = CreatePollRequest,
    responses(
        (status = 201, description = "Poll created and open", body = PollView),
        (status = 400, description = "Invalid poll", body = ErrorResponse),
        (status = 401, description = "Teacher login required", body = ErrorResponse)
    )
)]
pub async fn create_poll(
    State(state): State<AppState>,
    teacher: RequireTeacher,
    Json(request): Json<CreatePollRequest>,
) -> Result<(StatusCode, Json<PollView>), AppError> {
    let poll = state.polls.create_poll(teacher.teacher_id, request)?;
    Ok((StatusCode::CREATED, Json(poll)))
}

#[utoipa::path(
    post,
    path = "/api/teacher/polls/{poll_id}/close",
    tag = "Polls",
    params(
        ("poll_id" = i64, Path, description = "Poll ID")
    ),
    responses(
        (status = 200, description = "Poll closed", body = Poll),
        (status = 403, description = "Poll belongs to another teacher", body = ErrorResponse),
        (status = 404, description = "Poll not found", body = ErrorResponse)
    )
)]
pub async fn close_poll(
    State(state): State<AppState>,
    teacher: RequireTeacher,
    Path(poll_id): Path<i64>,
) -> Result<Json<Poll>, AppError> {
    state.polls.close_poll(teacher.teacher_id, poll_id).map(Json)
}

#[utoipa::path(
    delete,
    path = "/api/teacher/polls/{poll_id}",
    tag = "Polls",
    params(
        ("poll_id" = i64, Path, description = "Poll ID")
    ),
    responses(
        (status = 200, description = "Poll deleted", body = MessageResponse),
        (status = 403, description = "Poll belongs to another teacher", body = ErrorResponse),
        (status = 404, description = "Poll not found", body = ErrorResponse)
    )
)]
pub async fn delete_poll(
    State(state): State<AppState>,
    teacher: RequireTeacher,
    Path(poll_id): Path<i64>,
) -> Result<Json<MessageResponse>, AppError> {
    state.polls.delete_poll(teacher.teacher_id, poll_id)?;
    Ok(Json(MessageResponse::new("Poll deleted")))
}

#[utoipa::path(
    get,
    path = "/api/teacher/polls/{poll_id}/results",
    tag = "Polls",
    params(
        ("poll_id" = i64, Path, description = "Poll ID")
    ),
    responses(
        (status = 200, description = "Counts, percentages and word cloud", body = PollResults),
        (status = 403, description = "Poll belongs to another teacher", body = ErrorResponse),
        (status = 404, description = "Poll not found", body = ErrorResponse)
    )
)]
pub async fn poll_results(
    State(state): State<AppState>,
    teacher: RequireTeacher,
    Path(poll_id): Path<i64>,
) -> Result<Json<PollResults>, AppError> {
    state.polls.results(teacher.teacher_id, poll_id).map(Json)
}

// ============================================================================
// Respondent endpoints
// ============================================================================

#[utoipa::path(
    get,
    path = "/api/polls/{code}",
    tag = "Polls",
    params(
        ("code" = String, Path, description = "Poll code")
    ),
    responses(
        (status = 200, description = "Poll with its options", body = PollView),
        (status = 404, description = "Unknown poll code", body = ErrorResponse)
    )
)]
pub async fn get_poll(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<Json<PollView>, AppError> {
    state.polls.poll_for_code(&code).map(Json)
}

/// Answer a poll. Respondents without an email are told apart by session.
#[utoipa::path(
    post,
    path = "/api/polls/{code}/respond",
    tag = "Polls",
    params(
        ("code" = String, Path, description = "Poll code")
    ),
    request_body = PollAnswerRequest,
    responses(
        (status = 200, description = "Response recorded, updated tally", body = PollTally),
        (status = 400, description = "Poll closed or invalid answer", body = ErrorResponse),
        (status = 404, description = "Unknown poll code", body = ErrorResponse),
        (status = 409, description = "Already answered", body = ErrorResponse)
    )
)]
pub async fn respond_to_poll(
    State(state): State<AppState>,
    session: CurrentSession,
    Path(code): Path<String>,
    Json(answer): Json<PollAnswerRequest>,
) -> Result<impl IntoResponse, AppError> {
    let sid = state.sessions.upsert(session.id.as_deref(), |_| {});
    let tally = state.polls.respond(&code, answer, Some(&sid))?;

    Ok(([(header::SET_COOKIE, session_cookie(&sid))], Json(tally)))
}
