use axum::{
    extract::{Path, State},
    http::header,
    response::IntoResponse,
    Json,
};

use crate::auth::{session_cookie, CurrentSession};
use crate::error::AppError;
use crate::services::live_quiz::{
    JoinOutcome, JoinQuizRequest, ParticipantQuiz, ParticipantResults, SubmissionResult,
    SubmitAnswersRequest,
};

use super::responses::ErrorResponse;
use super::state::AppState;

/// Participant bound to this session for the quiz `code`
fn participant_for(session: &CurrentSession, code: &str) -> Option<i64> {
    session
        .data
        .participants
        .get(&code.trim().to_uppercase())
        .copied()
}

/// Join an active quiz by code
///
/// The participant id is remembered in the session, which is created when
/// the student has none yet.
#[utoipa::path(
    post,
    path = "/api/quiz/join",
    tag = "Student Quiz",
    request_body = JoinQuizRequest,
    responses(
        (status = 200, description = "Joined the quiz", body = JoinOutcome),
        (status = 400, description = "Quiz not active or missing details", body = ErrorResponse),
        (status = 404, description = "Unknown quiz code", body = ErrorResponse),
        (status = 409, description = "Already submitted", body = ErrorResponse)
    )
)]
pub async fn join_quiz(
    State(state): State<AppState>,
    session: CurrentSession,
    Json(request): Json<JoinQuizRequest>,
) -> Result<impl IntoResponse, AppError> {
    let outcome = state.live_quiz.join(request)?;

    let sid = state.sessions.upsert(session.id.as_deref(), |data| {
        data.participants
            .insert(outcome.quiz_code.clone(), outcome.participant.id);
    });

    tracing::info!(
        quiz_code = %outcome.quiz_code,
        participant_id = outcome.participant.id,
        "Participant joined quiz"
    );

    Ok(([(header::SET_COOKIE, session_cookie(&sid))], Json(outcome)))
}

#[utoipa::path(
    get,
    path = "/api/quiz/{code}/questions",
    tag = "Student Quiz",
    params(
        ("code" = String, Path, description = "Quiz code")
    ),
    responses(
        (status = 200, description = "Approved questions without answers", body = ParticipantQuiz),
        (status = 401, description = "Join the quiz first", body = ErrorResponse),
        (status = 404, description = "Unknown quiz code", body = ErrorResponse)
    )
)]
pub async fn quiz_questions(
    State(state): State<AppState>,
    session: CurrentSession,
    Path(code): Path<String>,
) -> Result<Json<ParticipantQuiz>, AppError> {
    state
        .live_quiz
        .questions_for_participant(&code, participant_for(&session, &code))
        .map(Json)
}

#[utoipa::path(
    post,
    path = "/api/quiz/{code}/submit",
    tag = "Student Quiz",
    params(
        ("code" = String, Path, description = "Quiz code")
    ),
    request_body = SubmitAnswersRequest,
    responses(
        (status = 200, description = "Answers graded", body = SubmissionResult),
        (status = 400, description = "Quiz closed or time limit exceeded", body = ErrorResponse),
        (status = 401, description = "Join the quiz first", body = ErrorResponse),
        (status = 409, description = "Already submitted", body = ErrorResponse)
    )
)]
pub async fn submit_answers(
    State(state): State<AppState>,
    session: CurrentSession,
    Path(code): Path<String>,
    Json(request): Json<SubmitAnswersRequest>,
) -> Result<Json<SubmissionResult>, AppError> {
    state
        .live_quiz
        .submit(&code, participant_for(&session, &code), request)
        .map(Json)
}

/// Score, answer review and a personal performance analysis
#[utoipa::path(
    get,
    path = "/api/quiz/{code}/results",
    tag = "Student Quiz",
    params(
        ("code" = String, Path, description = "Quiz code")
    ),
    responses(
        (status = 200, description = "Participant results", body = ParticipantResults),
        (status = 400, description = "Answers not submitted yet", body = ErrorResponse),
        (status = 401, description = "Join the quiz first", body = ErrorResponse)
    )
)]
pub async fn quiz_results(
    State(state): State<AppState>,
    session: CurrentSession,
    Path(code): Path<String>,
) -> Result<Json<ParticipantResults>, AppError> {
    state
        .live_quiz
        .participant_results(&code, participant_for(&session, &code))
        .await
        .map(Json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::SessionData;
    use std::collections::HashMap;

    #[test]
    fn test_participant_lookup_ignores_code_case() {
        let session = CurrentSession {
            id: Some("abc".into()),
            data: SessionData {
                participants: HashMap::from([("QZ12AB".to_string(), 41)]),
                ..Default::default()
            },
        };

        assert_eq!(participant_for(&session, "qz12ab"), Some(41));
        assert_eq!(participant_for(&session, " QZ12AB "), Some(41));
        assert_eq!(participant_for(&session, "OTHER1"), None);
    }
}
