use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::auth::RequireTeacher;
use crate::database::enums::ApprovalStatus;
use crate::database::models::{LiveQuiz, QuizAnalytics, QuizQuestion};
use crate::error::AppError;
use crate::services::live_quiz::{
    CreateQuizRequest, GenerateQuestionsRequest, PersonalizedHelp, QuestionDraft, QuestionEdit,
    QuestionWordCloud, QuizDetail, QuizInsights, TeacherResults,
};

use super::responses::{ErrorResponse, MessageResponse};
use super::state::AppState;

// ============================================================================
// Quizzes
// ============================================================================

/// Quizzes owned by the logged-in teacher, newest first
#[utoipa::path(
    get,
    path = "/api/teacher/quizzes",
    tag = "Teacher Quizzes",
    responses(
        (status = 200, description = "Teacher's quizzes", body = Vec<LiveQuiz>),
        (status = 401, description = "Teacher login required", body = ErrorResponse)
    )
)]
pub async fn list_quizzes(
    State(state): State<AppState>,
    teacher: RequireTeacher,
) -> Result<Json<Vec<LiveQuiz>>, AppError> {
    state.live_quiz.list_quizzes(teacher.teacher_id).map(Json)
}

#[utoipa::path(
    post,
    path = "/api/teacher/quizzes",
    tag = "Teacher Quizzes",
    request_body = CreateQuizRequest,
    responses(
        (status = 201, description = "Draft quiz created", body = LiveQuiz),
        (status = 400, description = "Invalid quiz", body = ErrorResponse),
        (status = 401, description = "Teacher login required", body = ErrorResponse)
    )
)]
pub async fn create_quiz(
    State(state): State<AppState>,
    teacher: RequireTeacher,
    Json(request): Json<CreateQuizRequest>,
) -> Result<(StatusCode, Json<LiveQuiz>), AppError> {
    let quiz = state.live_quiz.create_quiz(teacher.teacher_id, request)?;
    Ok((StatusCode::CREATED, Json(quiz)))
}

#[utoipa::path(
    get,
    path = "/api/teacher/quizzes/{quiz_id}",
    tag = "Teacher Quizzes",
    params(
        ("quiz_id" = i64, Path, description = "Quiz ID")
    ),
    responses(
        (status = 200, description = "Quiz with all of its questions", body = QuizDetail),
        (status = 403, description = "Quiz belongs to another teacher", body = ErrorResponse),
        (status = 404, description = "Quiz not found", body = ErrorResponse)
    )
)]
pub async fn get_quiz(
    State(state): State<AppState>,
    teacher: RequireTeacher,
    Path(quiz_id): Path<i64>,
) -> Result<Json<QuizDetail>, AppError> {
    state.live_quiz.quiz_detail(teacher.teacher_id, quiz_id).map(Json)
}

#[utoipa::path(
    post,
    path = "/api/teacher/quizzes/{quiz_id}/start",
    tag = "Teacher Quizzes",
    params(
        ("quiz_id" = i64, Path, description = "Quiz ID")
    ),
    responses(
        (status = 200, description = "Quiz is live", body = LiveQuiz),
        (status = 400, description = "Quiz is not a draft or has no approved questions", body = ErrorResponse),
        (status = 403, description = "Quiz belongs to another teacher", body = ErrorResponse)
    )
)]
pub async fn start_quiz(
    State(state): State<AppState>,
    teacher: RequireTeacher,
    Path(quiz_id): Path<i64>,
) -> Result<Json<LiveQuiz>, AppError> {
    state.live_quiz.start_quiz(teacher.teacher_id, quiz_id).map(Json)
}

#[utoipa::path(
    post,
    path = "/api/teacher/quizzes/{quiz_id}/end",
    tag = "Teacher Quizzes",
    params(
        ("quiz_id" = i64, Path, description = "Quiz ID")
    ),
    responses(
        (status = 200, description = "Quiz ended", body = LiveQuiz),
        (status = 400, description = "Quiz is not active", body = ErrorResponse),
        (status = 403, description = "Quiz belongs to another teacher", body = ErrorResponse)
    )
)]
pub async fn end_quiz(
    State(state): State<AppState>,
    teacher: RequireTeacher,
    Path(quiz_id): Path<i64>,
) -> Result<Json<LiveQuiz>, AppError> {
    state.live_quiz.end_quiz(teacher.teacher_id, quiz_id).map(Json)
}

// ============================================================================
// Questions
// ============================================================================

/// Add a question by hand; it is approved immediately
#[utoipa::path(
    post,
    path = "/api/teacher/quizzes/{quiz_id}/questions",
    tag = "Teacher Questions",
    params(
        ("quiz_id" = i64, Path, description = "Quiz ID")
    ),
    request_body = QuestionDraft,
    responses(
        (status = 201, description = "Question added", body = QuizQuestion),
        (status = 400, description = "Invalid question", body = ErrorResponse),
        (status = 403, description = "Quiz belongs to another teacher", body = ErrorResponse)
    )
)]
pub async fn add_question(
    State(state): State<AppState>,
    teacher: RequireTeacher,
    Path(quiz_id): Path<i64>,
    Json(draft): Json<QuestionDraft>,
) -> Result<(StatusCode, Json<QuizQuestion>), AppError> {
    let question = state.live_quiz.add_question(teacher.teacher_id, quiz_id, draft)?;
    Ok((StatusCode::CREATED, Json(question)))
}

/// Generate pending questions from source text
#[utoipa::path(
    post,
    path = "/api/teacher/quizzes/{quiz_id}/questions/generate",
    tag = "Teacher Questions",
    params(
        ("quiz_id" = i64, Path, description = "Quiz ID")
    ),
    request_body = GenerateQuestionsRequest,
    responses(
        (status = 201, description = "Questions awaiting approval", body = Vec<QuizQuestion>),
        (status = 400, description = "Empty text or bad question count", body = ErrorResponse),
        (status = 403, description = "Quiz belongs to another teacher", body = ErrorResponse)
    )
)]
pub async fn generate_questions(
    State(state): State<AppState>,
    teacher: RequireTeacher,
    Path(quiz_id): Path<i64>,
    Json(request): Json<GenerateQuestionsRequest>,
) -> Result<(StatusCode, Json<Vec<QuizQuestion>>), AppError> {
    let questions = state
        .live_quiz
        .generate_questions(teacher.teacher_id, quiz_id, request)
        .await?;
    Ok((StatusCode::CREATED, Json(questions)))
}

#[utoipa::path(
    put,
    path = "/api/teacher/questions/{question_id}",
    tag = "Teacher Questions",
    params(
        ("question_id" = i64, Path, description = "Question ID")
    ),
    request_body = QuestionEdit,
    responses(
        (status = 200, description = "Question updated", body = QuizQuestion),
        (status = 400, description = "Invalid edit", body = ErrorResponse),
        (status = 403, description = "Question belongs to another teacher", body = ErrorResponse),
        (status = 404, description = "Question not found", body = ErrorResponse)
    )
)]
pub async fn update_question(
    State(state): State<AppState>,
    teacher: RequireTeacher,
    Path(question_id): Path<i64>,
    Json(edit): Json<QuestionEdit>,
) -> Result<Json<QuizQuestion>, AppError> {
    state
        .live_quiz
        .edit_question(teacher.teacher_id, question_id, edit)
        .map(Json)
}

#[utoipa::path(
    post,
    path = "/api/teacher/questions/{question_id}/approve",
    tag = "Teacher Questions",
    params(
        ("question_id" = i64, Path, description = "Question ID")
    ),
    responses(
        (status = 200, description = "Question approved", body = QuizQuestion),
        (status = 403, description = "Question belongs to another teacher", body = ErrorResponse),
        (status = 404, description = "Question not found", body = ErrorResponse)
    )
)]
pub async fn approve_question(
    State(state): State<AppState>,
    teacher: RequireTeacher,
    Path(question_id): Path<i64>,
) -> Result<Json<QuizQuestion>, AppError> {
    state
        .live_quiz
        .set_approval(teacher.teacher_id, question_id, ApprovalStatus::Approved)
        .map(Json)
}

#[utoipa::path(
    post,
    path = "/api/teacher/questions/{question_id}/reject",
    tag = "Teacher Questions",
    params(
        ("question_id" = i64, Path, description = "Question ID")
    ),
    responses(
        (status = 200, description = "Question rejected", body = QuizQuestion),
        (status = 403, description = "Question belongs to another teacher", body = ErrorResponse),
        (status = 404, description = "Question not found", body = ErrorResponse)
    )
)]
pub async fn reject_question(
    State(state): State<AppState>,
    teacher: RequireTeacher,
    Path(question_id): Path<i64>,
) -> Result<Json<QuizQuestion>, AppError> {
    state
        .live_quiz
        .set_approval(teacher.teacher_id, question_id, ApprovalStatus::Rejected)
        .map(Json)
}

#[utoipa::path(
    delete,
    path = "/api/teacher/questions/{question_id}",
    tag = "Teacher Questions",
    params(
        ("question_id" = i64, Path, description = "Question ID")
    ),
    responses(
        (status = 200, description = "Question deleted", body = MessageResponse),
        (status = 403, description = "Question belongs to another teacher", body = ErrorResponse),
        (status = 404, description = "Question not found", body = ErrorResponse)
    )
)]
pub async fn delete_question(
    State(state): State<AppState>,
    teacher: RequireTeacher,
    Path(question_id): Path<i64>,
) -> Result<Json<MessageResponse>, AppError> {
    state.live_quiz.delete_question(teacher.teacher_id, question_id)?;
    Ok(Json(MessageResponse::new("Question deleted")))
}

// ============================================================================
// Results and insights
// ============================================================================

#[utoipa::path(
    get,
    path = "/api/teacher/quizzes/{quiz_id}/results",
    tag = "Teacher Reports",
    params(
        ("quiz_id" = i64, Path, description = "Quiz ID")
    ),
    responses(
        (status = 200, description = "Participants and their scores", body = TeacherResults),
        (status = 403, description = "Quiz belongs to another teacher", body = ErrorResponse)
    )
)]
pub async fn quiz_results(
    State(state): State<AppState>,
    teacher: RequireTeacher,
    Path(quiz_id): Path<i64>,
) -> Result<Json<TeacherResults>, AppError> {
    state.live_quiz.teacher_results(teacher.teacher_id, quiz_id).map(Json)
}

/// Recomputed class analytics
#[utoipa::path(
    get,
    path = "/api/teacher/quizzes/{quiz_id}/analytics",
    tag = "Teacher Reports",
    params(
        ("quiz_id" = i64, Path, description = "Quiz ID")
    ),
    responses(
        (status = 200, description = "Quiz analytics", body = QuizAnalytics),
        (status = 403, description = "Quiz belongs to another teacher", body = ErrorResponse)
    )
)]
pub async fn quiz_analytics(
    State(state): State<AppState>,
    teacher: RequireTeacher,
    Path(quiz_id): Path<i64>,
) -> Result<Json<QuizAnalytics>, AppError> {
    state.live_quiz.quiz_analytics(teacher.teacher_id, quiz_id).map(Json)
}

/// Mistake analysis and remedial content for the class
#[utoipa::path(
    get,
    path = "/api/teacher/quizzes/{quiz_id}/insights",
    tag = "Teacher Reports",
    params(
        ("quiz_id" = i64, Path, description = "Quiz ID")
    ),
    responses(
        (status = 200, description = "Teaching insights", body = QuizInsights),
        (status = 403, description = "Quiz belongs to another teacher", body = ErrorResponse)
    )
)]
pub async fn quiz_insights(
    State(state): State<AppState>,
    teacher: RequireTeacher,
    Path(quiz_id): Path<i64>,
) -> Result<Json<QuizInsights>, AppError> {
    state.live_quiz.insights(teacher.teacher_id, quiz_id).await.map(Json)
}

/// Keywords of the subjective answers, per question
#[utoipa::path(
    get,
    path = "/api/teacher/quizzes/{quiz_id}/word-cloud",
    tag = "Teacher Reports",
    params(
        ("quiz_id" = i64, Path, description = "Quiz ID")
    ),
    responses(
        (status = 200, description = "Word clouds", body = Vec<QuestionWordCloud>),
        (status = 403, description = "Quiz belongs to another teacher", body = ErrorResponse)
    )
)]
pub async fn quiz_word_cloud(
    State(state): State<AppState>,
    teacher: RequireTeacher,
    Path(quiz_id): Path<i64>,
) -> Result<Json<Vec<QuestionWordCloud>>, AppError> {
    state.live_quiz.word_cloud(teacher.teacher_id, quiz_id).await.map(Json)
}

#[utoipa::path(
    get,
    path = "/api/teacher/participants/{participant_id}/help",
    tag = "Teacher Reports",
    params(
        ("participant_id" = i64, Path, description = "Participant ID")
    ),
    responses(
        (status = 200, description = "Personalized help text", body = PersonalizedHelp),
        (status = 403, description = "Participant belongs to another teacher's quiz", body = ErrorResponse),
        (status = 404, description = "Participant not found", body = ErrorResponse)
    )
)]
pub async fn participant_help(
    State(state): State<AppState>,
    teacher: RequireTeacher,
    Path(participant_id): Path<i64>,
) -> Result<Json<PersonalizedHelp>, AppError> {
    state
        .live_quiz
        .personalized_help(teacher.teacher_id, participant_id)
        .await
        .map(Json)
}
