use axum::{
    middleware,
    routing::{delete, get, patch, post, put},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::clickstream::track_page_views;
use crate::websocket::websocket_handler;

use super::openapi::ApiDoc;
use super::state::AppState;
use super::{
    admin_handlers, auth_handlers, feedback_handlers, learning_handlers, live_quiz_handlers,
    poll_handlers, quiz_handlers,
};

/// Create the API router with Swagger UI and WebSocket support
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // WebSocket endpoint
        .route("/ws", get(websocket_handler))
        .route("/health", get(auth_handlers::health_check))
        // Sessions
        .route("/api/auth/register", post(auth_handlers::register))
        .route("/api/auth/login", post(auth_handlers::login))
        .route("/api/auth/logout", post(auth_handlers::logout))
        .route("/api/auth/admin-login", post(auth_handlers::admin_login))
        .route("/api/auth/teacher-login", post(auth_handlers::teacher_login))
        .route("/api/auth/me", get(auth_handlers::me))
        // Courses and learner progress
        .route("/api/home", get(learning_handlers::home))
        .route("/api/dashboard", get(learning_handlers::dashboard))
        .route("/api/courses/:course_id", get(learning_handlers::course_detail))
        .route("/api/contents/:content_id", get(learning_handlers::content_detail))
        .route(
            "/api/contents/:content_id/submit-quiz",
            post(learning_handlers::submit_quiz),
        )
        .route(
            "/api/contents/:content_id/mark-read",
            post(learning_handlers::mark_content_read),
        )
        .route("/api/track-video", post(learning_handlers::track_video))
        // Admin
        .route("/api/admin/analytics", get(admin_handlers::admin_analytics))
        .route("/api/admin/courses", post(admin_handlers::create_course))
        .route(
            "/api/admin/courses/:course_id/contents",
            post(admin_handlers::create_content),
        )
        .route(
            "/api/admin/contents/:content_id/quiz",
            post(admin_handlers::attach_quiz),
        )
        // Teacher live quizzes
        .route(
            "/api/teacher/quizzes",
            get(live_quiz_handlers::list_quizzes).post(live_quiz_handlers::create_quiz),
        )
        .route("/api/teacher/quizzes/:quiz_id", get(live_quiz_handlers::get_quiz))
        .route(
            "/api/teacher/quizzes/:quiz_id/questions",
            post(live_quiz_handlers::add_question),
        )
        .route(
            "/api/teacher/quizzes/:quiz_id/questions/generate",
            post(live_quiz_handlers::generate_questions),
        )
        .route("/api/teacher/quizzes/:quiz_id/start", post(live_quiz_handlers::start_quiz))
        .route("/api/teacher/quizzes/:quiz_id/end", post(live_quiz_handlers::end_quiz))
        .route("/api/teacher/quizzes/:quiz_id/results", get(live_quiz_handlers::quiz_results))
        .route(
            "/api/teacher/quizzes/:quiz_id/analytics",
            get(live_quiz_handlers::quiz_analytics),
        )
        .route(
            "/api/teacher/quizzes/:quiz_id/insights",
            get(live_quiz_handlers::quiz_insights),
        )
        .route(
            "/api/teacher/quizzes/:quiz_id/word-cloud",
            get(live_quiz_handlers::quiz_word_cloud),
        )
        .route(
            "/api/teacher/questions/:question_id",
            put(live_quiz_handlers::update_question).delete(live_quiz_handlers::delete_question),
        )
        .route(
            "/api/teacher/questions/:question_id/approve",
            post(live_quiz_handlers::approve_question),
        )
        .route(
            "/api/teacher/questions/:question_id/reject",
            post(live_quiz_handlers::reject_question),
        )
        .route(
            "/api/teacher/participants/:participant_id/help",
            get(live_quiz_handlers::participant_help),
        )
        // Students in a live quiz
        .route("/api/quiz/join", post(quiz_handlers::join_quiz))
        .route("/api/quiz/:code/questions", get(quiz_handlers::quiz_questions))
        .route("/api/quiz/:code/submit", post(quiz_handlers::submit_answers))
        .route("/api/quiz/:code/results", get(quiz_handlers::quiz_results))
        // Polls
        .route(
            "/api/teacher/polls",
            get(poll_handlers::list_polls).post(poll_handlers::create_poll),
        )
        .route(
            "/api/teacher/polls/:poll_id",
            delete(poll_handlers::delete_poll),
        )
        .route("/api/teacher/polls/:poll_id/close", post(poll_handlers::close_poll))
        .route("/api/teacher/polls/:poll_id/results", get(poll_handlers::poll_results))
        .route("/api/polls/:code", get(poll_handlers::get_poll))
        .route("/api/polls/:code/respond", post(poll_handlers::respond_to_poll))
        // Feedback and doubts
        .route("/api/feedback", post(feedback_handlers::submit_feedback))
        .route(
            "/api/courses/:course_id/feedback",
            get(feedback_handlers::course_feedback),
        )
        .route("/api/doubts", post(feedback_handlers::raise_doubt))
        .route("/api/courses/:course_id/doubts", get(feedback_handlers::course_doubts))
        .route(
            "/api/doubts/:doubt_id",
            patch(feedback_handlers::update_doubt),
        )
        .layer(middleware::from_fn_with_state(
            state.clone(),
            track_page_views::<AppState>,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer())
        .with_state(state)
}

/// Permissive CORS for browser clients on other origins
fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
}
