use axum::extract::FromRef;

use crate::auth::SessionStore;
use crate::clickstream::ClickstreamLogger;
use crate::config::AppConfig;
use crate::database::repositories::Repositories;
use crate::llm::LlmService;
use crate::services::{AuthService, FeedbackService, LearningService, LiveQuizService, PollService};
use crate::websocket::Broadcaster;

/// Shared application state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub sessions: SessionStore,
    pub logger: ClickstreamLogger,
    pub broadcaster: Broadcaster,
    pub auth: AuthService,
    pub learning: LearningService,
    pub live_quiz: LiveQuizService,
    pub polls: PollService,
    pub feedback: FeedbackService,
}

impl AppState {
    /// Wire services over the given repositories
    pub fn new(config: &AppConfig, repositories: Repositories, llm: LlmService) -> Self {
        let sessions = SessionStore::new(config.session_ttl_minutes);
        let broadcaster = Broadcaster::new();
        let logger = ClickstreamLogger::new(repositories.clickstream.clone());

        let auth = AuthService::new(
            repositories.users.clone(),
            repositories.live_quizzes.clone(),
            config.admin_username.clone(),
            config.admin_password.clone(),
        );

        let learning = LearningService::new(
            repositories.users.clone(),
            repositories.courses.clone(),
            repositories.progress.clone(),
            repositories.clickstream.clone(),
            logger.clone(),
        );

        let live_quiz = LiveQuizService::new(
            repositories.live_quizzes.clone(),
            repositories.participants.clone(),
            llm,
            broadcaster.clone(),
        );

        let polls = PollService::new(repositories.polls.clone(), broadcaster.clone());
        let feedback = FeedbackService::new(repositories.feedback.clone(), repositories.courses.clone());

        Self {
            sessions,
            logger,
            broadcaster,
            auth,
            learning,
            live_quiz,
            polls,
            feedback,
        }
    }
}

impl FromRef<AppState> for SessionStore {
    fn from_ref(state: &AppState) -> Self {
        state.sessions.clone()
    }
}

impl FromRef<AppState> for ClickstreamLogger {
    fn from_ref(state: &AppState) -> Self {
        state.logger.clone()
    }
}

impl FromRef<AppState> for Broadcaster {
    fn from_ref(state: &AppState) -> Self {
        state.broadcaster.clone()
    }
}
