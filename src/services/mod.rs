/// Application services
///
/// Each service owns the rules of one area and talks to storage only through
/// repository traits, so handlers stay thin and the rules are testable with mocks.

pub mod analytics;
pub mod auth;
pub mod codes;
pub mod feedback;
pub mod learning;
pub mod live_quiz;
pub mod polls;
pub mod validation;

pub use analytics::{compute_quiz_analytics, QuizAnalyticsReport};
pub use auth::AuthService;
pub use feedback::FeedbackService;
pub use learning::LearningService;
pub use live_quiz::LiveQuizService;
pub use polls::PollService;
