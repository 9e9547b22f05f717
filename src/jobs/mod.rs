/// Cron jobs and scheduled tasks module
///
/// Contains background jobs that run on a schedule:
/// - Ending live quizzes whose time limit elapsed
/// - Sweeping idle sessions

pub mod quiz_expiry_job;
pub mod session_sweep_job;

pub use quiz_expiry_job::QuizExpiryJob;
pub use session_sweep_job::create_session_sweep_job;
