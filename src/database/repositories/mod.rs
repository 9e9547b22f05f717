/// Repository traits and their diesel implementations
///
/// - One trait per aggregate, object-safe so services hold `Arc<dyn Trait>`
/// - Each `*RepositoryImpl` pulls connections through a provider closure
/// - Traits are mockable in tests through `mockall::automock`

pub mod clickstream_repository;
pub mod course_repository;
pub mod feedback_repository;
pub mod live_quiz_repository;
pub mod participant_repository;
pub mod poll_repository;
pub mod progress_repository;
pub mod user_repository;

pub use clickstream_repository::{ClickstreamRepository, ClickstreamRepositoryImpl};
pub use course_repository::{CourseRepository, CourseRepositoryImpl};
pub use feedback_repository::{FeedbackRepository, FeedbackRepositoryImpl};
pub use live_quiz_repository::{LiveQuizRepository, LiveQuizRepositoryImpl};
pub use participant_repository::{ParticipantRepository, ParticipantRepositoryImpl, SubmissionRecord};
pub use poll_repository::{PollRepository, PollRepositoryImpl};
pub use progress_repository::{ProgressRepository, ProgressRepositoryImpl};
pub use user_repository::{UserRepository, UserRepositoryImpl};

#[cfg(test)]
pub use clickstream_repository::MockClickstreamRepository;
#[cfg(test)]
pub use course_repository::MockCourseRepository;
#[cfg(test)]
pub use feedback_repository::MockFeedbackRepository;
#[cfg(test)]
pub use live_quiz_repository::MockLiveQuizRepository;
#[cfg(test)]
pub use participant_repository::MockParticipantRepository;
#[cfg(test)]
pub use poll_repository::MockPollRepository;
#[cfg(test)]
pub use progress_repository::MockProgressRepository;
#[cfg(test)]
pub use user_repository::MockUserRepository;

use crate::database::connection::DatabasePool;
use std::sync::Arc;

/// Every repository wired to one connection pool
#[derive(Clone)]
pub struct Repositories {
    pub users: Arc<dyn UserRepository>,
    pub courses: Arc<dyn CourseRepository>,
    pub progress: Arc<dyn ProgressRepository>,
    pub clickstream: Arc<dyn ClickstreamRepository>,
    pub live_quizzes: Arc<dyn LiveQuizRepository>,
    pub participants: Arc<dyn ParticipantRepository>,
    pub polls: Arc<dyn PollRepository>,
    pub feedback: Arc<dyn FeedbackRepository>,
}

impl Repositories {
    pub fn from_pool(pool: &DatabasePool) -> Self {
        let provider = |pool: DatabasePool| move || pool.get_conn();

        Self {
            users: Arc::new(UserRepositoryImpl::new(provider(pool.clone()))),
            courses: Arc::new(CourseRepositoryImpl::new(provider(pool.clone()))),
            progress: Arc::new(ProgressRepositoryImpl::new(provider(pool.clone()))),
            clickstream: Arc::new(ClickstreamRepositoryImpl::new(provider(pool.clone()))),
            live_quizzes: Arc::new(LiveQuizRepositoryImpl::new(provider(pool.clone()))),
            participants: Arc::new(ParticipantRepositoryImpl::new(provider(pool.clone()))),
            polls: Arc::new(PollRepositoryImpl::new(provider(pool.clone()))),
            feedback: Arc::new(FeedbackRepositoryImpl::new(provider(pool.clone()))),
        }
    }
}
