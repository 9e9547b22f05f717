use chrono::Utc;
use tokio_cron_scheduler::{Job, JobScheduler};

use crate::error::AppError;
use crate::services::LiveQuizService;

/// Quiz expiry job
///
/// Ends live quizzes whose time limit has elapsed and refreshes their analytics
pub struct QuizExpiryJob {
    live_quizzes: LiveQuizService,
    schedule: String,
}

impl QuizExpiryJob {
    pub fn new(live_quizzes: LiveQuizService, schedule: impl Into<String>) -> Self {
        Self {
            live_quizzes,
            schedule: schedule.into(),
        }
    }

    fn end_expired(&self) -> Result<usize, AppError> {
        let ended = self.live_quizzes.end_expired_quizzes(Utc::now())?;
        if ended > 0 {
            tracing::info!("Quiz expiry job ended {} quiz(zes)", ended);
        }
        Ok(ended)
    }

    /// Register this job with the scheduler
    pub async fn register(self, scheduler: &JobScheduler) -> Result<(), Box<dyn std::error::Error>> {
        let schedule = self.schedule.clone();
        let live_quizzes = self.live_quizzes.clone();

        let job = Job::new_async(schedule.as_str(), move |_uuid, _lock| {
            let live_quizzes = live_quizzes.clone();

            Box::pin(async move {
                let job = QuizExpiryJob {
                    live_quizzes,
                    schedule: String::new(),
                };

                if let Err(e) = job.end_expired() {
                    tracing::error!("Quiz expiry job failed: {}", e);
                }
            })
        })?;

        scheduler.add(job).await?;

        tracing::info!("Quiz expiry job registered (schedule: {})", schedule);

        Ok(())
    }

    /// Run the expiry pass immediately
    pub fn run_now(&self) -> Result<usize, AppError> {
        self.end_expired()
    }
}
