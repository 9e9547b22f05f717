use chrono::Utc;
use tokio_cron_scheduler::{Job, JobScheduler};

use crate::auth::SessionStore;

/// Every ten minutes
pub const SESSION_SWEEP_SCHEDULE: &str = "0 */10 * * * *";

/// Register a job that drops sessions idle past their TTL
pub async fn create_session_sweep_job(
    sessions: SessionStore,
    scheduler: &JobScheduler,
) -> Result<(), Box<dyn std::error::Error>> {
    let job = Job::new_async(SESSION_SWEEP_SCHEDULE, move |_uuid, _lock| {
        let sessions = sessions.clone();

        Box::pin(async move {
            let removed = sessions.sweep_expired(Utc::now());
            if removed > 0 {
                tracing::debug!(removed, remaining = sessions.len(), "Expired sessions swept");
            }
        })
    })?;

    scheduler.add(job).await?;

    tracing::info!("Session sweep job registered");

    Ok(())
}
