use classroom_quiz_api::auth::SessionStore;
use classroom_quiz_api::database::repositories::Repositories;
use classroom_quiz_api::database::{establish_connection_pool, run_migrations};
use classroom_quiz_api::jobs::{create_session_sweep_job, QuizExpiryJob};
use classroom_quiz_api::llm::LlmService;
use classroom_quiz_api::services::LiveQuizService;
use classroom_quiz_api::{create_router, AppConfig, AppState};
use std::net::SocketAddr;
use tokio_cron_scheduler::JobScheduler;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables from .env file (if present)
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "classroom_quiz_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env()?;

    tracing::info!("🗄️  Initializing PostgreSQL connection...");
    let pool = establish_connection_pool(&config.database_url, config.db_pool_max_size)?;

    if config.run_migrations {
        let applied = run_migrations(&pool)?;
        tracing::info!("✅ Migrations up to date ({} applied)", applied);
    }

    if config.llm.api_key.is_none() {
        tracing::warn!("⚠️  GROQ_API_KEY is not set, question generation and analyses use fallback templates");
    }

    let repositories = Repositories::from_pool(&pool);
    let llm = LlmService::from_config(&config.llm);
    let state = AppState::new(&config, repositories, llm);

    // Keep the scheduler alive for the lifetime of the server
    let _scheduler =
        initialize_cron_scheduler(&config, state.live_quiz.clone(), state.sessions.clone()).await;

    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    let addr = listener.local_addr()?;

    tracing::info!("🚀 Classroom Quiz API running on http://{}", addr);
    tracing::info!("📊 Health check: http://{}/health", addr);
    tracing::info!("📚 Swagger UI: http://{}/swagger-ui", addr);
    tracing::info!("🔌 WebSocket: ws://{}/ws", addr);
    tracing::info!(r#"   {{"action":"subscribe","channel":"quiz","code":"ABC123"}}"#);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}

/// Start the cron scheduler with the quiz expiry and session sweep jobs.
///
/// Failures are logged; the server runs without background jobs.
async fn initialize_cron_scheduler(
    config: &AppConfig,
    live_quiz: LiveQuizService,
    sessions: SessionStore,
) -> Option<JobScheduler> {
    tracing::info!("⏰ Initializing cron scheduler...");

    let scheduler = match JobScheduler::new().await {
        Ok(scheduler) => scheduler,
        Err(e) => {
            tracing::error!("❌ Failed to create cron scheduler: {}", e);
            return None;
        }
    };

    let expiry_job = QuizExpiryJob::new(live_quiz, config.quiz_expiry_cron.clone());

    // Close anything that expired while the server was down
    match expiry_job.run_now() {
        Ok(ended) if ended > 0 => tracing::info!("Ended {} expired quiz(zes) at startup", ended),
        Ok(_) => {}
        Err(e) => tracing::warn!("Startup quiz expiry pass failed: {}", e),
    }

    if let Err(e) = expiry_job.register(&scheduler).await {
        tracing::error!("❌ Failed to register quiz expiry job: {}", e);
        return None;
    }

    if let Err(e) = create_session_sweep_job(sessions, &scheduler).await {
        tracing::error!("❌ Failed to register session sweep job: {}", e);
        return None;
    }

    if let Err(e) = scheduler.start().await {
        tracing::error!("❌ Failed to start cron scheduler: {}", e);
        return None;
    }

    tracing::info!("✅ Cron scheduler started successfully");
    tracing::info!("   • Quiz expiry: {}", config.quiz_expiry_cron);
    tracing::info!("   • Session sweep: every 10 minutes");

    Some(scheduler)
}
