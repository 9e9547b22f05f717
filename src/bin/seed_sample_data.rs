//! Seed the database with the sample course and a test learner.
//!
//! Safe to run repeatedly: existing rows are looked up by title or username
//! and left untouched.

use classroom_quiz_api::clickstream::ClickstreamLogger;
use classroom_quiz_api::database::enums::{AnswerChoice, ContentType};
use classroom_quiz_api::database::models::{Content, Course, NewCourse};
use classroom_quiz_api::database::repositories::Repositories;
use classroom_quiz_api::database::{establish_connection_pool, run_migrations};
use classroom_quiz_api::services::learning::{ContentDraft, CourseQuizDraft};
use classroom_quiz_api::services::{AuthService, LearningService};
use classroom_quiz_api::{AppConfig, AppError};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const COURSE_TITLE: &str = "Web Development Fundamentals";

const COURSE_DESCRIPTION: &str = "Learn the basics of web development including HTML, CSS, and JavaScript. This course covers fundamental concepts needed to build modern web applications.";

const HTML_LESSON: &str = "HTML (HyperText Markup Language) is the standard markup language for creating web pages. It describes the structure of a web page using markup elements.

Key HTML concepts:
- Elements and tags
- Attributes
- Document structure
- Semantic HTML

HTML forms the backbone of all web pages. Understanding HTML is essential for web development.

Practice exercises:
1. Create a basic HTML page
2. Use different heading levels
3. Add paragraphs and links
4. Create lists and tables

Remember: HTML provides structure, CSS provides styling, and JavaScript provides interactivity.";

const SAMPLE_VIDEO_URL: &str =
    "https://commondatastorage.googleapis.com/gtv-videos-bucket/sample/BigBuckBunny.mp4";

const TEST_USERNAME: &str = "testuser";
const TEST_PASSWORD: &str = "testpass123";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "classroom_quiz_api=info,seed_sample_data=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env()?;
    let pool = establish_connection_pool(&config.database_url, 2)?;
    run_migrations(&pool)?;

    let repositories = Repositories::from_pool(&pool);
    let learning = LearningService::new(
        repositories.users.clone(),
        repositories.courses.clone(),
        repositories.progress.clone(),
        repositories.clickstream.clone(),
        ClickstreamLogger::new(repositories.clickstream.clone()),
    );
    let auth = AuthService::new(
        repositories.users.clone(),
        repositories.live_quizzes.clone(),
        config.admin_username.clone(),
        config.admin_password.clone(),
    );

    tracing::info!("Creating sample data...");

    let course = match repositories
        .courses
        .list_courses()?
        .into_iter()
        .find(|c| c.title == COURSE_TITLE)
    {
        Some(course) => course,
        None => learning.create_course(NewCourse {
            title: COURSE_TITLE.to_string(),
            description: COURSE_DESCRIPTION.to_string(),
        })?,
    };

    seed_content(
        &learning,
        &repositories,
        &course,
        ContentDraft {
            title: "Introduction to HTML".to_string(),
            content_type: ContentType::Text,
            text_content: Some(HTML_LESSON.to_string()),
            video_url: None,
            video_duration: 0,
            order: Some(1),
        },
    )?;

    seed_content(
        &learning,
        &repositories,
        &course,
        ContentDraft {
            title: "CSS Styling Basics Video".to_string(),
            content_type: ContentType::Video,
            text_content: None,
            video_url: Some(SAMPLE_VIDEO_URL.to_string()),
            video_duration: 120,
            order: Some(2),
        },
    )?;

    let quiz_content = seed_content(
        &learning,
        &repositories,
        &course,
        ContentDraft {
            title: "HTML Knowledge Check".to_string(),
            content_type: ContentType::Quiz,
            text_content: None,
            video_url: None,
            video_duration: 0,
            order: Some(3),
        },
    )?;

    if repositories.courses.quiz_for_content(quiz_content.id)?.is_none() {
        learning.attach_quiz(
            quiz_content.id,
            CourseQuizDraft {
                question: "What does HTML stand for?".to_string(),
                option_a: "HyperText Markup Language".to_string(),
                option_b: "High Tech Modern Language".to_string(),
                option_c: "Home Tool Markup Language".to_string(),
                option_d: "Hyperlink and Text Markup Language".to_string(),
                correct_answer: AnswerChoice::A,
            },
        )?;
    }

    if repositories.users.find_by_username(TEST_USERNAME)?.is_none() {
        auth.register(TEST_USERNAME, "test@example.com", TEST_PASSWORD)?;
        tracing::info!("Created test user: {} / {}", TEST_USERNAME, TEST_PASSWORD);
    }

    tracing::info!(
        "Sample data ready: {} course(s), {} content item(s), {} user(s)",
        repositories.courses.list_courses()?.len(),
        repositories.courses.count_contents()?,
        repositories.users.count()?,
    );
    tracing::info!("Analytics admin user: {}", config.admin_username);

    Ok(())
}

/// Find content by title within the course, creating it when missing
fn seed_content(
    learning: &LearningService,
    repositories: &Repositories,
    course: &Course,
    draft: ContentDraft,
) -> Result<Content, AppError> {
    let existing = repositories
        .courses
        .contents_for_course(course.id)?
        .into_iter()
        .find(|c| c.title == draft.title);

    match existing {
        Some(content) => Ok(content),
        None => learning.create_content(course.id, draft),
    }
}
