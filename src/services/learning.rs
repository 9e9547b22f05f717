//! Courses, content delivery and learner progress

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use utoipa::ToSchema;

use crate::clickstream::{ClickstreamLogger, RequestContext};
use crate::database::enums::{AnswerChoice, ContentType, EventName};
use crate::database::models::{
    ClickstreamEvent, Content, Course, CourseQuiz, NewContent, NewCourse, NewCourseQuiz,
    UserProgress,
};
use crate::database::repositories::{
    ClickstreamRepository, CourseRepository, ProgressRepository, UserRepository,
};
use crate::error::AppError;

use super::validation::{
    validate_length, validate_optional_length, COURSE_QUIZ_OPTION_MAX, TITLE_MAX, VIDEO_URL_MAX,
};

/// Events listed on the admin analytics page
pub const RECENT_EVENT_LIMIT: i64 = 100;

#[derive(Debug, Serialize, ToSchema)]
pub struct HomeView {
    pub courses: Vec<Course>,
    pub logged_in: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DashboardView {
    pub courses: Vec<Course>,
    pub user_progress: Vec<UserProgress>,
    pub total_content: i64,
    pub completed_content: i64,
    /// Completed share of all content, rounded to two decimals
    pub progress_percentage: f64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CourseDetailView {
    pub course: Course,
    pub contents: Vec<Content>,
    /// Progress rows keyed by content id
    pub progress: BTreeMap<i64, UserProgress>,
}

/// A course quiz as shown to learners, without the answer
#[derive(Debug, Serialize, ToSchema)]
pub struct QuizPayload {
    pub id: i64,
    pub question: String,
    pub option_a: String,
    pub option_b: String,
    pub option_c: String,
    pub option_d: String,
}

impl From<CourseQuiz> for QuizPayload {
    fn from(quiz: CourseQuiz) -> Self {
        Self {
            id: quiz.id,
            question: quiz.question,
            option_a: quiz.option_a,
            option_b: quiz.option_b,
            option_c: quiz.option_c,
            option_d: quiz.option_d,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ContentView {
    pub content: Content,
    pub user_progress: UserProgress,
    pub quiz: Option<QuizPayload>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct QuizSubmitResult {
    pub success: bool,
    pub correct: bool,
    pub score: i32,
    pub correct_answer: AnswerChoice,
}

/// `{success, message}` or `{success: false, error}` body
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct ActionResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ActionResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            error: None,
        }
    }

    pub fn done() -> Self {
        Self {
            success: true,
            message: None,
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            message: None,
            error: Some(error.into()),
        }
    }
}

/// Player event reported by the video tracker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VideoEvent {
    Play,
    Pause,
    Complete,
}

impl VideoEvent {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "play" => Some(VideoEvent::Play),
            "pause" => Some(VideoEvent::Pause),
            "complete" => Some(VideoEvent::Complete),
            _ => None,
        }
    }

    fn event_name(&self) -> EventName {
        match self {
            VideoEvent::Play => EventName::VideoPlay,
            VideoEvent::Pause => EventName::VideoPause,
            VideoEvent::Complete => EventName::VideoComplete,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AdminAnalyticsView {
    pub recent_events: Vec<ClickstreamEvent>,
    pub total_users: i64,
    pub total_events: i64,
    pub total_content: i64,
    /// Completed progress rows across all users
    pub user_progress_stats: i64,
    pub event_counts: BTreeMap<String, i64>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ContentDraft {
    pub title: String,
    pub content_type: ContentType,
    pub text_content: Option<String>,
    pub video_url: Option<String>,
    /// Seconds
    #[serde(default)]
    pub video_duration: i32,
    /// Appended after existing content when omitted
    pub order: Option<i32>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CourseQuizDraft {
    pub question: String,
    pub option_a: String,
    pub option_b: String,
    pub option_c: String,
    pub option_d: String,
    pub correct_answer: AnswerChoice,
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Share of content completed, rounded to two decimals, 0 without content
pub fn progress_percentage(completed: i64, total: i64) -> f64 {
    if total > 0 {
        round2(completed as f64 / total as f64 * 100.0)
    } else {
        0.0
    }
}

#[derive(Clone)]
pub struct LearningService {
    users: Arc<dyn UserRepository>,
    courses: Arc<dyn CourseRepository>,
    progress: Arc<dyn ProgressRepository>,
    clickstream: Arc<dyn ClickstreamRepository>,
    logger: ClickstreamLogger,
}

impl LearningService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        courses: Arc<dyn CourseRepository>,
        progress: Arc<dyn ProgressRepository>,
        clickstream: Arc<dyn ClickstreamRepository>,
        logger: ClickstreamLogger,
    ) -> Self {
        Self {
            users,
            courses,
            progress,
            clickstream,
            logger,
        }
    }

    fn content_or_404(&self, content_id: i64) -> Result<Content, AppError> {
        self.courses
            .find_content(content_id)?
            .ok_or_else(|| AppError::not_found(format!("Content {} not found", content_id)))
    }

    fn quiz_or_404(&self, content_id: i64) -> Result<CourseQuiz, AppError> {
        self.courses
            .quiz_for_content(content_id)?
            .ok_or_else(|| AppError::not_found(format!("No quiz for content {}", content_id)))
    }

    pub fn home(&self, ctx: &RequestContext) -> Result<HomeView, AppError> {
        let logged_in = ctx.user_id.is_some();
        if !logged_in {
            self.logger.log(
                ctx,
                EventName::PageView,
                "Homepage",
                "User viewed the homepage",
                None,
            );
        }

        Ok(HomeView {
            courses: self.courses.list_courses()?,
            logged_in,
        })
    }

    pub fn dashboard(&self, user_id: i64, ctx: &RequestContext) -> Result<DashboardView, AppError> {
        let courses = self.courses.list_courses()?;
        let user_progress = self.progress.for_user(user_id)?;
        let total_content = self.courses.count_contents()?;
        let completed_content = user_progress.iter().filter(|p| p.completed).count() as i64;

        self.logger.log(
            ctx,
            EventName::PageView,
            "Dashboard",
            "User viewed the dashboard",
            Some(user_id),
        );

        Ok(DashboardView {
            courses,
            user_progress,
            total_content,
            completed_content,
            progress_percentage: progress_percentage(completed_content, total_content),
        })
    }

    pub fn course_detail(
        &self,
        user_id: i64,
        course_id: i64,
        ctx: &RequestContext,
    ) -> Result<CourseDetailView, AppError> {
        let course = self
            .courses
            .find_course(course_id)?
            .ok_or_else(|| AppError::not_found(format!("Course {} not found", course_id)))?;

        let contents = self.courses.contents_for_course(course_id)?;
        let progress = self
            .progress
            .for_user_in_course(user_id, course_id)?
            .into_iter()
            .map(|p| (p.content_id, p))
            .collect();

        self.logger.log(
            ctx,
            EventName::PageView,
            "Course Detail",
            format!("User viewed course: {}", course.title),
            Some(user_id),
        );

        Ok(CourseDetailView {
            course,
            contents,
            progress,
        })
    }

    pub fn content_view(
        &self,
        user_id: i64,
        content_id: i64,
        ctx: &RequestContext,
    ) -> Result<ContentView, AppError> {
        let content = self.content_or_404(content_id)?;
        let user_progress = self.progress.get_or_create(user_id, content_id)?;

        let quiz = match content.content_type {
            ContentType::Quiz => Some(QuizPayload::from(self.quiz_or_404(content_id)?)),
            _ => None,
        };

        let kind = content.content_type.as_str();
        self.logger.log(
            ctx,
            EventName::PageView,
            &format!("{} Content", content.content_type.label()),
            format!("User {} viewed {}: {}", ctx.user_label(), kind, content.title),
            Some(user_id),
        );

        Ok(ContentView {
            content,
            user_progress,
            quiz,
        })
    }

    /// Grade a single-question course quiz. A correct answer completes the content.
    pub fn submit_quiz(
        &self,
        user_id: i64,
        content_id: i64,
        answer: &str,
        ctx: &RequestContext,
    ) -> Result<QuizSubmitResult, AppError> {
        let content = self.content_or_404(content_id)?;
        let quiz = self.quiz_or_404(content_id)?;

        let correct = AnswerChoice::from_str(answer.trim()) == Some(quiz.correct_answer);
        let score = i32::from(correct);

        let mut progress = self.progress.get_or_create(user_id, content_id)?;
        progress.quiz_score = Some(score);
        progress.completed = correct;
        if correct {
            progress.completed_at = Some(Utc::now());
        }
        self.progress.save(&progress)?;

        self.logger.log(
            ctx,
            EventName::QuizSubmit,
            "Quiz",
            format!(
                "User {} submitted quiz for {}. Answer: {}, Correct: {}, Score: {}",
                ctx.user_label(),
                content.title,
                answer,
                if correct { "True" } else { "False" },
                score
            ),
            Some(user_id),
        );

        Ok(QuizSubmitResult {
            success: true,
            correct,
            score,
            correct_answer: quiz.correct_answer,
        })
    }

    /// Record a player event. `complete` also completes the content.
    pub fn track_video(
        &self,
        user_id: i64,
        content_id: i64,
        event_type: &str,
        current_time: i32,
        ctx: &RequestContext,
    ) -> Result<ActionResponse, AppError> {
        let event = VideoEvent::parse(event_type)
            .ok_or_else(|| AppError::bad_request(format!("Unknown video event: {}", event_type)))?;
        let content = self.content_or_404(content_id)?;

        let (mut analytics, created) =
            self.progress
                .video_get_or_create(user_id, content_id, current_time)?;

        let now = Utc::now();
        if !created {
            analytics.total_watched += (current_time - analytics.current_position).max(0);
        }

        let description = match event {
            VideoEvent::Play => {
                analytics.play_timestamp = now;
                format!(
                    "User {} started playing video: {} at {}s",
                    ctx.user_label(),
                    content.title,
                    current_time
                )
            }
            VideoEvent::Pause => {
                analytics.pause_timestamp = Some(now);
                format!(
                    "User {} paused video: {} at {}s",
                    ctx.user_label(),
                    content.title,
                    current_time
                )
            }
            VideoEvent::Complete => {
                analytics.completed = true;

                let mut progress = self.progress.get_or_create(user_id, content_id)?;
                progress.completed = true;
                progress.completed_at = Some(now);
                progress.video_watched_duration = content.video_duration;
                self.progress.save(&progress)?;

                format!("User {} completed video: {}", ctx.user_label(), content.title)
            }
        };

        analytics.current_position = current_time;
        self.progress.save_video(&analytics)?;

        self.logger
            .log(ctx, event.event_name(), "Video Player", description, Some(user_id));

        Ok(ActionResponse::done())
    }

    pub fn mark_content_read(
        &self,
        user_id: i64,
        content_id: i64,
        ctx: &RequestContext,
    ) -> Result<ActionResponse, AppError> {
        let content = self.content_or_404(content_id)?;
        if content.content_type != ContentType::Text {
            return Ok(ActionResponse::failed("Only text content can be marked as read"));
        }

        let mut progress = self.progress.get_or_create(user_id, content_id)?;
        progress.completed = true;
        progress.completed_at = Some(Utc::now());
        self.progress.save(&progress)?;

        self.logger.log(
            ctx,
            EventName::TextRead,
            "Text Content",
            format!(
                "User {} marked text content as read: {}",
                ctx.user_label(),
                content.title
            ),
            Some(user_id),
        );

        Ok(ActionResponse::ok("Content marked as read"))
    }

    // ---- admin ----

    pub fn create_course(&self, course: NewCourse) -> Result<Course, AppError> {
        if course.title.trim().is_empty() {
            return Err(AppError::bad_request("Course title is required"));
        }
        validate_length("Course title", course.title.trim(), TITLE_MAX)?;
        Ok(self.courses.insert_course(course)?)
    }

    pub fn create_content(&self, course_id: i64, draft: ContentDraft) -> Result<Content, AppError> {
        if self.courses.find_course(course_id)?.is_none() {
            return Err(AppError::not_found(format!("Course {} not found", course_id)));
        }
        if draft.title.trim().is_empty() {
            return Err(AppError::bad_request("Content title is required"));
        }
        validate_length("Content title", draft.title.trim(), TITLE_MAX)?;
        validate_optional_length("Video URL", draft.video_url.as_deref(), VIDEO_URL_MAX)?;

        match draft.content_type {
            ContentType::Video if draft.video_url.as_deref().map_or(true, str::is_empty) => {
                return Err(AppError::bad_request("Video content requires video_url"));
            }
            ContentType::Text if draft.text_content.as_deref().map_or(true, str::is_empty) => {
                return Err(AppError::bad_request("Text content requires text_content"));
            }
            _ => {}
        }

        let position = match draft.order {
            Some(order) => order,
            None => self.courses.contents_for_course(course_id)?.len() as i32,
        };

        Ok(self.courses.insert_content(NewContent {
            course_id,
            title: draft.title,
            content_type: draft.content_type,
            text_content: draft.text_content,
            video_url: draft.video_url,
            video_duration: draft.video_duration.max(0),
            position,
        })?)
    }

    /// Attach the single quiz of a quiz content item
    pub fn attach_quiz(&self, content_id: i64, draft: CourseQuizDraft) -> Result<CourseQuiz, AppError> {
        let content = self.content_or_404(content_id)?;
        if content.content_type != ContentType::Quiz {
            return Err(AppError::bad_request("Quizzes can only be attached to quiz content"));
        }
        if self.courses.quiz_for_content(content_id)?.is_some() {
            return Err(AppError::Conflict(format!(
                "Content {} already has a quiz",
                content_id
            )));
        }
        for option in [&draft.option_a, &draft.option_b, &draft.option_c, &draft.option_d] {
            validate_length("Option", option, COURSE_QUIZ_OPTION_MAX)?;
        }

        Ok(self.courses.insert_course_quiz(NewCourseQuiz {
            content_id,
            question: draft.question,
            option_a: draft.option_a,
            option_b: draft.option_b,
            option_c: draft.option_c,
            option_d: draft.option_d,
            correct_answer: draft.correct_answer,
        })?)
    }

    pub fn admin_analytics(&self) -> Result<AdminAnalyticsView, AppError> {
        let event_counts = self
            .clickstream
            .counts_by_event_name()?
            .into_iter()
            .map(|(name, count)| (name.as_str().to_string(), count))
            .collect();

        Ok(AdminAnalyticsView {
            recent_events: self.clickstream.recent(RECENT_EVENT_LIMIT)?,
            total_users: self.users.count()?,
            total_events: self.clickstream.count()?,
            total_content: self.courses.count_contents()?,
            user_progress_stats: self.progress.count_completed()?,
            event_counts,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::VideoAnalytics;
    use crate::database::repositories::{
        MockClickstreamRepository, MockCourseRepository, MockProgressRepository,
        MockUserRepository,
    };

    fn content(id: i64, content_type: ContentType) -> Content {
        Content {
            id,
            course_id: 1,
            title: "HTML Basics".to_string(),
            content_type,
            text_content: Some("HTML is the language of the web".to_string()),
            video_url: None,
            video_duration: 120,
            position: 0,
            created_at: Utc::now(),
        }
    }

    fn progress(user_id: i64, content_id: i64) -> UserProgress {
        UserProgress {
            id: 10,
            user_id,
            content_id,
            completed: false,
            completed_at: None,
            video_watched_duration: 0,
            quiz_score: None,
        }
    }

    fn course_quiz(content_id: i64) -> CourseQuiz {
        CourseQuiz {
            id: 4,
            content_id,
            question: "What does HTML stand for?".to_string(),
            option_a: "Hyper Text Markup Language".to_string(),
            option_b: "High Tech Modern Language".to_string(),
            option_c: "Home Tool Markup Language".to_string(),
            option_d: "Hyperlink Text Management Language".to_string(),
            correct_answer: AnswerChoice::A,
        }
    }

    fn accepting_clickstream() -> MockClickstreamRepository {
        let mut repo = MockClickstreamRepository::new();
        repo.expect_insert()
            .returning(|_| Err(crate::database::DatabaseError::ConnectionPoolError("down".into())));
        repo
    }

    fn service(courses: MockCourseRepository, progress: MockProgressRepository) -> LearningService {
        let clickstream = Arc::new(accepting_clickstream());
        LearningService::new(
            Arc::new(MockUserRepository::new()),
            Arc::new(courses),
            Arc::new(progress),
            clickstream.clone(),
            ClickstreamLogger::new(clickstream),
        )
    }

    #[test]
    fn test_progress_percentage() {
        assert_eq!(progress_percentage(1, 3), 33.33);
        assert_eq!(progress_percentage(2, 2), 100.0);
        assert_eq!(progress_percentage(0, 0), 0.0);
    }

    #[test]
    fn test_correct_quiz_answer_scores_and_completes() {
        let mut courses = MockCourseRepository::new();
        courses
            .expect_find_content()
            .returning(|id| Ok(Some(content(id, ContentType::Quiz))));
        courses
            .expect_quiz_for_content()
            .returning(|id| Ok(Some(course_quiz(id))));

        let mut progress_repo = MockProgressRepository::new();
        progress_repo
            .expect_get_or_create()
            .returning(|user, content| Ok(progress(user, content)));
        progress_repo
            .expect_save()
            .withf(|p| p.completed && p.quiz_score == Some(1) && p.completed_at.is_some())
            .times(1)
            .returning(|p| Ok(p.clone()));

        let result = service(courses, progress_repo)
            .submit_quiz(1, 3, "A", &RequestContext::default())
            .unwrap();

        assert!(result.correct);
        assert_eq!(result.score, 1);
        assert_eq!(result.correct_answer, AnswerChoice::A);
    }

    #[test]
    fn test_wrong_quiz_answer_leaves_completed_at_unset() {
        let mut courses = MockCourseRepository::new();
        courses
            .expect_find_content()
            .returning(|id| Ok(Some(content(id, ContentType::Quiz))));
        courses
            .expect_quiz_for_content()
            .returning(|id| Ok(Some(course_quiz(id))));

        let mut progress_repo = MockProgressRepository::new();
        progress_repo
            .expect_get_or_create()
            .returning(|user, content| Ok(progress(user, content)));
        progress_repo
            .expect_save()
            .withf(|p| !p.completed && p.quiz_score == Some(0) && p.completed_at.is_none())
            .times(1)
            .returning(|p| Ok(p.clone()));

        let result = service(courses, progress_repo)
            .submit_quiz(1, 3, "B", &RequestContext::default())
            .unwrap();
        assert!(!result.correct);
        assert_eq!(result.score, 0);
    }

    #[test]
    fn test_quiz_content_without_quiz_is_404() {
        let mut courses = MockCourseRepository::new();
        courses
            .expect_find_content()
            .returning(|id| Ok(Some(content(id, ContentType::Quiz))));
        courses.expect_quiz_for_content().returning(|_| Ok(None));

        let mut progress_repo = MockProgressRepository::new();
        progress_repo
            .expect_get_or_create()
            .returning(|user, content| Ok(progress(user, content)));

        let result = service(courses, progress_repo).content_view(1, 3, &RequestContext::default());
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[test]
    fn test_mark_read_rejects_non_text() {
        let mut courses = MockCourseRepository::new();
        courses
            .expect_find_content()
            .returning(|id| Ok(Some(content(id, ContentType::Video))));

        let response = service(courses, MockProgressRepository::new())
            .mark_content_read(1, 2, &RequestContext::default())
            .unwrap();
        assert_eq!(
            response,
            ActionResponse::failed("Only text content can be marked as read")
        );
    }

    #[test]
    fn test_unknown_video_event_is_bad_request() {
        let result = service(MockCourseRepository::new(), MockProgressRepository::new())
            .track_video(1, 2, "rewind", 10, &RequestContext::default());
        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[test]
    fn test_video_complete_marks_progress_with_duration() {
        let mut courses = MockCourseRepository::new();
        courses
            .expect_find_content()
            .returning(|id| Ok(Some(content(id, ContentType::Video))));

        let mut progress_repo = MockProgressRepository::new();
        progress_repo
            .expect_video_get_or_create()
            .returning(|user_id, content_id, _| {
                Ok((
                    VideoAnalytics {
                        id: 1,
                        user_id,
                        content_id,
                        play_timestamp: Utc::now(),
                        pause_timestamp: None,
                        current_position: 100,
                        total_watched: 100,
                        completed: false,
                    },
                    false,
                ))
            });
        progress_repo
            .expect_get_or_create()
            .returning(|user, content| Ok(progress(user, content)));
        progress_repo
            .expect_save()
            .withf(|p| p.completed && p.video_watched_duration == 120)
            .times(1)
            .returning(|p| Ok(p.clone()));
        progress_repo
            .expect_save_video()
            .withf(|v| v.completed && v.current_position == 120 && v.total_watched == 120)
            .times(1)
            .returning(|v| Ok(v.clone()));

        let response = service(courses, progress_repo)
            .track_video(1, 2, "complete", 120, &RequestContext::default())
            .unwrap();
        assert!(response.success);
    }

    #[test]
    fn test_attach_quiz_requires_quiz_content() {
        let mut courses = MockCourseRepository::new();
        courses
            .expect_find_content()
            .returning(|id| Ok(Some(content(id, ContentType::Text))));

        let draft = CourseQuizDraft {
            question: "q".into(),
            option_a: "a".into(),
            option_b: "b".into(),
            option_c: "c".into(),
            option_d: "d".into(),
            correct_answer: AnswerChoice::A,
        };
        let result = service(courses, MockProgressRepository::new()).attach_quiz(2, draft);
        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }
}
