use utoipa::OpenApi;

use crate::api::responses::*;
use crate::api::{
    admin_handlers, auth_handlers, feedback_handlers, learning_handlers, live_quiz_handlers,
    poll_handlers, quiz_handlers,
};
use crate::database::enums::{
    AnswerChoice, ApprovalStatus, Clarity, ContentType, DoubtStatus, Engagement, EventName,
    GenerationMethod, PollStatus, PollType, QuestionType, QuizStatus,
};
use crate::database::models::{
    ClickstreamEvent, Content, Course, CourseQuiz, Doubt, Feedback, LiveQuiz, NewCourse, Poll,
    PollOption, QuizAnalytics, QuizParticipant, QuizQuestion, StudentAnalysis, TeacherProfile,
    User, UserProgress,
};
use crate::llm::BloomQuestion;
use crate::services::analytics::{DifficultQuestion, TopicPerformance};
use crate::services::feedback::{
    CourseFeedback, DoubtRequest, DoubtUpdate, FeedbackRequest, FeedbackSummary,
};
use crate::services::learning::{
    ActionResponse, AdminAnalyticsView, ContentDraft, ContentView, CourseDetailView,
    CourseQuizDraft, DashboardView, HomeView, QuizPayload, QuizSubmitResult,
};
use crate::services::live_quiz::{
    CreateQuizRequest, GenerateQuestionsRequest, JoinOutcome, JoinQuizRequest, ParticipantQuestion,
    ParticipantQuiz, ParticipantResults, PersonalizedHelp, QuestionDraft, QuestionEdit,
    QuestionReview, QuestionWordCloud, QuizDetail, QuizInsights, SubmissionResult,
    SubmitAnswersRequest, TeacherResults, WordCloudSource,
};
use crate::services::polls::{
    CreatePollRequest, OptionCount, PollAnswerRequest, PollResults, PollTally, PollView,
};
use crate::wordcloud::WordCount;

/// OpenAPI specification
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Classroom Quiz API",
        version = "1.0.0",
        description = "Course learning with clickstream tracking, live classroom quizzes and polls, and LLM-assisted question generation",
        license(
            name = "MIT"
        )
    ),
    paths(
        auth_handlers::health_check,
        auth_handlers::register,
        auth_handlers::login,
        auth_handlers::logout,
        auth_handlers::admin_login,
        auth_handlers::teacher_login,
        auth_handlers::me,
        learning_handlers::home,
        learning_handlers::dashboard,
        learning_handlers::course_detail,
        learning_handlers::content_detail,
        learning_handlers::submit_quiz,
        learning_handlers::track_video,
        learning_handlers::mark_content_read,
        admin_handlers::admin_analytics,
        admin_handlers::create_course,
        admin_handlers::create_content,
        admin_handlers::attach_quiz,
        live_quiz_handlers::list_quizzes,
        live_quiz_handlers::create_quiz,
        live_quiz_handlers::get_quiz,
        live_quiz_handlers::start_quiz,
        live_quiz_handlers::end_quiz,
        live_quiz_handlers::add_question,
        live_quiz_handlers::generate_questions,
        live_quiz_handlers::update_question,
        live_quiz_handlers::approve_question,
        live_quiz_handlers::reject_question,
        live_quiz_handlers::delete_question,
        live_quiz_handlers::quiz_results,
        live_quiz_handlers::quiz_analytics,
        live_quiz_handlers::quiz_insights,
        live_quiz_handlers::quiz_word_cloud,
        live_quiz_handlers::participant_help,
        quiz_handlers::join_quiz,
        quiz_handlers::quiz_questions,
        quiz_handlers::submit_answers,
        quiz_handlers::quiz_results,
        poll_handlers::list_polls,
        poll_handlers::create_poll,
        poll_handlers::close_poll,
        poll_handlers::delete_poll,
        poll_handlers::poll_results,
        poll_handlers::get_poll,
        poll_handlers::respond_to_poll,
        feedback_handlers::submit_feedback,
        feedback_handlers::course_feedback,
        feedback_handlers::raise_doubt,
        feedback_handlers::course_doubts,
        feedback_handlers::update_doubt,
    ),
    components(
        schemas(
            ErrorResponse,
            HealthResponse,
            MessageResponse,
            RegisterRequest,
            LoginRequest,
            AdminLoginRequest,
            TeacherLoginRequest,
            LoginResponse,
            TeacherLoginResponse,
            MeResponse,
            TrackVideoRequest,
            SubmitQuizRequest,
            User,
            TeacherProfile,
            Course,
            NewCourse,
            Content,
            CourseQuiz,
            UserProgress,
            ClickstreamEvent,
            HomeView,
            DashboardView,
            CourseDetailView,
            ContentView,
            QuizPayload,
            QuizSubmitResult,
            ActionResponse,
            AdminAnalyticsView,
            ContentDraft,
            CourseQuizDraft,
            LiveQuiz,
            QuizQuestion,
            QuizParticipant,
            QuizAnalytics,
            StudentAnalysis,
            BloomQuestion,
            CreateQuizRequest,
            QuestionDraft,
            GenerateQuestionsRequest,
            QuestionEdit,
            JoinQuizRequest,
            SubmitAnswersRequest,
            QuizDetail,
            ParticipantQuestion,
            ParticipantQuiz,
            JoinOutcome,
            SubmissionResult,
            QuestionReview,
            ParticipantResults,
            TeacherResults,
            QuizInsights,
            PersonalizedHelp,
            QuestionWordCloud,
            WordCloudSource,
            WordCount,
            DifficultQuestion,
            TopicPerformance,
            Poll,
            PollOption,
            CreatePollRequest,
            PollAnswerRequest,
            OptionCount,
            PollView,
            PollTally,
            PollResults,
            Feedback,
            Doubt,
            FeedbackRequest,
            DoubtRequest,
            DoubtUpdate,
            FeedbackSummary,
            CourseFeedback,
            ContentType,
            EventName,
            AnswerChoice,
            QuizStatus,
            QuestionType,
            GenerationMethod,
            ApprovalStatus,
            PollType,
            PollStatus,
            Clarity,
            Engagement,
            DoubtStatus,
        )
    ),
    tags(
        (name = "Health", description = "Health check endpoints"),
        (name = "Auth", description = "Learner, admin and teacher sessions"),
        (name = "Learning", description = "Courses, content and learner progress"),
        (name = "Admin", description = "Course authoring and clickstream analytics"),
        (name = "Teacher Quizzes", description = "Live quiz lifecycle"),
        (name = "Teacher Questions", description = "Manual and generated questions"),
        (name = "Teacher Reports", description = "Results, analytics and insights"),
        (name = "Student Quiz", description = "Joining and answering a live quiz"),
        (name = "Polls", description = "Classroom polls"),
        (name = "Feedback", description = "Course feedback and doubts"),
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_every_route_group() {
        let doc = ApiDoc::openapi();
        let paths = &doc.paths.paths;

        for path in [
            "/health",
            "/api/auth/login",
            "/api/contents/{content_id}/submit-quiz",
            "/api/teacher/quizzes/{quiz_id}/questions/generate",
            "/api/quiz/{code}/submit",
            "/api/polls/{code}/respond",
            "/api/doubts/{doubt_id}",
        ] {
            assert!(paths.contains_key(path), "missing {}", path);
        }
    }
}
