pub mod clickstream;
pub mod course;
pub mod feedback;
pub mod live_quiz;
pub mod poll;
pub mod progress;
pub mod user;

pub use clickstream::{ClickstreamEvent, NewClickstreamEvent};
pub use course::{Content, Course, CourseQuiz, NewContent, NewCourse, NewCourseQuiz};
pub use feedback::{Doubt, DoubtChanges, Feedback, NewDoubt, NewFeedback};
pub use live_quiz::{
    LiveQuiz, NewLiveQuiz, NewQuizAnalytics, NewQuizAnswer, NewQuizParticipant, NewQuizQuestion,
    NewStudentAnalysis, NewSubjectiveAnswer, NewTeacherProfile, QuestionChanges, QuizAnalytics,
    QuizAnswer, QuizParticipant, QuizQuestion, StudentAnalysis, SubjectiveAnswer, TeacherProfile,
};
pub use poll::{NewPoll, NewPollAnalytics, NewPollOption, NewPollResponse, Poll, PollAnalytics, PollOption, PollResponse};
pub use progress::{NewUserProgress, NewVideoAnalytics, UserProgress, VideoAnalytics};
pub use user::{NewUser, User};
