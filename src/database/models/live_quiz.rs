use chrono::{DateTime, Duration, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::database::enums::{
    AnswerChoice, ApprovalStatus, GenerationMethod, QuestionType, QuizStatus,
};

/// Teacher account extension. Email is unique across teachers.
#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Serialize, ToSchema)]
#[diesel(table_name = crate::database::schema::teacher_profiles)]
pub struct TeacherProfile {
    pub id: i64,
    pub user_id: i64,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = crate::database::schema::teacher_profiles)]
pub struct NewTeacherProfile {
    pub user_id: i64,
    pub email: String,
}

/// Teacher-run quiz joined by students through `quiz_code`
#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Serialize, ToSchema)]
#[diesel(table_name = crate::database::schema::live_quizzes)]
pub struct LiveQuiz {
    pub id: i64,
    pub teacher_id: i64,
    pub title: String,
    pub description: String,
    pub quiz_code: String,
    pub status: QuizStatus,
    pub created_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub ended_at: Option<DateTime<Utc>>,
    /// Time limit in minutes
    pub time_limit: i32,
}

impl LiveQuiz {
    /// Moment the time limit runs out, if the quiz has started
    pub fn deadline(&self) -> Option<DateTime<Utc>> {
        self.started_at
            .map(|started| started + Duration::minutes(i64::from(self.time_limit)))
    }

    /// True once an active quiz has run past its time limit
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.status == QuizStatus::Active && self.deadline().is_some_and(|d| d <= now)
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = crate::database::schema::live_quizzes)]
pub struct NewLiveQuiz {
    pub teacher_id: i64,
    pub title: String,
    pub description: String,
    pub quiz_code: String,
    pub status: QuizStatus,
    pub time_limit: i32,
}

#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Serialize, Deserialize, ToSchema)]
#[diesel(table_name = crate::database::schema::quiz_questions)]
pub struct QuizQuestion {
    pub id: i64,
    pub quiz_id: i64,
    pub question_text: String,
    pub question_type: QuestionType,
    pub option_a: String,
    pub option_b: String,
    pub option_c: String,
    pub option_d: String,
    /// None for subjective questions
    pub correct_answer: Option<AnswerChoice>,
    pub explanation: String,
    pub topic: String,
    pub generation_method: GenerationMethod,
    pub approval_status: ApprovalStatus,
    /// Source text used for LLM generation
    pub source_text: String,
    #[serde(rename = "order")]
    pub position: i32,
    pub created_at: DateTime<Utc>,
}

impl QuizQuestion {
    /// Text of the option behind a letter
    pub fn option_text(&self, choice: AnswerChoice) -> &str {
        match choice {
            AnswerChoice::A => &self.option_a,
            AnswerChoice::B => &self.option_b,
            AnswerChoice::C => &self.option_c,
            AnswerChoice::D => &self.option_d,
        }
    }

    /// Topic label, "General" when none was recorded
    pub fn topic_or_default(&self) -> &str {
        if self.topic.trim().is_empty() {
            "General"
        } else {
            self.topic.trim()
        }
    }

    pub fn is_approved(&self) -> bool {
        self.approval_status == ApprovalStatus::Approved
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = crate::database::schema::quiz_questions)]
pub struct NewQuizQuestion {
    pub quiz_id: i64,
    pub question_text: String,
    pub question_type: QuestionType,
    pub option_a: String,
    pub option_b: String,
    pub option_c: String,
    pub option_d: String,
    pub correct_answer: Option<AnswerChoice>,
    pub explanation: String,
    pub topic: String,
    pub generation_method: GenerationMethod,
    pub approval_status: ApprovalStatus,
    pub source_text: String,
    pub position: i32,
}

/// Partial update of a question; `None` leaves the column untouched
#[derive(Debug, Clone, Default, AsChangeset)]
#[diesel(table_name = crate::database::schema::quiz_questions)]
pub struct QuestionChanges {
    pub question_text: Option<String>,
    pub option_a: Option<String>,
    pub option_b: Option<String>,
    pub option_c: Option<String>,
    pub option_d: Option<String>,
    pub correct_answer: Option<AnswerChoice>,
    pub explanation: Option<String>,
    pub topic: Option<String>,
    pub approval_status: Option<ApprovalStatus>,
    pub position: Option<i32>,
}

impl QuestionChanges {
    /// Diesel refuses an update with no columns set
    pub fn is_empty(&self) -> bool {
        self.question_text.is_none()
            && self.option_a.is_none()
            && self.option_b.is_none()
            && self.option_c.is_none()
            && self.option_d.is_none()
            && self.correct_answer.is_none()
            && self.explanation.is_none()
            && self.topic.is_none()
            && self.approval_status.is_none()
            && self.position.is_none()
    }
}

/// A student taking a live quiz. Unique on (quiz_id, student_email).
#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Serialize, ToSchema)]
#[diesel(table_name = crate::database::schema::quiz_participants)]
pub struct QuizParticipant {
    pub id: i64,
    pub quiz_id: i64,
    pub student_name: String,
    pub student_email: String,
    pub joined_at: DateTime<Utc>,
    pub submitted_at: Option<DateTime<Utc>>,
    pub score: i32,
    pub total_questions: i32,
}

impl QuizParticipant {
    pub fn has_submitted(&self) -> bool {
        self.submitted_at.is_some()
    }

    /// Score as a percentage of objective questions, 0 when there were none
    pub fn percentage(&self) -> f64 {
        if self.total_questions > 0 {
            f64::from(self.score) / f64::from(self.total_questions) * 100.0
        } else {
            0.0
        }
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = crate::database::schema::quiz_participants)]
pub struct NewQuizParticipant {
    pub quiz_id: i64,
    pub student_name: String,
    pub student_email: String,
}

#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Serialize, ToSchema)]
#[diesel(table_name = crate::database::schema::quiz_answers)]
pub struct QuizAnswer {
    pub id: i64,
    pub participant_id: i64,
    pub question_id: i64,
    pub selected_answer: AnswerChoice,
    pub is_correct: bool,
    pub answered_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Insertable)]
#[diesel(table_name = crate::database::schema::quiz_answers)]
pub struct NewQuizAnswer {
    pub participant_id: i64,
    pub question_id: i64,
    pub selected_answer: AnswerChoice,
    pub is_correct: bool,
}

#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Serialize, ToSchema)]
#[diesel(table_name = crate::database::schema::subjective_answers)]
pub struct SubjectiveAnswer {
    pub id: i64,
    pub participant_id: i64,
    pub question_id: i64,
    pub answer_text: String,
    pub answered_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Insertable)]
#[diesel(table_name = crate::database::schema::subjective_answers)]
pub struct NewSubjectiveAnswer {
    pub participant_id: i64,
    pub question_id: i64,
    pub answer_text: String,
}

/// Cached per-participant performance analysis
#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Serialize, ToSchema)]
#[diesel(table_name = crate::database::schema::student_analyses)]
pub struct StudentAnalysis {
    pub id: i64,
    pub participant_id: i64,
    #[schema(value_type = Vec<String>)]
    pub weak_topics: serde_json::Value,
    #[schema(value_type = Vec<String>)]
    pub strong_topics: serde_json::Value,
    pub recommendations: String,
    pub reading_material: String,
    #[schema(value_type = Vec<Object>)]
    pub practice_questions: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = crate::database::schema::student_analyses)]
pub struct NewStudentAnalysis {
    pub participant_id: i64,
    pub weak_topics: serde_json::Value,
    pub strong_topics: serde_json::Value,
    pub recommendations: String,
    pub reading_material: String,
    pub practice_questions: serde_json::Value,
}

/// Aggregated quiz statistics, one row per quiz, regenerated in place
#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Serialize, ToSchema)]
#[diesel(table_name = crate::database::schema::quiz_analytics)]
pub struct QuizAnalytics {
    pub id: i64,
    pub quiz_id: i64,
    pub total_participants: i32,
    pub average_score: f64,
    pub completion_rate: f64,
    #[schema(value_type = Vec<Object>)]
    pub difficult_questions: serde_json::Value,
    #[schema(value_type = Object)]
    pub common_mistakes: serde_json::Value,
    #[schema(value_type = Object)]
    pub topic_performance: serde_json::Value,
    pub generated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable, AsChangeset)]
#[diesel(table_name = crate::database::schema::quiz_analytics)]
pub struct NewQuizAnalytics {
    pub quiz_id: i64,
    pub total_participants: i32,
    pub average_score: f64,
    pub completion_rate: f64,
    pub difficult_questions: serde_json::Value,
    pub common_mistakes: serde_json::Value,
    pub topic_performance: serde_json::Value,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quiz(status: QuizStatus, started_minutes_ago: Option<i64>, time_limit: i32) -> LiveQuiz {
        LiveQuiz {
            id: 1,
            teacher_id: 1,
            title: "Photosynthesis".to_string(),
            description: String::new(),
            quiz_code: "AB12CD".to_string(),
            status,
            created_at: Utc::now(),
            started_at: started_minutes_ago.map(|m| Utc::now() - Duration::minutes(m)),
            ended_at: None,
            time_limit,
        }
    }

    #[test]
    fn test_quiz_expiry() {
        assert!(quiz(QuizStatus::Active, Some(31), 30).is_expired(Utc::now()));
        assert!(!quiz(QuizStatus::Active, Some(5), 30).is_expired(Utc::now()));
        assert!(!quiz(QuizStatus::Draft, None, 30).is_expired(Utc::now()));
        assert!(!quiz(QuizStatus::Ended, Some(90), 30).is_expired(Utc::now()));
    }

    #[test]
    fn test_participant_percentage() {
        let mut participant = QuizParticipant {
            id: 1,
            quiz_id: 1,
            student_name: "Asha".to_string(),
            student_email: "asha@example.com".to_string(),
            joined_at: Utc::now(),
            submitted_at: None,
            score: 3,
            total_questions: 4,
        };
        assert_eq!(participant.percentage(), 75.0);

        participant.total_questions = 0;
        assert_eq!(participant.percentage(), 0.0);
    }
}
