use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::database::enums::{AnswerChoice, ContentType};

/// Course entity - top of the course -> content -> quiz hierarchy
#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Serialize, Deserialize, ToSchema)]
#[diesel(table_name = crate::database::schema::courses)]
pub struct Course {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable, Deserialize, ToSchema)]
#[diesel(table_name = crate::database::schema::courses)]
pub struct NewCourse {
    pub title: String,
    #[serde(default)]
    pub description: String,
}

/// A unit of course material: a video, a text lesson or a single-question quiz
#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Serialize, Deserialize, ToSchema)]
#[diesel(table_name = crate::database::schema::contents)]
pub struct Content {
    pub id: i64,
    pub course_id: i64,
    pub title: String,
    pub content_type: ContentType,
    pub text_content: Option<String>,
    pub video_url: Option<String>,
    /// Duration in seconds
    pub video_duration: i32,
    /// Display order within the course
    #[serde(rename = "order")]
    pub position: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = crate::database::schema::contents)]
pub struct NewContent {
    pub course_id: i64,
    pub title: String,
    pub content_type: ContentType,
    pub text_content: Option<String>,
    pub video_url: Option<String>,
    pub video_duration: i32,
    pub position: i32,
}

/// Multiple-choice question attached one-to-one to a quiz content
#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Serialize, Deserialize, ToSchema)]
#[diesel(table_name = crate::database::schema::course_quizzes)]
pub struct CourseQuiz {
    pub id: i64,
    pub content_id: i64,
    pub question: String,
    pub option_a: String,
    pub option_b: String,
    pub option_c: String,
    pub option_d: String,
    pub correct_answer: AnswerChoice,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = crate::database::schema::course_quizzes)]
pub struct NewCourseQuiz {
    pub content_id: i64,
    pub question: String,
    pub option_a: String,
    pub option_b: String,
    pub option_c: String,
    pub option_d: String,
    pub correct_answer: AnswerChoice,
}
