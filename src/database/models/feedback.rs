use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::Serialize;
use utoipa::ToSchema;

use crate::database::enums::{Clarity, DoubtStatus, Engagement};

/// Lesson feedback left by a student (optionally anonymous)
#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Serialize, ToSchema)]
#[diesel(table_name = crate::database::schema::feedback)]
pub struct Feedback {
    pub id: i64,
    pub student_id: Option<i64>,
    pub anonymous: bool,
    pub course_id: i64,
    pub content_id: Option<i64>,
    /// 1-5
    pub rating: Option<i16>,
    pub clarity: Option<Clarity>,
    pub engagement: Option<Engagement>,
    /// 1-5
    pub instructor_rating: Option<i16>,
    pub comment: String,
    pub created_at: DateTime<Utc>,
    /// Browser, device and similar client details
    #[schema(value_type = Object)]
    pub metadata: serde_json::Value,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = crate::database::schema::feedback)]
pub struct NewFeedback {
    pub student_id: Option<i64>,
    pub anonymous: bool,
    pub course_id: i64,
    pub content_id: Option<i64>,
    pub rating: Option<i16>,
    pub clarity: Option<Clarity>,
    pub engagement: Option<Engagement>,
    pub instructor_rating: Option<i16>,
    pub comment: String,
    pub metadata: serde_json::Value,
}

/// A question raised by a student about a course or a specific content item
#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Serialize, ToSchema)]
#[diesel(table_name = crate::database::schema::doubts)]
pub struct Doubt {
    pub id: i64,
    pub student_id: Option<i64>,
    pub anonymous: bool,
    pub course_id: i64,
    pub content_id: Option<i64>,
    #[serde(rename = "text")]
    pub body: String,
    pub created_at: DateTime<Utc>,
    pub status: DoubtStatus,
    /// User who handled the doubt
    pub teacher_id: Option<i64>,
    pub resolution: String,
    pub resolved_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = crate::database::schema::doubts)]
pub struct NewDoubt {
    pub student_id: Option<i64>,
    pub anonymous: bool,
    pub course_id: i64,
    pub content_id: Option<i64>,
    pub body: String,
}

#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = crate::database::schema::doubts)]
pub struct DoubtChanges {
    pub status: DoubtStatus,
    pub teacher_id: Option<i64>,
    pub resolution: Option<String>,
    pub resolved_at: Option<DateTime<Utc>>,
}
