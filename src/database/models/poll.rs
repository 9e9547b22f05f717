use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::Serialize;
use utoipa::ToSchema;

use crate::database::enums::{PollStatus, PollType};

#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Serialize, ToSchema)]
#[diesel(table_name = crate::database::schema::polls)]
pub struct Poll {
    pub id: i64,
    pub teacher_id: i64,
    pub question: String,
    pub poll_type: PollType,
    pub poll_code: String,
    pub status: PollStatus,
    pub created_at: DateTime<Utc>,
    pub closed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = crate::database::schema::polls)]
pub struct NewPoll {
    pub teacher_id: i64,
    pub question: String,
    pub poll_type: PollType,
    pub poll_code: String,
    pub status: PollStatus,
}

#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Serialize, ToSchema)]
#[diesel(table_name = crate::database::schema::poll_options)]
pub struct PollOption {
    pub id: i64,
    pub poll_id: i64,
    pub option_text: String,
    #[serde(rename = "order")]
    pub position: i32,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = crate::database::schema::poll_options)]
pub struct NewPollOption {
    pub poll_id: i64,
    pub option_text: String,
    pub position: i32,
}

/// One row per chosen option, or a single row carrying `text_response`
#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Serialize, ToSchema)]
#[diesel(table_name = crate::database::schema::poll_responses)]
pub struct PollResponse {
    pub id: i64,
    pub poll_id: i64,
    pub option_id: Option<i64>,
    pub text_response: Option<String>,
    #[serde(skip_serializing)]
    pub respondent_key: String,
    pub respondent_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Insertable)]
#[diesel(table_name = crate::database::schema::poll_responses)]
pub struct NewPollResponse {
    pub poll_id: i64,
    pub option_id: Option<i64>,
    pub text_response: Option<String>,
    pub respondent_key: String,
    pub respondent_name: Option<String>,
}

#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Serialize, ToSchema)]
#[diesel(table_name = crate::database::schema::poll_analytics)]
pub struct PollAnalytics {
    pub id: i64,
    pub poll_id: i64,
    pub total_responses: i32,
    #[schema(value_type = Vec<Object>)]
    pub option_counts: serde_json::Value,
    #[schema(value_type = Vec<Object>)]
    pub word_cloud: serde_json::Value,
    pub generated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable, AsChangeset)]
#[diesel(table_name = crate::database::schema::poll_analytics)]
pub struct NewPollAnalytics {
    pub poll_id: i64,
    pub total_responses: i32,
    pub option_counts: serde_json::Value,
    pub word_cloud: serde_json::Value,
}
