use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::Serialize;
use utoipa::ToSchema;

/// Per-user completion state for one content item
///
/// Unique on (user_id, content_id).
#[derive(Debug, Clone, Queryable, Selectable, Identifiable, AsChangeset, Serialize, ToSchema)]
#[diesel(table_name = crate::database::schema::user_progress)]
#[diesel(treat_none_as_null = true)]
pub struct UserProgress {
    pub id: i64,
    pub user_id: i64,
    pub content_id: i64,
    pub completed: bool,
    pub completed_at: Option<DateTime<Utc>>,
    /// Seconds watched
    pub video_watched_duration: i32,
    pub quiz_score: Option<i32>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = crate::database::schema::user_progress)]
pub struct NewUserProgress {
    pub user_id: i64,
    pub content_id: i64,
}

/// Playback state of a video for one user
#[derive(Debug, Clone, Queryable, Selectable, Identifiable, AsChangeset, Serialize, ToSchema)]
#[diesel(table_name = crate::database::schema::video_analytics)]
#[diesel(treat_none_as_null = true)]
pub struct VideoAnalytics {
    pub id: i64,
    pub user_id: i64,
    pub content_id: i64,
    pub play_timestamp: DateTime<Utc>,
    pub pause_timestamp: Option<DateTime<Utc>>,
    /// Current playback position in seconds
    pub current_position: i32,
    /// Total seconds watched
    pub total_watched: i32,
    pub completed: bool,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = crate::database::schema::video_analytics)]
pub struct NewVideoAnalytics {
    pub user_id: i64,
    pub content_id: i64,
    pub current_position: i32,
}
